//! # botbox-core
//!
//! Shared library for BotBox grid-game clients: the per-turn state model and
//! the JSON turn protocol.
//!
//! It has no async runtime, no sockets and no global state, so everything in
//! it can be unit-tested in isolation and reused by any transport.
//!
//! - **`domain`** – The decoded view of one turn: [`Board`], [`Snapshot`],
//!   [`Action`] labels, the occupancy-based [`legal_moves`] helper and a
//!   plain-text [`render`] for debug logs.
//!
//! - **`protocol`** – How a turn travels over the wire.  A notification is
//!   decoded into a [`Snapshot`]; the agent's [`Response`] is encoded in the
//!   envelope of the configured [`ProtocolVariant`].

pub mod domain;
pub mod protocol;

pub use domain::{
    legal_directions, legal_moves, legal_moves_with, render, Action, Board, CellValue, Coord,
    Direction, MovePolicy, PlayerState, Snapshot,
};
pub use protocol::{
    decode_notification, decode_response, encode_response, DecodeError, ProtocolVariant, Response,
    TurnCounter,
};
