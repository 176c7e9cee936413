//! Domain entities for BotBox grid games.
//!
//! Pure data and functions: no I/O, no async, no logging.  Everything here can
//! be built and tested without a server.

pub mod action;
pub mod board;
pub mod moves;
pub mod render;
pub mod snapshot;

pub use action::{Action, Direction};
pub use board::{Board, CellValue, Coord};
pub use moves::{legal_directions, legal_moves, legal_moves_with, MovePolicy};
pub use render::render;
pub use snapshot::{PlayerState, Snapshot};
