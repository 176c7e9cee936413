//! JSON codec for turn notifications and replies.
//!
//! Decoding turns a raw frame into a validated [`Snapshot`]; encoding turns a
//! [`Response`] into the envelope of the configured [`ProtocolVariant`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;
use tracing::trace;

use crate::domain::action::Action;
use crate::domain::board::{Board, CellValue, Coord};
use crate::domain::snapshot::{PlayerState, Snapshot};
use crate::protocol::messages::{
    ActionEnvelope, LegacyEnvelope, ProtocolVariant, Response, WireCell, WireNotification,
    LEGACY_DO_TYPE,
};

/// Errors raised while decoding a frame from the server.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The payload is not well-formed JSON.
    #[error("malformed JSON: {0}")]
    Malformed(String),

    /// The JSON is well-formed but a value has the wrong type.
    #[error("unexpected message shape: {0}")]
    InvalidShape(String),

    /// A required field is absent or `null`.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present with the right type but an unusable value.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// A legacy envelope whose `type` is not `"do"`.
    #[error("unexpected message type `{0}`")]
    UnexpectedType(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        match e.classify() {
            Category::Data => DecodeError::InvalidShape(e.to_string()),
            Category::Syntax | Category::Eof | Category::Io => DecodeError::Malformed(e.to_string()),
        }
    }
}

// ── Inbound ───────────────────────────────────────────────────────────────────

/// Decodes one server notification into a [`Snapshot`].
///
/// # Errors
///
/// - [`DecodeError::Malformed`] if `raw` is not JSON.
/// - [`DecodeError::InvalidShape`] if a field has the wrong JSON type, or a
///   cell value is neither a number nor a string.
/// - [`DecodeError::MissingField`] if `actions`, `state`, `state.w`,
///   `state.h` or `state.players` is absent, or `player` is absent under
///   [`ProtocolVariant::PerPlayer`].
/// - [`DecodeError::InvalidField`] if `w`/`h` are not positive 32-bit
///   integers or a cell key is not an integer.
///
/// Cells outside `[0, w) × [0, h)` are kept as-is.
///
/// ```rust
/// use botbox_core::protocol::{decode_notification, ProtocolVariant};
///
/// let raw = br#"{"player":0,"actions":["east"],
///               "state":{"w":2,"h":1,"players":[{"x":0,"y":0}]}}"#;
/// let snap = decode_notification(raw, ProtocolVariant::PerPlayer).unwrap();
/// assert_eq!(snap.actions()[0].as_str(), "east");
/// ```
pub fn decode_notification(raw: &[u8], variant: ProtocolVariant) -> Result<Snapshot, DecodeError> {
    let wire: WireNotification = serde_json::from_slice(raw)?;

    let actions = wire.actions.ok_or(DecodeError::MissingField("actions"))?;
    let state = wire.state.ok_or(DecodeError::MissingField("state"))?;
    let width = dimension("state.w", state.w)?;
    let height = dimension("state.h", state.h)?;
    let players = state.players.ok_or(DecodeError::MissingField("state.players"))?;

    let player = match (variant.requires_player(), wire.player) {
        (true, None) => return Err(DecodeError::MissingField("player")),
        (_, p) => p,
    };

    let mut cells = BTreeMap::new();
    for (x_key, column) in state.cells.unwrap_or_default() {
        let x = coordinate_key(&x_key)?;
        for (y_key, value) in column {
            let y = coordinate_key(&y_key)?;
            let value = match value {
                WireCell::Int(n) => CellValue::Int(n),
                WireCell::Text(s) => CellValue::Text(s),
            };
            cells.insert(Coord::new(x, y), value);
        }
    }

    let board = Board::new(width, height, cells);
    let outside = board.cells().filter(|(c, _)| !board.contains(**c)).count();
    if outside > 0 {
        trace!("notification has {outside} cell(s) outside the {width}x{height} grid");
    }

    let players = players
        .into_iter()
        .enumerate()
        .map(|(index, c)| PlayerState {
            index,
            position: Coord::new(c.x, c.y),
        })
        .collect();

    Ok(Snapshot::new(
        wire.turn,
        player,
        actions.into_iter().map(Action::from).collect(),
        board,
        players,
    ))
}

fn dimension(field: &'static str, value: Option<i64>) -> Result<u32, DecodeError> {
    let value = value.ok_or(DecodeError::MissingField(field))?;
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(DecodeError::InvalidField {
            field,
            reason: format!("expected a positive integer, got {value}"),
        }),
    }
}

fn coordinate_key(key: &str) -> Result<i64, DecodeError> {
    key.trim().parse().map_err(|_| DecodeError::InvalidField {
        field: "state.cells",
        reason: format!("coordinate key {key:?} is not an integer"),
    })
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// Serializes `response` in the envelope of `variant`.
///
/// # Errors
///
/// Only fails if `serde_json` fails to serialize two string fields, which
/// does not happen in practice; the error is still propagated.
pub fn encode_response(response: &Response, variant: ProtocolVariant) -> Result<String, serde_json::Error> {
    serde_json::to_string(&variant.envelope(response.action()))
}

/// Parses a reply envelope back into its action.
///
/// Used by test servers and echo checks; a client never receives its own
/// envelope.
///
/// # Errors
///
/// Returns [`DecodeError`] on malformed JSON, a missing field, or a legacy
/// envelope whose `type` is not `"do"`.
pub fn decode_response(raw: &[u8], variant: ProtocolVariant) -> Result<Action, DecodeError> {
    match variant {
        ProtocolVariant::PerPlayer => {
            let env: ActionEnvelope = parse(raw)?;
            Ok(Action::from(env.action))
        }
        ProtocolVariant::Legacy => {
            let env: LegacyEnvelope = parse(raw)?;
            if env.kind != LEGACY_DO_TYPE {
                return Err(DecodeError::UnexpectedType(env.kind));
            }
            Ok(Action::from(env.payload))
        }
    }
}

fn parse<T: DeserializeOwned>(raw: &[u8]) -> Result<T, DecodeError> {
    Ok(serde_json::from_slice(raw)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
