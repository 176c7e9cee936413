//! JSON message shapes exchanged with the game server.
//!
//! # Inbound (server → client)
//!
//! ```json
//! {"turn": 10, "player": 1, "actions": ["north", "east"],
//!  "state": {"w": 20, "h": 20,
//!            "cells": {"3": {"4": 0}},
//!            "players": [{"x": 0, "y": 0}, {"x": 19, "y": 19}]}}
//! ```
//!
//! `cells` is keyed by the string form of `x`, then of `y`, because the
//! server's JSON encoder only supports string keys.  `turn` and `player` are
//! optional on the wire; whether `player` is required depends on the
//! [`ProtocolVariant`].
//!
//! # Outbound (client → server)
//!
//! - per-player variant: `{"action": "north"}`
//! - legacy variant: `{"type": "do", "payload": "north"}`
//!
//! The raw wire structs keep required fields as `Option` so that the codec
//! can report exactly which one is missing instead of serde's generic
//! "missing field" message.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::action::Action;

/// Message type of a legacy envelope carrying an action.
pub const LEGACY_DO_TYPE: &str = "do";

/// Which envelope the server speaks.
///
/// Exactly one variant is used per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProtocolVariant {
    /// Notifications carry `player`; replies are `{"action": ...}`.
    #[default]
    PerPlayer,
    /// Single agent type, no `player`; replies are `{"type":"do","payload":...}`.
    Legacy,
}

impl ProtocolVariant {
    /// Returns `true` if notifications must carry the `player` field.
    pub const fn requires_player(self) -> bool {
        matches!(self, ProtocolVariant::PerPlayer)
    }

    /// Wraps `action` in this variant's outbound envelope.
    pub fn envelope(self, action: &Action) -> OutboundEnvelope {
        match self {
            ProtocolVariant::PerPlayer => OutboundEnvelope::Action(ActionEnvelope {
                action: action.as_str().to_owned(),
            }),
            ProtocolVariant::Legacy => OutboundEnvelope::Legacy(LegacyEnvelope {
                kind: LEGACY_DO_TYPE.to_owned(),
                payload: action.as_str().to_owned(),
            }),
        }
    }
}

impl FromStr for ProtocolVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-player" => Ok(ProtocolVariant::PerPlayer),
            "legacy" => Ok(ProtocolVariant::Legacy),
            other => Err(format!(
                "unknown protocol variant {other:?} (expected \"per-player\" or \"legacy\")"
            )),
        }
    }
}

// ── Inbound ───────────────────────────────────────────────────────────────────

/// Raw turn notification as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WireNotification {
    pub turn: Option<u64>,
    pub player: Option<usize>,
    pub actions: Option<Vec<String>>,
    pub state: Option<WireState>,
}

/// Raw `state` object.  Unknown fields (Tron also sends `Directions`) are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct WireState {
    pub w: Option<i64>,
    pub h: Option<i64>,
    pub cells: Option<BTreeMap<String, BTreeMap<String, WireCell>>>,
    pub players: Option<Vec<WireCoord>>,
}

/// A cell marker: the server sends integers for Tron but strings are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireCell {
    Int(i64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCoord {
    pub x: i64,
    pub y: i64,
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// A single reply to one notification.
///
/// Created, serialized, sent once and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    action: Action,
}

impl Response {
    pub fn new(action: Action) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

/// Per-player reply envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub action: String,
}

/// Legacy reply envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: String,
}

/// Either reply envelope, serialized without an extra wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundEnvelope {
    Action(ActionEnvelope),
    Legacy(LegacyEnvelope),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_player_envelope_json() {
        let env = ProtocolVariant::PerPlayer.envelope(&Action::from("east"));
        assert_eq!(serde_json::to_string(&env).unwrap(), r#"{"action":"east"}"#);
    }

    #[test]
    fn test_legacy_envelope_json() {
        let env = ProtocolVariant::Legacy.envelope(&Action::from("east"));
        assert_eq!(
            serde_json::to_string(&env).unwrap(),
            r#"{"type":"do","payload":"east"}"#
        );
    }

    #[test]
    fn test_variant_names_are_kebab_case() {
        let v: ProtocolVariant = serde_json::from_str("\"per-player\"").unwrap();
        assert_eq!(v, ProtocolVariant::PerPlayer);
        let v: ProtocolVariant = serde_json::from_str("\"legacy\"").unwrap();
        assert_eq!(v, ProtocolVariant::Legacy);
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("legacy".parse::<ProtocolVariant>(), Ok(ProtocolVariant::Legacy));
        assert!("v2".parse::<ProtocolVariant>().is_err());
    }

    #[test]
    fn test_only_per_player_requires_player_field() {
        assert!(ProtocolVariant::PerPlayer.requires_player());
        assert!(!ProtocolVariant::Legacy.requires_player());
    }

    #[test]
    fn test_wire_cell_accepts_numbers_and_strings() {
        let cells: Vec<WireCell> = serde_json::from_str(r##"[1, "#"]"##).unwrap();
        assert_eq!(cells, [WireCell::Int(1), WireCell::Text("#".into())]);
    }
}
