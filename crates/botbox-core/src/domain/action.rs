//! Action labels and the reference movement vocabulary.
//!
//! On the wire an action is just a string chosen from the list the server
//! offers for the current turn.  The core never hardcodes that list; the
//! [`Direction`] enum only exists for the legal-move helper and for agents
//! that want typed directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque action label such as `"north"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Action {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Action {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl From<Direction> for Action {
    fn from(dir: Direction) -> Self {
        Self::new(dir.label())
    }
}

/// The four cardinal moves of the reference vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    West,
    North,
    South,
}

impl Direction {
    /// Every direction in the order the legal-move helper emits them.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::North,
        Direction::South,
    ];

    /// Wire label of this direction.
    pub const fn label(self) -> &'static str {
        match self {
            Direction::East => "east",
            Direction::West => "west",
            Direction::North => "north",
            Direction::South => "south",
        }
    }

    /// Unit offset in screen coordinates (north decreases `y`).
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
            Direction::South => (0, 1),
        }
    }

    /// Parses a wire label; returns `None` for labels outside the vocabulary.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
