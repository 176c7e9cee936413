//! Legal-move helper.
//!
//! The server's `actions` list is authoritative.  These functions exist for
//! agents that want to double-check it or that receive an incomplete list.
//!
//! The default check only looks at cell occupancy: a move is legal when the
//! target cell is absent from the board's cell map.  Grid edges are NOT
//! checked, so a player standing on the border is told that stepping off the
//! grid is legal.  [`MovePolicy::WithinBounds`] adds the edge check for
//! callers that want it.

use crate::domain::action::{Action, Direction};
use crate::domain::snapshot::Snapshot;

/// Which checks a candidate move must pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovePolicy {
    /// Target must not be an occupied cell.
    #[default]
    OccupancyOnly,
    /// Target must not be occupied and must lie inside `[0, w) × [0, h)`.
    WithinBounds,
}

/// Returns the free directions for `player_index`, in east, west, north,
/// south order, using [`MovePolicy::OccupancyOnly`].
///
/// An unknown `player_index` yields an empty list.
pub fn legal_moves(snapshot: &Snapshot, player_index: usize) -> Vec<Action> {
    legal_moves_with(snapshot, player_index, MovePolicy::OccupancyOnly)
}

/// Same as [`legal_moves`] with an explicit policy.
pub fn legal_moves_with(snapshot: &Snapshot, player_index: usize, policy: MovePolicy) -> Vec<Action> {
    legal_directions(snapshot, player_index, policy)
        .into_iter()
        .map(Action::from)
        .collect()
}

/// Typed variant of [`legal_moves_with`].
pub fn legal_directions(snapshot: &Snapshot, player_index: usize, policy: MovePolicy) -> Vec<Direction> {
    let Some(player) = snapshot.player_state(player_index) else {
        return Vec::new();
    };
    let board = snapshot.board();

    Direction::ALL
        .into_iter()
        .filter(|dir| {
            let (dx, dy) = dir.offset();
            // A target past the edge of the coordinate space is never legal.
            let Some(target) = player.position.checked_offset(dx, dy) else {
                return false;
            };
            if board.is_occupied(target) {
                return false;
            }
            match policy {
                MovePolicy::OccupancyOnly => true,
                MovePolicy::WithinBounds => board.contains(target),
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
