//! Per-turn snapshot of the game as reported by the server.

use crate::domain::action::Action;
use crate::domain::board::{Board, Coord};

/// One player's reported position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerState {
    /// Position of the player in the server's `players` list.
    pub index: usize,
    pub position: Coord,
}

/// Immutable decoded view of one turn notification.
///
/// A snapshot is built fresh for every notification and moved into the task
/// that answers it; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    turn: Option<u64>,
    player: Option<usize>,
    actions: Vec<Action>,
    board: Board,
    players: Vec<PlayerState>,
}

impl Snapshot {
    pub fn new(
        turn: Option<u64>,
        player: Option<usize>,
        actions: Vec<Action>,
        board: Board,
        players: Vec<PlayerState>,
    ) -> Self {
        Self {
            turn,
            player,
            actions,
            board,
            players,
        }
    }

    /// Server turn counter, when the server sends one.
    pub fn turn(&self) -> Option<u64> {
        self.turn
    }

    /// Identity of the acting player.
    ///
    /// `None` in the legacy single-agent protocol, which does not send it.
    pub fn player(&self) -> Option<usize> {
        self.player
    }

    /// Legal actions offered by the server for this turn, in server order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    /// Looks up a player by its index in the server's list.
    pub fn player_state(&self, index: usize) -> Option<&PlayerState> {
        self.players.get(index)
    }

    /// Returns `true` if the server listed `action` as legal this turn.
    pub fn is_legal(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }
}
