//! Built-in decision callbacks selectable with `--agent`.

use std::sync::Arc;

use anyhow::anyhow;
use botbox_core::{legal_moves_with, Action, MovePolicy, Snapshot};

use crate::application::dispatcher::DecisionCallback;
use crate::domain::config::AgentKind;

/// Plays the first action the server offers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstActionAgent;

impl DecisionCallback for FirstActionAgent {
    fn decide(
        &self,
        _player: Option<usize>,
        actions: &[Action],
        _snapshot: &Snapshot,
    ) -> anyhow::Result<Action> {
        actions
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("server offered no actions"))
    }
}

/// Avoids walls and trails.
///
/// Picks the first offered action that is also a safe move from the
/// player's position.  Without a `player` field (legacy protocol) it
/// steers player 0.  When nothing is safe it plays the first offered
/// action, which is no worse than any other.
#[derive(Debug, Default, Clone, Copy)]
pub struct CautiousAgent;

impl DecisionCallback for CautiousAgent {
    fn decide(
        &self,
        player: Option<usize>,
        actions: &[Action],
        snapshot: &Snapshot,
    ) -> anyhow::Result<Action> {
        let safe = legal_moves_with(snapshot, player.unwrap_or(0), MovePolicy::WithinBounds);
        actions
            .iter()
            .find(|a| safe.contains(a))
            .or_else(|| actions.first())
            .cloned()
            .ok_or_else(|| anyhow!("server offered no actions"))
    }
}

/// Builds the callback for `kind`.
pub fn agent_for(kind: AgentKind) -> Arc<dyn DecisionCallback> {
    match kind {
        AgentKind::First => Arc::new(FirstActionAgent),
        AgentKind::Cautious => Arc::new(CautiousAgent),
    }
}

#[cfg(test)]
mod tests {
    use botbox_core::{Board, CellValue, Coord, PlayerState};
    use std::collections::BTreeMap;

    use super::*;

    fn actions(names: &[&str]) -> Vec<Action> {
        names.iter().map(|n| Action::from(*n)).collect()
    }

    fn one_player_at(x: i64, y: i64, board: Board) -> Snapshot {
        Snapshot::new(
            Some(1),
            Some(0),
            actions(&["east", "west", "north", "south"]),
            board,
            vec![PlayerState {
                index: 0,
                position: Coord::new(x, y),
            }],
        )
    }

    #[test]
    fn test_first_agent_plays_first_action() {
        let snap = one_player_at(0, 0, Board::empty(2, 2));
        let chosen = FirstActionAgent
            .decide(Some(0), snap.actions(), &snap)
            .unwrap();
        assert_eq!(chosen.as_str(), "east");
    }

    #[test]
    fn test_first_agent_fails_without_actions() {
        let snap = one_player_at(0, 0, Board::empty(2, 2));
        assert!(FirstActionAgent.decide(Some(0), &[], &snap).is_err());
    }

    #[test]
    fn test_cautious_agent_avoids_edge_and_trail() {
        // Arrange: 3x3 board, player in the top-left corner, trail to the east
        let mut cells = BTreeMap::new();
        cells.insert(Coord::new(1, 0), CellValue::Int(0));
        let snap = one_player_at(0, 0, Board::new(3, 3, cells));

        // Act
        let chosen = CautiousAgent.decide(Some(0), snap.actions(), &snap).unwrap();

        // Assert: east is a trail, west and north leave the grid
        assert_eq!(chosen.as_str(), "south");
    }

    #[test]
    fn test_cautious_agent_falls_back_to_first_when_boxed_in() {
        let snap = one_player_at(0, 0, Board::empty(1, 1));
        let chosen = CautiousAgent.decide(Some(0), snap.actions(), &snap).unwrap();
        assert_eq!(chosen.as_str(), "east");
    }

    #[test]
    fn test_cautious_agent_steers_player_zero_in_legacy_mode() {
        let snap = one_player_at(2, 2, Board::empty(3, 3));
        let chosen = CautiousAgent.decide(None, snap.actions(), &snap).unwrap();
        assert_eq!(chosen.as_str(), "west");
    }

    #[test]
    fn test_agent_for_builds_each_kind() {
        let snap = one_player_at(0, 0, Board::empty(3, 3));
        let first = agent_for(AgentKind::First)
            .decide(Some(0), snap.actions(), &snap)
            .unwrap();
        let cautious = agent_for(AgentKind::Cautious)
            .decide(Some(0), snap.actions(), &snap)
            .unwrap();
        assert_eq!(first.as_str(), "east");
        assert_eq!(cautious.as_str(), "east");
    }
}
