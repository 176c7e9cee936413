//! TurnDispatcher: answers every notification exactly once without ever
//! holding up the receive loop.
//!
//! # Lifecycle of one turn
//!
//! ```text
//! receive loop ── handle(snapshot) ──> tokio task ──> spawn_blocking(decide)
//!      │ (returns at once)                               │
//!      v                                                 v
//! next notification                     validate ─> Response ─> ResponseSender
//! ```
//!
//! Each turn runs in its own detached task and owns its snapshot.  Turns are
//! not serialized: when the server pipelines notifications, replies leave in
//! the order the decisions finish.  There is no timeout and no cancellation;
//! a stuck agent only stalls its own turn.
//!
//! The dispatcher depends only on the [`DecisionCallback`] and
//! [`ResponseSender`] traits, so it is fully testable without a socket.

use std::sync::Arc;

use async_trait::async_trait;
use botbox_core::{Action, Response, Snapshot, TurnCounter};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::config::FallbackPolicy;
use crate::error::SendError;

/// Agent-supplied decision logic.
///
/// `decide` runs on the blocking thread pool and may take as long as it
/// likes.  Any closure with the same signature is a `DecisionCallback`.
#[cfg_attr(test, mockall::automock)]
pub trait DecisionCallback: Send + Sync + 'static {
    /// Chooses one of `actions` for `player` (absent in the legacy protocol).
    fn decide(
        &self,
        player: Option<usize>,
        actions: &[Action],
        snapshot: &Snapshot,
    ) -> anyhow::Result<Action>;
}

impl<F> DecisionCallback for F
where
    F: Fn(Option<usize>, &[Action], &Snapshot) -> anyhow::Result<Action> + Send + Sync + 'static,
{
    fn decide(
        &self,
        player: Option<usize>,
        actions: &[Action],
        snapshot: &Snapshot,
    ) -> anyhow::Result<Action> {
        self(player, actions, snapshot)
    }
}

/// The single outbound path back to the server.
///
/// Implemented by the session controller; tests use a recording double.
#[async_trait]
pub trait ResponseSender: Send + Sync {
    async fn send_response(&self, response: Response) -> Result<(), SendError>;
}

/// Why the agent's answer could not be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// The callback returned an error.
    #[error("decision callback failed: {0}")]
    CallbackFailed(String),

    /// The callback panicked.
    #[error("decision callback panicked: {0}")]
    CallbackPanicked(String),

    /// The callback chose an action the server did not offer.
    #[error("agent chose {action:?}, which is not among the legal actions {legal:?}")]
    IllegalAction { action: String, legal: Vec<String> },
}

/// What happened to one dispatched turn.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The agent's own choice was sent.
    Answered(Action),
    /// The agent failed and the fallback action was sent instead.
    FellBack { error: TurnError, action: Action },
    /// The agent failed and no response was sent.
    Skipped { error: TurnError },
    /// A response was built but could not be delivered.
    Undelivered {
        action: Action,
        turn_error: Option<TurnError>,
        error: SendError,
    },
}

impl TurnOutcome {
    /// The action that reached the server, if any.
    pub fn sent_action(&self) -> Option<&Action> {
        match self {
            TurnOutcome::Answered(action) | TurnOutcome::FellBack { action, .. } => Some(action),
            TurnOutcome::Skipped { .. } | TurnOutcome::Undelivered { .. } => None,
        }
    }

    /// The turn error, if the agent's answer was rejected.
    pub fn turn_error(&self) -> Option<&TurnError> {
        match self {
            TurnOutcome::Answered(_) => None,
            TurnOutcome::FellBack { error, .. } | TurnOutcome::Skipped { error } => Some(error),
            TurnOutcome::Undelivered { turn_error, .. } => turn_error.as_ref(),
        }
    }
}

/// Spawns one independent task per notification.
pub struct TurnDispatcher {
    agent: Arc<dyn DecisionCallback>,
    sender: Arc<dyn ResponseSender>,
    fallback: FallbackPolicy,
    turns: TurnCounter,
}

impl TurnDispatcher {
    pub fn new(
        agent: Arc<dyn DecisionCallback>,
        sender: Arc<dyn ResponseSender>,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            agent,
            sender,
            fallback,
            turns: TurnCounter::new(),
        }
    }

    /// Schedules the turn for `snapshot` and returns immediately.
    ///
    /// The returned handle resolves to the [`TurnOutcome`]; dropping it
    /// detaches the task, which still runs to completion.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn handle(&self, snapshot: Snapshot) -> JoinHandle<TurnOutcome> {
        let label = TurnLabel {
            local: self.turns.next(),
            server: snapshot.turn(),
        };
        debug!("turn {label}: dispatched");

        tokio::spawn(run_turn(
            label,
            snapshot,
            Arc::clone(&self.agent),
            Arc::clone(&self.sender),
            self.fallback,
        ))
    }

    /// Number of turns dispatched so far.
    pub fn dispatched(&self) -> u64 {
        self.turns.current()
    }
}

/// Local and server turn numbers, for log lines.
#[derive(Debug, Clone, Copy)]
struct TurnLabel {
    local: u64,
    server: Option<u64>,
}

impl std::fmt::Display for TurnLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.server {
            Some(server) => write!(f, "#{} (server turn {server})", self.local),
            None => write!(f, "#{}", self.local),
        }
    }
}

async fn run_turn(
    label: TurnLabel,
    snapshot: Snapshot,
    agent: Arc<dyn DecisionCallback>,
    sender: Arc<dyn ResponseSender>,
    fallback: FallbackPolicy,
) -> TurnOutcome {
    let legal = snapshot.actions().to_vec();

    // The snapshot moves onto the blocking pool; the action comes back
    // together with whether the server offered it.
    let decided = tokio::task::spawn_blocking(move || {
        agent
            .decide(snapshot.player(), snapshot.actions(), &snapshot)
            .map(|action| {
                let offered = snapshot.is_legal(&action);
                (action, offered)
            })
    })
    .await;

    let verdict = match decided {
        Ok(Ok((action, true))) => Ok(action),
        Ok(Ok((action, false))) => Err(TurnError::IllegalAction {
            action: action.into_inner(),
            legal: legal.iter().map(|a| a.as_str().to_owned()).collect(),
        }),
        Ok(Err(e)) => Err(TurnError::CallbackFailed(format!("{e:#}"))),
        Err(join_error) => Err(TurnError::CallbackPanicked(join_error.to_string())),
    };

    match verdict {
        Ok(action) => deliver(label, &*sender, action, None).await,
        Err(turn_error) => {
            error!("turn {label}: turn error: {turn_error}");
            match fallback.pick(&legal) {
                Some(action) => {
                    info!("turn {label}: sending fallback action {action}");
                    deliver(label, &*sender, action, Some(turn_error)).await
                }
                None => {
                    warn!("turn {label}: no fallback available ({fallback:?}); turn left unanswered");
                    TurnOutcome::Skipped { error: turn_error }
                }
            }
        }
    }
}

async fn deliver(
    label: TurnLabel,
    sender: &dyn ResponseSender,
    action: Action,
    turn_error: Option<TurnError>,
) -> TurnOutcome {
    match sender.send_response(Response::new(action.clone())).await {
        Ok(()) => {
            debug!("turn {label}: sent {action}");
            match turn_error {
                None => TurnOutcome::Answered(action),
                Some(error) => TurnOutcome::FellBack { error, action },
            }
        }
        Err(error) => {
            warn!("turn {label}: response {action} dropped: {error}");
            TurnOutcome::Undelivered {
                action,
                turn_error,
                error,
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
