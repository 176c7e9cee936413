//! Application layer: turn dispatch and the built-in agents.
//!
//! Nothing here touches a socket; the infrastructure layer plugs in through
//! [`dispatcher::ResponseSender`].

pub mod agents;
pub mod dispatcher;

pub use agents::{agent_for, CautiousAgent, FirstActionAgent};
pub use dispatcher::{DecisionCallback, ResponseSender, TurnDispatcher, TurnError, TurnOutcome};
