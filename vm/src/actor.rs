//! Actor identities, block reasons, and step outcomes.
//!
//! Each actor runs as a resumable state machine with an explicit resume
//! point. Suspension is a returned [`StepOutcome::Suspended`], never a
//! blocking primitive.

use serde::{Deserialize, Serialize};

use crate::error::Violation;
use crate::trace::ObsEvent;

/// The two protocol actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActorId {
    /// The transaction master issuing write/read requests.
    Master,
    /// The memory slave serving requests.
    Slave,
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Slave => write!(f, "slave"),
        }
    }
}

/// Why an actor cannot make progress until the channel changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockReason {
    /// Waiting for the request mailbox to drain before posting.
    RequestSlotBusy,
    /// Waiting for a committed request to consume.
    AwaitRequest,
    /// Waiting for the response mailbox to drain before posting.
    ResponseSlotBusy,
    /// Waiting for a committed response to consume.
    AwaitResponse,
}

/// Result of offering an actor one state-machine step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// The actor advanced and remains runnable this cycle.
    Progressed,
    /// The actor cannot proceed; it re-enters the ready set once the
    /// channel satisfies the given reason after a sync pass.
    Suspended(BlockReason),
    /// The actor reached its terminal state.
    Done,
    /// A modeled safety property failed during the step.
    Violation(Violation),
}

/// Bundled result of one actor step: the outcome plus the observable
/// events the step produced. The kernel commits the events to the trace.
#[derive(Debug)]
pub struct StepPack {
    /// How the step ended.
    pub outcome: StepOutcome,
    /// Observable events to append to the kernel trace.
    pub events: Vec<ObsEvent>,
}

impl StepPack {
    /// A pack with no events.
    #[must_use]
    pub fn bare(outcome: StepOutcome) -> Self {
        Self {
            outcome,
            events: Vec::new(),
        }
    }
}
