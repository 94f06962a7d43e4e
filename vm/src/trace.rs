//! Observable event trace emitted by the kernel.
//!
//! The trace is the engine's observability surface: every channel action,
//! suspension, completion, and sync pass is recorded with the kernel tick
//! at which it happened.

use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, BlockReason};
use crate::channel::{Message, Response};
use crate::error::Violation;

/// Observable event with the kernel tick at which it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObsEvent {
    /// An actor staged a request into the channel.
    RequestPosted {
        /// Kernel tick.
        tick: u64,
        /// Posting actor.
        actor: ActorId,
        /// The request.
        msg: Message,
    },
    /// An actor consumed the committed request.
    RequestTaken {
        /// Kernel tick.
        tick: u64,
        /// Consuming actor.
        actor: ActorId,
        /// The request.
        msg: Message,
    },
    /// An actor staged a response into the channel.
    ResponsePosted {
        /// Kernel tick.
        tick: u64,
        /// Posting actor.
        actor: ActorId,
        /// The response.
        resp: Response,
    },
    /// An actor consumed the committed response.
    ResponseTaken {
        /// Kernel tick.
        tick: u64,
        /// Consuming actor.
        actor: ActorId,
        /// The response.
        resp: Response,
    },
    /// An actor suspended until the channel changes.
    ActorBlocked {
        /// Kernel tick.
        tick: u64,
        /// The suspended actor.
        actor: ActorId,
        /// Why it suspended.
        reason: BlockReason,
    },
    /// An actor reached its terminal state.
    ActorDone {
        /// Kernel tick.
        tick: u64,
        /// The finished actor.
        actor: ActorId,
    },
    /// The kernel ran the delta-cycle settle pass.
    EventsSynced {
        /// Kernel tick after the pass.
        tick: u64,
        /// Whether any committed state or flag changed.
        changed: bool,
    },
    /// A safety property failed.
    ViolationRaised {
        /// Kernel tick.
        tick: u64,
        /// The actor whose step detected the violation.
        actor: ActorId,
        /// The violation.
        violation: Violation,
    },
}

/// Extract the acting actor from an event, if it has one.
#[must_use]
pub fn obs_actor(ev: &ObsEvent) -> Option<ActorId> {
    match ev {
        ObsEvent::RequestPosted { actor, .. }
        | ObsEvent::RequestTaken { actor, .. }
        | ObsEvent::ResponsePosted { actor, .. }
        | ObsEvent::ResponseTaken { actor, .. }
        | ObsEvent::ActorBlocked { actor, .. }
        | ObsEvent::ActorDone { actor, .. }
        | ObsEvent::ViolationRaised { actor, .. } => Some(*actor),
        ObsEvent::EventsSynced { .. } => None,
    }
}

/// Collected event trace for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    events: Vec<ObsEvent>,
}

impl Trace {
    /// An empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event.
    pub fn record(&mut self, ev: ObsEvent) {
        self.events.push(ev);
    }

    /// Append a batch of events.
    pub fn extend(&mut self, evs: impl IntoIterator<Item = ObsEvent>) {
        self.events.extend(evs);
    }

    /// All recorded events, in order.
    #[must_use]
    pub fn events(&self) -> &[ObsEvent] {
        &self.events
    }

    /// The communication events only (posts and takes), in order.
    ///
    /// Sync passes and suspension bookkeeping are scheduling artifacts; the
    /// comm subsequence is what schedule-confluence comparisons use.
    #[must_use]
    pub fn comm_events(&self) -> Vec<ObsEvent> {
        self.events
            .iter()
            .filter(|ev| {
                matches!(
                    ev,
                    ObsEvent::RequestPosted { .. }
                        | ObsEvent::RequestTaken { .. }
                        | ObsEvent::ResponsePosted { .. }
                        | ObsEvent::ResponseTaken { .. }
                )
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{MemOp, Message};

    #[test]
    fn test_comm_events_filters_bookkeeping() {
        let mut trace = Trace::new();
        trace.record(ObsEvent::RequestPosted {
            tick: 0,
            actor: ActorId::Master,
            msg: Message {
                op: MemOp::Write,
                addr: 0,
                data: 50,
            },
        });
        trace.record(ObsEvent::EventsSynced {
            tick: 1,
            changed: true,
        });
        trace.record(ObsEvent::ActorBlocked {
            tick: 1,
            actor: ActorId::Slave,
            reason: BlockReason::AwaitRequest,
        });

        assert_eq!(trace.events().len(), 3);
        assert_eq!(trace.comm_events().len(), 1);
    }

    #[test]
    fn test_obs_actor_extraction() {
        let ev = ObsEvent::ActorDone {
            tick: 4,
            actor: ActorId::Master,
        };
        assert_eq!(obs_actor(&ev), Some(ActorId::Master));
        let sync = ObsEvent::EventsSynced {
            tick: 4,
            changed: false,
        };
        assert_eq!(obs_actor(&sync), None);
    }
}
