//! Memory slave actor: serves read/write requests against the backing store.
//!
//! The slave is greedy: it acts the instant it is scheduled and has work.
//! When it runs relative to the master is entirely the scheduler's choice.

use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, BlockReason, StepOutcome, StepPack};
use crate::channel::{MemOp, Message, PostOutcome, Response, SharedChannel, Status};
use crate::error::EngineError;
use crate::memory::MemoryStore;
use crate::trace::ObsEvent;

/// Slave resume points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlavePc {
    /// Wait for a committed request.
    AwaitRequest,
    /// Perform the memory access for the taken request.
    ServeRequest,
    /// Post the computed response, retrying until the slot frees.
    AwaitResponseAck,
}

/// The slave state machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlaveActor {
    pc: SlavePc,
    /// Request taken but not yet served, saved across suspensions.
    pending: Option<Message>,
    /// Response computed but not yet accepted by the channel.
    outgoing: Option<Response>,
}

impl SlaveActor {
    /// A slave parked waiting for its first request.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pc: SlavePc::AwaitRequest,
            pending: None,
            outgoing: None,
        }
    }

    /// Current resume point.
    #[must_use]
    pub fn pc(&self) -> SlavePc {
        self.pc
    }

    /// Whether the slave is parked with no request in flight.
    #[must_use]
    pub fn is_parked(&self) -> bool {
        self.pc == SlavePc::AwaitRequest && self.pending.is_none() && self.outgoing.is_none()
    }

    /// Execute one state-machine step.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnreachableState`] if the machine's saved
    /// locals do not match its resume point, which is an engine defect.
    pub fn step(
        &mut self,
        tick: u64,
        chan: &mut SharedChannel,
        memory: &mut MemoryStore,
    ) -> Result<StepPack, EngineError> {
        match self.pc {
            SlavePc::AwaitRequest => match chan.take_request() {
                None => Ok(StepPack::bare(StepOutcome::Suspended(
                    BlockReason::AwaitRequest,
                ))),
                Some(msg) => {
                    self.pending = Some(msg);
                    self.pc = SlavePc::ServeRequest;
                    Ok(StepPack {
                        outcome: StepOutcome::Progressed,
                        events: vec![ObsEvent::RequestTaken {
                            tick,
                            actor: ActorId::Slave,
                            msg,
                        }],
                    })
                }
            },
            SlavePc::ServeRequest => {
                let msg = self.pending.take().ok_or_else(|| EngineError::UnreachableState {
                    actor: ActorId::Slave,
                    detail: "serving with no pending request".to_string(),
                })?;
                let resp = match msg.op {
                    MemOp::Write => match memory.write(msg.addr, msg.data) {
                        Err(violation) => {
                            return Ok(StepPack::bare(StepOutcome::Violation(violation)))
                        }
                        Ok(()) => Response {
                            op: MemOp::Write,
                            status: Status::Ok,
                            data: 0,
                        },
                    },
                    MemOp::Read => match memory.read(msg.addr) {
                        Err(violation) => {
                            return Ok(StepPack::bare(StepOutcome::Violation(violation)))
                        }
                        Ok(value) => Response {
                            op: MemOp::Read,
                            status: Status::Ok,
                            data: value,
                        },
                    },
                };
                self.outgoing = Some(resp);
                self.pc = SlavePc::AwaitResponseAck;
                Ok(StepPack::bare(StepOutcome::Progressed))
            }
            SlavePc::AwaitResponseAck => {
                let resp = self.outgoing.ok_or_else(|| EngineError::UnreachableState {
                    actor: ActorId::Slave,
                    detail: "posting with no computed response".to_string(),
                })?;
                match chan.post_response(resp) {
                    PostOutcome::Accepted => {
                        self.outgoing = None;
                        self.pc = SlavePc::AwaitRequest;
                        Ok(StepPack {
                            outcome: StepOutcome::Progressed,
                            events: vec![ObsEvent::ResponsePosted {
                                tick,
                                actor: ActorId::Slave,
                                resp,
                            }],
                        })
                    }
                    PostOutcome::NotReady => Ok(StepPack::bare(StepOutcome::Suspended(
                        BlockReason::ResponseSlotBusy,
                    ))),
                }
            }
        }
    }
}

impl Default for SlaveActor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Violation;

    fn memory() -> MemoryStore {
        MemoryStore::new([0].into_iter().collect())
    }

    fn post_committed(chan: &mut SharedChannel, msg: Message) {
        assert_eq!(chan.post_request(msg), PostOutcome::Accepted);
        chan.sync_events();
    }

    #[test]
    fn test_suspends_with_no_request() {
        let mut slave = SlaveActor::new();
        let mut chan = SharedChannel::new();
        let mut mem = memory();
        let pack = slave.step(0, &mut chan, &mut mem).unwrap();
        assert_eq!(
            pack.outcome,
            StepOutcome::Suspended(BlockReason::AwaitRequest)
        );
        assert!(slave.is_parked());
    }

    #[test]
    fn test_serves_write_then_posts_ok() {
        let mut slave = SlaveActor::new();
        let mut chan = SharedChannel::new();
        let mut mem = memory();
        post_committed(
            &mut chan,
            Message {
                op: MemOp::Write,
                addr: 0,
                data: 50,
            },
        );

        slave.step(1, &mut chan, &mut mem).unwrap();
        slave.step(1, &mut chan, &mut mem).unwrap();
        let pack = slave.step(1, &mut chan, &mut mem).unwrap();
        assert_eq!(pack.outcome, StepOutcome::Progressed);
        assert_eq!(mem.read(0), Ok(50));

        chan.sync_events();
        let resp = chan.take_response().unwrap();
        assert_eq!(resp.op, MemOp::Write);
        assert_eq!(resp.status, Status::Ok);
    }

    #[test]
    fn test_read_carries_stored_value() {
        let mut slave = SlaveActor::new();
        let mut chan = SharedChannel::new();
        let mut mem = memory();
        mem.write(0, 50).unwrap();
        post_committed(
            &mut chan,
            Message {
                op: MemOp::Read,
                addr: 0,
                data: 0,
            },
        );

        slave.step(1, &mut chan, &mut mem).unwrap();
        slave.step(1, &mut chan, &mut mem).unwrap();
        slave.step(1, &mut chan, &mut mem).unwrap();
        chan.sync_events();
        let resp = chan.take_response().unwrap();
        assert_eq!(resp.data, 50);
    }

    #[test]
    fn test_out_of_domain_request_is_a_violation() {
        let mut slave = SlaveActor::new();
        let mut chan = SharedChannel::new();
        let mut mem = memory();
        post_committed(
            &mut chan,
            Message {
                op: MemOp::Write,
                addr: 3,
                data: 53,
            },
        );

        slave.step(1, &mut chan, &mut mem).unwrap();
        let pack = slave.step(1, &mut chan, &mut mem).unwrap();
        assert_eq!(
            pack.outcome,
            StepOutcome::Violation(Violation::OutOfDomainAccess { addr: 3 })
        );
    }

    #[test]
    fn test_loops_back_to_await_request() {
        let mut slave = SlaveActor::new();
        let mut chan = SharedChannel::new();
        let mut mem = memory();
        post_committed(
            &mut chan,
            Message {
                op: MemOp::Write,
                addr: 0,
                data: 50,
            },
        );

        slave.step(1, &mut chan, &mut mem).unwrap();
        slave.step(1, &mut chan, &mut mem).unwrap();
        slave.step(1, &mut chan, &mut mem).unwrap();
        assert_eq!(slave.pc(), SlavePc::AwaitRequest);
    }
}
