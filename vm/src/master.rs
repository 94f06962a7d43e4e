//! Master actor: issues write/read transaction pairs and checks round trips.
//!
//! The resume-point enum replaces the flattened goto graph of the hardware
//! model this protocol derives from: every blocking wait is a suspension
//! that returns control to the kernel instead of a jump label.

use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, BlockReason, StepOutcome, StepPack};
use crate::channel::{MemOp, Message, PostOutcome, SharedChannel};
use crate::error::EngineError;
use crate::property::PropertyChecker;
use crate::trace::ObsEvent;

/// Offset the master adds to the address to form write data.
pub const DATA_OFFSET: i64 = 50;

/// Master resume points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MasterPc {
    /// Compute the next transaction's address and data.
    Init,
    /// Post the write request.
    IssueWrite,
    /// Wait for the write response.
    AwaitWriteAck,
    /// Post the read request.
    IssueRead,
    /// Wait for the read response.
    AwaitReadAck,
    /// All iterations finished.
    Done,
}

/// The master state machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MasterActor {
    pc: MasterPc,
    iteration: u32,
    iterations: u32,
    verify_round_trip: bool,
    /// In-flight transaction address, saved across suspensions.
    addr: u64,
    /// In-flight write data (also the expected read-back value).
    data: i64,
}

impl MasterActor {
    /// A master that will issue `iterations` write/read pairs.
    #[must_use]
    pub fn new(iterations: u32, verify_round_trip: bool) -> Self {
        Self {
            pc: MasterPc::Init,
            iteration: 0,
            iterations,
            verify_round_trip,
            addr: 0,
            data: 0,
        }
    }

    /// Current resume point.
    #[must_use]
    pub fn pc(&self) -> MasterPc {
        self.pc
    }

    /// Whether the master has finished all iterations.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.pc == MasterPc::Done
    }

    /// Execute one state-machine step.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnreachableState`] if stepped after `Done` or
    /// if the channel yields a response kind the current state does not
    /// await. Both are engine defects, not modeled behavior.
    pub fn step(
        &mut self,
        tick: u64,
        chan: &mut SharedChannel,
        checker: &PropertyChecker,
    ) -> Result<StepPack, EngineError> {
        match self.pc {
            MasterPc::Init => {
                if self.iteration >= self.iterations {
                    self.pc = MasterPc::Done;
                    return Ok(StepPack::bare(StepOutcome::Done));
                }
                self.addr = u64::from(self.iteration);
                self.data = i64::from(self.iteration) + DATA_OFFSET;
                self.pc = MasterPc::IssueWrite;
                Ok(StepPack::bare(StepOutcome::Progressed))
            }
            MasterPc::IssueWrite => {
                let msg = Message {
                    op: MemOp::Write,
                    addr: self.addr,
                    data: self.data,
                };
                match chan.post_request(msg) {
                    PostOutcome::Accepted => {
                        self.pc = MasterPc::AwaitWriteAck;
                        Ok(StepPack {
                            outcome: StepOutcome::Progressed,
                            events: vec![ObsEvent::RequestPosted {
                                tick,
                                actor: ActorId::Master,
                                msg,
                            }],
                        })
                    }
                    PostOutcome::NotReady => Ok(StepPack::bare(StepOutcome::Suspended(
                        BlockReason::RequestSlotBusy,
                    ))),
                }
            }
            MasterPc::AwaitWriteAck => match chan.take_response() {
                None => Ok(StepPack::bare(StepOutcome::Suspended(
                    BlockReason::AwaitResponse,
                ))),
                Some(resp) => {
                    if resp.op != MemOp::Write {
                        return Err(EngineError::UnreachableState {
                            actor: ActorId::Master,
                            detail: "read response while awaiting write ack".to_string(),
                        });
                    }
                    self.pc = MasterPc::IssueRead;
                    Ok(StepPack {
                        outcome: StepOutcome::Progressed,
                        events: vec![ObsEvent::ResponseTaken {
                            tick,
                            actor: ActorId::Master,
                            resp,
                        }],
                    })
                }
            },
            MasterPc::IssueRead => {
                let msg = Message {
                    op: MemOp::Read,
                    addr: self.addr,
                    data: 0,
                };
                match chan.post_request(msg) {
                    PostOutcome::Accepted => {
                        self.pc = MasterPc::AwaitReadAck;
                        Ok(StepPack {
                            outcome: StepOutcome::Progressed,
                            events: vec![ObsEvent::RequestPosted {
                                tick,
                                actor: ActorId::Master,
                                msg,
                            }],
                        })
                    }
                    PostOutcome::NotReady => Ok(StepPack::bare(StepOutcome::Suspended(
                        BlockReason::RequestSlotBusy,
                    ))),
                }
            }
            MasterPc::AwaitReadAck => match chan.take_response() {
                None => Ok(StepPack::bare(StepOutcome::Suspended(
                    BlockReason::AwaitResponse,
                ))),
                Some(resp) => {
                    if resp.op != MemOp::Read {
                        return Err(EngineError::UnreachableState {
                            actor: ActorId::Master,
                            detail: "write response while awaiting read ack".to_string(),
                        });
                    }
                    let taken = ObsEvent::ResponseTaken {
                        tick,
                        actor: ActorId::Master,
                        resp,
                    };
                    if self.verify_round_trip {
                        if let Err(violation) = checker.check_round_trip(self.data, resp.data) {
                            return Ok(StepPack {
                                outcome: StepOutcome::Violation(violation),
                                events: vec![taken],
                            });
                        }
                    }
                    self.iteration += 1;
                    if self.iteration < self.iterations {
                        self.pc = MasterPc::Init;
                        Ok(StepPack {
                            outcome: StepOutcome::Progressed,
                            events: vec![taken],
                        })
                    } else {
                        self.pc = MasterPc::Done;
                        Ok(StepPack {
                            outcome: StepOutcome::Done,
                            events: vec![taken],
                        })
                    }
                }
            },
            MasterPc::Done => Err(EngineError::UnreachableState {
                actor: ActorId::Master,
                detail: "stepped after Done".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{Response, Status};

    fn checker() -> PropertyChecker {
        PropertyChecker::new([0].into_iter().collect())
    }

    fn drive_to_write_posted(master: &mut MasterActor, chan: &mut SharedChannel) {
        master.step(0, chan, &checker()).unwrap();
        master.step(0, chan, &checker()).unwrap();
        assert_eq!(master.pc(), MasterPc::AwaitWriteAck);
    }

    #[test]
    fn test_zero_iterations_finishes_immediately() {
        let mut master = MasterActor::new(0, true);
        let mut chan = SharedChannel::new();
        let pack = master.step(0, &mut chan, &checker()).unwrap();
        assert_eq!(pack.outcome, StepOutcome::Done);
        assert!(master.is_done());
    }

    #[test]
    fn test_init_computes_offset_data() {
        let mut master = MasterActor::new(1, true);
        let mut chan = SharedChannel::new();
        drive_to_write_posted(&mut master, &mut chan);
        chan.sync_events();
        let msg = chan.take_request().unwrap();
        assert_eq!(msg.addr, 0);
        assert_eq!(msg.data, DATA_OFFSET);
    }

    #[test]
    fn test_suspends_until_response_committed() {
        let mut master = MasterActor::new(1, true);
        let mut chan = SharedChannel::new();
        drive_to_write_posted(&mut master, &mut chan);

        let pack = master.step(0, &mut chan, &checker()).unwrap();
        assert_eq!(
            pack.outcome,
            StepOutcome::Suspended(BlockReason::AwaitResponse)
        );
        assert_eq!(master.pc(), MasterPc::AwaitWriteAck);
    }

    #[test]
    fn test_round_trip_mismatch_is_a_violation() {
        let mut master = MasterActor::new(1, true);
        let mut chan = SharedChannel::new();
        drive_to_write_posted(&mut master, &mut chan);
        chan.sync_events();
        chan.take_request();

        chan.post_response(Response {
            op: MemOp::Write,
            status: Status::Ok,
            data: 0,
        });
        chan.sync_events();
        // Write ack, then read issued.
        master.step(2, &mut chan, &checker()).unwrap();
        master.step(2, &mut chan, &checker()).unwrap();
        chan.sync_events();
        chan.take_request();

        chan.post_response(Response {
            op: MemOp::Read,
            status: Status::Ok,
            data: 7,
        });
        chan.sync_events();
        let pack = master.step(4, &mut chan, &checker()).unwrap();
        assert_eq!(
            pack.outcome,
            StepOutcome::Violation(crate::error::Violation::RoundTripMismatch {
                expected: DATA_OFFSET,
                observed: 7
            })
        );
    }

    #[test]
    fn test_stepping_done_master_is_an_engine_error() {
        let mut master = MasterActor::new(0, true);
        let mut chan = SharedChannel::new();
        master.step(0, &mut chan, &checker()).unwrap();
        assert!(matches!(
            master.step(0, &mut chan, &checker()),
            Err(EngineError::UnreachableState { .. })
        ));
    }
}
