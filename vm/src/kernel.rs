//! The kernel: ties channel, memory, actors, scheduler, and clock together.
//!
//! One kernel cycle is a drain pass (every runnable actor steps until it
//! suspends or finishes, pick order decided by the [`ChoicePolicy`]) followed
//! by the channel's sync pass. Effects staged during a pass become
//! cross-visible only after the sync. Losing that boundary would silently
//! change the reachable state space.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, StepOutcome};
use crate::channel::SharedChannel;
use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::error::{EngineError, Violation};
use crate::master::MasterActor;
use crate::memory::MemoryStore;
use crate::property::PropertyChecker;
use crate::scheduler::{ChoicePolicy, Scheduler};
use crate::slave::SlaveActor;
use crate::trace::{ObsEvent, Trace};

/// Why a run ended without a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InconclusiveReason {
    /// The cycle budget ran out with actors still live.
    BudgetExhausted {
        /// Cycles completed when the budget hit.
        cycles: u64,
    },
    /// No actor can ever run again and the master is not done.
    Deadlock,
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Both actors terminated; no property violated.
    Success,
    /// A safety property failed.
    Violation(Violation),
    /// The run ended without a verdict.
    Inconclusive(InconclusiveReason),
}

/// The simulation kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kernel {
    config: SimConfig,
    chan: SharedChannel,
    memory: MemoryStore,
    master: MasterActor,
    slave: SlaveActor,
    sched: Scheduler,
    clock: SimClock,
    checker: PropertyChecker,
    trace: Trace,
    outcome: Option<Outcome>,
}

impl Kernel {
    /// A kernel in its initial state for the given configuration.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let checker = PropertyChecker::new(config.valid_addresses.clone());
        let memory = MemoryStore::new(config.valid_addresses.clone());
        let master = MasterActor::new(config.master_iterations, config.verify_round_trip);
        let clock = SimClock::new(config.tick_duration);
        Self {
            config,
            chan: SharedChannel::new(),
            memory,
            master,
            slave: SlaveActor::new(),
            sched: Scheduler::new(),
            clock,
            checker,
            trace: Trace::new(),
            outcome: None,
        }
    }

    /// The legal nondeterministic choices right now. Empty once the run has
    /// an outcome or every actor is blocked or done.
    #[must_use]
    pub fn runnable(&self) -> Vec<ActorId> {
        if self.outcome.is_some() {
            Vec::new()
        } else {
            self.sched.runnable()
        }
    }

    /// One state-machine step for the chosen actor.
    ///
    /// # Errors
    ///
    /// [`EngineError::StepNotRunnable`] if the actor is not in the current
    /// choice set; [`EngineError::UnreachableState`] from the actor itself.
    pub fn step_actor(&mut self, id: ActorId) -> Result<StepOutcome, EngineError> {
        if self.outcome.is_some() || !self.sched.is_ready(id) {
            return Err(EngineError::StepNotRunnable { actor: id });
        }
        let tick = self.clock.tick;
        let pack = match id {
            ActorId::Master => self.master.step(tick, &mut self.chan, &self.checker)?,
            ActorId::Slave => self.slave.step(tick, &mut self.chan, &mut self.memory)?,
        };
        self.trace.extend(pack.events);
        self.sched.update_after_step(id, &pack.outcome);
        match &pack.outcome {
            StepOutcome::Progressed => {}
            StepOutcome::Suspended(reason) => self.trace.record(ObsEvent::ActorBlocked {
                tick,
                actor: id,
                reason: *reason,
            }),
            StepOutcome::Done => self.trace.record(ObsEvent::ActorDone { tick, actor: id }),
            StepOutcome::Violation(violation) => {
                self.trace.record(ObsEvent::ViolationRaised {
                    tick,
                    actor: id,
                    violation: *violation,
                });
                self.outcome = Some(Outcome::Violation(*violation));
            }
        }
        Ok(pack.outcome)
    }

    /// Close the current kernel cycle.
    ///
    /// Runs the sync pass, advances the clock, wakes actors whose wait
    /// conditions now hold, and checks the termination conditions. Returns
    /// the run's outcome once there is one.
    ///
    /// # Errors
    ///
    /// [`EngineError::PrematureSync`] if actors are still runnable.
    pub fn end_cycle(&mut self) -> Result<Option<Outcome>, EngineError> {
        if let Some(outcome) = &self.outcome {
            return Ok(Some(outcome.clone()));
        }
        if !self.sched.none_ready() {
            return Err(EngineError::PrematureSync {
                runnable: self.sched.runnable().len(),
            });
        }

        // The master took its final response this pass: nothing is left for
        // the slave, so the run ends without another sync.
        if self.try_finish() {
            return Ok(self.outcome.clone());
        }

        let changed = self.chan.sync_events();
        self.clock.advance();
        self.trace.record(ObsEvent::EventsSynced {
            tick: self.clock.tick,
            changed,
        });
        self.sched.wake_ready(&self.chan);

        if self.try_finish() {
            return Ok(self.outcome.clone());
        }
        if self.sched.none_ready() && !self.sched.is_done(ActorId::Master) && self.chan.is_drained()
        {
            self.outcome = Some(Outcome::Inconclusive(InconclusiveReason::Deadlock));
            return Ok(self.outcome.clone());
        }
        if let Some(max_cycles) = self.config.max_cycles {
            if self.clock.tick >= max_cycles {
                self.outcome = Some(Outcome::Inconclusive(InconclusiveReason::BudgetExhausted {
                    cycles: self.clock.tick,
                }));
                return Ok(self.outcome.clone());
            }
        }
        Ok(None)
    }

    /// Success detection: master done, channel drained, slave parked. The
    /// parked slave is shut down as part of declaring success.
    fn try_finish(&mut self) -> bool {
        let slave_finished = self.sched.is_done(ActorId::Slave) || self.slave.is_parked();
        if self.sched.is_done(ActorId::Master) && self.chan.is_drained() && slave_finished {
            if !self.sched.is_done(ActorId::Slave) {
                self.sched.mark_done(ActorId::Slave);
                self.trace.record(ObsEvent::ActorDone {
                    tick: self.clock.tick,
                    actor: ActorId::Slave,
                });
            }
            self.outcome = Some(Outcome::Success);
            true
        } else {
            false
        }
    }

    /// Drive the run to completion with the given choice policy.
    ///
    /// # Errors
    ///
    /// Propagates any [`EngineError`] from actor steps or cycle bookkeeping.
    pub fn run(&mut self, policy: &mut dyn ChoicePolicy) -> Result<Outcome, EngineError> {
        loop {
            while self.outcome.is_none() {
                let candidates = self.runnable();
                if candidates.is_empty() {
                    break;
                }
                let choice = policy.choose(&candidates);
                self.step_actor(choice)?;
            }
            if let Some(outcome) = self.end_cycle()? {
                return Ok(outcome);
            }
        }
    }

    /// Fingerprint of the semantic state (channel, memory, actors,
    /// scheduling sets). Clock, trace, and step counters are excluded so
    /// interleavings that converge on the same state dedup.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.chan.hash(&mut hasher);
        self.memory.hash(&mut hasher);
        self.master.hash(&mut hasher);
        self.slave.hash(&mut hasher);
        self.sched.hash_semantic(&mut hasher);
        hasher.finish()
    }

    /// The run's outcome, once decided.
    #[must_use]
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Completed kernel cycles (sync passes).
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.clock.tick
    }

    /// Total actor steps taken.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.sched.step_count()
    }

    /// The recorded event trace.
    #[must_use]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The shared channel (read-only).
    #[must_use]
    pub fn channel(&self) -> &SharedChannel {
        &self.chan
    }

    /// The backing memory (read-only).
    #[must_use]
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Mutable backing memory, for fault-injection harnesses.
    pub fn memory_mut(&mut self) -> &mut MemoryStore {
        &mut self.memory
    }

    /// The master actor (read-only).
    #[must_use]
    pub fn master(&self) -> &MasterActor {
        &self.master
    }

    /// The slave actor (read-only).
    #[must_use]
    pub fn slave(&self) -> &SlaveActor {
        &self.slave
    }

    /// The scheduler bookkeeping (read-only).
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.sched
    }
}
