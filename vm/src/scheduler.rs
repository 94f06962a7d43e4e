//! Cooperative scheduling bookkeeping and the nondeterministic choice source.
//!
//! The scheduler tracks which actors are ready, blocked, or done. Which
//! ready actor runs next is decided by an injected [`ChoicePolicy`]: each
//! pick with more than one candidate is a branch point an exploration
//! driver can enumerate instead of resolving.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, BlockReason, StepOutcome};
use crate::channel::SharedChannel;

/// Injected decision source for the scheduler's nondeterministic pick.
///
/// Implementations may be deterministic, replayed, random, or enumerating;
/// the engine itself never resolves a choice.
pub trait ChoicePolicy {
    /// Choose one actor from a non-empty candidate set.
    fn choose(&mut self, candidates: &[ActorId]) -> ActorId;
}

/// Deterministic policy: always the first runnable candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstRunnable;

impl ChoicePolicy for FirstRunnable {
    fn choose(&mut self, candidates: &[ActorId]) -> ActorId {
        candidates[0]
    }
}

/// Replay of a recorded decision list.
///
/// Decisions are consumed only at real branch points (two or more
/// candidates); forced picks do not advance the list. Once the list is
/// exhausted the policy falls back to the first candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaySchedule {
    decisions: VecDeque<ActorId>,
}

impl ReplaySchedule {
    /// A schedule replaying the given decisions in order.
    #[must_use]
    pub fn new(decisions: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
        }
    }

    /// Decisions not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.decisions.len()
    }
}

impl ChoicePolicy for ReplaySchedule {
    fn choose(&mut self, candidates: &[ActorId]) -> ActorId {
        if candidates.len() < 2 {
            return candidates[0];
        }
        while let Some(decision) = self.decisions.pop_front() {
            if candidates.contains(&decision) {
                return decision;
            }
        }
        candidates[0]
    }
}

/// Ready/blocked/done bookkeeping for the two actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    ready: BTreeSet<ActorId>,
    blocked: BTreeMap<ActorId, BlockReason>,
    done: BTreeSet<ActorId>,
    steps: u64,
}

impl Scheduler {
    /// A scheduler with both actors ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ready: [ActorId::Master, ActorId::Slave].into_iter().collect(),
            blocked: BTreeMap::new(),
            done: BTreeSet::new(),
            steps: 0,
        }
    }

    /// The current runnable candidates, in deterministic order.
    #[must_use]
    pub fn runnable(&self) -> Vec<ActorId> {
        self.ready.iter().copied().collect()
    }

    /// Whether the given actor may be stepped right now.
    #[must_use]
    pub fn is_ready(&self, id: ActorId) -> bool {
        self.ready.contains(&id)
    }

    /// Whether no actor can be stepped without a sync pass.
    #[must_use]
    pub fn none_ready(&self) -> bool {
        self.ready.is_empty()
    }

    /// Whether the given actor has reached its terminal state.
    #[must_use]
    pub fn is_done(&self, id: ActorId) -> bool {
        self.done.contains(&id)
    }

    /// Total actor steps taken.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// The block reason for an actor, if it is blocked.
    #[must_use]
    pub fn block_reason(&self, id: ActorId) -> Option<BlockReason> {
        self.blocked.get(&id).copied()
    }

    /// Record that one actor step was taken and route its outcome.
    pub fn update_after_step(&mut self, id: ActorId, outcome: &StepOutcome) {
        self.steps += 1;
        match outcome {
            StepOutcome::Progressed => {}
            StepOutcome::Suspended(reason) => self.mark_blocked(id, *reason),
            StepOutcome::Done => self.mark_done(id),
            // The kernel terminates the run; the actor keeps its slot so the
            // final state snapshot still shows where it stood.
            StepOutcome::Violation(_) => {}
        }
    }

    /// Move an actor from ready to blocked.
    pub fn mark_blocked(&mut self, id: ActorId, reason: BlockReason) {
        self.ready.remove(&id);
        self.blocked.insert(id, reason);
    }

    /// Remove an actor from all queues; it will never run again.
    pub fn mark_done(&mut self, id: ActorId) {
        self.ready.remove(&id);
        self.blocked.remove(&id);
        self.done.insert(id);
    }

    /// Wake every blocked actor whose wait condition now holds.
    ///
    /// Called by the kernel after each sync pass; wait conditions are
    /// evaluated against committed channel state only.
    pub fn wake_ready(&mut self, chan: &SharedChannel) -> Vec<ActorId> {
        let woken: Vec<ActorId> = self
            .blocked
            .iter()
            .filter(|(_, reason)| wake_condition(**reason, chan))
            .map(|(id, _)| *id)
            .collect();
        for id in &woken {
            self.blocked.remove(id);
            self.ready.insert(*id);
        }
        woken
    }

    /// Semantic scheduling state for fingerprinting: the step counter is
    /// excluded so converging interleavings dedup.
    pub fn hash_semantic<H: std::hash::Hasher>(&self, state: &mut H) {
        use std::hash::Hash;
        self.ready.hash(state);
        self.blocked.hash(state);
        self.done.hash(state);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn wake_condition(reason: BlockReason, chan: &SharedChannel) -> bool {
    match reason {
        BlockReason::RequestSlotBusy => chan.request_slot_free(),
        BlockReason::AwaitRequest => chan.has_committed_request(),
        BlockReason::ResponseSlotBusy => chan.response_slot_free(),
        BlockReason::AwaitResponse => chan.has_committed_response(),
    }
}
