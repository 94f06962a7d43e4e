//! Randomized schedule sampling.

use serde::{Deserialize, Serialize};

use transim_vm::{ActorId, ChoicePolicy, EngineError, Kernel, Outcome, SimConfig, Violation};

use crate::rng::SimRng;

/// Choice policy drawing uniformly from the candidate set.
pub struct RandomPolicy {
    rng: SimRng,
}

impl RandomPolicy {
    /// A policy seeded directly.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SimRng::new(seed),
        }
    }

    /// A policy drawing from an existing stream.
    #[must_use]
    pub fn from_rng(rng: SimRng) -> Self {
        Self { rng }
    }
}

impl ChoicePolicy for RandomPolicy {
    fn choose(&mut self, candidates: &[ActorId]) -> ActorId {
        candidates[self.rng.pick_index(candidates.len())]
    }
}

/// Records the branch decisions another policy makes, for later replay.
///
/// Only real branch points (two or more candidates) are recorded, matching
/// what `transim_vm::ReplaySchedule` consumes.
pub struct RecordingPolicy<P> {
    inner: P,
    decisions: Vec<ActorId>,
}

impl<P: ChoicePolicy> RecordingPolicy<P> {
    /// Wrap a policy and start recording.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            decisions: Vec::new(),
        }
    }

    /// Decisions recorded so far.
    #[must_use]
    pub fn decisions(&self) -> &[ActorId] {
        &self.decisions
    }

    /// Consume the recorder, yielding the decision list.
    #[must_use]
    pub fn into_decisions(self) -> Vec<ActorId> {
        self.decisions
    }
}

impl<P: ChoicePolicy> ChoicePolicy for RecordingPolicy<P> {
    fn choose(&mut self, candidates: &[ActorId]) -> ActorId {
        let choice = self.inner.choose(candidates);
        if candidates.len() >= 2 {
            self.decisions.push(choice);
        }
        choice
    }
}

/// Aggregated results of repeated random walks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Walks completed.
    pub runs: usize,
    /// Walks that ended in `Success`.
    pub successes: usize,
    /// Walks that ended in a violation.
    pub violations: usize,
    /// Walks that ended inconclusive.
    pub inconclusive: usize,
    /// The first violation observed, if any.
    pub first_violation: Option<Violation>,
}

/// Run `runs` independent random walks over the schedule space.
///
/// Each walk gets a forked RNG stream, so the set of walks is fully
/// determined by `seed`.
///
/// # Errors
///
/// Propagates any [`EngineError`] from the engine.
pub fn random_walks(config: &SimConfig, seed: u64, runs: usize) -> Result<WalkStats, EngineError> {
    let mut rng = SimRng::new(seed);
    let mut stats = WalkStats::default();
    for _ in 0..runs {
        let mut policy = RandomPolicy::from_rng(rng.fork());
        let mut kernel = Kernel::new(config.clone());
        match kernel.run(&mut policy)? {
            Outcome::Success => stats.successes += 1,
            Outcome::Violation(violation) => {
                stats.violations += 1;
                stats.first_violation.get_or_insert(violation);
            }
            Outcome::Inconclusive(_) => stats.inconclusive += 1,
        }
        stats.runs += 1;
    }
    tracing::debug!(
        runs = stats.runs,
        successes = stats.successes,
        violations = stats.violations,
        "random walks finished"
    );
    Ok(stats)
}
