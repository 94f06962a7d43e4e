//! Exhaustive schedule exploration over the kernel's choice points.
//!
//! Depth-first search over kernel clones: forced steps run inline, and every
//! point where two actors are runnable branches the search. Revisited states
//! are pruned by semantic fingerprint, so interleavings that converge are
//! explored once.

use std::collections::HashSet;

use transim_vm::{ActorId, EngineError, InconclusiveReason, Kernel, Outcome, SimConfig, Violation};

/// Budgets for one exploration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExploreConfig {
    /// Maximum scheduling decisions along any one path.
    pub max_depth: usize,
    /// Maximum distinct branch-point states to visit.
    pub max_states: usize,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            max_depth: 4096,
            max_states: 1 << 20,
        }
    }
}

/// Why an exploration stopped without a full sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InconclusiveDetail {
    /// Some schedule ended without a verdict.
    RunInconclusive(InconclusiveReason),
    /// A path exceeded the decision-depth budget.
    DepthBudget,
    /// The distinct-state budget was exhausted.
    StateBudget,
}

/// Result of exploring the schedule space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExploreOutcome {
    /// Every explored schedule terminated successfully.
    AllSuccess {
        /// Distinct branch-point states visited.
        states_explored: usize,
        /// Completed schedules (pruned branches excluded).
        schedules_run: usize,
    },
    /// Some schedule reached a property violation.
    ViolationFound {
        /// The violation.
        violation: Violation,
        /// Branch decisions reproducing it (replayable via
        /// `transim_vm::ReplaySchedule`).
        schedule: Vec<ActorId>,
    },
    /// The sweep was cut short.
    Inconclusive {
        /// Why.
        detail: InconclusiveDetail,
        /// Distinct branch-point states visited before stopping.
        states_explored: usize,
    },
}

/// Errors from exploration.
#[derive(Debug, thiserror::Error)]
pub enum ExploreError {
    /// The engine reported a defect.
    #[error("engine error during exploration: {0}")]
    Engine(#[from] EngineError),
}

/// Explore all schedules of `config` up to the given budgets.
///
/// # Errors
///
/// Returns [`ExploreError::Engine`] if the engine faults.
pub fn explore(config: &SimConfig, ecfg: &ExploreConfig) -> Result<ExploreOutcome, ExploreError> {
    explore_with(config, ecfg, |_| {})
}

/// Explore all schedules, invoking `visit` on every intermediate kernel
/// state (after each step and each cycle boundary). Invariant sweeps hook
/// in here.
///
/// # Errors
///
/// Returns [`ExploreError::Engine`] if the engine faults.
pub fn explore_with<F>(
    config: &SimConfig,
    ecfg: &ExploreConfig,
    mut visit: F,
) -> Result<ExploreOutcome, ExploreError>
where
    F: FnMut(&Kernel),
{
    let mut stack: Vec<(Kernel, Vec<ActorId>)> = vec![(Kernel::new(config.clone()), Vec::new())];
    let mut seen: HashSet<u64> = HashSet::new();
    let mut schedules_run = 0_usize;

    while let Some((mut kernel, schedule)) = stack.pop() {
        loop {
            visit(&kernel);
            if let Some(outcome) = kernel.outcome() {
                match outcome {
                    Outcome::Success => {
                        schedules_run += 1;
                    }
                    Outcome::Violation(violation) => {
                        tracing::debug!(%violation, depth = schedule.len(), "violation found");
                        return Ok(ExploreOutcome::ViolationFound {
                            violation: *violation,
                            schedule,
                        });
                    }
                    Outcome::Inconclusive(reason) => {
                        return Ok(ExploreOutcome::Inconclusive {
                            detail: InconclusiveDetail::RunInconclusive(*reason),
                            states_explored: seen.len(),
                        });
                    }
                }
                break;
            }

            let candidates = kernel.runnable();
            match candidates.len() {
                0 => {
                    kernel.end_cycle()?;
                }
                1 => {
                    kernel.step_actor(candidates[0])?;
                }
                _ => {
                    if !seen.insert(kernel.fingerprint()) {
                        // Reached before via another interleaving.
                        break;
                    }
                    if seen.len() >= ecfg.max_states {
                        return Ok(ExploreOutcome::Inconclusive {
                            detail: InconclusiveDetail::StateBudget,
                            states_explored: seen.len(),
                        });
                    }
                    if schedule.len() >= ecfg.max_depth {
                        return Ok(ExploreOutcome::Inconclusive {
                            detail: InconclusiveDetail::DepthBudget,
                            states_explored: seen.len(),
                        });
                    }
                    for &candidate in candidates.iter().rev() {
                        let mut branch = kernel.clone();
                        branch.step_actor(candidate)?;
                        let mut branch_schedule = schedule.clone();
                        branch_schedule.push(candidate);
                        stack.push((branch, branch_schedule));
                    }
                    break;
                }
            }
        }
    }

    tracing::info!(
        states = seen.len(),
        schedules = schedules_run,
        "exploration complete"
    );
    Ok(ExploreOutcome::AllSuccess {
        states_explored: seen.len(),
        schedules_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_budget_reports_inconclusive() {
        let ecfg = ExploreConfig {
            max_depth: 0,
            ..ExploreConfig::default()
        };
        let outcome = explore(&SimConfig::default(), &ecfg).unwrap();
        assert!(matches!(
            outcome,
            ExploreOutcome::Inconclusive {
                detail: InconclusiveDetail::DepthBudget,
                ..
            }
        ));
    }
}
