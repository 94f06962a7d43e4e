//! Run harness producing machine-readable reports.

use serde::{Deserialize, Serialize};

use transim_vm::{ChoicePolicy, EngineError, Kernel, ObsEvent, Outcome, SimConfig};

/// Everything observable about one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Terminal outcome.
    pub outcome: Outcome,
    /// Kernel cycles (sync passes) completed.
    pub cycles: u64,
    /// Actor steps taken.
    pub steps: u64,
    /// The full observable event trace.
    pub events: Vec<ObsEvent>,
}

impl RunReport {
    /// Pretty-printed JSON rendering of the report.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Run one simulation to completion under the given choice policy.
///
/// # Errors
///
/// Propagates any [`EngineError`] from the engine.
pub fn run_once(
    config: &SimConfig,
    policy: &mut dyn ChoicePolicy,
) -> Result<RunReport, EngineError> {
    let mut kernel = Kernel::new(config.clone());
    let outcome = kernel.run(policy)?;
    tracing::info!(
        outcome = ?outcome,
        cycles = kernel.cycles(),
        steps = kernel.steps(),
        "run complete"
    );
    Ok(RunReport {
        outcome,
        cycles: kernel.cycles(),
        steps: kernel.steps(),
        events: kernel.trace().events().to_vec(),
    })
}
