//! Engine configuration.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of write/read transaction pairs the master issues.
    pub master_iterations: u32,
    /// Addresses the memory store accepts; anything else is a violation.
    pub valid_addresses: BTreeSet<u64>,
    /// Kernel-cycle budget. `None` means unbounded.
    pub max_cycles: Option<u64>,
    /// Whether the master checks read responses against the data it wrote.
    pub verify_round_trip: bool,
    /// Simulated time per kernel cycle.
    pub tick_duration: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            master_iterations: 1,
            valid_addresses: [0].into_iter().collect(),
            max_cycles: None,
            verify_round_trip: true,
            tick_duration: Duration::from_millis(1),
        }
    }
}
