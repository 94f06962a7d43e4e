//! Violation taxonomy and engine errors.
//!
//! A [`Violation`] is a modeled safety-property failure: it is part of the
//! simulated system's behavior and surfaces as a terminal outcome, never as
//! an `Err`. An [`EngineError`] is a defect in the engine or its driver and
//! aborts the run loudly.

use serde::{Deserialize, Serialize};

use crate::actor::ActorId;

/// A modeled safety-property violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Violation {
    /// Memory access outside the configured address domain.
    OutOfDomainAccess {
        /// The offending address.
        addr: u64,
    },
    /// Read-back data does not match the data the master wrote.
    RoundTripMismatch {
        /// Data the master expected to read back.
        expected: i64,
        /// Data carried by the read response.
        observed: i64,
    },
}

impl Violation {
    /// Stable machine-readable code for each violation kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfDomainAccess { .. } => "sim.violation.out_of_domain",
            Self::RoundTripMismatch { .. } => "sim.violation.round_trip",
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfDomainAccess { addr } => {
                write!(f, "out-of-domain access at address {addr}")
            }
            Self::RoundTripMismatch { expected, observed } => {
                write!(f, "round-trip mismatch: expected {expected}, observed {observed}")
            }
        }
    }
}

/// Errors that indicate a defect in the engine or its driver.
///
/// These are never findings about the simulated protocol; they must abort
/// the run rather than be folded into an outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// An actor was stepped at a resume point its machine does not define.
    #[error("{actor} reached an unreachable state: {detail}")]
    UnreachableState {
        /// The actor whose machine is in an undefined state.
        actor: ActorId,
        /// What the machine was asked to do.
        detail: String,
    },
    /// The driver stepped an actor that is not currently runnable.
    #[error("{actor} stepped while not runnable")]
    StepNotRunnable {
        /// The actor the driver tried to step.
        actor: ActorId,
    },
    /// The driver requested a sync pass while actors are still runnable.
    #[error("sync requested with {runnable} actor(s) still runnable")]
    PrematureSync {
        /// Number of actors that could still make progress.
        runnable: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_codes_are_stable() {
        assert_eq!(
            Violation::OutOfDomainAccess { addr: 3 }.code(),
            "sim.violation.out_of_domain"
        );
        assert_eq!(
            Violation::RoundTripMismatch {
                expected: 50,
                observed: 0
            }
            .code(),
            "sim.violation.round_trip"
        );
    }

    #[test]
    fn violation_display_names_the_address() {
        let v = Violation::OutOfDomainAccess { addr: 7 };
        assert_eq!(v.to_string(), "out-of-domain access at address 7");
    }
}
