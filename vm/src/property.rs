//! Point checks for the modeled safety properties.
//!
//! Pure predicates: a failed check is returned as a [`Violation`] value and
//! the kernel converts it into the terminal outcome. The checks never panic
//! and never raise a host-language exception past the kernel's bookkeeping.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Violation;

/// Evaluates the address-bound and round-trip safety properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyChecker {
    valid_addresses: BTreeSet<u64>,
}

impl PropertyChecker {
    /// A checker accepting exactly the given addresses.
    #[must_use]
    pub fn new(valid_addresses: BTreeSet<u64>) -> Self {
        Self { valid_addresses }
    }

    /// Check that `addr` lies in the valid domain.
    ///
    /// # Errors
    ///
    /// Returns [`Violation::OutOfDomainAccess`] otherwise.
    pub fn check_address_bound(&self, addr: u64) -> Result<(), Violation> {
        if self.valid_addresses.contains(&addr) {
            Ok(())
        } else {
            Err(Violation::OutOfDomainAccess { addr })
        }
    }

    /// Check that read-back data matches what was written.
    ///
    /// # Errors
    ///
    /// Returns [`Violation::RoundTripMismatch`] otherwise.
    pub fn check_round_trip(&self, expected: i64, observed: i64) -> Result<(), Violation> {
        if expected == observed {
            Ok(())
        } else {
            Err(Violation::RoundTripMismatch { expected, observed })
        }
    }

    /// The configured valid address set.
    #[must_use]
    pub fn valid_addresses(&self) -> &BTreeSet<u64> {
        &self.valid_addresses
    }
}
