//! Slave-side backing memory with a configured valid address domain.
//!
//! Out-of-domain access is a modeled violation surfaced as a value, never a
//! host-language fault. Valid cells default to 0 until written.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::Violation;
use crate::property::PropertyChecker;

/// The memory the slave reads and writes on behalf of the master.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryStore {
    checker: PropertyChecker,
    cells: BTreeMap<u64, i64>,
}

impl MemoryStore {
    /// A store accepting exactly the given addresses.
    #[must_use]
    pub fn new(valid_addresses: BTreeSet<u64>) -> Self {
        Self {
            checker: PropertyChecker::new(valid_addresses),
            cells: BTreeMap::new(),
        }
    }

    /// Read the cell at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Violation::OutOfDomainAccess`] if `addr` is outside the
    /// valid domain.
    pub fn read(&self, addr: u64) -> Result<i64, Violation> {
        self.checker.check_address_bound(addr)?;
        Ok(self.cells.get(&addr).copied().unwrap_or(0))
    }

    /// Write `value` to the cell at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Violation::OutOfDomainAccess`] if `addr` is outside the
    /// valid domain.
    pub fn write(&mut self, addr: u64, value: i64) -> Result<(), Violation> {
        self.checker.check_address_bound(addr)?;
        self.cells.insert(addr, value);
        Ok(())
    }

    /// The configured valid address set.
    #[must_use]
    pub fn valid_addresses(&self) -> &BTreeSet<u64> {
        self.checker.valid_addresses()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(addrs: &[u64]) -> MemoryStore {
        MemoryStore::new(addrs.iter().copied().collect())
    }

    #[test]
    fn test_unwritten_valid_cell_reads_zero() {
        let mem = store_with(&[0]);
        assert_eq!(mem.read(0), Ok(0));
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let mut mem = store_with(&[0, 1]);
        mem.write(1, 51).unwrap();
        assert_eq!(mem.read(1), Ok(51));
        assert_eq!(mem.read(0), Ok(0));
    }

    #[test]
    fn test_out_of_domain_is_a_violation_not_a_default() {
        let mut mem = store_with(&[0]);
        assert_eq!(mem.read(1), Err(Violation::OutOfDomainAccess { addr: 1 }));
        assert_eq!(
            mem.write(1, 9),
            Err(Violation::OutOfDomainAccess { addr: 1 })
        );
    }

    #[test]
    fn test_empty_domain_rejects_everything() {
        let mem = store_with(&[]);
        assert_eq!(mem.read(0), Err(Violation::OutOfDomainAccess { addr: 0 }));
    }
}
