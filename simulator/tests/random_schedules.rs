//! Property tests: seeded random schedules never change the verdict.

use proptest::prelude::*;

use transim_simulator::{run_once, RandomPolicy};
use transim_vm::{Kernel, Outcome, SimConfig, DATA_OFFSET};

proptest! {
    #[test]
    fn random_schedules_always_succeed(seed in any::<u64>()) {
        let report = run_once(&SimConfig::default(), &mut RandomPolicy::new(seed)).unwrap();
        prop_assert_eq!(report.outcome, Outcome::Success);
        prop_assert!(report.cycles <= 4);
    }

    #[test]
    fn memory_contents_are_schedule_independent(seed in any::<u64>(), iterations in 0_u32..4) {
        let config = SimConfig {
            master_iterations: iterations,
            valid_addresses: (0..u64::from(iterations)).collect(),
            ..SimConfig::default()
        };
        let mut kernel = Kernel::new(config);
        let outcome = kernel.run(&mut RandomPolicy::new(seed)).unwrap();
        prop_assert_eq!(outcome, Outcome::Success);
        for addr in 0..u64::from(iterations) {
            prop_assert_eq!(
                kernel.memory().read(addr),
                Ok(i64::try_from(addr).unwrap() + DATA_OFFSET)
            );
        }
    }
}
