//! Property violations surface as outcomes, never as silent defaults.

use std::collections::BTreeSet;

use transim_vm::{
    ActorId, FirstRunnable, Kernel, ObsEvent, Outcome, SimConfig, Violation, DATA_OFFSET,
};

#[test]
fn empty_domain_violates_at_first_serve() {
    let config = SimConfig {
        valid_addresses: BTreeSet::new(),
        ..SimConfig::default()
    };
    let mut kernel = Kernel::new(config);
    let outcome = kernel.run(&mut FirstRunnable).unwrap();

    assert_eq!(
        outcome,
        Outcome::Violation(Violation::OutOfDomainAccess { addr: 0 })
    );
    let raised = kernel
        .trace()
        .events()
        .iter()
        .find_map(|ev| match ev {
            ObsEvent::ViolationRaised {
                actor, violation, ..
            } => Some((*actor, *violation)),
            _ => None,
        })
        .expect("violation event in trace");
    assert_eq!(raised.0, ActorId::Slave);
    assert_eq!(raised.1, Violation::OutOfDomainAccess { addr: 0 });
}

/// Drive cycles until the write has landed, corrupt the cell, and let the
/// run finish: the master's read-back check must fire.
fn run_with_corruption(verify: bool) -> Outcome {
    let config = SimConfig {
        verify_round_trip: verify,
        ..SimConfig::default()
    };
    let mut kernel = Kernel::new(config);
    let mut corrupted = false;
    loop {
        while let Some(&next) = kernel.runnable().first() {
            kernel.step_actor(next).unwrap();
        }
        if let Some(outcome) = kernel.end_cycle().unwrap() {
            return outcome;
        }
        if !corrupted && kernel.memory().read(0) == Ok(DATA_OFFSET) {
            kernel.memory_mut().write(0, 7).unwrap();
            corrupted = true;
        }
    }
}

#[test]
fn corrupted_read_back_is_a_round_trip_mismatch() {
    assert_eq!(
        run_with_corruption(true),
        Outcome::Violation(Violation::RoundTripMismatch {
            expected: DATA_OFFSET,
            observed: 7
        })
    );
}

#[test]
fn non_verifying_master_ignores_corruption() {
    assert_eq!(run_with_corruption(false), Outcome::Success);
}

#[test]
fn violation_stops_the_run_immediately() {
    let config = SimConfig {
        valid_addresses: BTreeSet::new(),
        ..SimConfig::default()
    };
    let mut kernel = Kernel::new(config);
    kernel.run(&mut FirstRunnable).unwrap();

    // The run is decided: no further choices are offered.
    assert!(kernel.runnable().is_empty());
    assert!(matches!(kernel.outcome(), Some(Outcome::Violation(_))));
}
