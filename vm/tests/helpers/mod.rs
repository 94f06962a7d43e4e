//! Shared fixtures for engine integration tests.

use transim_vm::{Kernel, MemOp, ObsEvent, Outcome, SimConfig, Trace};

/// Run the default single-iteration protocol to completion with the
/// deterministic first-runnable policy.
pub fn run_default() -> (Kernel, Outcome) {
    let mut kernel = Kernel::new(SimConfig::default());
    let outcome = kernel
        .run(&mut transim_vm::FirstRunnable)
        .expect("default run");
    (kernel, outcome)
}

/// Project the comm events of a trace onto (kind, op) pairs.
pub fn comm_kinds(trace: &Trace) -> Vec<(&'static str, MemOp)> {
    trace
        .comm_events()
        .iter()
        .map(|ev| match ev {
            ObsEvent::RequestPosted { msg, .. } => ("req_posted", msg.op),
            ObsEvent::RequestTaken { msg, .. } => ("req_taken", msg.op),
            ObsEvent::ResponsePosted { resp, .. } => ("resp_posted", resp.op),
            ObsEvent::ResponseTaken { resp, .. } => ("resp_taken", resp.op),
            other => unreachable!("non-comm event {other:?} in comm projection"),
        })
        .collect()
}
