//! Schedule exploration and sampling middleware for the transim engine.
//!
//! The engine (`transim-vm`) surfaces every scheduling decision through its
//! `ChoicePolicy` hook; this crate supplies the outer drivers: exhaustive
//! explicit-state exploration of all interleavings, seeded random-walk
//! sampling, and a run harness producing machine-readable reports.

pub mod explorer;
pub mod rng;
pub mod runner;
pub mod schedule;

pub use explorer::{explore, explore_with, ExploreConfig, ExploreError, ExploreOutcome};
pub use rng::SimRng;
pub use runner::{run_once, RunReport};
pub use schedule::{random_walks, RandomPolicy, RecordingPolicy, WalkStats};
