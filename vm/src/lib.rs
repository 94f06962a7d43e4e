//! Deterministic two-actor transaction-level protocol engine.
//!
//! A master and a memory slave exchange request/response transactions
//! through a shared channel of size-1 mailboxes, driven by a cooperative
//! kernel with delta-cycle semantics: effects staged during a kernel cycle
//! become cross-visible only after the sync pass.
//!
//! # Architecture
//!
//! - **Channel** ([`channel::SharedChannel`]): two-phase mailboxes plus
//!   delta-cycle event flags
//! - **Memory** ([`memory::MemoryStore`]): the slave's backing store with a
//!   configured valid address domain
//! - **Actors** ([`master::MasterActor`], [`slave::SlaveActor`]): resumable
//!   state machines suspending at channel boundaries
//! - **Scheduler** ([`scheduler::Scheduler`]): ready/blocked bookkeeping with
//!   an injected [`scheduler::ChoicePolicy`] decision source
//! - **Kernel** ([`kernel::Kernel`]): the cycle loop, termination detection,
//!   and the observable trace
//! - **Properties** ([`property::PropertyChecker`]): address-bound and
//!   round-trip checks whose failures are modeled violations
//!
//! The engine contains no randomness and no real concurrency: every
//! scheduling choice is surfaced through the `ChoicePolicy` so an outer
//! driver (see `transim-simulator`) can enumerate, replay, or sample the
//! interleavings.
//!
//! # Usage
//!
//! ```
//! use transim_vm::{FirstRunnable, Kernel, Outcome, SimConfig};
//!
//! let mut kernel = Kernel::new(SimConfig::default());
//! let outcome = kernel.run(&mut FirstRunnable).unwrap();
//! assert_eq!(outcome, Outcome::Success);
//! ```

pub mod actor;
pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod kernel;
pub mod master;
pub mod memory;
pub mod property;
pub mod scheduler;
pub mod slave;
pub mod trace;

pub use actor::{ActorId, BlockReason, StepOutcome, StepPack};
pub use channel::{EventFlag, MemOp, Message, PostOutcome, Response, SharedChannel, Status};
pub use clock::SimClock;
pub use config::SimConfig;
pub use error::{EngineError, Violation};
pub use kernel::{InconclusiveReason, Kernel, Outcome};
pub use master::{MasterActor, MasterPc, DATA_OFFSET};
pub use memory::MemoryStore;
pub use property::PropertyChecker;
pub use scheduler::{ChoicePolicy, FirstRunnable, ReplaySchedule, Scheduler};
pub use slave::{SlaveActor, SlavePc};
pub use trace::{obs_actor, ObsEvent, Trace};
