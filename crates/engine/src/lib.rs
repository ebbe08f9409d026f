//! Event-driven enforcement engine.
//!
//! - [`EventProcessor`] -- consumes one playback event, applies the gate
//!   policy and drives the ransom state machine.
//! - [`SessionResolver`] -- maps weak identifiers to a live session key.
//! - [`Enforcer`] -- terminates a session with a message, trying an ordered
//!   list of strategies.
//! - [`RansomStore`] -- persistence seam with Postgres and in-memory
//!   implementations.
//! - [`SubjectLocks`] -- per-subject mutual exclusion.

pub mod enforcement;
pub mod error;
pub mod locks;
pub mod processor;
pub mod resolver;
pub mod store;

pub use enforcement::{Enforcer, Termination, TerminationStrategy};
pub use error::{EnforcementError, ResolveError, StoreError};
pub use locks::SubjectLocks;
pub use processor::{EventProcessor, Intervention, ProcessOutcome};
pub use resolver::{ResolverConfig, SessionLookup, SessionResolver};
pub use store::{MemoryRansomStore, PgRansomStore, RansomStore};
