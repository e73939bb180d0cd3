//! Session management for the gateway
//!
//! Maps the bearer tokens handed to web clients onto Service Layer sessions.
//! Records expire lazily: a read of an expired record deletes it, and every
//! write sweeps out whatever has expired. A background sweeper can tighten
//! that bound further without changing the store's contract.

pub mod adapters;
pub mod clock;
pub mod store;
pub mod sweeper;

pub use adapters::InMemorySessionStore;
pub use clock::{Clock, ClockRef, ManualClock, SystemClock};
pub use store::{Session, SessionError, SessionStore, SessionStoreRef};
pub use sweeper::spawn_sweeper;
