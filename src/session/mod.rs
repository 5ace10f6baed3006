//! Per-user session state.
//!
//! A [`Session`] is created when a user starts working and dropped when they
//! leave. Nothing in it outlives the process.

pub mod cache;
pub mod log;

pub use cache::{Fingerprint, PlanCache};
pub use log::{ErrorLog, ErrorLogEntry};

#[derive(Debug, Default)]
pub struct Session {
    pub cache: PlanCache,
    pub errors: ErrorLog,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}
