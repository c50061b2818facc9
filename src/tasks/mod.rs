//! Background Tasks Module
//!
//! Periodic expiry sweeps that run for the lifetime of the process.
//!
//! # Tasks
//! - In-memory sweep: every `VOLATILE_SWEEP_INTERVAL` (default 5 minutes)
//! - Persistent sweep: every `PERSISTENT_SWEEP_INTERVAL` (default 6 hours)

mod cleanup;

pub use cleanup::{spawn_persistent_sweep, spawn_volatile_sweep, BackgroundTasks};
