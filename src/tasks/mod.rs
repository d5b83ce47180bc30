//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: Drops expired entries from the in-memory store

mod sweeper;

pub use sweeper::spawn_sweeper;
