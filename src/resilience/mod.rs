//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! RPC round trip:
//!     → timeouts.rs (every call has a deadline, distinguishable timeout error)
//!
//! Receipt polling:
//!     → backoff.rs (capped exponential delay with jitter between polls)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - The dispatch core never retries; retry policy belongs to the caller

pub mod backoff;
pub mod timeouts;
