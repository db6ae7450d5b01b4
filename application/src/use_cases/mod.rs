//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod adapt;
pub mod coordinate;
pub mod detect_failures;
pub mod monitor_health;
pub mod reassign;
