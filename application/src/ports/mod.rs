//! Outbound ports
//!
//! Interfaces implemented by the infrastructure layer.

pub mod history;
pub mod notification;
pub mod telemetry;
