//! Alert sinks
//!
//! Implementations of the [`NotificationSink`](pact_application::NotificationSink)
//! port: structured logging, an in-process broadcast bus, and a fan-out
//! that combines them.

mod broadcast;
mod tracing_sink;

pub use broadcast::{AlertBusError, AlertReceiver, BroadcastAlertSink};
pub use tracing_sink::{FanoutAlertSink, TracingAlertSink};
