//! In-process alert bus.
//!
//! Alerts are published on a `tokio::sync::broadcast` channel so any number
//! of observers (the CLI's monitor view, tests) can follow them live.
//! Alerts published with no subscriber are dropped.

use pact_application::ports::notification::{Alert, NotificationSink};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq)]
pub enum AlertBusError {
    #[error("Alert bus is closed")]
    Closed,

    #[error("No alerts available")]
    Empty,

    #[error("Receiver lagged by {0} alerts (alerts were dropped)")]
    Lagged(u64),
}

#[derive(Clone)]
pub struct BroadcastAlertSink {
    sender: Arc<broadcast::Sender<Alert>>,
}

impl BroadcastAlertSink {
    /// `capacity` alerts are buffered per subscriber before the oldest drop.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> AlertReceiver {
        AlertReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationSink for BroadcastAlertSink {
    fn notify(&self, alert: Alert) {
        let receivers = self.sender.send(alert).unwrap_or(0);
        if receivers == 0 {
            debug!("No subscribers listening for alerts");
        }
    }
}

pub struct AlertReceiver {
    receiver: broadcast::Receiver<Alert>,
}

impl AlertReceiver {
    /// Wait for the next alert.
    pub async fn recv(&mut self) -> Result<Alert, AlertBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => AlertBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("Alert receiver lagged by {} alerts", n);
                AlertBusError::Lagged(n)
            }
        })
    }

    pub fn try_recv(&mut self) -> Result<Alert, AlertBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => AlertBusError::Empty,
            broadcast::error::TryRecvError::Closed => AlertBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Alert receiver lagged by {} alerts", n);
                AlertBusError::Lagged(n)
            }
        })
    }
}
