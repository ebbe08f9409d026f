//! Webhook liveness tracking.

use std::sync::{PoisonError, RwLock};

use watchgate_core::types::Timestamp;

/// Records when the media server last delivered a webhook.
///
/// Owned by [`AppState`](crate::state::AppState); written by the webhook
/// endpoints and read by `/health`.
#[derive(Debug, Default)]
pub struct WebhookMonitor {
    last_received: RwLock<Option<Timestamp>>,
}

impl WebhookMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a webhook as received now and return the timestamp.
    pub fn record(&self) -> Timestamp {
        let now = chrono::Utc::now();
        *self
            .last_received
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(now);
        now
    }

    /// Time of the most recent webhook, if any arrived since startup.
    pub fn last_received(&self) -> Option<Timestamp> {
        *self
            .last_received
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert!(WebhookMonitor::new().last_received().is_none());
    }

    #[test]
    fn record_is_visible_to_readers() {
        let monitor = WebhookMonitor::new();
        let first = monitor.record();
        assert_eq!(monitor.last_received(), Some(first));

        let second = monitor.record();
        assert!(second >= first);
        assert_eq!(monitor.last_received(), Some(second));
    }
}
