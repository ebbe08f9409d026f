use std::sync::Arc;

use tokio_util::task::TaskTracker;
use watchgate_engine::{EventProcessor, RansomStore};
use watchgate_plex::MediaServer;

use crate::config::ServerConfig;
use crate::monitor::WebhookMonitor;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (payments, health).
    pub pool: watchgate_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Ransom persistence shared with the processor.
    pub store: Arc<dyn RansomStore>,
    /// Media server client, or a stand-in that reports `NotConfigured`.
    pub media: Arc<dyn MediaServer>,
    pub processor: Arc<EventProcessor>,
    pub monitor: Arc<WebhookMonitor>,
    /// Webhook events handed off for processing after the delivery is acknowledged.
    pub webhook_tasks: TaskTracker,
}

impl AppState {
    /// Wire the event processor to `store` and `media`.
    pub fn new(
        pool: watchgate_db::DbPool,
        config: ServerConfig,
        store: Arc<dyn RansomStore>,
        media: Arc<dyn MediaServer>,
    ) -> Self {
        let processor = EventProcessor::new(Arc::clone(&store), Arc::clone(&media), config.resolver);

        Self {
            pool,
            config: Arc::new(config),
            store,
            media,
            processor: Arc::new(processor),
            monitor: Arc::new(WebhookMonitor::new()),
            webhook_tasks: TaskTracker::new(),
        }
    }

    /// Whether a real media server connection is configured.
    pub fn media_server_configured(&self) -> bool {
        self.config.plex.is_some()
    }
}
