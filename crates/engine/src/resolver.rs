//! Session resolution.
//!
//! Playback notifications can arrive before the media server lists the new
//! session, so resolution waits a settle delay before the first fetch. An
//! optional polling window re-fetches until a match appears or the window
//! closes; with a zero window the lookup is single-shot.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use watchgate_plex::{MediaServer, PlaybackSession};

use crate::error::ResolveError;

/// Default wait before the first fetch.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Default interval between fetches inside the polling window.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Timing of a resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Wait before the first fetch.
    pub settle_delay: Duration,
    /// How long to keep polling after the first fetch misses.
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_wait: Duration::ZERO,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ResolverConfig {
    /// No waiting at all. Used by tests.
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            max_wait: Duration::ZERO,
            poll_interval: Duration::ZERO,
        }
    }
}

/// Identifiers available for matching a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionLookup<'a> {
    pub player_id: Option<&'a str>,
    pub subject: Option<&'a str>,
    pub title: Option<&'a str>,
}

impl SessionLookup<'_> {
    /// Pick the session these identifiers refer to.
    ///
    /// A `(subject, title)` match anywhere in the table wins over a player
    /// match, since player identifiers are optional and unstable.
    pub fn find<'s>(&self, sessions: &'s [PlaybackSession]) -> Option<&'s PlaybackSession> {
        if let (Some(subject), Some(title)) = (self.subject, self.title) {
            if let Some(session) = sessions.iter().find(|s| s.is_watching(subject, title)) {
                return Some(session);
            }
        }

        let player_id = self.player_id?;
        sessions.iter().find(|s| s.has_player(player_id))
    }
}

/// Finds the live session behind a playback event.
pub struct SessionResolver {
    server: Arc<dyn MediaServer>,
    config: ResolverConfig,
}

impl SessionResolver {
    pub fn new(server: Arc<dyn MediaServer>, config: ResolverConfig) -> Self {
        Self { server, config }
    }

    /// Resolve `lookup` to a session key.
    ///
    /// Transport errors end the attempt immediately.
    pub async fn resolve(&self, lookup: SessionLookup<'_>) -> Result<String, ResolveError> {
        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        let deadline = Instant::now() + self.config.max_wait;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let sessions = self.server.sessions().await?;
            tracing::debug!(attempt, live = sessions.len(), "Fetched live sessions");

            if let Some(session) = lookup.find(&sessions) {
                tracing::debug!(session_key = %session.session_key, "Session matched");
                return Ok(session.session_key.clone());
            }

            if Instant::now() + self.config.poll_interval >= deadline {
                tracing::debug!(
                    attempt,
                    subject = ?lookup.subject,
                    title = ?lookup.title,
                    player_id = ?lookup.player_id,
                    "No session matched",
                );
                return Err(ResolveError::NotFound);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
