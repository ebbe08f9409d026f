//! The media server seam used by the enforcement engine.

use async_trait::async_trait;

use crate::api::{PlexApi, PlexError};
use crate::library::LibrarySection;
use crate::sessions::PlaybackSession;

/// Read access to the live session table and library directory, plus the
/// single write the engine performs: terminating a session.
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// Sessions currently playing.
    async fn sessions(&self) -> Result<Vec<PlaybackSession>, PlexError>;

    /// Terminate the session addressed by `session_id`, showing `reason`.
    async fn terminate_session(&self, session_id: &str, reason: &str) -> Result<(), PlexError>;

    /// Library sections on the server.
    async fn library_sections(&self) -> Result<Vec<LibrarySection>, PlexError>;

    /// Name of the section holding `title`, if any.
    async fn library_for_title(&self, title: &str) -> Result<Option<String>, PlexError>;
}

#[async_trait]
impl MediaServer for PlexApi {
    async fn sessions(&self) -> Result<Vec<PlaybackSession>, PlexError> {
        PlexApi::sessions(self).await
    }

    async fn terminate_session(&self, session_id: &str, reason: &str) -> Result<(), PlexError> {
        PlexApi::terminate_session(self, session_id, reason).await
    }

    async fn library_sections(&self) -> Result<Vec<LibrarySection>, PlexError> {
        PlexApi::library_sections(self).await
    }

    async fn library_for_title(&self, title: &str) -> Result<Option<String>, PlexError> {
        PlexApi::library_for_title(self, title).await
    }
}

/// Stand-in used when no server URL / token is configured.
///
/// Every call fails with [`PlexError::NotConfigured`], which the engine
/// treats like any other transport failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unconfigured;

#[async_trait]
impl MediaServer for Unconfigured {
    async fn sessions(&self) -> Result<Vec<PlaybackSession>, PlexError> {
        Err(PlexError::NotConfigured)
    }

    async fn terminate_session(&self, _session_id: &str, _reason: &str) -> Result<(), PlexError> {
        Err(PlexError::NotConfigured)
    }

    async fn library_sections(&self) -> Result<Vec<LibrarySection>, PlexError> {
        Err(PlexError::NotConfigured)
    }

    async fn library_for_title(&self, _title: &str) -> Result<Option<String>, PlexError> {
        Err(PlexError::NotConfigured)
    }
}
