use watchgate_plex::PlexError;

/// Persistence failure. Fatal to the event being processed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The subject already has an active ransom.
    #[error("Subject '{subject}' already has an active ransom")]
    ActiveRansomExists { subject: String },

    /// The backing store cannot be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Session resolution failure. Never fatal.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The media server could not be reached or answered with an error.
    #[error("Session lookup failed: {0}")]
    Transport(#[from] PlexError),

    /// No live session matched.
    #[error("No matching session")]
    NotFound,
}

/// Failure of a single termination strategy.
#[derive(Debug, thiserror::Error)]
pub enum EnforcementError {
    #[error("Termination request failed: {0}")]
    Transport(#[from] PlexError),

    /// The session disappeared from the live table before it could be stopped.
    #[error("Session {0} is no longer live")]
    SessionGone(String),

    /// The live session carries no session object id to stop.
    #[error("Session {0} has no session id")]
    MissingSessionId(String),
}
