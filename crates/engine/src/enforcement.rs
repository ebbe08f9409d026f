//! Session termination.
//!
//! Termination is attempted with an ordered list of strategies; the first
//! that succeeds wins. Failure of every strategy is logged and reported to
//! the caller as [`Termination::Failed`], never raised.

use std::fmt;
use std::sync::Arc;

use watchgate_plex::MediaServer;

use crate::error::EnforcementError;

/// One way of ending a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStrategy {
    /// Terminate request addressed directly by session key.
    DirectByKey,
    /// Re-fetch the live table and stop the matching session object by its id.
    StopSessionObject,
}

impl fmt::Display for TerminationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationStrategy::DirectByKey => f.write_str("direct"),
            TerminationStrategy::StopSessionObject => f.write_str("session-object"),
        }
    }
}

/// Strategies in the order they are tried.
pub const DEFAULT_STRATEGIES: [TerminationStrategy; 2] = [
    TerminationStrategy::DirectByKey,
    TerminationStrategy::StopSessionObject,
];

/// Result of a termination attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Terminated(TerminationStrategy),
    Failed,
}

impl Termination {
    pub fn succeeded(self) -> bool {
        matches!(self, Termination::Terminated(_))
    }
}

/// Ends sessions and shows the viewer a message.
pub struct Enforcer {
    server: Arc<dyn MediaServer>,
    strategies: Vec<TerminationStrategy>,
}

impl Enforcer {
    pub fn new(server: Arc<dyn MediaServer>) -> Self {
        Self::with_strategies(server, DEFAULT_STRATEGIES.to_vec())
    }

    pub fn with_strategies(server: Arc<dyn MediaServer>, strategies: Vec<TerminationStrategy>) -> Self {
        Self { server, strategies }
    }

    /// Terminate `session_key`, displaying `message`.
    pub async fn terminate(&self, session_key: &str, message: &str) -> Termination {
        for &strategy in &self.strategies {
            match self.attempt(strategy, session_key, message).await {
                Ok(()) => {
                    tracing::info!(session_key, %strategy, "Session terminated");
                    return Termination::Terminated(strategy);
                }
                Err(e) => {
                    tracing::warn!(session_key, %strategy, error = %e, "Termination attempt failed");
                }
            }
        }

        tracing::error!(session_key, "All termination strategies failed");
        Termination::Failed
    }

    async fn attempt(
        &self,
        strategy: TerminationStrategy,
        session_key: &str,
        message: &str,
    ) -> Result<(), EnforcementError> {
        match strategy {
            TerminationStrategy::DirectByKey => {
                self.server.terminate_session(session_key, message).await?;
            }
            TerminationStrategy::StopSessionObject => {
                let sessions = self.server.sessions().await?;
                let session = sessions
                    .iter()
                    .find(|s| s.session_key == session_key)
                    .ok_or_else(|| EnforcementError::SessionGone(session_key.to_string()))?;
                let session_id = session
                    .session_id
                    .as_deref()
                    .ok_or_else(|| EnforcementError::MissingSessionId(session_key.to_string()))?;
                self.server.terminate_session(session_id, message).await?;
            }
        }
        Ok(())
    }
}
