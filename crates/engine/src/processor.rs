//! The enforcement pipeline for one playback event.
//!
//! Under the subject's lock:
//!
//! 1. Reload the active ransoms; a subject without one is left alone.
//! 2. Classify the event against the ransom's gate.
//! 3. Violation: resolve the session and terminate it with the lock message.
//! 4. Progress checkpoint: persist progress; at the threshold, unlock the
//!    ransom and terminate the session with the unlock message.
//!
//! Resolution and enforcement failures are logged and never abort the
//! event. Only storage failures surface as errors.

use std::sync::Arc;

use watchgate_core::message::{render_lock_message, render_unlock_message};
use watchgate_core::playback::PlaybackEvent;
use watchgate_core::policy::{evaluate, is_locked_collection, Decision};
use watchgate_db::models::ransom::Ransom;
use watchgate_plex::MediaServer;

use crate::enforcement::{Enforcer, Termination};
use crate::error::{ResolveError, StoreError};
use crate::locks::SubjectLocks;
use crate::resolver::{ResolverConfig, SessionLookup, SessionResolver};
use crate::store::RansomStore;

/// What happened when a session had to be interrupted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intervention {
    /// The session was found and a termination was attempted.
    Sent {
        session_key: String,
        termination: Termination,
    },
    /// No live session could be resolved; nothing was sent.
    Unresolved,
}

/// Result of processing one event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// The subject has no active ransom.
    NotGated,
    /// The subject is gated but the event needs no action.
    Ignored,
    /// Playback from the locked collection was interrupted.
    Blocked(Intervention),
    /// Progress on the prerequisite was stored; still below threshold.
    ProgressRecorded { progress: f64 },
    /// The threshold was reached and the ransom unlocked.
    Unlocked { progress: f64, notice: Intervention },
}

/// Applies the gate policy to playback events.
pub struct EventProcessor {
    store: Arc<dyn RansomStore>,
    server: Arc<dyn MediaServer>,
    resolver: SessionResolver,
    enforcer: Enforcer,
    locks: SubjectLocks,
}

impl EventProcessor {
    pub fn new(
        store: Arc<dyn RansomStore>,
        server: Arc<dyn MediaServer>,
        resolver_config: ResolverConfig,
    ) -> Self {
        Self {
            resolver: SessionResolver::new(Arc::clone(&server), resolver_config),
            enforcer: Enforcer::new(Arc::clone(&server)),
            store,
            server,
            locks: SubjectLocks::new(),
        }
    }

    /// Process one event to completion.
    pub async fn process(&self, event: &PlaybackEvent) -> Result<ProcessOutcome, StoreError> {
        let _guard = self.locks.lock(&event.subject).await;

        let Some(ransom) = self.active_ransom_for(&event.subject).await? else {
            tracing::debug!(subject = %event.subject, event = event.kind.as_str(), "Subject not gated");
            return Ok(ProcessOutcome::NotGated);
        };

        tracing::info!(
            subject = %event.subject,
            event = event.kind.as_str(),
            title = %event.title,
            library = ?event.library,
            locked = %ransom.locked_collection,
            progress = event.progress(),
            "Gated playback event",
        );

        match evaluate(event, &ransom.gate()) {
            Decision::Ignore => Ok(ProcessOutcome::Ignored),
            Decision::Violation => Ok(self.block(event, &ransom).await),
            Decision::ResolveCollection => {
                if self.title_in_locked_collection(event, &ransom).await {
                    Ok(self.block(event, &ransom).await)
                } else {
                    Ok(ProcessOutcome::Ignored)
                }
            }
            Decision::Progress {
                progress,
                threshold_met,
            } => self.record_progress(event, &ransom, progress, threshold_met).await,
        }
    }

    /// Step 1: reload the active set and pick the subject's ransom.
    async fn active_ransom_for(&self, subject: &str) -> Result<Option<Ransom>, StoreError> {
        let active = self.store.list_active().await?;
        Ok(active.into_iter().find(|r| r.subject == subject))
    }

    /// Ask the library directory which collection holds the title.
    async fn title_in_locked_collection(&self, event: &PlaybackEvent, ransom: &Ransom) -> bool {
        match self.server.library_for_title(&event.title).await {
            Ok(Some(library)) => is_locked_collection(&library, &ransom.gate()),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(title = %event.title, error = %e, "Library lookup failed");
                false
            }
        }
    }

    /// Step 3: interrupt playback from the locked collection.
    async fn block(&self, event: &PlaybackEvent, ransom: &Ransom) -> ProcessOutcome {
        tracing::info!(
            subject = %event.subject,
            title = %event.title,
            "Playback from locked collection",
        );
        let message = render_lock_message(ransom.lock_message.as_deref(), &ransom.gate());
        ProcessOutcome::Blocked(self.intervene(event, &message).await)
    }

    /// Step 4: persist progress and unlock at the threshold.
    async fn record_progress(
        &self,
        event: &PlaybackEvent,
        ransom: &Ransom,
        progress: f64,
        threshold_met: bool,
    ) -> Result<ProcessOutcome, StoreError> {
        self.store.set_progress(&event.subject, progress).await?;

        if !threshold_met {
            tracing::info!(
                subject = %event.subject,
                progress,
                threshold = ransom.threshold,
                remaining = ransom.threshold - progress,
                "Progress recorded",
            );
            return Ok(ProcessOutcome::ProgressRecorded { progress });
        }

        let Some(unlocked) = self.store.mark_unlocked(&event.subject).await? else {
            // Deleted between reload and unlock.
            tracing::warn!(subject = %event.subject, "Ransom vanished before unlock");
            return Ok(ProcessOutcome::ProgressRecorded { progress });
        };

        tracing::info!(
            subject = %event.subject,
            ransom_id = unlocked.id,
            progress,
            threshold = ransom.threshold,
            library = %ransom.locked_collection,
            "Threshold met, ransom unlocked",
        );

        let message = render_unlock_message(ransom.unlock_message.as_deref(), &ransom.gate(), progress);
        let notice = self.intervene(event, &message).await;
        Ok(ProcessOutcome::Unlocked { progress, notice })
    }

    /// Resolve the event's session and terminate it with `message`.
    async fn intervene(&self, event: &PlaybackEvent, message: &str) -> Intervention {
        let lookup = SessionLookup {
            player_id: event.player_id.as_deref(),
            subject: Some(&event.subject),
            title: Some(&event.title),
        };

        match self.resolver.resolve(lookup).await {
            Ok(session_key) => {
                let termination = self.enforcer.terminate(&session_key, message).await;
                Intervention::Sent {
                    session_key,
                    termination,
                }
            }
            Err(ResolveError::NotFound) => {
                tracing::warn!(
                    subject = %event.subject,
                    player_id = ?event.player_id,
                    "Could not find session for player",
                );
                Intervention::Unresolved
            }
            Err(e @ ResolveError::Transport(_)) => {
                tracing::warn!(subject = %event.subject, error = %e, "Session lookup failed");
                Intervention::Unresolved
            }
        }
    }
}
