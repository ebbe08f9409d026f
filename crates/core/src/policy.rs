//! The enforcement decision for a single playback event.
//!
//! Given an event from a subject with an active ransom, decide whether the
//! event is an attempt to watch the locked collection, a progress checkpoint
//! on the prerequisite, or neither. The caller performs the side effects.

use crate::playback::PlaybackEvent;
use crate::ransom::Gate;

/// What the engine should do with one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Not gated; leave the viewer alone.
    Ignore,
    /// Playback started on a title from the locked collection.
    Violation,
    /// Playback started on a non-prerequisite title whose collection the
    /// server did not report. Look it up, then call [`is_locked_collection`].
    ResolveCollection,
    /// Stop / pause on the prerequisite.
    Progress { progress: f64, threshold_met: bool },
}

/// Classify `event` against the terms of an active ransom.
pub fn evaluate(event: &PlaybackEvent, gate: &Gate<'_>) -> Decision {
    let on_prerequisite = event.title == gate.prerequisite;

    if event.kind.is_play_started() && !on_prerequisite {
        return match event.library.as_deref() {
            Some(library) if is_locked_collection(library, gate) => Decision::Violation,
            Some(_) => Decision::Ignore,
            None => Decision::ResolveCollection,
        };
    }

    if event.kind.is_progress_checkpoint() && on_prerequisite {
        let progress = event.progress();
        return Decision::Progress {
            progress,
            threshold_met: gate.is_satisfied_by(progress),
        };
    }

    Decision::Ignore
}

/// Whether `library` is the collection withheld by `gate`.
pub fn is_locked_collection(library: &str, gate: &Gate<'_>) -> bool {
    library == gate.locked_collection
}
