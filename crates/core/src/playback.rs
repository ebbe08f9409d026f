//! Canonical playback events.
//!
//! The media server posts one JSON document per playback notification. Only a
//! handful of fields matter for enforcement; everything else is ignored and
//! every field that matters has a default, so a structurally valid but sparse
//! payload still decodes.

use serde::Deserialize;

use crate::error::CoreError;
use crate::ransom::MAX_PERCENT;

/// Subject / title placeholder used when the payload omits them.
pub const UNKNOWN: &str = "Unknown";

/// Event name used when the payload omits `event`.
pub const UNKNOWN_EVENT: &str = "unknown";

// ---------------------------------------------------------------------------
// Event kind
// ---------------------------------------------------------------------------

/// The kind of playback notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Playback began (`media.play`, `playback.started`).
    PlayStarted,
    /// `media.stop`
    Stop,
    /// `media.pause`
    Pause,
    /// `media.resume`
    Resume,
    /// `media.scrobble`
    Scrobble,
    /// Anything else, kept verbatim for logging.
    Other(String),
}

impl EventKind {
    /// Map a wire event name to its kind.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "media.play" | "playback.started" => EventKind::PlayStarted,
            "media.stop" => EventKind::Stop,
            "media.pause" => EventKind::Pause,
            "media.resume" => EventKind::Resume,
            "media.scrobble" => EventKind::Scrobble,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn is_play_started(&self) -> bool {
        matches!(self, EventKind::PlayStarted)
    }

    /// Stop and pause carry a reliable view offset for the title.
    pub fn is_progress_checkpoint(&self) -> bool {
        matches!(self, EventKind::Stop | EventKind::Pause)
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::PlayStarted => "media.play",
            EventKind::Stop => "media.stop",
            EventKind::Pause => "media.pause",
            EventKind::Resume => "media.resume",
            EventKind::Scrobble => "media.scrobble",
            EventKind::Other(name) => name,
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical event
// ---------------------------------------------------------------------------

/// One decoded playback notification.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackEvent {
    pub kind: EventKind,
    /// Account name of the viewer.
    pub subject: String,
    pub title: String,
    /// Collection the title belongs to, as reported by the server.
    pub library: Option<String>,
    /// Machine identifier of the player, if reported.
    pub player_id: Option<String>,
    /// Playback position in milliseconds.
    pub view_offset: f64,
    /// Title length in milliseconds.
    pub duration: f64,
}

impl PlaybackEvent {
    /// Percentage of the title watched at this event.
    pub fn progress(&self) -> f64 {
        derive_progress(self.view_offset, self.duration)
    }

    /// Decode a raw JSON body.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let payload: WebhookPayload = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::Validation(format!("malformed webhook payload: {e}")))?;
        Ok(payload.into())
    }

    /// Decode the JSON string carried in a multipart `payload` field.
    pub fn from_json_str(text: &str) -> Result<Self, CoreError> {
        Self::from_json_slice(text.as_bytes())
    }
}

/// `round(view_offset / duration * 100, 1)`, clamped to `[0, 100]`.
///
/// Returns `0.0` when the duration is zero, negative or not a number.
pub fn derive_progress(view_offset: f64, duration: f64) -> f64 {
    if duration.is_nan() || duration <= 0.0 || !view_offset.is_finite() {
        return 0.0;
    }
    let percent = (view_offset / duration) * 100.0;
    // Formatting rounds the exact binary value half-to-even.
    let rounded: f64 = format!("{percent:.1}").parse().unwrap_or(percent);
    rounded.clamp(0.0, MAX_PERCENT)
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    event: Option<String>,
    #[serde(default, rename = "Account")]
    account: Option<AccountPayload>,
    #[serde(default, rename = "Metadata")]
    metadata: Option<MetadataPayload>,
    #[serde(default, rename = "Player")]
    player: Option<PlayerPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct AccountPayload {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataPayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    library_section_title: Option<String>,
    #[serde(default)]
    view_offset: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct PlayerPayload {
    #[serde(default)]
    uuid: Option<String>,
}

impl From<WebhookPayload> for PlaybackEvent {
    fn from(payload: WebhookPayload) -> Self {
        let metadata = payload.metadata.unwrap_or_default();
        let event = payload.event.unwrap_or_else(|| UNKNOWN_EVENT.to_string());

        PlaybackEvent {
            kind: EventKind::from_wire(&event),
            subject: payload
                .account
                .and_then(|a| a.title)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            title: metadata.title.unwrap_or_else(|| UNKNOWN.to_string()),
            library: metadata.library_section_title,
            player_id: payload.player.and_then(|p| p.uuid),
            view_offset: metadata.view_offset.unwrap_or(0.0),
            duration: metadata.duration.unwrap_or(1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_quarter() {
        assert_eq!(derive_progress(30.0, 120.0), 25.0);
    }

    #[test]
    fn progress_zero_duration() {
        assert_eq!(derive_progress(30.0, 0.0), 0.0);
        assert_eq!(derive_progress(30.0, -1.0), 0.0);
    }

    #[test]
    fn progress_rounds_to_one_decimal() {
        assert_eq!(derive_progress(1.0, 3.0), 33.3);
        assert_eq!(derive_progress(2.0, 3.0), 66.7);
    }

    #[test]
    fn progress_ties_round_to_even() {
        assert_eq!(derive_progress(1.0, 16.0), 6.2);
        assert_eq!(derive_progress(3.0, 16.0), 18.8);
        assert_eq!(derive_progress(63.0, 1008.0), 6.2);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(derive_progress(150.0, 100.0), 100.0);
        assert_eq!(derive_progress(-10.0, 100.0), 0.0);
    }

    #[test]
    fn decodes_full_payload() {
        let body = br#"{
            "event": "media.pause",
            "Account": { "title": "bob" },
            "Metadata": {
                "title": "Inception",
                "librarySectionTitle": "Movies",
                "viewOffset": 30,
                "duration": 100
            },
            "Player": { "uuid": "abc-123", "local": true }
        }"#;

        let event = PlaybackEvent::from_json_slice(body).unwrap();
        assert_eq!(event.kind, EventKind::Pause);
        assert_eq!(event.subject, "bob");
        assert_eq!(event.title, "Inception");
        assert_eq!(event.library.as_deref(), Some("Movies"));
        assert_eq!(event.player_id.as_deref(), Some("abc-123"));
        assert_eq!(event.progress(), 30.0);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let event = PlaybackEvent::from_json_slice(b"{}").unwrap();
        assert_eq!(event.kind, EventKind::Other(UNKNOWN_EVENT.to_string()));
        assert_eq!(event.subject, UNKNOWN);
        assert_eq!(event.title, UNKNOWN);
        assert_eq!(event.library, None);
        assert_eq!(event.player_id, None);
        assert_eq!(event.view_offset, 0.0);
        assert_eq!(event.duration, 1.0);
    }

    #[test]
    fn null_library_is_absent() {
        let body = br#"{"event":"media.play","Metadata":{"librarySectionTitle":null}}"#;
        let event = PlaybackEvent::from_json_slice(body).unwrap();
        assert_eq!(event.library, None);
        assert!(event.kind.is_play_started());
    }

    #[test]
    fn rejects_non_json() {
        assert!(PlaybackEvent::from_json_str("not json").is_err());
    }

    #[test]
    fn wire_names_map_to_kinds() {
        assert_eq!(EventKind::from_wire("playback.started"), EventKind::PlayStarted);
        assert_eq!(EventKind::from_wire("media.play"), EventKind::PlayStarted);
        assert!(EventKind::from_wire("media.stop").is_progress_checkpoint());
        assert!(EventKind::from_wire("media.pause").is_progress_checkpoint());
        assert!(!EventKind::from_wire("media.resume").is_progress_checkpoint());
        assert!(!EventKind::from_wire("media.scrobble").is_play_started());
        assert_eq!(EventKind::from_wire("media.rate").as_str(), "media.rate");
    }
}
