//! Live playback sessions as reported by `GET /status/sessions`.

use serde::{Deserialize, Deserializer, Serialize};

/// A session currently playing on the media server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackSession {
    /// Key identifying the playback item within the session table.
    pub session_key: String,
    /// Transcode/session object id, used by the stop-with-reason fallback.
    pub session_id: Option<String>,
    /// Account name of the viewer.
    pub subject: Option<String>,
    pub title: String,
    /// Machine identifiers of the players attached to this session.
    pub player_ids: Vec<String>,
}

impl PlaybackSession {
    /// Whether this session is `subject` watching `title`.
    pub fn is_watching(&self, subject: &str, title: &str) -> bool {
        self.subject.as_deref() == Some(subject) && self.title == title
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|p| p == player_id)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SessionsResponse {
    #[serde(rename = "MediaContainer")]
    container: SessionsContainer,
}

#[derive(Debug, Default, Deserialize)]
struct SessionsContainer {
    #[serde(default, rename = "Metadata")]
    metadata: Vec<SessionMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionMetadata {
    #[serde(deserialize_with = "string_or_number")]
    session_key: String,
    #[serde(default)]
    title: String,
    #[serde(default, rename = "User")]
    user: Option<NamedWire>,
    #[serde(default, rename = "Player")]
    player: Option<PlayerWire>,
    #[serde(default, rename = "Session")]
    session: Option<SessionWire>,
}

#[derive(Debug, Deserialize)]
struct NamedWire {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerWire {
    #[serde(default)]
    machine_identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionWire {
    #[serde(default)]
    id: Option<String>,
}

impl SessionsResponse {
    pub(crate) fn into_sessions(self) -> Vec<PlaybackSession> {
        self.container
            .metadata
            .into_iter()
            .map(|m| PlaybackSession {
                session_key: m.session_key,
                session_id: m.session.and_then(|s| s.id),
                subject: m.user.and_then(|u| u.title),
                title: m.title,
                player_ids: m
                    .player
                    .and_then(|p| p.machine_identifier)
                    .into_iter()
                    .collect(),
            })
            .collect()
    }
}

/// The server reports keys as strings, older builds as numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
