#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use watchgate_core::playback::{EventKind, PlaybackEvent};
use watchgate_db::models::ransom::CreateRansom;
use watchgate_engine::{EventProcessor, MemoryRansomStore, RansomStore, ResolverConfig};
use watchgate_plex::{LibrarySection, MediaServer, PlaybackSession, PlexError};

/// A scripted media server that records every call.
#[derive(Default)]
pub struct FakeServer {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    sessions: Vec<PlaybackSession>,
    libraries: HashMap<String, String>,
    /// Session ids the terminate endpoint rejects.
    rejected_ids: Vec<String>,
    offline: bool,
    session_fetches: usize,
    terminations: Vec<(String, String)>,
    /// How long each session fetch takes, if at all.
    fetch_delay: Option<Duration>,
    fetches_in_flight: usize,
    max_fetches_in_flight: usize,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_session(&self, key: &str, subject: &str, title: &str, player: &str) {
        self.state.lock().unwrap().sessions.push(PlaybackSession {
            session_key: key.to_string(),
            session_id: Some(format!("sid-{key}")),
            subject: Some(subject.to_string()),
            title: title.to_string(),
            player_ids: vec![player.to_string()],
        });
    }

    pub fn add_title(&self, title: &str, library: &str) {
        self.state
            .lock()
            .unwrap()
            .libraries
            .insert(title.to_string(), library.to_string());
    }

    /// Make the terminate endpoint answer non-200 for this id.
    pub fn reject_termination(&self, id: &str) {
        self.state.lock().unwrap().rejected_ids.push(id.to_string());
    }

    /// Make every call fail with a transport-level error.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Make every session fetch take `delay`.
    pub fn set_fetch_delay(&self, delay: Duration) {
        self.state.lock().unwrap().fetch_delay = Some(delay);
    }

    /// Most session fetches ever running at the same time.
    pub fn max_fetches_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_fetches_in_flight
    }

    pub fn session_fetches(&self) -> usize {
        self.state.lock().unwrap().session_fetches
    }

    /// Successful terminate calls as `(session id, reason)`.
    pub fn terminations(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().terminations.clone()
    }
}

fn offline_error() -> PlexError {
    PlexError::ApiError {
        status: 503,
        body: "offline".to_string(),
    }
}

#[async_trait]
impl MediaServer for FakeServer {
    async fn sessions(&self) -> Result<Vec<PlaybackSession>, PlexError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.fetches_in_flight += 1;
            state.max_fetches_in_flight = state.max_fetches_in_flight.max(state.fetches_in_flight);
            state.fetch_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.fetches_in_flight -= 1;
        if state.offline {
            return Err(offline_error());
        }
        state.session_fetches += 1;
        Ok(state.sessions.clone())
    }

    async fn terminate_session(&self, session_id: &str, reason: &str) -> Result<(), PlexError> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(offline_error());
        }
        if state.rejected_ids.iter().any(|id| id == session_id) {
            return Err(PlexError::ApiError {
                status: 400,
                body: "bad session".to_string(),
            });
        }
        state
            .terminations
            .push((session_id.to_string(), reason.to_string()));
        Ok(())
    }

    async fn library_sections(&self) -> Result<Vec<LibrarySection>, PlexError> {
        Ok(Vec::new())
    }

    async fn library_for_title(&self, title: &str) -> Result<Option<String>, PlexError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(offline_error());
        }
        Ok(state.libraries.get(title).cloned())
    }
}

pub fn ransom(subject: &str, prerequisite: &str, locked: &str, threshold: f64) -> CreateRansom {
    CreateRansom {
        subject: subject.to_string(),
        prerequisite: prerequisite.to_string(),
        locked_collection: locked.to_string(),
        threshold: Some(threshold),
        issued_by: None,
        lock_message: None,
        unlock_message: None,
    }
}

pub fn event(kind: EventKind, subject: &str, title: &str, library: Option<&str>) -> PlaybackEvent {
    PlaybackEvent {
        kind,
        subject: subject.to_string(),
        title: title.to_string(),
        library: library.map(str::to_string),
        player_id: Some("player-1".to_string()),
        view_offset: 0.0,
        duration: 100.0,
    }
}

pub fn checkpoint(kind: EventKind, subject: &str, title: &str, view_offset: f64, duration: f64) -> PlaybackEvent {
    PlaybackEvent {
        view_offset,
        duration,
        ..event(kind, subject, title, Some("Movies"))
    }
}

/// Processor wired to an in-memory store and the given fake server.
pub fn processor(store: &Arc<MemoryRansomStore>, server: &Arc<FakeServer>) -> EventProcessor {
    EventProcessor::new(
        Arc::clone(store) as Arc<dyn RansomStore>,
        Arc::clone(server) as Arc<dyn MediaServer>,
        ResolverConfig::immediate(),
    )
}
