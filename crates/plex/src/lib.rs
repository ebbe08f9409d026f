//! Media server client.
//!
//! Wraps the handful of media-server HTTP endpoints the enforcement engine
//! needs (live session directory, session termination, library directory)
//! behind the [`MediaServer`] trait so the engine can be driven by a fake
//! in tests.

pub mod api;
pub mod library;
pub mod server;
pub mod sessions;

pub use api::{PlexApi, PlexConfig, PlexError};
pub use library::LibrarySection;
pub use server::{MediaServer, Unconfigured};
pub use sessions::PlaybackSession;
