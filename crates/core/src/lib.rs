//! Watchgate domain logic.
//!
//! Pure, I/O-free building blocks shared by the persistence layer, the
//! enforcement engine and the HTTP server:
//!
//! - [`ransom`] -- ransom lifecycle state and threshold rules.
//! - [`playback`] -- canonical playback events decoded from webhook payloads.
//! - [`policy`] -- the violation / progress decision for one event.
//! - [`message`] -- lock and unlock message rendering.

pub mod error;
pub mod message;
pub mod playback;
pub mod policy;
pub mod ransom;
pub mod types;
