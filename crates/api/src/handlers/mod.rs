//! Request handlers.
//!
//! Handlers delegate to the ransom store, the payment repository or the
//! media server client and map errors via [`AppError`](crate::error::AppError).

pub mod media;
pub mod payments;
pub mod ransoms;
pub mod webhook;
