//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod payment_repo;
pub mod ransom_repo;

pub use payment_repo::PaymentRepo;
pub use ransom_repo::RansomRepo;
