//! tms core: transport-agnostic domain model, roles, and error types.
//!
//! This crate defines the entities, payload contracts and error surface shared
//! by the server and any client tooling. It intentionally carries no transport,
//! storage or runtime dependencies.
//!
//! # Guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `TmsError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;

/// Shared result type.
pub use error::{ClientCode, Result, TmsError};
pub use model::Role;
