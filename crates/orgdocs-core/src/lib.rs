//! Core types for orgdocs.
//!
//! This crate defines what the binary crate builds on:
//! - `SyncError`: the error taxonomy shared across the pipeline
//! - `DocumentStore`: the remote document-store seam
//! - `sync_document`: the create-or-update decision over that seam
//! - `resolve_home`: `~` shorthand expansion for user-supplied paths

mod error;
mod paths;
mod store;

pub use error::SyncError;
pub use paths::{resolve_home, resolve_home_in};
pub use store::{sync_document, DocumentStore, RemoteDocument, SyncOutcome};
