// Shared modules (used by the binary and by the integration tests)
pub mod auth;
pub mod config;
pub mod convert;
pub mod gdrive;
pub mod sync;
pub mod watch;
