//! Error taxonomy for the sync pipeline.

/// Failures raised anywhere in the convert → authorize → sync pipeline.
///
/// The watch loop catches all of these, logs them, and keeps watching;
/// none of them terminate the process.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("Conversion failed: {0}")]
    Convert(String),

    #[error("Remote store error: {0}")]
    Remote(String),

    /// More than one remote document carries the logical name being synced.
    /// Silently overwriting the wrong copy is worse than refusing, so no
    /// mutation is attempted; cleanup is manual.
    #[error("more than one version of document exists: {name} ({count} matches)")]
    AmbiguousDocument { name: String, count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
