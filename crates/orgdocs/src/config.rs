use std::path::PathBuf;

use clap::Parser;

/// Configuration for the orgdocs watcher.
#[derive(Parser, Debug, Clone)]
#[command(name = "orgdocs")]
#[command(about = "Watch an org file, export it to ODT via Emacs, and sync it to a Google Drive document")]
pub struct Config {
    /// Title of the Google Drive document to create or replace
    pub doc_name: String,

    /// Path to the org file to watch (a leading `~` is expanded)
    pub org_file: String,

    /// Path to the OAuth client credentials file (installed-app JSON)
    #[arg(long, default_value = "credentials.json", env = "ORGDOCS_CREDENTIALS")]
    pub credentials: PathBuf,

    /// Path to the cached OAuth token file
    #[arg(long, default_value = "token.json", env = "ORGDOCS_TOKEN")]
    pub token: PathBuf,

    /// Quiet window for collapsing bursts of file events (milliseconds)
    #[arg(long, default_value = "500", env = "ORGDOCS_DEBOUNCE_MS")]
    pub debounce_ms: u64,

    /// Emacs program used for the batch ODT export
    #[arg(long, default_value = "emacs", env = "ORGDOCS_EMACS")]
    pub emacs: String,
}
