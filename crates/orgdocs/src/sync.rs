//! One convert → authorize → sync cycle.

use orgdocs_core::{resolve_home, sync_document, SyncOutcome};
use tracing::{info, instrument};

use crate::auth::Authenticator;
use crate::config::Config;
use crate::convert::OdtExporter;
use crate::gdrive::GDriveClient;

/// Run a full sync cycle for the configured file and document name.
///
/// Credentials are re-read from disk on every cycle; the Drive client lives
/// only for this one cycle.
#[instrument(skip(config), fields(doc_name = %config.doc_name), level = "debug")]
pub async fn run_cycle(config: &Config) -> anyhow::Result<SyncOutcome> {
    info!("updating {} from {}", config.doc_name, config.org_file);

    let org_path = resolve_home(&config.org_file);
    let exporter = OdtExporter::new(&config.emacs);
    let odt_path = exporter.export(&org_path).await?;

    let auth = Authenticator::new(config.credentials.clone(), config.token.clone());
    let token = auth.access_token().await?;

    let content = tokio::fs::read(&odt_path).await?;
    let client = GDriveClient::new(token);
    let outcome = sync_document(&client, &config.doc_name, &content).await?;

    match &outcome {
        SyncOutcome::Created(id) => info!("created document {:?} (id {})", config.doc_name, id),
        SyncOutcome::Updated(id) => info!("updated document {:?} (id {})", config.doc_name, id),
    }

    Ok(outcome)
}
