//! Org → ODT conversion via Emacs in batch mode.
//!
//! The export is delegated entirely to `org-odt-export-to-odt`; this module
//! only runs the process and derives where Emacs left the output.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Runs the external batch export and reports the produced file.
#[derive(Debug, Clone)]
pub struct OdtExporter {
    program: String,
}

impl OdtExporter {
    /// `program` is the Emacs binary to invoke (usually just `emacs`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Export `org_path` to ODT and return the path of the produced file.
    ///
    /// The output lands next to the source: same directory, same base name,
    /// `.odt` extension. A nonzero exit fails the export; stderr chatter on
    /// a successful exit is logged as a warning only.
    #[instrument(skip(self), level = "debug")]
    pub async fn export(&self, org_path: &Path) -> anyhow::Result<PathBuf> {
        let abs_path = tokio::fs::canonicalize(org_path)
            .await
            .with_context(|| format!("Failed to resolve org file {}", org_path.display()))?;

        debug!("Running {} batch export for {}", self.program, abs_path.display());

        let output = Command::new(&self.program)
            .arg(&abs_path)
            .args(["--batch", "-f", "org-odt-export-to-odt", "--kill"])
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.program))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {} while exporting {}: {}",
                self.program,
                output.status,
                abs_path.display(),
                stderr.trim()
            );
        }

        if !stderr.trim().is_empty() {
            warn!("{} wrote to stderr during export: {}", self.program, stderr.trim());
        }

        Ok(derive_output_path(&abs_path))
    }
}

/// Sibling path with the `.odt` extension: `dir(src) + stem(src) + ".odt"`.
fn derive_output_path(org_path: &Path) -> PathBuf {
    org_path.with_extension("odt")
}
