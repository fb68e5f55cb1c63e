//! Remote document-store seam and the create-or-update decision.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// A remote document as reported by the store: an opaque identifier plus the
/// display name it was matched on. Never cached across sync cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub id: String,
    pub name: String,
}

/// What a sync cycle did to the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No document carried the name; a new one was created with this id.
    Created(String),
    /// Exactly one document carried the name; its content was replaced.
    Updated(String),
}

impl SyncOutcome {
    /// The identifier of the document the cycle ended up pointing at.
    pub fn document_id(&self) -> &str {
        match self {
            SyncOutcome::Created(id) | SyncOutcome::Updated(id) => id,
        }
    }
}

/// Remote document-store abstraction.
///
/// The Google Drive client implements this; tests use an in-memory fake.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Identifiers of existing documents whose name equals `name` exactly.
    async fn find_document_ids(&self, name: &str) -> Result<Vec<String>, SyncError>;

    /// Create a new document with the given display name and body content.
    /// Returns the new document's identifier.
    async fn create_document(&self, name: &str, content: &[u8]) -> Result<String, SyncError>;

    /// Replace the content of an existing document in place, keeping the
    /// same display name and document type.
    async fn update_document(&self, id: &str, name: &str, content: &[u8])
        -> Result<(), SyncError>;
}

/// Create-or-update a remote document by logical name.
///
/// List-then-decide over the match count: zero matches create, one match
/// updates in place, two or more fail with [`SyncError::AmbiguousDocument`]
/// before any mutation is attempted. The sequence is not transactional
/// against concurrent writers; a duplicate created between the list and the
/// mutation surfaces as ambiguity on the next cycle.
pub async fn sync_document<S: DocumentStore + ?Sized>(
    store: &S,
    name: &str,
    content: &[u8],
) -> Result<SyncOutcome, SyncError> {
    let ids = store.find_document_ids(name).await?;

    match ids.as_slice() {
        [] => {
            let id = store.create_document(name, content).await?;
            Ok(SyncOutcome::Created(id))
        }
        [id] => {
            store.update_document(id, name, content).await?;
            Ok(SyncOutcome::Updated(id.clone()))
        }
        _ => Err(SyncError::AmbiguousDocument {
            name: name.to_string(),
            count: ids.len(),
        }),
    }
}
