use crate::documents::{default_title, visible_documents, Document, SortKey};
use crate::storage::{KeyValueStore, StorageError, ACTIVE_ID_KEY, DOCUMENTS_KEY};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Owns the document list, the selection and the search filter.
///
/// Every operation that changes `documents` or the active id writes that slice
/// back to storage before returning. Writes are best effort: a failure is
/// logged and kept in [`DocumentStore::last_persist_error`], and the
/// in-memory change stands.
pub struct DocumentStore<S: KeyValueStore> {
    storage: S,
    documents: Vec<Document>,
    active_id: Option<String>,
    search: String,
    last_persist_error: Option<PersistError>,
}

#[derive(Debug, Clone)]
struct PersistError {
    key: &'static str,
    message: String,
}

impl<S: KeyValueStore> DocumentStore<S> {
    /// Hydrates from storage. Missing or unreadable entries start empty.
    pub fn load(storage: S) -> Self {
        let documents = load_documents(&storage);
        let active_id = load_active_id(&storage);
        tracing::info!(
            documents = documents.len(),
            active = active_id.is_some(),
            "document store hydrated"
        );
        Self {
            storage,
            documents,
            active_id,
            search: String::new(),
            last_persist_error: None,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn active_document(&self) -> Option<&Document> {
        let id = self.active_id.as_deref()?;
        self.get(id)
    }

    pub fn visible_documents(&self, sort: SortKey) -> Vec<&Document> {
        visible_documents(&self.documents, &self.search, sort)
    }

    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error
            .as_ref()
            .map(|err| err.message.as_str())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn create(&mut self) -> &Document {
        self.create_at(Utc::now())
    }

    pub fn create_at(&mut self, now: DateTime<Utc>) -> &Document {
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            title: default_title(self.documents.len() + 1),
            content: String::new(),
            created_at: now,
        };
        tracing::debug!(id = %doc.id, title = %doc.title, "create document");
        self.active_id = Some(doc.id.clone());
        self.documents.push(doc);
        self.persist_documents();
        self.persist_active_id();
        let ix = self.documents.len() - 1;
        &self.documents[ix]
    }

    /// Returns whether a document was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|doc| doc.id != id);
        let removed = self.documents.len() != before;
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
        tracing::debug!(%id, removed, "delete document");
        self.persist_documents();
        self.persist_active_id();
        removed
    }

    /// Selects `id` without checking that it exists.
    pub fn select(&mut self, id: &str) {
        tracing::debug!(%id, "select document");
        self.active_id = Some(id.to_string());
        self.persist_active_id();
    }

    pub fn set_content(&mut self, id: &str, content: &str) -> bool {
        let Some(doc) = self.documents.iter_mut().find(|doc| doc.id == id) else {
            return false;
        };
        doc.content = content.to_string();
        tracing::debug!(%id, bytes = content.len(), "set content");
        self.persist_documents();
        true
    }

    pub fn set_title(&mut self, id: &str, title: &str) -> bool {
        let Some(doc) = self.documents.iter_mut().find(|doc| doc.id == id) else {
            return false;
        };
        doc.title = title.to_string();
        tracing::debug!(%id, %title, "set title");
        self.persist_documents();
        true
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
    }

    fn persist_documents(&mut self) {
        let result = serde_json::to_string(&self.documents)
            .map_err(StorageError::from)
            .and_then(|raw| self.storage.set(DOCUMENTS_KEY, &raw));
        self.record_persist_result(DOCUMENTS_KEY, result);
    }

    fn persist_active_id(&mut self) {
        let result = match self.active_id.as_deref() {
            Some(id) if !id.is_empty() => self.storage.set(ACTIVE_ID_KEY, id),
            _ => self.storage.remove(ACTIVE_ID_KEY),
        };
        self.record_persist_result(ACTIVE_ID_KEY, result);
    }

    /// A later successful write of the same key clears its error.
    fn record_persist_result(&mut self, key: &'static str, result: Result<(), StorageError>) {
        match result {
            Ok(()) => {
                if self
                    .last_persist_error
                    .as_ref()
                    .is_some_and(|err| err.key == key)
                {
                    self.last_persist_error = None;
                }
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "failed to persist");
                self.last_persist_error = Some(PersistError {
                    key,
                    message: format!("Could not save {key}: {err}"),
                });
            }
        }
    }
}

fn load_documents<S: KeyValueStore>(storage: &S) -> Vec<Document> {
    let raw = match storage.get(DOCUMENTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(error = %err, "could not read documents, starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Document>>(&raw) {
        Ok(documents) => documents,
        Err(err) => {
            tracing::warn!(error = %err, "corrupt documents entry, starting empty");
            Vec::new()
        }
    }
}

fn load_active_id<S: KeyValueStore>(storage: &S) -> Option<String> {
    match storage.get(ACTIVE_ID_KEY) {
        Ok(value) => value.filter(|id| !id.is_empty()),
        Err(err) => {
            tracing::warn!(error = %err, "could not read active id");
            None
        }
    }
}
