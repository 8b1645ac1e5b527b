use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::analysis::document::Document;

/// Directory sink for uploaded documents.
///
/// Two requests persisting the same sanitized filename into the same root
/// overwrite each other; use `scoped` to isolate a request.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A store rooted at `<root>/<request_id>`.
    pub fn scoped(&self, request_id: Uuid) -> Self {
        Self {
            root: self.root.join(request_id.to_string()),
        }
    }

    /// Writes the full document content under its sanitized filename,
    /// creating the directory first if needed.
    pub fn persist(&self, document: &Document) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(document.safe_filename());
        std::fs::write(&path, &document.content)?;
        debug!(
            "Persisted {} upload ({} bytes) to {}",
            document.slot.key(),
            document.content.len(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::document::DocumentSlot;

    #[test]
    fn test_persist_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("nested").join("uploads"));
        let doc = Document::new(DocumentSlot::Blueprint, "blueprint.txt", "Step 1: greet");

        let path = store.persist(&doc).unwrap();

        assert_eq!(path, store.root().join("blueprint.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Step 1: greet");
    }

    #[test]
    fn test_persist_uses_sanitized_name_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let doc = Document::new(DocumentSlot::Persona, "../../escape.txt", "persona");

        let path = store.persist(&doc).unwrap();

        assert_eq!(path, dir.path().join("escape.txt"));
        assert!(path.starts_with(dir.path()));
    }

    #[test]
    fn test_persist_writes_binary_content_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let bytes = vec![0u8, 159, 146, 150, 255];
        let doc = Document::new(DocumentSlot::SystemMap, "map.png", bytes.clone());

        let path = store.persist(&doc).unwrap();

        assert_eq!(std::fs::read(path).unwrap(), bytes);
    }

    #[test]
    fn test_scoped_store_nests_under_request_id() {
        let store = UploadStore::new("uploads");
        let id = Uuid::new_v4();
        assert_eq!(store.scoped(id).root(), Path::new("uploads").join(id.to_string()));
    }

    #[test]
    fn test_persist_surfaces_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let store = UploadStore::new(&blocker);
        let doc = Document::new(DocumentSlot::Blueprint, "b.txt", "x");

        assert!(store.persist(&doc).is_err());
    }
}
