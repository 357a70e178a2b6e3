use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::tree::ProjectTree;

/// Persists `ProjectTree` snapshots as JSON, the hand-off format between the project
/// tree owner and the project-file writer.
/// 以 JSON 保存 `ProjectTree` 快照，作為專案樹與專案檔寫入器之間的交換格式。
#[derive(Debug)]
pub struct ProjectSnapshotStore {
    path: PathBuf,
}

impl ProjectSnapshotStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads the snapshot, returning `Ok(None)` when the file is absent.
    /// 載入快照；若檔案不存在則回傳 `Ok(None)`。
    pub fn load(&self) -> Result<Option<ProjectTree>, SnapshotError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let tree = serde_json::from_str(&contents).map_err(|err| {
                    SnapshotError::Invalid(format!("{}: {err}", self.path.display()))
                })?;
                Ok(Some(tree))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SnapshotError::Io(err)),
        }
    }

    /// Like [`load`](Self::load) but treats a missing file as an error.
    pub fn load_required(&self) -> Result<ProjectTree, SnapshotError> {
        self.load()?
            .ok_or_else(|| SnapshotError::Missing(self.path.clone()))
    }
}

/// Errors emitted by [`ProjectSnapshotStore`].
/// [`ProjectSnapshotStore`] 可能拋出的錯誤。
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("project snapshot IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid project snapshot: {0}")]
    Invalid(String),
    #[error("project snapshot {} does not exist", .0.display())]
    Missing(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ProjectMetadata, KEY_NAME};
    use crate::tree::SourceFileEntry;
    use tempfile::tempdir;

    #[test]
    fn load_keeps_entry_kinds_and_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.json");

        let tree = ProjectTree::new("demo", "C:\\demo", dir.path().join("demo.prj"))
            .with_source_file(SourceFileEntry::computed("C:\\demo\\b.lsp"))
            .with_source_file(SourceFileEntry::original("C:\\demo\\a.lsp", "A"))
            .with_metadata(
                ProjectMetadata::new()
                    .with_property("zeta", "1")
                    .with_property(KEY_NAME, "demo"),
            );

        fs::write(&path, serde_json::to_string_pretty(&tree).unwrap()).unwrap();
        let loaded = ProjectSnapshotStore::new(&path).load().unwrap().unwrap();
        assert_eq!(loaded, tree);
    }

    #[test]
    fn load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = ProjectSnapshotStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_none());
        assert!(matches!(
            store.load_required(),
            Err(SnapshotError::Missing(_))
        ));
    }

    #[test]
    fn invalid_payload_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.json");
        fs::write(&path, r#"{"project_name": 3}"#).unwrap();
        let err = ProjectSnapshotStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(_)));
    }
}
