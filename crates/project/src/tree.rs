use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::metadata::ProjectMetadata;
use crate::winpath;

/// One source file referenced by the project.
/// 專案所引用的單一原始檔。
///
/// `Original` entries came from parsing an existing project file and keep the exact text
/// found there; that text always wins over anything computed from `file_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SourceFileRecord", into = "SourceFileRecord")]
pub enum SourceFileEntry {
    Original { file_path: String, raw_text: String },
    Computed { file_path: String },
}

impl SourceFileEntry {
    pub fn computed(file_path: impl Into<String>) -> Self {
        SourceFileEntry::Computed {
            file_path: file_path.into(),
        }
    }

    pub fn original(file_path: impl Into<String>, raw_text: impl Into<String>) -> Self {
        SourceFileEntry::Original {
            file_path: file_path.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Absolute Windows path of the file.
    pub fn file_path(&self) -> &str {
        match self {
            SourceFileEntry::Original { file_path, .. } | SourceFileEntry::Computed { file_path } => {
                file_path
            }
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            SourceFileEntry::Original { raw_text, .. } => Some(raw_text),
            SourceFileEntry::Computed { .. } => None,
        }
    }
}

/// Flat JSON shape of a source-file entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SourceFileRecord {
    file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw_file_path: Option<String>,
}

impl From<SourceFileRecord> for SourceFileEntry {
    fn from(record: SourceFileRecord) -> Self {
        match record.raw_file_path {
            Some(raw_text) => SourceFileEntry::Original {
                file_path: record.file_path,
                raw_text,
            },
            None => SourceFileEntry::Computed {
                file_path: record.file_path,
            },
        }
    }
}

impl From<SourceFileEntry> for SourceFileRecord {
    fn from(entry: SourceFileEntry) -> Self {
        match entry {
            SourceFileEntry::Original {
                file_path,
                raw_text,
            } => SourceFileRecord {
                file_path,
                raw_file_path: Some(raw_text),
            },
            SourceFileEntry::Computed { file_path } => SourceFileRecord {
                file_path,
                raw_file_path: None,
            },
        }
    }
}

/// Snapshot of an opened project: its location, ordered file list, and properties.
/// 已開啟專案的快照：位置、依序排列的檔案清單與屬性。
///
/// `project_file_path`'s parent is expected to be `project_directory`; callers keep that
/// true, nothing here checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTree {
    pub project_name: String,
    pub project_directory: String,
    pub project_file_path: PathBuf,
    #[serde(default)]
    pub source_files: Vec<SourceFileEntry>,
    #[serde(default)]
    pub metadata: ProjectMetadata,
}

impl ProjectTree {
    pub fn new(
        project_name: impl Into<String>,
        project_directory: impl Into<String>,
        project_file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            project_directory: project_directory.into(),
            project_file_path: project_file_path.into(),
            source_files: Vec::new(),
            metadata: ProjectMetadata::default(),
        }
    }

    /// Builds an empty tree whose name and directory are derived from the project file.
    /// 依專案檔位置推導名稱與目錄，建立空的專案樹。
    pub fn from_project_file(project_file_path: impl AsRef<Path>) -> Self {
        let path = project_file_path.as_ref();
        let text = path.to_string_lossy();
        let file_name = winpath::basename(&text);
        let project_name = match file_name.rfind('.') {
            Some(idx) if idx > 0 => &file_name[..idx],
            _ => file_name,
        };
        Self::new(project_name, winpath::dirname(&text), path)
    }

    pub fn push_source_file(&mut self, entry: SourceFileEntry) {
        self.source_files.push(entry);
    }

    pub fn with_source_file(mut self, entry: SourceFileEntry) -> Self {
        self.push_source_file(entry);
        self
    }

    pub fn with_metadata(mut self, metadata: ProjectMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}
