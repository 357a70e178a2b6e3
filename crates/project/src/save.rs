use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::document::{compose_project_text, ComposeError, ComposeOptions};
use crate::tree::ProjectTree;
use crate::util::write_atomic;

/// Language identifier the formatter receives alongside the raw project text.
pub const PROJECT_LANGUAGE_ID: &str = "autolisp";

/// Error type returned by external collaborators (formatter, reloader).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pretty-prints raw project text. Implemented by the editor's Lisp formatter.
/// 將原始專案檔文字排版；由編輯器的 Lisp 排版器實作。
pub trait ProjectFormatter {
    fn format(&self, text: &str, language_id: &str) -> Result<String, CollaboratorError>;
}

impl<F> ProjectFormatter for F
where
    F: Fn(&str, &str) -> Result<String, CollaboratorError>,
{
    fn format(&self, text: &str, language_id: &str) -> Result<String, CollaboratorError> {
        self(text, language_id)
    }
}

/// Formatter that hands the raw text back untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFormatter;

impl ProjectFormatter for PassthroughFormatter {
    fn format(&self, text: &str, _language_id: &str) -> Result<String, CollaboratorError> {
        Ok(text.to_string())
    }
}

/// Rebuilds the project tree from a freshly written project file.
/// 由剛寫入的專案檔重新建立專案樹。
pub trait ProjectReloader {
    fn reload(&mut self, project_file: &Path) -> Result<ProjectTree, CollaboratorError>;
}

impl<F> ProjectReloader for F
where
    F: FnMut(&Path) -> Result<ProjectTree, CollaboratorError>,
{
    fn reload(&mut self, project_file: &Path) -> Result<ProjectTree, CollaboratorError> {
        self(project_file)
    }
}

/// Errors raised while saving the open project.
/// 儲存目前專案時的錯誤。
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no project opened yet")]
    NoProjectOpened,
    #[error("failed to compose project text: {0}")]
    Compose(#[from] ComposeError),
    #[error("failed to format project text: {0}")]
    Format(#[source] CollaboratorError),
    #[error("formatter returned empty text")]
    EmptyFormatterOutput,
    #[error("failed to write project file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to reopen project file {path}: {source}")]
    Reload {
        path: PathBuf,
        #[source]
        source: CollaboratorError,
    },
}

/// Tracks the currently opened project, if any.
/// 追蹤目前開啟的專案。
#[derive(Debug, Default)]
pub struct ProjectSession {
    current: Option<ProjectTree>,
}

impl ProjectSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, tree: ProjectTree) {
        log::info!("opened project '{}'", tree.project_name);
        self.current = Some(tree);
    }

    pub fn close(&mut self) -> Option<ProjectTree> {
        self.current.take()
    }

    pub fn has_project_opened(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&ProjectTree> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut ProjectTree> {
        self.current.as_mut()
    }
}

/// Writes the open project to its project file, then reopens it.
/// 將目前專案寫回專案檔並重新開啟。
///
/// Nothing touches the filesystem until the formatted text is complete. The previous file
/// is replaced by rename, so a failed write leaves it intact. If the reload fails the file
/// on disk is already new while the session still holds the old tree.
pub fn save_project<'s, F, R>(
    session: &'s mut ProjectSession,
    options: &ComposeOptions,
    formatter: &F,
    reloader: &mut R,
) -> Result<&'s ProjectTree, SaveError>
where
    F: ProjectFormatter + ?Sized,
    R: ProjectReloader + ?Sized,
{
    let tree = session.current().ok_or(SaveError::NoProjectOpened)?;

    let raw_text = compose_project_text(tree, options)?;
    let formatted = formatter
        .format(&raw_text, PROJECT_LANGUAGE_ID)
        .map_err(SaveError::Format)?;
    if formatted.is_empty() {
        return Err(SaveError::EmptyFormatterOutput);
    }

    let target = tree.project_file_path.clone();
    write_atomic(&target, formatted.as_bytes()).map_err(|source| SaveError::Write {
        path: target.clone(),
        source,
    })?;
    log::info!("wrote project file {}", target.display());

    let reloaded = reloader
        .reload(&target)
        .map_err(|source| SaveError::Reload {
            path: target.clone(),
            source,
        })?;
    Ok(session.current.insert(reloaded))
}
