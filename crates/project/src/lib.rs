//! Project-file writer for VLisp projects: turns a project tree snapshot into the exact
//! text of a legacy `.prj` file.
//! VLisp 專案檔寫入模組：將專案樹快照轉為舊式 `.prj` 專案檔的精確文字。

mod util;

pub mod config;
pub mod document;
pub mod metadata;
pub mod render;
pub mod save;
pub mod tree;
pub mod tree_store;
pub mod winpath;

pub use config::{ConfigError, WriterConfig, WriterConfigStore};
pub use document::{
    compose_project_text, render_expression, render_header, ComposeError, ComposeOptions,
    DEFAULT_DATE_FORMAT, EOF_MARKER, HEADER_PREFIX,
};
pub use metadata::{
    is_standard_property, ProjectMetadata, EXPRESSION_NAME, MISSING_PROPERTY_VALUE, STANDARD_KEYS,
};
pub use render::{
    render_file_list, render_properties, ExtensionStrip, PathClassifier, EMPTY_FILE_LIST, LINE_END,
};
pub use save::{
    save_project, CollaboratorError, PassthroughFormatter, ProjectFormatter, ProjectReloader,
    ProjectSession, SaveError, PROJECT_LANGUAGE_ID,
};
pub use tree::{ProjectTree, SourceFileEntry};
pub use tree_store::{ProjectSnapshotStore, SnapshotError};
