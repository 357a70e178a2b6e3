use std::fmt::Write as _;

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::WriterConfig;
use crate::metadata::{ProjectMetadata, EXPRESSION_NAME};
use crate::render::{render_file_list, render_properties, ExtensionStrip, LINE_END};
use crate::tree::ProjectTree;

/// Fixed start of the header comment; identifies the format version.
pub const HEADER_PREFIX: &str = ";;; VLisp project file [V2.0] ";

/// End-of-file marker closing every project file.
pub const EOF_MARKER: &str = ";;; EOF";

/// Default header date format, the short US locale date (`10/18/2026`).
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Inputs to composition that do not come from the project tree.
/// 組合專案檔文字時，專案樹以外的輸入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    pub saved_on: NaiveDate,
    pub date_format: String,
    pub extension_strip: ExtensionStrip,
}

impl ComposeOptions {
    pub fn new(saved_on: NaiveDate) -> Self {
        Self {
            saved_on,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            extension_strip: ExtensionStrip::default(),
        }
    }

    pub fn from_config(config: &WriterConfig, saved_on: NaiveDate) -> Self {
        Self {
            saved_on,
            date_format: config.date_format.clone(),
            extension_strip: config.extension_strip,
        }
    }

    pub fn with_extension_strip(mut self, strip: ExtensionStrip) -> Self {
        self.extension_strip = strip;
        self
    }
}

/// Reasons the project text cannot be composed.
/// 無法組合專案檔文字的原因。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("project name is empty")]
    MissingProjectName,
    #[error("project directory is empty")]
    MissingProjectDirectory,
    #[error("project {field} contains a line break")]
    LineBreakInHeader { field: &'static str },
    #[error("property key {0:?} cannot be written as a symbol")]
    InvalidPropertyKey(String),
    #[error("date format {0:?} cannot render a calendar date")]
    InvalidDateFormat(String),
}

fn has_line_break(text: &str) -> bool {
    text.contains(['\r', '\n'])
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key
            .chars()
            .any(|ch| ch.is_whitespace() || matches!(ch, '(' | ')' | '"' | ';'))
}

fn validate(tree: &ProjectTree) -> Result<(), ComposeError> {
    if tree.project_name.trim().is_empty() {
        return Err(ComposeError::MissingProjectName);
    }
    if tree.project_directory.trim().is_empty() {
        return Err(ComposeError::MissingProjectDirectory);
    }
    if has_line_break(&tree.project_name) {
        return Err(ComposeError::LineBreakInHeader { field: "name" });
    }
    if has_line_break(&tree.project_directory) {
        return Err(ComposeError::LineBreakInHeader { field: "directory" });
    }
    if let Some(key) = tree.metadata.keys().find(|key| !is_valid_key(key)) {
        return Err(ComposeError::InvalidPropertyKey(key.to_string()));
    }
    Ok(())
}

/// Renders the header comment line, terminated by CR/LF.
pub fn render_header(tree: &ProjectTree, options: &ComposeOptions) -> Result<String, ComposeError> {
    let mut header = String::new();
    write!(
        header,
        "{HEADER_PREFIX}{} saved to:[{}] at:[{}]{LINE_END}",
        tree.project_name,
        tree.project_directory,
        options.saved_on.format(&options.date_format)
    )
    .map_err(|_| ComposeError::InvalidDateFormat(options.date_format.clone()))?;
    Ok(header)
}

/// Renders the top-level expression wrapping the property block.
pub fn render_expression(metadata: &ProjectMetadata, file_list: &str) -> String {
    let mut expression = String::from("(");
    expression.push_str(EXPRESSION_NAME);
    expression.push_str(LINE_END);
    expression.push_str(&render_properties(metadata, file_list));
    expression.push(')');
    expression.push_str(LINE_END);
    expression
}

/// Produces the complete, unformatted project file text for `tree`.
/// 產生完整（未排版）的專案檔文字。
///
/// Either the whole text is returned or an error; partial output never escapes.
pub fn compose_project_text(
    tree: &ProjectTree,
    options: &ComposeOptions,
) -> Result<String, ComposeError> {
    validate(tree)?;

    let mut text = render_header(tree, options)?;
    let file_list = render_file_list(
        &tree.source_files,
        &tree.project_directory,
        options.extension_strip,
    );
    log::debug!(
        "composing project '{}' with {} source files and {} properties",
        tree.project_name,
        tree.source_files.len(),
        tree.metadata.len()
    );
    text.push_str(&render_expression(&tree.metadata, &file_list));
    text.push_str(EOF_MARKER);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::*;
    use crate::tree::SourceFileEntry;

    fn saved_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    fn sample_tree() -> ProjectTree {
        let metadata = ProjectMetadata::new()
            .with_property(KEY_NAME, "demo")
            .with_property(KEY_OWN_LIST, "nil")
            .with_property(KEY_FAS_DIRECTORY, "nil")
            .with_property(KEY_TMP_DIRECTORY, "nil")
            .with_property(KEY_PROJECT_KEYS, "(:BUILD (:standard))")
            .with_property(KEY_CONTEXT_ID, ":AUTOLISP")
            .with_property("custom-flag", "1");
        ProjectTree::new("demo", "C:\\proj", "C:\\proj\\demo.prj")
            .with_source_file(SourceFileEntry::computed("C:\\proj\\main.lsp"))
            .with_source_file(SourceFileEntry::computed("D:\\shared\\util.lsp"))
            .with_source_file(SourceFileEntry::original("C:\\proj\\legacy.lsp", "LEGACY"))
            .with_metadata(metadata)
    }

    /// Counts how often the paren depth returns to zero, skipping strings and comments.
    fn top_level_forms(text: &str) -> usize {
        let mut depth = 0usize;
        let mut forms = 0;
        let mut in_string = false;
        let mut in_comment = false;
        for ch in text.chars() {
            match ch {
                '\n' if in_comment => in_comment = false,
                _ if in_comment => {}
                '"' => in_string = !in_string,
                _ if in_string => {}
                ';' => in_comment = true,
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        forms += 1;
                    }
                }
                _ => {}
            }
        }
        assert_eq!(depth, 0, "unbalanced parentheses");
        forms
    }

    #[test]
    fn composes_full_document() {
        let text = compose_project_text(&sample_tree(), &ComposeOptions::new(saved_on())).unwrap();
        assert_eq!(
            text,
            ";;; VLisp project file [V2.0] demo saved to:[C:\\proj] at:[3/7/2024]\r\n\
             (VLISP-PROJECT-LIST\r\n\
             :NAME\r\ndemo\r\n\
             :OWN-LIST\r\n (\"main\" \"D:/shared/util\" LEGACY) \r\n\
             :FAS-DIRECTORY\r\nnil\r\n\
             :TMP-DIRECTORY\r\nnil\r\n\
             :PROJECT-KEYS\r\n(:BUILD (:standard))\r\n\
             :CONTEXT-ID\r\n:AUTOLISP\r\n\
             custom-flag\r\n1\r\n\
             )\r\n\
             ;;; EOF"
        );
    }

    #[test]
    fn document_shape_is_stable() {
        let options = ComposeOptions::new(saved_on());
        let tree = sample_tree();
        let first = compose_project_text(&tree, &options).unwrap();
        let second = compose_project_text(&tree, &options).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with(";;; VLisp project file [V2.0]"));
        assert!(first.ends_with(";;; EOF"));
        assert_eq!(top_level_forms(&first), 1);
    }

    #[test]
    fn empty_project_uses_nil_file_list() {
        let tree = ProjectTree::new("bare", "C:\\bare", "C:\\bare\\bare.prj");
        let text = compose_project_text(&tree, &ComposeOptions::new(saved_on())).unwrap();
        assert!(text.contains(":OWN-LIST\r\n nil \r\n"));
        assert!(text.contains(":NAME\r\nnil\r\n"));
        assert_eq!(top_level_forms(&text), 1);
    }

    #[test]
    fn date_format_is_configurable() {
        let mut options = ComposeOptions::new(saved_on());
        options.date_format = "%Y-%m-%d".to_string();
        let header = render_header(&sample_tree(), &options).unwrap();
        assert!(header.ends_with("at:[2024-03-07]\r\n"));

        options.date_format = "%H:%M".to_string();
        assert_eq!(
            render_header(&sample_tree(), &options),
            Err(ComposeError::InvalidDateFormat("%H:%M".to_string()))
        );
    }

    #[test]
    fn composition_failures_are_reported() {
        let options = ComposeOptions::new(saved_on());

        let mut tree = sample_tree();
        tree.project_name.clear();
        assert_eq!(
            compose_project_text(&tree, &options),
            Err(ComposeError::MissingProjectName)
        );

        let mut tree = sample_tree();
        tree.project_directory = "C:\\proj\r\nX".to_string();
        assert_eq!(
            compose_project_text(&tree, &options),
            Err(ComposeError::LineBreakInHeader { field: "directory" })
        );

        let mut tree = sample_tree();
        tree.metadata.set_property("bad key", "1");
        assert_eq!(
            compose_project_text(&tree, &options),
            Err(ComposeError::InvalidPropertyKey("bad key".to_string()))
        );
    }
}
