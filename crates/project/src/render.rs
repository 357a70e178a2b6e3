//! Text renderers for the pieces of a project file: file-list tokens, the file list
//! clause, and the property block.
//! 專案檔各段文字的產生器：檔案清單項目、檔案清單子句與屬性區塊。

use serde::{Deserialize, Serialize};

use crate::metadata::{ProjectMetadata, KEY_OWN_LIST, STANDARD_KEYS};
use crate::tree::SourceFileEntry;
use crate::winpath;

/// Line terminator used throughout the project file.
pub const LINE_END: &str = "\r\n";

/// File-list clause written when the project has no source files.
pub const EMPTY_FILE_LIST: &str = " nil ";

const LEGACY_EXTENSION_WIDTH: usize = 4;

/// How the extension is removed from a file-list token.
/// 產生檔案清單項目時移除副檔名的方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionStrip {
    /// Drops the last four characters, whatever they are. Files whose extension is not
    /// exactly four characters long (dot included) lose the wrong characters; legacy
    /// readers expect this output, so it stays the default.
    #[default]
    FixedWidth,
    /// Drops everything from the last `.` of the final path component. Tokens without
    /// an extension are left untouched.
    LastDot,
}

impl ExtensionStrip {
    pub fn strip(self, token: &str) -> &str {
        match self {
            ExtensionStrip::FixedWidth => {
                let keep = token.chars().count().saturating_sub(LEGACY_EXTENSION_WIDTH);
                match token.char_indices().nth(keep) {
                    Some((idx, _)) => &token[..idx],
                    None => token,
                }
            }
            ExtensionStrip::LastDot => {
                let component_start = token.rfind('/').map_or(0, |idx| idx + 1);
                match token[component_start..].rfind('.') {
                    Some(idx) if idx > 0 => &token[..component_start + idx],
                    _ => token,
                }
            }
        }
    }
}

/// Length of the file's extension including the dot, if it has one.
fn extension_width(file_path: &str) -> Option<usize> {
    let name = winpath::basename(file_path);
    name.rfind('.').map(|idx| name[idx..].chars().count())
}

/// Decides the textual form of each source-file entry relative to one project directory.
/// 依專案目錄決定每個原始檔項目的輸出文字。
#[derive(Debug, Clone)]
pub struct PathClassifier {
    project_dir_key: String,
    strip: ExtensionStrip,
}

impl PathClassifier {
    pub fn new(project_directory: &str, strip: ExtensionStrip) -> Self {
        Self {
            project_dir_key: winpath::directory_key(project_directory),
            strip,
        }
    }

    /// Returns the token(s) for `entry`, always ending with a single space.
    ///
    /// Original text is emitted verbatim. Files inside the project directory become a
    /// quoted basename, files elsewhere a quoted forward-slash absolute path; both
    /// without extension.
    pub fn classify(&self, entry: &SourceFileEntry) -> String {
        let file_path = match entry {
            SourceFileEntry::Original { raw_text, .. } => return format!("{raw_text} "),
            SourceFileEntry::Computed { file_path } => file_path,
        };

        if self.strip == ExtensionStrip::FixedWidth
            && extension_width(file_path) != Some(LEGACY_EXTENSION_WIDTH)
        {
            log::warn!(
                "'{file_path}' does not have a {LEGACY_EXTENSION_WIDTH}-character extension; \
                 fixed-width stripping will cut the wrong characters"
            );
        }

        let file_dir_key = winpath::directory_key(winpath::dirname(file_path));
        if file_dir_key != self.project_dir_key {
            let absolute = winpath::normalize(file_path).replace('\\', "/");
            format!("\"{}\" ", self.strip.strip(&absolute))
        } else {
            format!("\"{}\" ", self.strip.strip(winpath::basename(file_path)))
        }
    }
}

/// Renders the file-list clause: ` nil ` for no files, otherwise ` (<tokens>) `.
/// 產生檔案清單子句。
pub fn render_file_list(
    source_files: &[SourceFileEntry],
    project_directory: &str,
    strip: ExtensionStrip,
) -> String {
    if source_files.is_empty() {
        return EMPTY_FILE_LIST.to_string();
    }

    let classifier = PathClassifier::new(project_directory, strip);
    let mut list = String::from(" (");
    for entry in source_files {
        list.push_str(&classifier.classify(entry));
    }
    let trimmed = list.trim_end().len();
    list.truncate(trimmed);
    list.push_str(") ");
    list
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(LINE_END);
    out.push_str(value);
    out.push_str(LINE_END);
}

/// Renders every property as a key line followed by a value line.
/// 輸出所有屬性（每組為鍵一行、值一行）。
///
/// Standard keys come first in their fixed order, with `file_list` standing in for the
/// file-list marker's value; the remaining keys follow in metadata order.
pub fn render_properties(metadata: &ProjectMetadata, file_list: &str) -> String {
    let mut out = String::new();
    for key in STANDARD_KEYS {
        let value = if key == KEY_OWN_LIST {
            file_list
        } else {
            metadata.property(key)
        };
        push_pair(&mut out, key, value);
    }
    for key in metadata.extension_keys() {
        push_pair(&mut out, key, metadata.property(key));
    }
    out
}
