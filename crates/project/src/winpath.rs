//! Windows path rules evaluated as plain text, independent of the host OS.
//! 以純文字套用 Windows 路徑規則，不受執行平台影響。
//!
//! Project files store drive-letter paths, so classification must behave the same on a
//! Linux build host as it does on the Windows machine that wrote the file. `std::path`
//! follows the host's rules, hence these helpers.

fn is_sep(ch: char) -> bool {
    ch == '\\' || ch == '/'
}

struct PathRoot<'a> {
    device: &'a str,
    absolute: bool,
    rest: &'a str,
}

fn split_root(path: &str) -> PathRoot<'_> {
    let bytes = path.as_bytes();
    let starts_with_sep = |offset: usize| bytes.get(offset).is_some_and(|b| *b == b'\\' || *b == b'/');

    if starts_with_sep(0) && starts_with_sep(1) {
        // UNC root: \\server\share
        let after = &path[2..];
        if let Some(server_end) = after.find(is_sep) {
            let server = &after[..server_end];
            let share_area = after[server_end..].trim_start_matches(is_sep);
            if !server.is_empty() && !share_area.is_empty() {
                let share_len = share_area.find(is_sep).unwrap_or(share_area.len());
                let device_end = path.len() - share_area.len() + share_len;
                return PathRoot {
                    device: &path[..device_end],
                    absolute: true,
                    rest: path[device_end..].trim_start_matches(is_sep),
                };
            }
        }
        return PathRoot {
            device: "",
            absolute: true,
            rest: path.trim_start_matches(is_sep),
        };
    }

    if starts_with_sep(0) {
        return PathRoot {
            device: "",
            absolute: true,
            rest: path.trim_start_matches(is_sep),
        };
    }

    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let after = &path[2..];
        return PathRoot {
            device: &path[..2],
            absolute: after.starts_with(is_sep),
            rest: after.trim_start_matches(is_sep),
        };
    }

    PathRoot {
        device: "",
        absolute: false,
        rest: path,
    }
}

/// Normalizes a Windows path: unifies separators to `\`, collapses repeated separators,
/// and resolves `.` / `..` segments. A trailing separator is preserved.
/// 正規化 Windows 路徑：統一分隔符號並解析 `.` 與 `..`，保留結尾分隔符號。
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let root = split_root(path);
    let mut parts: Vec<&str> = Vec::new();
    for segment in root.rest.split(is_sep) {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !root.absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let mut tail = parts.join("\\");
    if tail.is_empty() && !root.absolute {
        tail.push('.');
    }
    if !tail.is_empty() && path.ends_with(is_sep) {
        tail.push('\\');
    }

    let mut normalized = root.device.replace('/', "\\");
    if root.absolute {
        normalized.push('\\');
    }
    normalized.push_str(&tail);
    normalized
}

/// Returns the directory portion of `path`, ignoring trailing separators.
/// 取得路徑的目錄部分（忽略結尾分隔符號）。
///
/// Only the last separator is cut, so `C:\proj\\foo.lsp` yields `C:\proj\`.
pub fn dirname(path: &str) -> &str {
    let root = split_root(path);
    let root_len = path.len() - root.rest.len();
    let rest = root.rest.trim_end_matches(is_sep);
    match rest.rfind(is_sep) {
        Some(idx) => &path[..root_len + idx],
        None if root_len > 0 => &path[..root_len],
        None => ".",
    }
}

/// Returns the final component of `path`, ignoring trailing separators.
/// 取得路徑的最後一段名稱。
pub fn basename(path: &str) -> &str {
    let rest = split_root(path).rest.trim_end_matches(is_sep);
    match rest.rfind(is_sep) {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    }
}

/// Key used to decide whether two directories are the same: normalized and uppercased.
pub fn directory_key(dir: &str) -> String {
    normalize(dir).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_unifies_separators_and_resolves_dots() {
        assert_eq!(normalize("C:/proj/./src/../lib"), "C:\\proj\\lib");
        assert_eq!(normalize("C:\\proj\\\\sub\\"), "C:\\proj\\sub\\");
        assert_eq!(normalize("C:\\..\\proj"), "C:\\proj");
        assert_eq!(normalize("..\\a\\..\\..\\b"), "..\\..\\b");
        assert_eq!(normalize("//server/share/dir"), "\\\\server\\share\\dir");
        assert_eq!(normalize(""), ".");
    }

    #[test]
    fn dirname_follows_windows_rules() {
        assert_eq!(dirname("C:\\proj\\foo.lsp"), "C:\\proj");
        assert_eq!(dirname("C:\\foo.lsp"), "C:\\");
        assert_eq!(dirname("C:\\proj\\sub\\"), "C:\\proj");
        assert_eq!(dirname("C:\\proj\\\\foo.lsp"), "C:\\proj\\");
        assert_eq!(dirname("C:/proj//sub//"), "C:/proj/");
        assert_eq!(dirname("foo.lsp"), ".");
        assert_eq!(dirname("\\\\server\\share\\foo.lsp"), "\\\\server\\share\\");
    }

    #[test]
    fn basename_returns_last_component() {
        assert_eq!(basename("C:\\proj\\foo.lsp"), "foo.lsp");
        assert_eq!(basename("C:/proj/lib/"), "lib");
        assert_eq!(basename("C:foo.lsp"), "foo.lsp");
        assert_eq!(basename("foo.lsp"), "foo.lsp");
    }

    #[test]
    fn directory_key_ignores_case_and_separator_style() {
        assert_eq!(directory_key("c:/Proj"), directory_key("C:\\PROJ"));
        assert_ne!(directory_key("C:\\proj"), directory_key("C:\\proj\\"));
    }
}
