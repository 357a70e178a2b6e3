use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name of the top-level expression wrapping the whole project definition.
pub const EXPRESSION_NAME: &str = "VLISP-PROJECT-LIST";

pub const KEY_NAME: &str = ":NAME";
/// Marker key whose value is replaced by the rendered source-file list.
pub const KEY_OWN_LIST: &str = ":OWN-LIST";
pub const KEY_FAS_DIRECTORY: &str = ":FAS-DIRECTORY";
pub const KEY_TMP_DIRECTORY: &str = ":TMP-DIRECTORY";
pub const KEY_PROJECT_KEYS: &str = ":PROJECT-KEYS";
pub const KEY_CONTEXT_ID: &str = ":CONTEXT-ID";

/// Standard keys in their mandated emission order.
/// 標準屬性鍵，依規定的輸出順序排列。
pub const STANDARD_KEYS: [&str; 6] = [
    KEY_NAME,
    KEY_OWN_LIST,
    KEY_FAS_DIRECTORY,
    KEY_TMP_DIRECTORY,
    KEY_PROJECT_KEYS,
    KEY_CONTEXT_ID,
];

/// Text reported for a property that has no stored value.
pub const MISSING_PROPERTY_VALUE: &str = "nil";

/// Returns `true` when `key` belongs to the closed set of standard properties.
pub fn is_standard_property(key: &str) -> bool {
    STANDARD_KEYS.contains(&key)
}

/// Project properties keyed by name, kept in insertion order.
/// 專案屬性表，保留插入順序。
///
/// Values are stored in their final textual (Lisp) form and are never escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    entries: Vec<(String, String)>,
}

impl ProjectMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or updates a property. Updating keeps the key's original position.
    /// 新增或更新屬性；更新時維持原本位置。
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_property(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Looks up a property, answering [`MISSING_PROPERTY_VALUE`] when it is absent.
    /// 查詢屬性值；不存在時回傳 `nil`。
    pub fn property(&self, key: &str) -> &str {
        self.get(key).unwrap_or(MISSING_PROPERTY_VALUE)
    }

    /// Iterates over all keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Keys outside the standard set, in insertion order.
    /// 非標準屬性鍵（依插入順序）。
    pub fn extension_keys(&self) -> impl Iterator<Item = &str> {
        self.keys().filter(|key| !is_standard_property(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ProjectMetadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = ProjectMetadata::new();
        for (key, value) in iter {
            metadata.set_property(key, value);
        }
        metadata
    }
}

impl Serialize for ProjectMetadata {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProjectMetadata {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MetadataVisitor;

        impl<'de> Visitor<'de> for MetadataVisitor {
            type Value = ProjectMetadata;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of project property names to values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut metadata = ProjectMetadata::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    metadata.set_property(key, value);
                }
                Ok(metadata)
            }
        }

        deserializer.deserialize_map(MetadataVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_keeps_original_position() {
        let mut metadata = ProjectMetadata::new()
            .with_property(KEY_NAME, "demo")
            .with_property("custom-flag", "1")
            .with_property(KEY_CONTEXT_ID, ":AUTOLISP");
        metadata.set_property(KEY_NAME, "renamed");

        let keys: Vec<_> = metadata.keys().collect();
        assert_eq!(keys, vec![KEY_NAME, "custom-flag", KEY_CONTEXT_ID]);
        assert_eq!(metadata.get(KEY_NAME), Some("renamed"));
    }

    #[test]
    fn missing_property_reads_as_nil() {
        let metadata = ProjectMetadata::new();
        assert_eq!(metadata.get(KEY_FAS_DIRECTORY), None);
        assert_eq!(metadata.property(KEY_FAS_DIRECTORY), "nil");
    }

    #[test]
    fn classification_is_exact_membership() {
        assert!(is_standard_property(":OWN-LIST"));
        assert!(!is_standard_property(":own-list"));
        assert!(!is_standard_property("custom-flag"));

        let metadata: ProjectMetadata = [
            ("zeta", "1"),
            (KEY_TMP_DIRECTORY, "nil"),
            ("alpha", "2"),
        ]
        .into_iter()
        .collect();
        let extras: Vec<_> = metadata.extension_keys().collect();
        assert_eq!(extras, vec!["zeta", "alpha"]);
    }

    #[test]
    fn json_preserves_document_order() {
        let json = r#"{"zeta":"1",":NAME":"demo","alpha":"(a b)"}"#;
        let metadata: ProjectMetadata = serde_json::from_str(json).unwrap();
        let keys: Vec<_> = metadata.keys().collect();
        assert_eq!(keys, vec!["zeta", ":NAME", "alpha"]);
        assert_eq!(serde_json::to_string(&metadata).unwrap(), json);
    }
}
