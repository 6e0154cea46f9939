//! Kubernetes manifest documents
//!
//! A [`ManifestDocument`] keeps only what the converter reads from a
//! resource: its `kind`, the object metadata and the raw `spec`/`data`
//! sections. Everything else in the document is ignored.

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{CoreError, Result};

/// One parsed Kubernetes resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    /// Resource kind (`Deployment`, `Service`, ...)
    #[serde(default)]
    pub kind: Option<String>,

    /// Object metadata
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ObjectMeta,

    /// Resource spec, left opaque until the classifier decodes it
    #[serde(default)]
    pub spec: Value,

    /// ConfigMap/Secret `data`
    #[serde(default)]
    pub data: Value,

    /// Secret `stringData`
    #[serde(default)]
    pub string_data: Value,
}

impl ManifestDocument {
    /// Kind, or `Unknown` when the document has none
    pub fn kind_or_unknown(&self) -> &str {
        self.kind.as_deref().unwrap_or("Unknown")
    }

    /// Name, or `unnamed` when the document has none
    pub fn name_or_unnamed(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or("unnamed")
    }
}

/// Object metadata
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "string_map")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "string_map")]
    pub annotations: BTreeMap<String, String>,
}

// =============================================================================
// LOADING
// =============================================================================

/// Parse a multi-document YAML stream
///
/// Empty documents are skipped and documents that are not mappings are
/// dropped. Invalid YAML fails the whole stream.
pub fn load_manifests(input: &[u8]) -> Result<Vec<ManifestDocument>> {
    let mut documents = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_slice(input).enumerate() {
        let value =
            Value::deserialize(document).map_err(|source| CoreError::Parse { index, source })?;

        match value {
            Value::Null => {
                tracing::debug!(index, "skipping empty document");
            }
            Value::Mapping(_) => {
                let doc: ManifestDocument = serde_yaml::from_value(value)
                    .map_err(|source| CoreError::Parse { index, source })?;
                tracing::debug!(index, kind = doc.kind_or_unknown(), "loaded document");
                documents.push(doc);
            }
            _ => {
                tracing::debug!(index, "dropping non-mapping document");
            }
        }
    }

    Ok(documents)
}

/// Read and parse a manifest file
pub fn load_manifest_file(path: &Path) -> Result<Vec<ManifestDocument>> {
    let bytes = fs::read(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_manifests(&bytes)
}

// =============================================================================
// LENIENT VALUE HELPERS
// =============================================================================

/// Render a YAML scalar as a string
///
/// Returns `None` for null, sequences and mappings.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Convert a YAML mapping of scalars into a string map
///
/// Null yields an empty map; null entries become empty strings.
pub fn value_to_string_map(value: &Value) -> std::result::Result<BTreeMap<String, String>, String> {
    let mapping = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Mapping(mapping) => mapping,
        _ => return Err("expected a mapping of strings".to_string()),
    };

    let mut map = BTreeMap::new();
    for (key, entry) in mapping {
        let key = scalar_to_string(key).ok_or_else(|| "mapping keys must be scalars".to_string())?;
        let entry = match entry {
            Value::Null => String::new(),
            other => scalar_to_string(other)
                .ok_or_else(|| format!("value for '{}' must be a scalar", key))?,
        };
        map.insert(key, entry);
    }
    Ok(map)
}

/// Deserialize an explicit `null` as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_string_map(&value).map_err(de::Error::custom)
}

/// Deserialize a scalar (string, number or bool) as a string
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        other => scalar_to_string(&other)
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected a string")),
    }
}

/// Decode an optional raw section into a typed value; absent or null yields the default
pub(crate) fn decode_section<T>(section: Option<&Value>) -> std::result::Result<T, serde_yaml::Error>
where
    T: DeserializeOwned + Default,
{
    match section {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_yaml::from_value(value.clone()),
    }
}
