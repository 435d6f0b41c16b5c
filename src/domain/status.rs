use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Normalizes a raw status label into its column key form.
///
/// Lower-cases, decomposes accented characters (NFD), drops every combining
/// mark and trims surrounding whitespace. `"En Revisión "` and `"en revision"`
/// both become `"en revision"`.
pub fn normalize(label: &str) -> String {
    label
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Stable identity of a board column, derived from a status label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnKey(String);

impl ColumnKey {
    /// Builds the key for a raw label as supplied by the backend
    pub fn from_label(label: &str) -> Self {
        Self(normalize(label))
    }

    /// Returns the normalized string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric status code (`estado`) the backend stores on a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub i64);

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entry of the backend's status catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDefinition {
    #[serde(rename = "idEstado")]
    pub id: StatusCode,
    #[serde(rename = "descripcionEstado")]
    pub label: String,
}

impl StatusDefinition {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id: StatusCode(id),
            label: label.into(),
        }
    }

    pub fn key(&self) -> ColumnKey {
        ColumnKey::from_label(&self.label)
    }
}

/// Column key to the status code a ticket takes when placed in that column
pub type StatusMap = HashMap<ColumnKey, StatusCode>;

/// Column key to its presentation label
pub type LabelMap = HashMap<ColumnKey, String>;
