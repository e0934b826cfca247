//! Nouns — vertices of the persistent knowledge graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A concept, entity, process, property, value, context, or unclassified
/// label tracked by the graph store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Noun {
    pub id: String,
    /// Lower-cased, trimmed. Unique per store.
    pub label: String,
    #[serde(default)]
    pub kind: NounType,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Noun {
    pub fn new(label: impl Into<String>, kind: NounType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: normalize_label(label),
            kind,
            properties: HashMap::new(),
            created_at: Utc::now(),
        }
    }
}

/// Normalize a noun label the way the graph store expects it: trimmed and
/// lower-cased. Used both when creating nouns and when looking them up.
pub fn normalize_label(label: impl Into<String>) -> String {
    label.into().trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NounType {
    Concept,
    Entity,
    Process,
    Property,
    Value,
    Context,
    #[default]
    Unknown,
}

impl std::fmt::Display for NounType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NounType::Concept => "concept",
            NounType::Entity => "entity",
            NounType::Process => "process",
            NounType::Property => "property",
            NounType::Value => "value",
            NounType::Context => "context",
            NounType::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_noun_normalizes_label() {
        let n = Noun::new("  Photosynthesis  ", NounType::Process);
        assert_eq!(n.label, "photosynthesis");
    }

    #[test]
    fn normalize_label_lowercases_and_trims() {
        assert_eq!(normalize_label(" DNA "), "dna");
    }
}
