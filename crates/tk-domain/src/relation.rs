//! Relations — directed, typed, weighted edges between nouns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub kind: RelationType,
    /// Always clamped to `[0.0, 1.0]` by [`Relation::new`].
    pub weight: f64,
    #[serde(default)]
    pub context_id: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Relation {
    pub fn new(from_id: impl Into<String>, kind: RelationType, to_id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from_id: from_id.into(),
            to_id: to_id.into(),
            kind,
            weight: weight.clamp(0.0, 1.0),
            context_id: None,
            properties: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_context(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }
}

/// Closed vocabulary of relation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    IsA,
    Has,
    Causes,
    PartOf,
    UsedFor,
    Opposes,
    Requires,
    Produces,
    Equals,
    GreaterThan,
    LessThan,
    Contains,
    Precedes,
    Follows,
    RelatesTo,
    ExampleOf,
    DefinedAs,
}

impl RelationType {
    /// The types over which `infer` takes a bounded transitive closure.
    pub const TRANSITIVE: [RelationType; 5] = [
        RelationType::IsA,
        RelationType::Causes,
        RelationType::Requires,
        RelationType::PartOf,
        RelationType::Precedes,
    ];

    pub fn is_transitive(self) -> bool {
        Self::TRANSITIVE.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::IsA => "is_a",
            RelationType::Has => "has",
            RelationType::Causes => "causes",
            RelationType::PartOf => "part_of",
            RelationType::UsedFor => "used_for",
            RelationType::Opposes => "opposes",
            RelationType::Requires => "requires",
            RelationType::Produces => "produces",
            RelationType::Equals => "equals",
            RelationType::GreaterThan => "greater_than",
            RelationType::LessThan => "less_than",
            RelationType::Contains => "contains",
            RelationType::Precedes => "precedes",
            RelationType::Follows => "follows",
            RelationType::RelatesTo => "relates_to",
            RelationType::ExampleOf => "example_of",
            RelationType::DefinedAs => "defined_as",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A relation joined with the noun it points at — the shape returned by
/// `relations_from`/`relations_to`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationEdge {
    pub relation: Relation,
    pub noun: crate::noun::Noun,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_is_clamped_into_unit_interval() {
        let r = Relation::new("a", RelationType::Causes, "b", 1.5);
        assert_eq!(r.weight, 1.0);
        let r = Relation::new("a", RelationType::Causes, "b", -0.2);
        assert_eq!(r.weight, 0.0);
    }

    #[test]
    fn transitive_set_matches_spec() {
        assert!(RelationType::IsA.is_transitive());
        assert!(RelationType::Causes.is_transitive());
        assert!(RelationType::Requires.is_transitive());
        assert!(RelationType::PartOf.is_transitive());
        assert!(RelationType::Precedes.is_transitive());
        assert!(!RelationType::Opposes.is_transitive());
        assert!(!RelationType::Equals.is_transitive());
    }
}
