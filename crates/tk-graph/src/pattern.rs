//! Query/traversal shapes exchanged with the graph store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tk_domain::{Noun, NounType, Relation, RelationType};

/// A noun-side constraint within a [`QueryPattern`]. Both fields are
/// optional; an empty pattern matches every noun.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NounPattern {
    pub label: Option<String>,
    pub kind: Option<NounType>,
}

impl NounPattern {
    pub fn matches(&self, noun: &Noun) -> bool {
        if let Some(label) = &self.label {
            if noun.label != tk_domain::noun::normalize_label(label) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if noun.kind != kind {
                return false;
            }
        }
        true
    }
}

/// `{from?: {label?, type?}, relation?, to?: {label?, type?}}` — the pattern
/// family `query` accepts. Results are ordered by descending weight and
/// bounded by a caller-supplied limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryPattern {
    pub from: Option<NounPattern>,
    pub relation: Option<RelationType>,
    pub to: Option<NounPattern>,
}

/// A fully-resolved `(from, relation, to)` match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triple {
    pub from: Noun,
    pub relation: Relation,
    pub to: Noun,
}

/// One entry of a bounded BFS traversal from a start noun.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraverseNode {
    pub noun: Noun,
    pub depth: u32,
    /// Noun ids from the start noun to this one, inclusive of both ends.
    pub path: Vec<String>,
}

pub type TraverseResult = HashMap<String, TraverseNode>;

/// Summary counters returned by `GraphStore::stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub nouns: usize,
    pub relations: usize,
    /// Relation count broken down by type (`as_str()` keyed).
    pub types: HashMap<String, usize>,
}
