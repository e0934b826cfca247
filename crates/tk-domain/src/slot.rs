//! Working-memory slots: the tagged, transient records demons exchange.
//!
//! `Slot::content` is a tagged variant indexed by [`SlotTag`], one variant
//! per entry in the recognized tag vocabulary. A slot written with a tag
//! outside that vocabulary carries [`SlotContent::Raw`] so forward-looking
//! demons can still round-trip it through JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::{Intent, Subject};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    #[serde(default)]
    pub noun_id: Option<String>,
    pub tag: SlotTag,
    pub content: SlotContent,
    pub confidence: f64,
    pub source_demon: String,
    /// `0` means "lives to end of turn" and is untouched by tick decay.
    pub ttl: u32,
    pub created_at: DateTime<Utc>,
}

impl Slot {
    pub fn new(source_demon: impl Into<String>, tag: SlotTag, content: SlotContent, confidence: f64, ttl: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            noun_id: None,
            tag,
            content,
            confidence: confidence.clamp(0.0, 1.0),
            source_demon: source_demon.into(),
            ttl,
            created_at: Utc::now(),
        }
    }
}

/// The closed vocabulary of semantic roles slots carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotTag {
    RawInput,
    Intent,
    Subject,
    NounPhrase,
    QuestionFocus,
    Relation,
    ContextFact,
    Hierarchy,
    InferredRelation,
    Contradiction,
    ClaimAssessment,
    UnknownConcepts,
    Decomposition,
    Prerequisites,
    KnowledgeGaps,
    Examples,
    SolutionSteps,
    SimplificationNeeded,
    Analogy,
    FuzzyMatch,
    Response,
    StudentTopic,
    StudentConfusion,
}

impl SlotTag {
    /// Tags swept away at the end of every turn (see orchestrator post-turn
    /// cleanup). `Response`, `StudentTopic`, and `StudentConfusion` are
    /// deliberately excluded — they persist across turns until TTL expiry.
    pub const EPHEMERAL: &'static [SlotTag] = &[
        SlotTag::RawInput,
        SlotTag::Intent,
        SlotTag::NounPhrase,
        SlotTag::QuestionFocus,
        SlotTag::Relation,
        SlotTag::ContextFact,
        SlotTag::Hierarchy,
        SlotTag::InferredRelation,
        SlotTag::Contradiction,
        SlotTag::ClaimAssessment,
        SlotTag::UnknownConcepts,
        SlotTag::Decomposition,
        SlotTag::Prerequisites,
        SlotTag::KnowledgeGaps,
        SlotTag::Examples,
        SlotTag::SolutionSteps,
        SlotTag::SimplificationNeeded,
        SlotTag::Analogy,
        SlotTag::FuzzyMatch,
    ];

    pub fn is_ephemeral(self) -> bool {
        Self::EPHEMERAL.contains(&self)
    }
}

/// Payload carried by a slot. One variant per [`SlotTag`], plus a fallback
/// for tags not yet recognized by this build (see module docs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SlotContent {
    RawInput { text: String },
    Intent { intent: Intent },
    Subject { subject: Subject },
    NounPhrase { phrase: String },
    QuestionFocus { focus: String },
    Relation(RelationFact),
    ContextFact(RelationFact),
    Hierarchy(RelationFact),
    InferredRelation(RelationFact),
    Contradiction(ContradictionFact),
    ClaimAssessment(ClaimAssessmentFact),
    UnknownConcepts { labels: Vec<String> },
    Decomposition(DecompositionFact),
    Prerequisites(PrerequisitesFact),
    KnowledgeGaps { gaps: Vec<String> },
    Examples { items: Vec<String> },
    SolutionSteps { steps: Vec<String> },
    SimplificationNeeded { concept: String },
    Analogy(AnalogyFact),
    FuzzyMatch { query: String, resolved: String },
    Response { text: String },
    StudentTopic { topic: String },
    StudentConfusion { topic: String },
    /// Unrecognized-tag fallback, kept for forward compatibility.
    Raw(serde_json::Value),
}

/// A resolved graph edge carried into working memory (used for `relation`,
/// `context_fact`, `hierarchy`, and `inferred_relation` slots alike).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationFact {
    pub from: String,
    pub kind: crate::relation::RelationType,
    pub to: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContradictionFact {
    pub concept: String,
    pub claim1: String,
    pub claim2: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimAssessmentFact {
    pub supported: Vec<String>,
    pub weak: Vec<String>,
    pub unsupported: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DecompositionFact {
    pub concept: String,
    /// Outgoing `part_of`/`has`/`contains` targets.
    pub parts: Vec<String>,
    /// Incoming `part_of` sources (things this concept is part of... in
    /// reverse: things that decompose *into* it).
    pub incoming_parts: Vec<String>,
    /// Incoming `example_of` sources.
    pub incoming_examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PrerequisitesFact {
    pub items: Vec<String>,
    pub gaps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalogyFact {
    pub concept: String,
    pub analog: String,
    pub confidence: f64,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub shared_types: Vec<String>,
    #[serde(default)]
    pub mapping: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_tags_exclude_retained_ones() {
        assert!(SlotTag::Relation.is_ephemeral());
        assert!(SlotTag::Contradiction.is_ephemeral());
        assert!(!SlotTag::Response.is_ephemeral());
        assert!(!SlotTag::StudentTopic.is_ephemeral());
        assert!(!SlotTag::StudentConfusion.is_ephemeral());
    }

    #[test]
    fn slot_confidence_is_clamped() {
        let s = Slot::new("parse", SlotTag::Intent, SlotContent::Intent { intent: Intent::Question }, 3.0, 0);
        assert_eq!(s.confidence, 1.0);
    }
}
