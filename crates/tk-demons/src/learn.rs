//! `learn` — the only demon allowed to mutate the persistent graph. Fired
//! exactly once per turn by the orchestrator, after a response has already
//! been produced.

use std::sync::OnceLock;

use regex::Regex;
use tk_domain::relation::RelationType;
use tk_domain::slot::{RelationFact, Slot, SlotContent, SlotTag};
use tk_domain::{noun::NounType, Intent, Subject};
use tk_graph::GraphStore;
use tk_memory::MemoryView;

use crate::traits::{Action, Demon, DemonOutput, Trigger};

pub struct Learn;

const ID: &str = "learn";

const SUBJECT_BUCKET_NAMES: &[&str] =
    &["mathematics", "physics", "chemistry", "biology", "history", "language", "computer_science", "geography", "economics", "general"];

/// Suffix heuristics for noun-type inference on persistence. `-ity` is
/// deliberately left out of the property list: common science nouns like
/// "gravity", "velocity", and "density" all end in it, and treating them as
/// `property` rather than `concept` is wrong far more often than right.
const PROCESS_SUFFIXES: &[&str] = &["ing", "tion", "sis", "ment"];
const PROPERTY_SUFFIXES: &[&str] = &["ness", "ful", "ous", "ive", "able"];

fn ends_with_any(label: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|s| label.ends_with(s))
}

fn is_numeric_or_bool(label: &str) -> bool {
    label.parse::<f64>().is_ok() || matches!(label, "true" | "false" | "yes" | "no")
}

fn infer_noun_type(label: &str) -> NounType {
    if is_numeric_or_bool(label) {
        NounType::Value
    } else if ends_with_any(label, PROCESS_SUFFIXES) {
        NounType::Process
    } else if ends_with_any(label, PROPERTY_SUFFIXES) {
        NounType::Property
    } else if SUBJECT_BUCKET_NAMES.contains(&label) {
        NounType::Context
    } else {
        NounType::Concept
    }
}

fn regex(slot: &OnceLock<Regex>, pattern: &str) -> &Regex {
    slot.get_or_init(|| Regex::new(pattern).expect("static pattern is valid"))
}

/// `(X, relation, Y)` triples found by re-scanning the raw input. `produces`
/// is folded in alongside `causes` but resolves to [`RelationType::Produces`]
/// — that variant exists in the domain model for exactly this distinction,
/// which the literal pattern family in the spec text doesn't otherwise
/// reach.
fn scan_raw_input(raw: &str) -> Vec<(String, RelationType, String)> {
    let text = raw.trim().trim_end_matches(&['?', '.', '!'][..]).to_lowercase();
    let mut out = Vec::new();

    static CAUSES: OnceLock<Regex> = OnceLock::new();
    if let Some(c) = regex(&CAUSES, r"^(.+?)\s+(causes|cause|produces|produce|leads to|results in)\s+(.+)$").captures(&text) {
        let kind = if c[2].contains("produc") { RelationType::Produces } else { RelationType::Causes };
        out.push((c[1].trim().to_string(), kind, c[3].trim().to_string()));
    }

    static IS_A: OnceLock<Regex> = OnceLock::new();
    if let Some(c) = regex(&IS_A, r"^(.+?)\s+is\s+an?\s+(.+)$").captures(&text) {
        out.push((c[1].trim().to_string(), RelationType::IsA, c[2].trim().to_string()));
    }

    static PART_OF: OnceLock<Regex> = OnceLock::new();
    if let Some(c) = regex(&PART_OF, r"^(.+?)\s+is\s+part\s+of\s+(.+)$").captures(&text) {
        out.push((c[1].trim().to_string(), RelationType::PartOf, c[2].trim().to_string()));
    }

    static HAS: OnceLock<Regex> = OnceLock::new();
    if let Some(c) = regex(&HAS, r"^(.+?)\s+(?:has|contains)\s+(.+)$").captures(&text) {
        out.push((c[1].trim().to_string(), RelationType::Has, c[2].trim().to_string()));
    }

    static REQUIRES: OnceLock<Regex> = OnceLock::new();
    if let Some(c) = regex(&REQUIRES, r"^(.+?)\s+(?:requires|needs)\s+(.+)$").captures(&text) {
        out.push((c[1].trim().to_string(), RelationType::Requires, c[2].trim().to_string()));
    }

    static EQUALS: OnceLock<Regex> = OnceLock::new();
    if let Some(c) = regex(&EQUALS, r"^(.+?)\s+(?:equals|is\s+equal\s+to|=)\s+(.+)$").captures(&text) {
        out.push((c[1].trim().to_string(), RelationType::Equals, c[2].trim().to_string()));
    }

    static USED_FOR: OnceLock<Regex> = OnceLock::new();
    if let Some(c) = regex(&USED_FOR, r"^(.+?)\s+is\s+used\s+(?:for|to)\s+(.+)$").captures(&text) {
        out.push((c[1].trim().to_string(), RelationType::UsedFor, c[2].trim().to_string()));
    }

    out
}

impl Demon for Learn {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Learn"
    }

    fn description(&self) -> &'static str {
        "Persists this turn's noun phrases, relations, and raw-input matches into the graph."
    }

    fn triggers(&self) -> &'static [Trigger] {
        // `tick_interval(5)` is wired but unreachable under chain-only
        // scheduling — the orchestrator fires this demon explicitly, once,
        // after every turn.
        &[Trigger::TagPresent(SlotTag::Response), Trigger::TickInterval(5)]
    }

    fn run(&self, view: &MemoryView, graph: &GraphStore) -> DemonOutput {
        let intent = view.latest_by_tag(SlotTag::Intent).and_then(|s| match &s.content {
            SlotContent::Intent { intent } => Some(*intent),
            _ => None,
        });

        // A greeting carries no topical content worth grounding in the graph.
        if intent == Some(Intent::Greeting) {
            return DemonOutput::empty();
        }

        let subject = view
            .latest_by_tag(SlotTag::Subject)
            .and_then(|s| match &s.content {
                SlotContent::Subject { subject } => Some(*subject),
                _ => None,
            })
            .unwrap_or_default();

        let mut actions = Vec::new();
        let mut nouns_written = 0usize;
        let mut relations_written = 0usize;
        let mut link_failures = 0usize;

        let noun_phrases: Vec<String> = view
            .find_by_tag(SlotTag::NounPhrase)
            .into_iter()
            .filter_map(|s| match &s.content {
                SlotContent::NounPhrase { phrase } => Some(phrase.clone()),
                _ => None,
            })
            .collect();

        for phrase in &noun_phrases {
            match graph.ensure_noun(phrase, infer_noun_type(phrase), Default::default()) {
                Ok(_) => nouns_written += 1,
                Err(e) => {
                    link_failures += 1;
                    tracing::warn!(noun = %phrase, error = %e, "learn: failed to persist noun phrase");
                }
            }
        }

        if let Err(e) = graph.ensure_noun(subject.as_str(), NounType::Context, Default::default()) {
            link_failures += 1;
            tracing::warn!(subject = %subject, error = %e, "learn: failed to persist subject noun");
        }

        let raw_text = view.latest_by_tag(SlotTag::RawInput).and_then(|s| match &s.content {
            SlotContent::RawInput { text } => Some(text.clone()),
            _ => None,
        });
        if let Some(raw) = raw_text {
            for (from, kind, to) in scan_raw_input(&raw) {
                match graph.link(&from, kind, &to, 0.6, Some(subject.as_str())) {
                    Ok(_) => relations_written += 1,
                    Err(e) => {
                        link_failures += 1;
                        actions.push(Action::Log(format!("link failed: {from} {kind} {to}: {e}")));
                        tracing::warn!(from = %from, to = %to, kind = %kind, error = %e, "learn: link failed");
                    }
                }
            }
        }

        for slot in view.find_by_tag(SlotTag::Relation) {
            if slot.confidence < 0.5 {
                continue;
            }
            let SlotContent::Relation(RelationFact { from, kind, to, weight }) = &slot.content else { continue };
            match graph.link(from, *kind, to, *weight, Some(subject.as_str())) {
                Ok(_) => relations_written += 1,
                Err(e) => {
                    link_failures += 1;
                    tracing::warn!(from = %from, to = %to, error = %e, "learn: failed to persist relation slot");
                }
            }
        }

        let topic = view
            .latest_by_tag(SlotTag::QuestionFocus)
            .and_then(|s| match &s.content {
                SlotContent::QuestionFocus { focus } => Some(focus.clone()),
                _ => None,
            })
            .or_else(|| noun_phrases.first().cloned())
            .unwrap_or_else(|| subject.as_str().to_string());

        let mut write = vec![Slot::new(ID, SlotTag::StudentTopic, SlotContent::StudentTopic { topic: topic.clone() }, 0.6, 30)];
        if intent == Some(Intent::Confusion) {
            write.push(Slot::new(ID, SlotTag::StudentConfusion, SlotContent::StudentConfusion { topic: topic.clone() }, 0.6, 50));
        }

        if !view.has_tag(SlotTag::StudentTopic) {
            if let Err(e) = graph.link("student", RelationType::RelatesTo, &topic, 0.5, Some("currently_studying")) {
                link_failures += 1;
                tracing::warn!(topic = %topic, error = %e, "learn: failed to record currently_studying edge");
            }
        }

        tk_domain::trace::TraceEvent::LearnPersisted { nouns_written, relations_written, link_failures }.emit();

        DemonOutput { write, evict: Vec::new(), focus: None, actions, chain: Vec::new() }
    }
}
