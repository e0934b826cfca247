//! `relate` — resolves the concepts `parse` found against the persistent
//! graph and surfaces whatever is already known about them.

use std::collections::HashSet;

use tk_domain::relation::RelationType;
use tk_domain::slot::{RelationFact, Slot, SlotContent, SlotTag};
use tk_domain::Noun;
use tk_graph::GraphStore;
use tk_memory::MemoryView;

use crate::traits::{Demon, DemonOutput, Trigger};

pub struct Relate;

const ID: &str = "relate";

/// How many outgoing edges of a resolved noun are surfaced as `relation`
/// slots. The spec's literal rule ("for every ordered pair of resolved
/// nouns, emit a relation slot for each edge between them") degenerates to
/// nothing when only one noun resolves — e.g. a bare "what is x?" query
/// against `x equals 5` — so this surfaces every outgoing edge of each
/// resolved noun, which subsumes the pairwise case and lets a singleton
/// resolution still carry its own edges into the corpus `infer` reads.
const MAX_RELATION_EDGES_PER_NOUN: usize = 20;
const MAX_HIERARCHY_DEPTH: u32 = 5;
const MAX_CONTEXT_FACTS: usize = 10;

impl Demon for Relate {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Relate"
    }

    fn description(&self) -> &'static str {
        "Resolves noun phrases against the graph and loads known relations and hierarchy."
    }

    fn triggers(&self) -> &'static [Trigger] {
        &[Trigger::ChainFrom("parse"), Trigger::TagPresent(SlotTag::NounPhrase)]
    }

    fn run(&self, view: &MemoryView, graph: &GraphStore) -> DemonOutput {
        let mut candidates: Vec<String> = view
            .find_by_tag(SlotTag::NounPhrase)
            .into_iter()
            .filter_map(|s| match &s.content {
                SlotContent::NounPhrase { phrase } => Some(phrase.clone()),
                _ => None,
            })
            .collect();
        let raw_input = view.latest_by_tag(SlotTag::RawInput).and_then(|s| match &s.content {
            SlotContent::RawInput { text } => Some(text.clone()),
            _ => None,
        });

        if let Some(focus_slot) = view.latest_by_tag(SlotTag::QuestionFocus) {
            if let SlotContent::QuestionFocus { focus } = &focus_slot.content {
                // `extract_question_focus` falls back to the whole input when no
                // pattern matches (nlp.rs). That fallback is a sentence, not a
                // noun — resolving or fuzzy-matching it against the graph and
                // declaring it "unknown" would bury the noun phrases that did
                // resolve (see decompose/question's hierarchy-referencing
                // branches). Skip it here; the individual noun phrases already
                // carry the real candidates.
                let is_whole_input_fallback = raw_input
                    .as_deref()
                    .map(|raw| raw.trim().trim_end_matches(['?', '.', '!']).trim().eq_ignore_ascii_case(focus.trim()))
                    .unwrap_or(false);
                if !is_whole_input_fallback && !candidates.contains(focus) {
                    candidates.push(focus.clone());
                }
            }
        }

        let mut write = Vec::new();
        let mut resolved: Vec<Noun> = Vec::new();
        let mut unresolved: Vec<String> = Vec::new();

        for label in &candidates {
            match graph.find(label) {
                Some(noun) => resolved.push(noun),
                None => {
                    let hits = graph.search(label, 1);
                    match hits.into_iter().next() {
                        Some(noun) => {
                            if noun.label != *label {
                                write.push(Slot::new(
                                    ID,
                                    SlotTag::FuzzyMatch,
                                    SlotContent::FuzzyMatch { query: label.clone(), resolved: noun.label.clone() },
                                    0.6,
                                    10,
                                ));
                            }
                            resolved.push(noun);
                        }
                        None => unresolved.push(label.clone()),
                    }
                }
            }
        }

        let mut seen_ids: HashSet<String> = HashSet::new();
        resolved.retain(|n| seen_ids.insert(n.id.clone()));

        let mut relation_count = 0usize;
        for noun in &resolved {
            for edge in graph.relations_from(&noun.id, None).into_iter().take(MAX_RELATION_EDGES_PER_NOUN) {
                write.push(Slot::new(
                    ID,
                    SlotTag::Relation,
                    SlotContent::Relation(RelationFact {
                        from: noun.label.clone(),
                        kind: edge.relation.kind,
                        to: edge.noun.label.clone(),
                        weight: edge.relation.weight,
                    }),
                    0.9,
                    10,
                ));
                relation_count += 1;
            }

            let mut current = noun.clone();
            for _ in 0..MAX_HIERARCHY_DEPTH {
                let ancestors = graph.relations_from(&current.id, Some(RelationType::IsA));
                if ancestors.is_empty() {
                    break;
                }
                for edge in &ancestors {
                    write.push(Slot::new(
                        ID,
                        SlotTag::Hierarchy,
                        SlotContent::Hierarchy(RelationFact {
                            from: current.label.clone(),
                            kind: RelationType::IsA,
                            to: edge.noun.label.clone(),
                            weight: edge.relation.weight,
                        }),
                        0.9,
                        10,
                    ));
                }
                current = ancestors[0].noun.clone();
            }
        }

        if !unresolved.is_empty() {
            write.push(Slot::new(ID, SlotTag::UnknownConcepts, SlotContent::UnknownConcepts { labels: unresolved.clone() }, 0.7, 10));
        }

        if let Some(subject_slot) = view.latest_by_tag(SlotTag::Subject) {
            if let SlotContent::Subject { subject } = &subject_slot.content {
                if let Some(subject_noun) = graph.find(subject.as_str()) {
                    for edge in graph.relations_from(&subject_noun.id, None).into_iter().take(MAX_CONTEXT_FACTS) {
                        write.push(Slot::new(
                            ID,
                            SlotTag::ContextFact,
                            SlotContent::ContextFact(RelationFact {
                                from: subject_noun.label.clone(),
                                kind: edge.relation.kind,
                                to: edge.noun.label.clone(),
                                weight: edge.relation.weight,
                            }),
                            0.4,
                            10,
                        ));
                    }
                }
            }
        }

        let mut chain = Vec::new();
        if relation_count > 0 {
            chain.push("infer".to_string());
        }
        if !unresolved.is_empty() {
            chain.push("question".to_string());
        }
        if !resolved.is_empty() && relation_count == 0 {
            chain.push("analogize".to_string());
        }

        DemonOutput { write, evict: Vec::new(), focus: None, actions: Vec::new(), chain }
    }
}
