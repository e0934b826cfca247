//! `analogize` — explains a concept by comparison, either from a small
//! built-in table of well-known analogies or by finding other graph nouns
//! with a structurally similar relation pattern.

use std::collections::HashSet;

use tk_domain::relation::RelationType;
use tk_domain::slot::{AnalogyFact, Slot, SlotContent, SlotTag};
use tk_graph::pattern::QueryPattern;
use tk_graph::GraphStore;
use tk_memory::MemoryView;

use crate::traits::{Demon, DemonOutput, Trigger};

pub struct Analogize;

const ID: &str = "analogize";
const MIN_STRUCTURAL_SCORE: f64 = 0.3;
const MAX_STRUCTURAL_PER_CONCEPT: usize = 2;

/// Well-known labels with a pre-written, concrete explanation. Emitted at a
/// fixed confidence since these never come from the graph.
const BOOTSTRAPPED: &[(&str, &str, &str)] = &[
    (
        "electricity",
        "water flowing through pipes",
        "Electricity flows through wires like water flows through pipes. Voltage is like water pressure, current is like the flow rate, and resistance is like a pipe narrowing.",
    ),
    (
        "atom",
        "a miniature solar system",
        "An atom is like a miniature solar system: the nucleus sits at the center like the sun, and electrons orbit around it the way planets orbit the sun.",
    ),
    (
        "cell",
        "a factory",
        "A cell is like a factory: the nucleus is the control office, mitochondria are the power plant, and ribosomes are the assembly lines.",
    ),
    (
        "dna",
        "an instruction manual",
        "DNA is like an instruction manual written in a four-letter alphabet, with each gene a separate set of instructions for building one part of the organism.",
    ),
    (
        "variable",
        "a labeled box",
        "A variable is like a labeled box you can put a value into and take a different value out of later — the label stays the same even as its contents change.",
    ),
    (
        "function",
        "a vending machine",
        "A function is like a vending machine: you put something in, it does a fixed set of steps you never see, and a result comes out the other side.",
    ),
    (
        "evolution",
        "selective breeding stretched over deep time",
        "Evolution is like selective breeding, except nature does the selecting instead of a person, and it plays out over millions of generations instead of a few.",
    ),
    (
        "gravity",
        "a stretched rubber sheet",
        "Gravity is like a heavy ball resting on a stretched rubber sheet: the ball dips the sheet, and anything rolling nearby curves toward it.",
    ),
];

fn bootstrapped(label: &str) -> Option<(&'static str, &'static str)> {
    BOOTSTRAPPED.iter().find(|(key, _, _)| *key == label).map(|(_, analog, explanation)| (*analog, *explanation))
}

fn jaccard(a: &HashSet<RelationType>, b: &HashSet<RelationType>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

fn structural_analogies(concept: &str, graph: &GraphStore) -> Vec<AnalogyFact> {
    let Some(noun) = graph.find(concept) else { return Vec::new() };
    let out_edges = graph.relations_from(&noun.id, None);
    let in_edges = graph.relations_to(&noun.id, None);
    let out_types: HashSet<RelationType> = out_edges.iter().map(|e| e.relation.kind).collect();
    let in_types: HashSet<RelationType> = in_edges.iter().map(|e| e.relation.kind).collect();
    if out_types.is_empty() {
        return Vec::new();
    }

    let mut candidate_labels: Vec<String> = Vec::new();
    for t in &out_types {
        let triples = graph.query(&QueryPattern { from: None, relation: Some(*t), to: None }, 200);
        for triple in triples {
            if triple.from.label != concept && !candidate_labels.contains(&triple.from.label) {
                candidate_labels.push(triple.from.label);
            }
        }
    }

    let mut scored: Vec<(String, f64, Vec<RelationType>, Vec<(String, String)>)> = Vec::new();
    for label in candidate_labels {
        let Some(candidate_noun) = graph.find(&label) else { continue };
        let cand_out = graph.relations_from(&candidate_noun.id, None);
        let cand_in = graph.relations_to(&candidate_noun.id, None);
        let cand_out_types: HashSet<RelationType> = cand_out.iter().map(|e| e.relation.kind).collect();
        let cand_in_types: HashSet<RelationType> = cand_in.iter().map(|e| e.relation.kind).collect();

        let score = 0.6 * jaccard(&out_types, &cand_out_types) + 0.4 * jaccard(&in_types, &cand_in_types);
        if score < MIN_STRUCTURAL_SCORE {
            continue;
        }

        let shared: Vec<RelationType> = out_types.intersection(&cand_out_types).copied().collect();
        let mapping: Vec<(String, String)> = shared
            .iter()
            .filter_map(|t| {
                let a_target = out_edges.iter().find(|e| e.relation.kind == *t).map(|e| e.noun.label.clone());
                let b_target = cand_out.iter().find(|e| e.relation.kind == *t).map(|e| e.noun.label.clone());
                a_target.zip(b_target)
            })
            .collect();

        scored.push((label, score, shared, mapping));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_STRUCTURAL_PER_CONCEPT);

    scored
        .into_iter()
        .map(|(analog, score, shared, mapping)| AnalogyFact {
            concept: concept.to_string(),
            analog,
            confidence: score,
            explanation: None,
            shared_types: shared.iter().map(|t| t.as_str().to_string()).collect(),
            mapping,
        })
        .collect()
}

impl Demon for Analogize {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Analogize"
    }

    fn description(&self) -> &'static str {
        "Produces bootstrapped or structural analogies for the turn's candidate concepts."
    }

    fn triggers(&self) -> &'static [Trigger] {
        &[Trigger::ChainFrom("decompose"), Trigger::ChainFrom("relate"), Trigger::TagPresent(SlotTag::SimplificationNeeded)]
    }

    fn run(&self, view: &MemoryView, graph: &GraphStore) -> DemonOutput {
        let mut candidates = Vec::new();
        if let Some(slot) = view.latest_by_tag(SlotTag::QuestionFocus) {
            if let SlotContent::QuestionFocus { focus } = &slot.content {
                candidates.push(focus.clone());
            }
        }
        for slot in view.find_by_tag(SlotTag::NounPhrase) {
            if let SlotContent::NounPhrase { phrase } = &slot.content {
                if !candidates.contains(phrase) {
                    candidates.push(phrase.clone());
                }
            }
        }

        let mut write = Vec::new();
        for concept in &candidates {
            if let Some((analog, explanation)) = bootstrapped(concept) {
                write.push(Slot::new(
                    ID,
                    SlotTag::Analogy,
                    SlotContent::Analogy(AnalogyFact {
                        concept: concept.clone(),
                        analog: analog.to_string(),
                        confidence: 0.85,
                        explanation: Some(explanation.to_string()),
                        shared_types: Vec::new(),
                        mapping: Vec::new(),
                    }),
                    0.85,
                    10,
                ));
            }

            for fact in structural_analogies(concept, graph) {
                write.push(Slot::new(ID, SlotTag::Analogy, SlotContent::Analogy(fact.clone()), fact.confidence, 10));
            }
        }

        DemonOutput { write, evict: Vec::new(), focus: None, actions: Vec::new(), chain: vec!["question".to_string()] }
    }
}
