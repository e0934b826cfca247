//! `infer` — runs four fixed rules over the relations `relate` surfaced:
//! bounded transitive closure, property inheritance, contradiction
//! detection, and (on a claim) a supported/weak/unsupported assessment.

use std::collections::HashMap;

use tk_domain::relation::RelationType;
use tk_domain::slot::{ClaimAssessmentFact, ContradictionFact, RelationFact, Slot, SlotContent, SlotTag};
use tk_domain::Intent;
use tk_graph::GraphStore;
use tk_memory::MemoryView;

use crate::traits::{Demon, DemonOutput, Trigger};

pub struct Infer;

const ID: &str = "infer";

fn corpus_edges(view: &MemoryView) -> Vec<RelationFact> {
    let mut edges = Vec::new();
    for tag in [SlotTag::Relation, SlotTag::ContextFact] {
        for slot in view.find_by_tag(tag) {
            match &slot.content {
                SlotContent::Relation(fact) | SlotContent::ContextFact(fact) => edges.push(fact.clone()),
                _ => {}
            }
        }
    }
    edges
}

fn hierarchy_edges(view: &MemoryView) -> Vec<RelationFact> {
    view.find_by_tag(SlotTag::Hierarchy)
        .into_iter()
        .filter_map(|s| match &s.content {
            SlotContent::Hierarchy(fact) => Some(fact.clone()),
            _ => None,
        })
        .collect()
}

/// Rule 1: one-pass bounded transitive closure over `{is_a, causes,
/// requires, part_of, precedes}`.
fn transitive_closure(edges: &[RelationFact], hierarchy: &[RelationFact]) -> Vec<RelationFact> {
    let mut all = edges.to_vec();
    all.extend(hierarchy.iter().cloned());

    let mut inferred = Vec::new();
    let mut seen: HashMap<(String, RelationType, String), ()> = HashMap::new();
    let existing: HashMap<(String, RelationType, String), ()> =
        all.iter().map(|e| ((e.from.clone(), e.kind, e.to.clone()), ())).collect();

    for t in RelationType::TRANSITIVE {
        let hop1: Vec<&RelationFact> = all.iter().filter(|e| e.kind == t).collect();
        for e1 in &hop1 {
            for e2 in &hop1 {
                if e1.to != e2.from {
                    continue;
                }
                if e1.from == e2.to {
                    continue;
                }
                let key = (e1.from.clone(), t, e2.to.clone());
                if existing.contains_key(&key) || seen.contains_key(&key) {
                    continue;
                }
                seen.insert(key, ());
                inferred.push(RelationFact { from: e1.from.clone(), kind: t, to: e2.to.clone(), weight: e1.weight.min(e2.weight) * 0.9 });
            }
        }
    }
    inferred
}

/// Rule 2: `A is_a B` plus `B has/requires P` implies `A has/requires P`.
fn property_inheritance(edges: &[RelationFact], hierarchy: &[RelationFact]) -> Vec<RelationFact> {
    let mut out = Vec::new();
    for isa in hierarchy.iter().filter(|e| e.kind == RelationType::IsA) {
        for prop in edges.iter().filter(|e| e.from == isa.to && matches!(e.kind, RelationType::Has | RelationType::Requires)) {
            out.push(RelationFact { from: isa.from.clone(), kind: prop.kind, to: prop.to.clone(), weight: isa.weight.min(prop.weight) * 0.85 });
        }
    }
    out
}

/// Rule 3: contradictory `equals` edges sharing a `from`. If the two
/// targets are linked by an `opposes` edge in the graph, the reason names
/// that explicitly; otherwise it states the bare inequality.
fn contradictions(edges: &[RelationFact], graph: &GraphStore) -> Vec<ContradictionFact> {
    let mut by_from: HashMap<String, Vec<String>> = HashMap::new();
    for e in edges.iter().filter(|e| e.kind == RelationType::Equals) {
        let targets = by_from.entry(e.from.clone()).or_default();
        if !targets.contains(&e.to) {
            targets.push(e.to.clone());
        }
    }

    let mut out = Vec::new();
    for (concept, targets) in by_from {
        if targets.len() < 2 {
            continue;
        }
        for i in 0..targets.len() {
            for j in (i + 1)..targets.len() {
                let (to1, to2) = (&targets[i], &targets[j]);
                let opposed = graph
                    .find(to1)
                    .zip(graph.find(to2))
                    .map(|(a, b)| graph.relations_from(&a.id, Some(RelationType::Opposes)).iter().any(|e| e.noun.id == b.id))
                    .unwrap_or(false);
                let reason = if opposed {
                    format!("{to1} and {to2} are opposites, so {concept} cannot equal both")
                } else {
                    format!("{concept} cannot equal both {to1} and {to2}")
                };
                out.push(ContradictionFact { concept: concept.clone(), claim1: format!("{concept} equals {to1}"), claim2: format!("{concept} equals {to2}"), reason });
            }
        }
    }
    out
}

/// Rule 4: only runs when the turn's intent is `claim`.
fn claim_assessment(edges: &[RelationFact], hierarchy: &[RelationFact]) -> ClaimAssessmentFact {
    let mut best_weight: HashMap<String, f64> = HashMap::new();
    let mut order = Vec::new();
    for e in edges {
        for label in [&e.from, &e.to] {
            if !best_weight.contains_key(label) {
                order.push(label.clone());
            }
            let entry = best_weight.entry(label.clone()).or_insert(0.0);
            *entry = entry.max(e.weight);
        }
    }
    let in_hierarchy: std::collections::HashSet<&str> =
        hierarchy.iter().flat_map(|h| [h.from.as_str(), h.to.as_str()]).collect();

    let mut supported = Vec::new();
    let mut weak = Vec::new();
    let mut unsupported = Vec::new();
    for label in &order {
        let w = best_weight[label];
        if w > 0.5 {
            supported.push(label.clone());
        } else if w > 0.3 || in_hierarchy.contains(label.as_str()) {
            weak.push(label.clone());
        } else {
            unsupported.push(label.clone());
        }
    }

    let confidence = if order.is_empty() { 0.0 } else { supported.len() as f64 / order.len() as f64 };
    ClaimAssessmentFact { supported, weak, unsupported, confidence }
}

impl Demon for Infer {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Infer"
    }

    fn description(&self) -> &'static str {
        "Applies transitive closure, property inheritance, contradiction detection, and claim assessment."
    }

    fn triggers(&self) -> &'static [Trigger] {
        &[Trigger::ChainFrom("relate"), Trigger::TagPresent(SlotTag::Relation)]
    }

    fn run(&self, view: &MemoryView, graph: &GraphStore) -> DemonOutput {
        let edges = corpus_edges(view);
        let hierarchy = hierarchy_edges(view);

        let mut write = Vec::new();

        let inferred = transitive_closure(&edges, &hierarchy);
        for fact in &inferred {
            write.push(Slot::new(ID, SlotTag::InferredRelation, SlotContent::InferredRelation(fact.clone()), fact.weight, 10));
        }

        let inherited = property_inheritance(&edges, &hierarchy);
        for fact in &inherited {
            write.push(Slot::new(ID, SlotTag::InferredRelation, SlotContent::InferredRelation(fact.clone()), fact.weight, 10));
        }

        let contradiction_facts = contradictions(&edges, graph);
        for fact in &contradiction_facts {
            write.push(Slot::new(ID, SlotTag::Contradiction, SlotContent::Contradiction(fact.clone()), 0.9, 0));
        }

        let is_claim = view.latest_by_tag(SlotTag::Intent).is_some_and(|s| matches!(&s.content, SlotContent::Intent { intent } if *intent == Intent::Claim));
        if is_claim {
            let assessment = claim_assessment(&edges, &hierarchy);
            write.push(Slot::new(ID, SlotTag::ClaimAssessment, SlotContent::ClaimAssessment(assessment), 0.7, 10));
        }

        let has_inference = !inferred.is_empty() || !inherited.is_empty();
        let chain = if has_inference { vec!["decompose".to_string(), "question".to_string()] } else { vec!["question".to_string()] };

        DemonOutput { write, evict: Vec::new(), focus: None, actions: Vec::new(), chain }
    }
}
