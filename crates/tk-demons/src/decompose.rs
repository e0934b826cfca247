//! `decompose` — breaks the turn's target concept into parts,
//! prerequisites, and examples, combining whatever the graph already knows
//! with a fixed per-subject heuristic step list.

use std::collections::HashSet;

use tk_domain::relation::RelationType;
use tk_domain::slot::{DecompositionFact, PrerequisitesFact, Slot, SlotContent, SlotTag};
use tk_domain::{Intent, Subject};
use tk_graph::GraphStore;
use tk_memory::MemoryView;

use crate::traits::{Demon, DemonOutput, Trigger};

pub struct Decompose;

const ID: &str = "decompose";

fn target_concept(view: &MemoryView) -> Option<String> {
    if let Some(slot) = view.latest_by_tag(SlotTag::QuestionFocus) {
        if let SlotContent::QuestionFocus { focus } = &slot.content {
            return Some(focus.clone());
        }
    }
    view.latest_by_tag(SlotTag::NounPhrase).and_then(|s| match &s.content {
        SlotContent::NounPhrase { phrase } => Some(phrase.clone()),
        _ => None,
    })
}

fn known_concepts(view: &MemoryView) -> HashSet<String> {
    let mut known = HashSet::new();
    for slot in view.find_by_tag(SlotTag::NounPhrase) {
        if let SlotContent::NounPhrase { phrase } = &slot.content {
            known.insert(phrase.clone());
        }
    }
    for slot in view.find_by_tag(SlotTag::Hierarchy) {
        if let SlotContent::Hierarchy(fact) = &slot.content {
            known.insert(fact.from.clone());
            known.insert(fact.to.clone());
        }
    }
    known
}

/// Canonical ordered step lists, independent of graph content. The
/// fallback applies to any subject without its own list.
pub(crate) fn heuristic_steps(subject: Subject) -> &'static [&'static str] {
    match subject {
        Subject::Mathematics => &[
            "identify what quantity you're solving for",
            "write down what you already know as equations",
            "choose an operation or identity that connects them",
            "work through the algebra one step at a time",
            "check the answer against the original problem",
        ],
        Subject::Physics => &[
            "identify the system and what's acting on it",
            "list the known quantities and their units",
            "pick the law or principle that applies",
            "set up the equation and solve for the unknown",
            "sanity-check the magnitude and units of the result",
        ],
        Subject::Biology => &[
            "name the structure or process involved",
            "describe its role in the larger system",
            "trace the sequence of steps or stages",
            "connect it to a concrete, observable example",
        ],
        Subject::History => &[
            "place the event on a timeline",
            "identify the people and groups involved",
            "establish the causes that led to it",
            "trace its immediate and longer-term consequences",
        ],
        Subject::Language => &[
            "identify the part of speech or grammatical role",
            "find the rule that governs its use",
            "compare it against a correct example",
            "try constructing a new sentence with it",
        ],
        Subject::ComputerScience => &[
            "state the problem input and desired output",
            "describe the approach in plain language first",
            "translate each step into code",
            "trace through a small example by hand",
            "check edge cases",
        ],
        _ => &[
            "break the idea into its smallest parts",
            "connect each part to something already familiar",
            "walk through one concrete example",
            "restate the whole idea in your own words",
        ],
    }
}

impl Demon for Decompose {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Decompose"
    }

    fn description(&self) -> &'static str {
        "Breaks the target concept into parts, prerequisites, examples, and a heuristic step list."
    }

    fn triggers(&self) -> &'static [Trigger] {
        &[Trigger::ChainFrom("infer"), Trigger::ChainFrom("parse"), Trigger::TagPresent(SlotTag::Intent)]
    }

    fn run(&self, view: &MemoryView, graph: &GraphStore) -> DemonOutput {
        let Some(concept) = target_concept(view) else {
            return DemonOutput::empty();
        };
        let subject = view
            .latest_by_tag(SlotTag::Subject)
            .and_then(|s| match &s.content {
                SlotContent::Subject { subject } => Some(*subject),
                _ => None,
            })
            .unwrap_or_default();
        let intent = view.latest_by_tag(SlotTag::Intent).and_then(|s| match &s.content {
            SlotContent::Intent { intent } => Some(*intent),
            _ => None,
        });

        let mut write = Vec::new();
        let mut decomposition = DecompositionFact { concept: concept.clone(), ..Default::default() };
        let mut prerequisite_labels = Vec::new();
        let mut examples = Vec::new();

        if let Some(noun) = graph.find(&concept) {
            for kind in [RelationType::PartOf, RelationType::Has, RelationType::Contains] {
                decomposition.parts.extend(graph.relations_from(&noun.id, Some(kind)).into_iter().map(|e| e.noun.label));
            }
            prerequisite_labels.extend(graph.relations_from(&noun.id, Some(RelationType::Requires)).into_iter().map(|e| e.noun.label));
            examples.extend(graph.relations_from(&noun.id, Some(RelationType::ExampleOf)).into_iter().map(|e| e.noun.label));
            decomposition.incoming_parts.extend(graph.relations_to(&noun.id, Some(RelationType::PartOf)).into_iter().map(|e| e.noun.label));
            decomposition.incoming_examples.extend(graph.relations_to(&noun.id, Some(RelationType::ExampleOf)).into_iter().map(|e| e.noun.label));
        }

        let known = known_concepts(view);
        let gaps: Vec<String> = prerequisite_labels.iter().filter(|p| !known.contains(*p)).cloned().collect();

        let steps: Vec<String> = heuristic_steps(subject).iter().map(|s| s.to_string()).collect();

        write.push(Slot::new(ID, SlotTag::Decomposition, SlotContent::Decomposition(decomposition), 0.7, 10));
        write.push(Slot::new(
            ID,
            SlotTag::Prerequisites,
            SlotContent::Prerequisites(PrerequisitesFact { items: prerequisite_labels.clone(), gaps: gaps.clone() }),
            0.7,
            10,
        ));
        if !gaps.is_empty() {
            write.push(Slot::new(ID, SlotTag::KnowledgeGaps, SlotContent::KnowledgeGaps { gaps }, 0.7, 10));
        }
        if !examples.is_empty() {
            write.push(Slot::new(ID, SlotTag::Examples, SlotContent::Examples { items: examples }, 0.6, 10));
        }
        write.push(Slot::new(ID, SlotTag::SolutionSteps, SlotContent::SolutionSteps { steps }, 0.6, 10));

        let confusion = matches!(intent, Some(Intent::Confusion));
        if confusion {
            write.push(Slot::new(ID, SlotTag::SimplificationNeeded, SlotContent::SimplificationNeeded { concept: concept.clone() }, 0.8, 0));
        }

        let mut chain = Vec::new();
        if confusion {
            chain.push("analogize".to_string());
        }
        chain.push("question".to_string());

        DemonOutput { write, evict: Vec::new(), focus: None, actions: Vec::new(), chain }
    }
}
