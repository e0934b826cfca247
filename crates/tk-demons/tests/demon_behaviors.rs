//! Integration tests for individual demons against a real, tempdir-backed
//! graph store. Each demon is invoked directly through its `Demon::run`
//! with a hand-built `MemoryView`, mirroring how the hypervisor calls it.

use tempfile::TempDir;
use tk_demons::traits::{Action, Demon};
use tk_demons::{analogize::Analogize, decompose::Decompose, infer::Infer, learn::Learn, parse::Parse, question::Question, relate::Relate};
use tk_domain::slot::{Slot, SlotContent, SlotTag};
use tk_domain::{Intent, NounType, RelationType, Subject};
use tk_graph::GraphStore;
use tk_memory::MemoryView;

fn open_store() -> (TempDir, GraphStore) {
    let dir = TempDir::new().unwrap();
    let store = GraphStore::open(dir.path()).unwrap();
    (dir, store)
}

fn view(slots: Vec<Slot>) -> MemoryView {
    MemoryView::new(slots, Vec::new(), 0)
}

#[test]
fn parse_classifies_greeting_and_chains_to_question() {
    let (_dir, store) = open_store();
    let raw = Slot::new("hypervisor", SlotTag::RawInput, SlotContent::RawInput { text: "hi".into() }, 1.0, 0);
    let output = Parse.run(&view(vec![raw]), &store);

    let intent = output.write.iter().find(|s| s.tag == SlotTag::Intent).unwrap();
    assert!(matches!(&intent.content, SlotContent::Intent { intent: Intent::Greeting }));
    assert_eq!(output.chain, vec!["question".to_string()]);
    assert!(output.write.iter().all(|s| s.tag != SlotTag::NounPhrase));
}

#[test]
fn parse_extracts_focus_and_chain_for_questions() {
    let (_dir, store) = open_store();
    let raw = Slot::new("hypervisor", SlotTag::RawInput, SlotContent::RawInput { text: "what is gravity?".into() }, 1.0, 0);
    let output = Parse.run(&view(vec![raw]), &store);

    let focus = output.write.iter().find(|s| s.tag == SlotTag::QuestionFocus).unwrap();
    assert!(matches!(&focus.content, SlotContent::QuestionFocus { focus } if focus == "gravity"));
    assert_eq!(output.chain, vec!["relate".to_string(), "infer".to_string(), "question".to_string()]);
}

#[test]
fn relate_fuzzy_matches_and_flags_unresolved() {
    let (_dir, store) = open_store();
    store.link("mitochondria", RelationType::PartOf, "cell", 1.0, None).unwrap();

    let phrase = Slot::new("parse", SlotTag::NounPhrase, SlotContent::NounPhrase { phrase: "mito".into() }, 0.8, 10);
    let unknown = Slot::new("parse", SlotTag::NounPhrase, SlotContent::NounPhrase { phrase: "zzyzx".into() }, 0.8, 10);
    let output = Relate.run(&view(vec![phrase, unknown]), &store);

    let fuzzy = output.write.iter().find(|s| s.tag == SlotTag::FuzzyMatch).unwrap();
    assert!(matches!(&fuzzy.content, SlotContent::FuzzyMatch { query, resolved } if query == "mito" && resolved == "mitochondria"));

    let unresolved = output.write.iter().find(|s| s.tag == SlotTag::UnknownConcepts).unwrap();
    assert!(matches!(&unresolved.content, SlotContent::UnknownConcepts { labels } if labels == &vec!["zzyzx".to_string()]));
    assert!(output.chain.contains(&"question".to_string()));
}

#[test]
fn infer_transitive_closure_matches_weight_formula() {
    let (_dir, store) = open_store();
    let h1 = Slot::new(
        "relate",
        SlotTag::Hierarchy,
        SlotContent::Hierarchy(tk_domain::slot::RelationFact { from: "dog".into(), kind: RelationType::IsA, to: "mammal".into(), weight: 1.0 }),
        0.9,
        10,
    );
    let h2 = Slot::new(
        "relate",
        SlotTag::Hierarchy,
        SlotContent::Hierarchy(tk_domain::slot::RelationFact { from: "mammal".into(), kind: RelationType::IsA, to: "animal".into(), weight: 0.8 }),
        0.9,
        10,
    );
    let output = Infer.run(&view(vec![h1, h2]), &store);

    let inferred = output
        .write
        .iter()
        .find_map(|s| match &s.content {
            SlotContent::InferredRelation(fact) if fact.from == "dog" && fact.to == "animal" => Some(fact.clone()),
            _ => None,
        })
        .expect("dog is_a animal should be inferred");
    assert!((inferred.weight - 0.8 * 0.9).abs() < 1e-9);
    assert_eq!(output.chain, vec!["decompose".to_string(), "question".to_string()]);
}

#[test]
fn infer_detects_contradiction_between_equals_edges() {
    let (_dir, store) = open_store();
    let e1 = Slot::new(
        "relate",
        SlotTag::Relation,
        SlotContent::Relation(tk_domain::slot::RelationFact { from: "x".into(), kind: RelationType::Equals, to: "5".into(), weight: 0.9 }),
        0.9,
        10,
    );
    let e2 = Slot::new(
        "relate",
        SlotTag::Relation,
        SlotContent::Relation(tk_domain::slot::RelationFact { from: "x".into(), kind: RelationType::Equals, to: "7".into(), weight: 0.9 }),
        0.9,
        10,
    );
    let output = Infer.run(&view(vec![e1, e2]), &store);

    let contradiction = output.write.iter().find(|s| s.tag == SlotTag::Contradiction).unwrap();
    assert!(matches!(&contradiction.content, SlotContent::Contradiction(fact) if fact.concept == "x"));
    assert_eq!(contradiction.ttl, 0);
}

#[test]
fn decompose_produces_subject_keyed_heuristic_steps_and_gaps() {
    let (_dir, store) = open_store();
    store.link("photosynthesis", RelationType::Requires, "sunlight", 1.0, None).unwrap();

    let focus = Slot::new("parse", SlotTag::QuestionFocus, SlotContent::QuestionFocus { focus: "photosynthesis".into() }, 0.8, 0);
    let subject = Slot::new("parse", SlotTag::Subject, SlotContent::Subject { subject: Subject::Biology }, 1.0, 0);
    let output = Decompose.run(&view(vec![focus, subject]), &store);

    let steps = output
        .write
        .iter()
        .find_map(|s| match &s.content {
            SlotContent::SolutionSteps { steps } => Some(steps.clone()),
            _ => None,
        })
        .unwrap();
    assert!(!steps.is_empty());
    assert!(steps[0].contains("structure") || steps[0].contains("process"), "biology steps should open on naming the structure/process");

    let gaps = output
        .write
        .iter()
        .find_map(|s| match &s.content {
            SlotContent::KnowledgeGaps { gaps } => Some(gaps.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(gaps, vec!["sunlight".to_string()]);
}

#[test]
fn analogize_emits_bootstrapped_electricity_explanation_verbatim() {
    let (_dir, store) = open_store();
    let phrase = Slot::new("parse", SlotTag::NounPhrase, SlotContent::NounPhrase { phrase: "electricity".into() }, 0.8, 10);
    let output = Analogize.run(&view(vec![phrase]), &store);

    let analogy = output
        .write
        .iter()
        .find_map(|s| match &s.content {
            SlotContent::Analogy(fact) if fact.concept == "electricity" => Some(fact.clone()),
            _ => None,
        })
        .unwrap();
    assert!(analogy.explanation.unwrap().starts_with("Electricity flows through wires like water flows through pipes"));
    assert_eq!(output.chain, vec!["question".to_string()]);
}

#[test]
fn question_narrates_contradiction_and_asks_which_is_correct() {
    let (_dir, store) = open_store();
    let contradiction = Slot::new(
        "infer",
        SlotTag::Contradiction,
        SlotContent::Contradiction(tk_domain::slot::ContradictionFact {
            concept: "x".into(),
            claim1: "x equals 5".into(),
            claim2: "x equals 7".into(),
            reason: "x cannot equal both 5 and 7".into(),
        }),
        0.9,
        0,
    );
    let intent = Slot::new("parse", SlotTag::Intent, SlotContent::Intent { intent: Intent::Question }, 1.0, 0);
    let output = Question.run(&view(vec![contradiction, intent]), &store);

    let text = output.actions.iter().find_map(|a| match a {
        Action::Respond(t) => Some(t.clone()),
        _ => None,
    });
    let text = text.unwrap();
    assert!(text.contains("x cannot equal both 5 and 7"));
    assert!(text.to_lowercase().contains("which one is correct"));
    assert!(output.chain.is_empty(), "question is terminal");
}

#[test]
fn learn_skips_graph_writes_on_greeting() {
    let (_dir, store) = open_store();
    let raw = Slot::new("hypervisor", SlotTag::RawInput, SlotContent::RawInput { text: "hi".into() }, 1.0, 0);
    let intent = Slot::new("parse", SlotTag::Intent, SlotContent::Intent { intent: Intent::Greeting }, 1.0, 0);
    Learn.run(&view(vec![raw, intent]), &store);

    assert_eq!(store.stats().nouns, 0);
}

#[test]
fn learn_infers_process_type_from_suffix() {
    let (_dir, store) = open_store();
    let raw = Slot::new("hypervisor", SlotTag::RawInput, SlotContent::RawInput { text: "photosynthesis produces oxygen".into() }, 1.0, 0);
    let intent = Slot::new("parse", SlotTag::Intent, SlotContent::Intent { intent: Intent::Claim }, 1.0, 0);
    let phrase = Slot::new("parse", SlotTag::NounPhrase, SlotContent::NounPhrase { phrase: "photosynthesis".into() }, 0.8, 10);
    Learn.run(&view(vec![raw, intent, phrase]), &store);

    let noun = store.find("photosynthesis").unwrap();
    assert_eq!(noun.kind, NounType::Process);

    let oxygen = store.find("oxygen");
    assert!(oxygen.is_some(), "raw-input pattern scan should have linked photosynthesis produces oxygen");
}
