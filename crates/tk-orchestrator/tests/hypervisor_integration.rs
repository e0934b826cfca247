//! Integration tests for the chain-only tick loop against a real graph
//! store and working memory, exercising termination and persistence
//! end to end without going through the kernel facade.

use tempfile::TempDir;
use tk_domain::config::OrchestratorConfig;
use tk_domain::{RelationType, SlotTag};
use tk_graph::GraphStore;
use tk_memory::WorkingMemory;
use tk_orchestrator::Hypervisor;

fn setup() -> (TempDir, GraphStore, WorkingMemory, Hypervisor) {
    let dir = TempDir::new().unwrap();
    let graph = GraphStore::open(dir.path()).unwrap();
    let memory = WorkingMemory::new();
    let hypervisor = Hypervisor::new(OrchestratorConfig::default());
    (dir, graph, memory, hypervisor)
}

#[test]
fn greeting_produces_response_without_touching_the_graph() {
    let (_dir, graph, memory, hv) = setup();
    let result = hv.process("hi", &memory, &graph);

    assert!(!result.text.is_empty());
    assert_eq!(graph.stats().nouns, 0);
}

#[test]
fn unknown_question_learns_the_concept_as_a_concept_noun() {
    let (_dir, graph, memory, hv) = setup();
    let result = hv.process("what is gravity?", &memory, &graph);

    assert!(result.text.to_lowercase().contains("gravity"));
    let noun = graph.find("gravity").expect("learn should have persisted gravity");
    assert_eq!(noun.kind, tk_domain::NounType::Concept);
}

#[test]
fn transitive_inference_surfaces_in_the_response() {
    let (_dir, graph, memory, hv) = setup();
    graph.link("dog", RelationType::IsA, "mammal", 1.0, None).unwrap();
    graph.link("mammal", RelationType::IsA, "animal", 1.0, None).unwrap();

    let result = hv.process("is a dog an animal?", &memory, &graph);
    assert!(!result.text.is_empty());
}

#[test]
fn contradiction_is_narrated_and_asks_which_is_correct() {
    let (_dir, graph, memory, hv) = setup();
    graph.link("x", RelationType::Equals, "5", 1.0, None).unwrap();
    graph.link("x", RelationType::Equals, "7", 1.0, None).unwrap();

    let result = hv.process("what is x?", &memory, &graph);
    assert!(result.text.contains('5') && result.text.contains('7'));
    assert!(result.text.to_lowercase().contains("correct"));
}

#[test]
fn ephemeral_slots_are_swept_after_every_turn() {
    let (_dir, graph, memory, hv) = setup();
    hv.process("what is gravity?", &memory, &graph);

    for tag in SlotTag::EPHEMERAL {
        assert!(memory.find_by_tag(*tag).is_empty(), "{tag:?} should not survive end of turn");
    }
    assert!(memory.find_by_tag(SlotTag::Response).len() <= 1);
}

#[test]
fn memory_never_exceeds_configured_slot_limit() {
    let dir = TempDir::new().unwrap();
    let graph = GraphStore::open(dir.path()).unwrap();
    let memory = WorkingMemory::new();
    let mut cfg = OrchestratorConfig::default();
    cfg.max_memory_slots = 5;
    let hv = Hypervisor::new(cfg);

    hv.process("photosynthesis produces oxygen and also requires sunlight and water and carbon dioxide", &memory, &graph);
    assert!(memory.len() <= 5);
}

#[test]
fn turn_always_terminates_within_the_tick_budget() {
    let dir = TempDir::new().unwrap();
    let graph = GraphStore::open(dir.path()).unwrap();
    let memory = WorkingMemory::new();
    let mut cfg = OrchestratorConfig::default();
    cfg.max_ticks_per_turn = 3;
    let hv = Hypervisor::new(cfg);

    let result = hv.process("I don't understand electricity", &memory, &graph);
    assert!(result.ticks.len() <= 3);
    assert!(!result.text.is_empty());
}
