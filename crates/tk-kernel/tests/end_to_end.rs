//! End-to-end scenarios and universal properties from spec.md §8, driven
//! entirely through the public `Kernel` facade against a real tempdir-backed
//! graph store.

use tempfile::TempDir;
use tk_domain::config::KernelConfig;
use tk_domain::RelationType;
use tk_kernel::Kernel;

fn fresh_kernel() -> (TempDir, Kernel) {
    let dir = TempDir::new().unwrap();
    let mut config = KernelConfig::default();
    config.graph.path = dir.path().to_path_buf();
    (dir, Kernel::init(config).unwrap())
}

// ── Scenario 1: greeting ────────────────────────────────────────────

#[test]
fn scenario_greeting_produces_one_turn_and_no_graph_writes() {
    let (_dir, kernel) = fresh_kernel();
    let result = kernel.process("hi", false).unwrap();

    assert!(!result.text.is_empty());
    assert_eq!(kernel.stats().graph.nouns, 0);
}

// ── Scenario 2: unknown question ────────────────────────────────────

#[test]
fn scenario_unknown_question_about_gravity() {
    let (_dir, kernel) = fresh_kernel();
    let result = kernel.process("what is gravity?", true).unwrap();

    assert!(result.text.to_lowercase().contains("gravity"));
    let debug = result.debug.expect("debug trace was requested");
    assert!(debug.ticks.iter().any(|t| t.demons_fired > 0));

    let graph = kernel.graph();
    let noun = graph.find("gravity").expect("gravity should be learned");
    assert_eq!(noun.kind, tk_domain::NounType::Concept);
}

// ── Scenario 3: analogy bootstrap ───────────────────────────────────

#[test]
fn scenario_electricity_confusion_triggers_bootstrapped_analogy() {
    let (_dir, kernel) = fresh_kernel();
    let result = kernel.process("I don't understand electricity", false).unwrap();

    assert!(result.text.contains("Electricity flows through wires like water flows through pipes"));
}

// ── Scenario 4: relation learning ───────────────────────────────────

#[test]
fn scenario_relation_learning_persists_a_single_weighted_edge() {
    let (_dir, kernel) = fresh_kernel();
    kernel.process("photosynthesis produces oxygen", false).unwrap();

    let graph = kernel.graph();
    let photo = graph.find("photosynthesis").unwrap();
    let edges = graph.relations_from(&photo.id, Some(RelationType::Produces));
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].noun.label, "oxygen");
    assert!((edges[0].relation.weight - 0.6).abs() < 1e-9);
}

// ── Scenario 5: transitive inference ────────────────────────────────

#[test]
fn scenario_transitive_inference_over_preexisting_hierarchy() {
    let (_dir, kernel) = fresh_kernel();
    let graph = kernel.graph();
    graph.link("dog", RelationType::IsA, "mammal", 1.0, None).unwrap();
    graph.link("mammal", RelationType::IsA, "animal", 1.0, None).unwrap();

    let result = kernel.process("is a dog an animal?", false).unwrap();
    assert!(!result.text.is_empty());
    // The response should reference the hierarchy chain (dog -> mammal ->
    // animal), not treat "is a dog an animal" as an unrecognized concept.
    assert!(result.text.to_lowercase().contains("mammal"));
}

// ── Scenario 6: contradiction ────────────────────────────────────────

#[test]
fn scenario_contradiction_between_equals_edges() {
    let (_dir, kernel) = fresh_kernel();
    let graph = kernel.graph();
    graph.link("x", RelationType::Equals, "5", 1.0, None).unwrap();
    graph.link("x", RelationType::Equals, "7", 1.0, None).unwrap();

    let result = kernel.process("what is x?", false).unwrap();
    assert!(result.text.contains('5') && result.text.contains('7'));
    assert!(result.text.to_lowercase().contains("correct"));
}

// ── Universal properties ────────────────────────────────────────────

#[test]
fn process_rejects_empty_input() {
    let (_dir, kernel) = fresh_kernel();
    assert!(kernel.process("", false).is_err());
}

#[test]
fn process_rejects_overlong_input() {
    let (_dir, kernel) = fresh_kernel();
    let huge = "a ".repeat(3000);
    assert!(kernel.process(&huge, false).is_err());
}

#[test]
fn process_never_returns_empty_response_text() {
    let (_dir, kernel) = fresh_kernel();
    for input in ["hi", "what is x?", "photosynthesis produces oxygen", "actually that's wrong", "xyz abc qqq"] {
        let result = kernel.process(input, false).unwrap();
        assert!(!result.text.is_empty(), "input {input:?} produced an empty response");
    }
}

#[test]
fn save_and_load_state_round_trips_working_memory() {
    let (_dir, kernel) = fresh_kernel();
    kernel.process("what is gravity?", false).unwrap();

    let blob = kernel.save_state().unwrap();

    let (_dir2, kernel2) = fresh_kernel();
    kernel2.load_state(&blob).unwrap();

    assert_eq!(kernel.stats().memory.slots, kernel2.stats().memory.slots);
}

#[test]
fn list_demons_reports_all_seven_in_pipeline_order() {
    let (_dir, kernel) = fresh_kernel();
    let ids: Vec<String> = kernel.list_demons().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["parse", "relate", "infer", "decompose", "analogize", "question", "learn"]);
}

#[test]
fn sequential_turns_release_the_busy_flag_between_calls() {
    let (_dir, kernel) = fresh_kernel();
    assert!(kernel.process("what is gravity?", false).is_ok());
    // If the busy flag weren't released at the end of `process`, this
    // second call on the same kernel would return `Error::Busy`.
    assert!(kernel.process("what is photosynthesis?", false).is_ok());
}
