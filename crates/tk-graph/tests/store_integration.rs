//! Integration tests for the graph store — persistence, merge semantics,
//! and query/traverse behavior against a real on-disk journal + snapshot.

use std::collections::HashMap;

use tempfile::TempDir;
use tk_domain::{NounType, RelationType};
use tk_graph::pattern::{NounPattern, QueryPattern};
use tk_graph::GraphStore;

fn open_store() -> (TempDir, GraphStore) {
    let dir = TempDir::new().unwrap();
    let store = GraphStore::open(dir.path()).unwrap();
    (dir, store)
}

#[test]
fn ensure_noun_is_idempotent_by_label() {
    let (_dir, store) = open_store();
    let a = store.ensure_noun("Photosynthesis", NounType::Process, HashMap::new()).unwrap();
    let b = store.ensure_noun("  photosynthesis  ", NounType::Process, HashMap::new()).unwrap();
    assert_eq!(a.id, b.id);
    assert_eq!(store.stats().nouns, 1);
}

#[test]
fn find_is_exact_and_search_is_fuzzy() {
    let (_dir, store) = open_store();
    store.ensure_noun("mitochondria", NounType::Concept, HashMap::new()).unwrap();
    assert!(store.find("mito").is_none());
    assert!(store.find("mitochondria").is_some());
    assert_eq!(store.search("mito", 10).len(), 1);
}

#[test]
fn link_with_duplicate_merges_by_max_weight() {
    let (_dir, store) = open_store();
    store.link("dog", RelationType::IsA, "mammal", 0.4, None).unwrap();
    store.link("dog", RelationType::IsA, "mammal", 0.9, None).unwrap();
    store.link("dog", RelationType::IsA, "mammal", 0.2, None).unwrap();

    let dog = store.find("dog").unwrap();
    let edges = store.relations_from(&dog.id, Some(RelationType::IsA));
    assert_eq!(edges.len(), 1, "duplicates should merge into one edge");
    assert_eq!(edges[0].relation.weight, 0.9);
}

#[test]
fn relations_from_and_to_are_symmetric_views() {
    let (_dir, store) = open_store();
    store.link("photosynthesis", RelationType::Produces, "oxygen", 0.6, None).unwrap();
    let photo = store.find("photosynthesis").unwrap();
    let oxygen = store.find("oxygen").unwrap();

    let from = store.relations_from(&photo.id, None);
    assert_eq!(from.len(), 1);
    assert_eq!(from[0].noun.label, "oxygen");

    let to = store.relations_to(&oxygen.id, None);
    assert_eq!(to.len(), 1);
    assert_eq!(to[0].noun.label, "photosynthesis");
}

#[test]
fn query_orders_by_descending_weight_and_respects_limit() {
    let (_dir, store) = open_store();
    store.link("a", RelationType::RelatesTo, "b", 0.2, None).unwrap();
    store.link("a", RelationType::RelatesTo, "c", 0.9, None).unwrap();
    store.link("a", RelationType::RelatesTo, "d", 0.5, None).unwrap();

    let pattern = QueryPattern {
        from: Some(NounPattern { label: Some("a".into()), kind: None }),
        relation: Some(RelationType::RelatesTo),
        to: None,
    };
    let triples = store.query(&pattern, 2);
    assert_eq!(triples.len(), 2);
    assert_eq!(triples[0].to.label, "c");
    assert_eq!(triples[1].to.label, "d");
}

#[test]
fn traverse_is_bfs_over_outgoing_edges_only() {
    let (_dir, store) = open_store();
    store.link("dog", RelationType::IsA, "mammal", 1.0, None).unwrap();
    store.link("mammal", RelationType::IsA, "animal", 1.0, None).unwrap();
    store.link("cat", RelationType::IsA, "mammal", 1.0, None).unwrap();

    let dog = store.find("dog").unwrap();
    let result = store.traverse(&dog.id, 2);

    assert_eq!(result.len(), 3); // dog, mammal, animal — not cat (incoming only)
    assert_eq!(result[&dog.id].depth, 0);

    let mammal_id = store.find("mammal").unwrap().id;
    assert_eq!(result[&mammal_id].depth, 1);
}

#[test]
fn delete_noun_cascades_to_incident_relations() {
    let (_dir, store) = open_store();
    store.link("x", RelationType::Equals, "5", 0.6, None).unwrap();
    let x = store.find("x").unwrap();
    store.delete_noun(&x.id).unwrap();

    assert!(store.find_by_id(&x.id).is_none());
    assert_eq!(store.stats().relations, 0);
}

#[test]
fn state_survives_reopen_via_journal_replay() {
    let dir = TempDir::new().unwrap();
    {
        let store = GraphStore::open(dir.path()).unwrap();
        store.link("photosynthesis", RelationType::Produces, "oxygen", 0.6, None).unwrap();
    }
    let reopened = GraphStore::open(dir.path()).unwrap();
    assert_eq!(reopened.stats().nouns, 2);
    assert_eq!(reopened.stats().relations, 1);
}

#[test]
fn compact_snapshot_then_reopen_preserves_state() {
    let dir = TempDir::new().unwrap();
    {
        let store = GraphStore::open(dir.path()).unwrap();
        store.link("dna", RelationType::PartOf, "cell", 0.8, None).unwrap();
        store.compact().unwrap();
    }
    let reopened = GraphStore::open(dir.path()).unwrap();
    assert_eq!(reopened.stats().nouns, 2);
    assert_eq!(reopened.stats().relations, 1);
}
