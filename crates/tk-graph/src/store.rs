//! The persistent graph store: nouns, typed relations, lookup, search,
//! pattern query, and bounded traversal.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tk_domain::error::{Error, Result};
use tk_domain::noun::normalize_label;
use tk_domain::{Noun, NounType, Relation, RelationEdge, RelationType};

use crate::journal::{Journal, JournalOp};
use crate::pattern::{GraphStats, QueryPattern, Triple, TraverseNode, TraverseResult};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    nouns: Vec<Noun>,
    relations: Vec<Relation>,
}

struct State {
    nouns: HashMap<String, Noun>,
    relations: HashMap<String, Relation>,
    /// Normalized label -> noun id. Kept in lockstep with `nouns`.
    label_index: HashMap<String, String>,
}

impl State {
    fn empty() -> Self {
        Self {
            nouns: HashMap::new(),
            relations: HashMap::new(),
            label_index: HashMap::new(),
        }
    }

    fn apply(&mut self, op: &JournalOp) {
        match op {
            JournalOp::UpsertNoun(noun) => {
                self.label_index.insert(noun.label.clone(), noun.id.clone());
                self.nouns.insert(noun.id.clone(), noun.clone());
            }
            JournalOp::UpsertRelation(rel) => {
                self.relations.insert(rel.id.clone(), rel.clone());
            }
            JournalOp::DeleteNoun(id) => {
                if let Some(noun) = self.nouns.remove(id) {
                    self.label_index.remove(&noun.label);
                }
                self.relations
                    .retain(|_, r| &r.from_id != id && &r.to_id != id);
            }
            JournalOp::DeleteRelations(ids) => {
                for id in ids {
                    self.relations.remove(id);
                }
            }
        }
    }
}

/// Persistent directed multigraph of nouns and typed relations.
///
/// Synchronous and single-writer: every mutating call takes the same
/// exclusive lock around an in-memory map plus a durable journal append,
/// matching the "single writer lock, no cross-call transactions" contract
/// the reasoning kernel expects of its graph store.
pub struct GraphStore {
    dir: PathBuf,
    state: RwLock<State>,
    journal: RwLock<Journal>,
    /// When true, `link` merges `(from, to, type)` duplicates by keeping the
    /// max weight instead of recording a second edge. See DESIGN.md for why
    /// this is the chosen resolution of the spec's open question.
    merge_duplicate_relations: bool,
}

impl GraphStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_merge(dir, true)
    }

    pub fn open_with_merge(dir: impl AsRef<Path>, merge_duplicate_relations: bool) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(Error::Io)?;

        let mut state = State::empty();
        let snapshot_path = dir.join("graph.snapshot.json");
        if snapshot_path.exists() {
            let raw = fs::read_to_string(&snapshot_path).map_err(Error::Io)?;
            let snapshot: Snapshot = serde_json::from_str(&raw).unwrap_or_default();
            for noun in snapshot.nouns {
                state.apply(&JournalOp::UpsertNoun(noun));
            }
            for rel in snapshot.relations {
                state.apply(&JournalOp::UpsertRelation(rel));
            }
        }

        for op in Journal::replay(&dir)? {
            state.apply(&op);
        }

        let journal = Journal::open(&dir)?;

        tracing::info!(
            nouns = state.nouns.len(),
            relations = state.relations.len(),
            path = %dir.display(),
            "graph store loaded"
        );

        Ok(Self {
            dir,
            state: RwLock::new(state),
            journal: RwLock::new(journal),
            merge_duplicate_relations,
        })
    }

    fn write_op(&self, op: JournalOp) -> Result<()> {
        self.journal.write().append(&op)?;
        self.state.write().apply(&op);
        Ok(())
    }

    // ── Nouns ────────────────────────────────────────────────────────

    pub fn ensure_noun(
        &self,
        label: &str,
        kind: NounType,
        properties: HashMap<String, serde_json::Value>,
    ) -> Result<Noun> {
        let normalized = normalize_label(label);
        if let Some(existing) = self.find(&normalized) {
            return Ok(existing);
        }
        let mut noun = Noun::new(normalized, kind);
        noun.properties = properties;
        self.write_op(JournalOp::UpsertNoun(noun.clone()))?;
        Ok(noun)
    }

    pub fn find(&self, label: &str) -> Option<Noun> {
        let normalized = normalize_label(label);
        let state = self.state.read();
        let id = state.label_index.get(&normalized)?;
        state.nouns.get(id).cloned()
    }

    pub fn find_by_id(&self, id: &str) -> Option<Noun> {
        self.state.read().nouns.get(id).cloned()
    }

    /// Case-insensitive substring match, most-recent first.
    pub fn search(&self, q: &str, limit: usize) -> Vec<Noun> {
        let needle = q.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let state = self.state.read();
        let mut hits: Vec<Noun> = state
            .nouns
            .values()
            .filter(|n| n.label.contains(&needle))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        hits.truncate(limit);
        hits
    }

    pub fn delete_noun(&self, id: &str) -> Result<()> {
        self.write_op(JournalOp::DeleteNoun(id.to_string()))
    }

    // ── Relations ────────────────────────────────────────────────────

    pub fn link(
        &self,
        from_label: &str,
        kind: RelationType,
        to_label: &str,
        weight: f64,
        context_label: Option<&str>,
    ) -> Result<Relation> {
        let from = self.ensure_noun(from_label, NounType::Unknown, HashMap::new())?;
        let to = self.ensure_noun(to_label, NounType::Unknown, HashMap::new())?;
        let context_id = match context_label {
            Some(label) => Some(self.ensure_noun(label, NounType::Context, HashMap::new())?.id),
            None => None,
        };

        if self.merge_duplicate_relations {
            let existing = {
                let state = self.state.read();
                state
                    .relations
                    .values()
                    .find(|r| r.from_id == from.id && r.to_id == to.id && r.kind == kind)
                    .cloned()
            };
            if let Some(mut existing) = existing {
                if weight > existing.weight {
                    existing.weight = weight.clamp(0.0, 1.0);
                    self.write_op(JournalOp::UpsertRelation(existing.clone()))?;
                }
                return Ok(existing);
            }
        }

        let mut relation = Relation::new(from.id, kind, to.id, weight);
        if let Some(ctx) = context_id {
            relation = relation.with_context(ctx);
        }
        self.write_op(JournalOp::UpsertRelation(relation.clone()))?;
        Ok(relation)
    }

    pub fn relations_from(&self, noun_id: &str, kind: Option<RelationType>) -> Vec<RelationEdge> {
        let state = self.state.read();
        state
            .relations
            .values()
            .filter(|r| r.from_id == noun_id && kind.map_or(true, |k| r.kind == k))
            .filter_map(|r| {
                state
                    .nouns
                    .get(&r.to_id)
                    .map(|noun| RelationEdge { relation: r.clone(), noun: noun.clone() })
            })
            .collect()
    }

    pub fn relations_to(&self, noun_id: &str, kind: Option<RelationType>) -> Vec<RelationEdge> {
        let state = self.state.read();
        state
            .relations
            .values()
            .filter(|r| r.to_id == noun_id && kind.map_or(true, |k| r.kind == k))
            .filter_map(|r| {
                state
                    .nouns
                    .get(&r.from_id)
                    .map(|noun| RelationEdge { relation: r.clone(), noun: noun.clone() })
            })
            .collect()
    }

    pub fn query(&self, pattern: &QueryPattern, limit: usize) -> Vec<Triple> {
        let state = self.state.read();
        let from_pat = pattern.from.clone().unwrap_or_default();
        let to_pat = pattern.to.clone().unwrap_or_default();

        let mut triples: Vec<Triple> = state
            .relations
            .values()
            .filter(|r| pattern.relation.map_or(true, |k| r.kind == k))
            .filter_map(|r| {
                let from = state.nouns.get(&r.from_id)?;
                let to = state.nouns.get(&r.to_id)?;
                if !from_pat.matches(from) || !to_pat.matches(to) {
                    return None;
                }
                Some(Triple { from: from.clone(), relation: r.clone(), to: to.clone() })
            })
            .collect();

        triples.sort_by(|a, b| b.relation.weight.partial_cmp(&a.relation.weight).unwrap_or(std::cmp::Ordering::Equal));
        triples.truncate(limit);
        triples
    }

    /// BFS over outgoing edges only, bounded by `max_depth`.
    pub fn traverse(&self, start_id: &str, max_depth: u32) -> TraverseResult {
        let state = self.state.read();
        let mut result = TraverseResult::new();
        let Some(start) = state.nouns.get(start_id) else {
            return result;
        };

        result.insert(
            start_id.to_string(),
            TraverseNode { noun: start.clone(), depth: 0, path: vec![start_id.to_string()] },
        );

        let mut queue: VecDeque<(String, u32, Vec<String>)> =
            VecDeque::from([(start_id.to_string(), 0, vec![start_id.to_string()])]);

        while let Some((current_id, depth, path)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for rel in state.relations.values().filter(|r| r.from_id == current_id) {
                if result.contains_key(&rel.to_id) {
                    continue;
                }
                let Some(to_noun) = state.nouns.get(&rel.to_id) else { continue };
                let mut next_path = path.clone();
                next_path.push(rel.to_id.clone());
                result.insert(
                    rel.to_id.clone(),
                    TraverseNode { noun: to_noun.clone(), depth: depth + 1, path: next_path.clone() },
                );
                queue.push_back((rel.to_id.clone(), depth + 1, next_path));
            }
        }

        result
    }

    pub fn stats(&self) -> GraphStats {
        let state = self.state.read();
        let mut types: HashMap<String, usize> = HashMap::new();
        for rel in state.relations.values() {
            *types.entry(rel.kind.as_str().to_string()).or_insert(0) += 1;
        }
        GraphStats { nouns: state.nouns.len(), relations: state.relations.len(), types }
    }

    /// Write a compacted snapshot and truncate the journal. Not required
    /// for correctness (the journal alone is durable) but keeps startup
    /// replay time bounded for a long-lived store.
    pub fn compact(&self) -> Result<()> {
        let state = self.state.read();
        let snapshot = Snapshot {
            nouns: state.nouns.values().cloned().collect(),
            relations: state.relations.values().cloned().collect(),
        };
        drop(state);

        let json = serde_json::to_string_pretty(&snapshot).map_err(Error::Json)?;
        let tmp_path = self.dir.join("graph.snapshot.json.tmp");
        fs::write(&tmp_path, json).map_err(Error::Io)?;
        fs::rename(&tmp_path, self.dir.join("graph.snapshot.json")).map_err(Error::Io)?;

        self.journal.write().truncate()
    }
}
