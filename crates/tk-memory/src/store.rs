//! The orchestrator-owned working-memory scratchpad.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tk_domain::{Slot, SlotTag};

use crate::view::MemoryView;

#[derive(Debug, Serialize, Deserialize, Default)]
struct MemoryState {
    slots: HashMap<String, Slot>,
    focus: Vec<String>,
    tick: u64,
}

/// `{slots, focus, tick}` — the transient keyed scratchpad demons read
/// snapshots of and the orchestrator writes through.
pub struct WorkingMemory {
    state: RwLock<MemoryState>,
}

impl Default for WorkingMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingMemory {
    pub fn new() -> Self {
        Self { state: RwLock::new(MemoryState::default()) }
    }

    pub fn write(&self, slot: Slot) -> Slot {
        let mut state = self.state.write();
        state.slots.insert(slot.id.clone(), slot.clone());
        slot
    }

    pub fn read(&self, id: &str) -> Option<Slot> {
        self.state.read().slots.get(id).cloned()
    }

    pub fn find_by_tag(&self, tag: SlotTag) -> Vec<Slot> {
        self.state.read().slots.values().filter(|s| s.tag == tag).cloned().collect()
    }

    pub fn latest_by_tag(&self, tag: SlotTag) -> Option<Slot> {
        self.state
            .read()
            .slots
            .values()
            .filter(|s| s.tag == tag)
            .max_by_key(|s| s.created_at)
            .cloned()
    }

    /// Remove a slot. Also drops it from `focus` if present. Returns
    /// whether a slot was actually removed.
    pub fn evict(&self, id: &str) -> bool {
        let mut state = self.state.write();
        let removed = state.slots.remove(id).is_some();
        if removed {
            state.focus.retain(|f| f != id);
        }
        removed
    }

    /// Replace the focus list, silently dropping ids not present in slots.
    pub fn set_focus(&self, ids: &[String]) {
        let mut state = self.state.write();
        let kept: Vec<String> = ids.iter().filter(|id| state.slots.contains_key(*id)).cloned().collect();
        state.focus = kept;
    }

    pub fn focused(&self) -> Vec<Slot> {
        let state = self.state.read();
        state.focus.iter().filter_map(|id| state.slots.get(id)).cloned().collect()
    }

    /// Decrement every `ttl>0` slot and evict those reaching zero.
    /// `ttl=0` slots ("lives to end of turn") are untouched by decay.
    pub fn tick(&self) -> Vec<String> {
        let mut state = self.state.write();
        state.tick += 1;

        let mut expired = Vec::new();
        for slot in state.slots.values_mut() {
            if slot.ttl > 0 {
                slot.ttl -= 1;
                if slot.ttl == 0 {
                    expired.push(slot.id.clone());
                }
            }
        }
        for id in &expired {
            state.slots.remove(id);
        }
        state.focus.retain(|id| !expired.contains(id));
        expired
    }

    pub fn tick_count(&self) -> u64 {
        self.state.read().tick
    }

    /// Evict slots while `len() > max`, preferring (in order) unfocused
    /// slots, then low confidence, then old age — focused slots are
    /// evicted only once everything else is exhausted.
    pub fn enforce_limit(&self, max: usize) -> Vec<String> {
        let mut state = self.state.write();
        if state.slots.len() <= max {
            return Vec::new();
        }

        let focus_set: std::collections::HashSet<String> = state.focus.iter().cloned().collect();
        let mut candidates: Vec<Slot> = state.slots.values().cloned().collect();
        candidates.sort_by(|a, b| {
            let a_focused = focus_set.contains(&a.id);
            let b_focused = focus_set.contains(&b.id);
            a_focused
                .cmp(&b_focused)
                .then(a.confidence.partial_cmp(&b.confidence).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.created_at.cmp(&b.created_at))
        });

        let mut evicted = Vec::new();
        for slot in candidates {
            if state.slots.len() <= max {
                break;
            }
            state.slots.remove(&slot.id);
            evicted.push(slot.id);
        }
        state.focus.retain(|id| !evicted.contains(id));
        evicted
    }

    pub fn len(&self) -> usize {
        self.state.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone the full contents into a read-only snapshot for a demon call.
    pub fn snapshot(&self) -> MemoryView {
        let state = self.state.read();
        MemoryView::new(state.slots.values().cloned().collect(), state.focus.clone(), state.tick)
    }

    /// JSON-serialize the full working memory (used by the kernel facade's
    /// `save_state`).
    pub fn serialize(&self) -> tk_domain::error::Result<Vec<u8>> {
        let state = self.state.read();
        serde_json::to_vec(&*state).map_err(tk_domain::error::Error::Json)
    }

    /// Replace the working memory wholesale from a previously-serialized
    /// blob. On parse failure, the current state is left untouched.
    pub fn deserialize(&self, blob: &[u8]) -> tk_domain::error::Result<()> {
        let restored: MemoryState = serde_json::from_slice(blob).map_err(tk_domain::error::Error::Json)?;
        *self.state.write() = restored;
        Ok(())
    }
}
