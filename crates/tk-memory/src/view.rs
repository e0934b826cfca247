//! Read-only snapshot of working memory handed to a demon for one call.
//!
//! Demons never see the live, lockable `WorkingMemory` — only a cloned
//! snapshot — so a demon can't observe (or accidentally depend on) writes
//! made by another demon invoked concurrently with it. There is no such
//! concurrency in this kernel (turns are single-threaded), but the
//! snapshot boundary is what makes demons pure functions: `run(view, ...)`
//! cannot mutate anything it was handed.

use tk_domain::{Slot, SlotTag};

#[derive(Debug, Clone)]
pub struct MemoryView {
    slots: Vec<Slot>,
    focus: Vec<String>,
    pub tick: u64,
}

impl MemoryView {
    pub fn new(slots: Vec<Slot>, focus: Vec<String>, tick: u64) -> Self {
        Self { slots, focus, tick }
    }

    pub fn read(&self, id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn find_by_tag(&self, tag: SlotTag) -> Vec<&Slot> {
        self.slots.iter().filter(|s| s.tag == tag).collect()
    }

    pub fn latest_by_tag(&self, tag: SlotTag) -> Option<&Slot> {
        self.slots
            .iter()
            .filter(|s| s.tag == tag)
            .max_by_key(|s| s.created_at)
    }

    pub fn has_tag(&self, tag: SlotTag) -> bool {
        self.slots.iter().any(|s| s.tag == tag)
    }

    pub fn focused(&self) -> Vec<&Slot> {
        self.focus.iter().filter_map(|id| self.read(id)).collect()
    }

    pub fn all(&self) -> &[Slot] {
        &self.slots
    }
}
