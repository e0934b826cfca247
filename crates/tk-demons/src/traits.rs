//! The common shape every demon is built against: a pure function from a
//! working-memory snapshot (plus read-only graph access) to a mutation plan.

use tk_domain::{Slot, SlotTag};
use tk_graph::GraphStore;
use tk_memory::MemoryView;

/// When a demon is eligible to run. Only [`Trigger::NewInput`] is consulted
/// by the orchestrator's scheduler — everything else is documentation: the
/// chain model is the sole mid-turn recruitment mechanism (see
/// `tk-orchestrator`). Kept here anyway because `list_demons()` reports a
/// demon's declared triggers, and the tag-based ones describe genuine
/// invariants about what a demon reads even though the scheduler ignores
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    NewInput,
    ChainFrom(&'static str),
    TagPresent(SlotTag),
    TagAbsent(SlotTag),
    TickInterval(u32),
    Always,
}

/// One of the five action kinds a demon may emit. `Ask` is rendered
/// identically to `Respond` for the user; the distinction exists only so a
/// demon can express "this is a question back to the student" in a trace.
#[derive(Debug, Clone)]
pub enum Action {
    Respond(String),
    Ask(String),
    Store { noun: String, relations: Vec<String> },
    Query(String),
    Log(String),
}

impl Action {
    /// The user-visible text, if this action carries one.
    pub fn response_text(&self) -> Option<&str> {
        match self {
            Action::Respond(text) | Action::Ask(text) => Some(text),
            _ => None,
        }
    }
}

/// The mutation plan a demon hands back to the orchestrator. A demon never
/// mutates working memory or the graph itself — it only describes what
/// should happen, and the orchestrator applies it.
#[derive(Debug, Clone, Default)]
pub struct DemonOutput {
    pub write: Vec<Slot>,
    pub evict: Vec<String>,
    pub focus: Option<Vec<String>>,
    pub actions: Vec<Action>,
    /// Demon ids suggested to run next, in order.
    pub chain: Vec<String>,
}

impl DemonOutput {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A pure reasoner: consumes a memory snapshot (and read-only graph access)
/// and returns a mutation plan. Graph mutation is reserved for `learn`; all
/// other demons may only read.
pub trait Demon {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn triggers(&self) -> &'static [Trigger];

    fn run(&self, view: &MemoryView, graph: &GraphStore) -> DemonOutput;
}
