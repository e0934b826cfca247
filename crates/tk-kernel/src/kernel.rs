//! The kernel facade: the reasoning core's only public surface.
//!
//! Owns one working-memory instance, one graph handle, and one
//! hypervisor. `process` is the sole entry point callers drive; everything
//! else (`stats`, `save_state`/`load_state`, `list_demons`) introspects or
//! checkpoints that state without touching the reasoning loop itself.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;
use tk_domain::config::KernelConfig;
use tk_domain::error::{Error, Result};
use tk_graph::GraphStore;
use tk_memory::WorkingMemory;
use tk_orchestrator::{Hypervisor, TurnResult};

use crate::stats::{DemonStats, KernelStats, MemoryStats};

const MAX_INPUT_CHARS: usize = 5000;

#[derive(Debug, Clone, Serialize)]
pub struct DemonInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Result of one `process` call. `debug` is populated only when the caller
/// asked for a trace; the response text is always present.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub text: String,
    pub debug: Option<TurnResult>,
}

/// One kernel instance: a graph handle, a working memory, and a
/// hypervisor, plus the bookkeeping `stats()` reports on.
///
/// `process` is not re-entrant — a second call while one is in flight
/// returns [`Error::Busy`] rather than blocking or interleaving, since the
/// tick loop assumes exclusive access to working memory across a whole
/// turn (see orchestrator docs on chain-only scheduling).
pub struct Kernel {
    graph: GraphStore,
    memory: WorkingMemory,
    hypervisor: Hypervisor,
    busy: AtomicBool,
    total_fired: AtomicU64,
}

impl Kernel {
    /// Open (or create) the persistent graph store at `config.graph.path`
    /// and construct a fresh working memory and hypervisor. This is the
    /// facade's `init()` — there is no separate readiness step.
    pub fn init(config: KernelConfig) -> Result<Self> {
        let graph = GraphStore::open(&config.graph.path)?;
        Ok(Self {
            graph,
            memory: WorkingMemory::new(),
            hypervisor: Hypervisor::new(config.orchestrator),
            busy: AtomicBool::new(false),
            total_fired: AtomicU64::new(0),
        })
    }

    /// Convenience constructor reading `TK_GRAPH_PATH` from the
    /// environment, falling back to the tutor resource profile.
    pub fn init_tutor(graph_path: impl AsRef<Path>) -> Result<Self> {
        let mut config = KernelConfig::tutor_profile();
        config.graph.path = graph_path.as_ref().to_path_buf();
        Self::init(config)
    }

    /// Validate, run one full turn through the hypervisor, and return the
    /// response text (plus a debug trace when `debug` is true).
    pub fn process(&self, text: &str, debug: bool) -> Result<ProcessResult> {
        if text.is_empty() {
            return Err(Error::InputInvalid("input must not be empty".to_string()));
        }
        if text.chars().count() > MAX_INPUT_CHARS {
            return Err(Error::InputInvalid(format!(
                "input exceeds {MAX_INPUT_CHARS} characters"
            )));
        }

        if self.busy.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            tracing::warn!("process called while a turn is already in progress");
            return Err(Error::Busy);
        }
        let result = self.hypervisor.process(text, &self.memory, &self.graph);
        self.busy.store(false, Ordering::SeqCst);

        let fired: usize = result.ticks.iter().map(|t| t.demons_fired).sum();
        self.total_fired.fetch_add(fired as u64, Ordering::Relaxed);

        Ok(ProcessResult {
            text: result.text.clone(),
            debug: if debug { Some(result) } else { None },
        })
    }

    pub fn stats(&self) -> KernelStats {
        KernelStats {
            memory: MemoryStats {
                slots: self.memory.len(),
                focused: self.memory.focused().len(),
                total_ticks: self.memory.tick_count(),
            },
            graph: self.graph.stats(),
            demons: DemonStats {
                registered: tk_demons::all().len(),
                total_fired: self.total_fired.load(Ordering::Relaxed),
            },
        }
    }

    /// JSON-serialize the working memory to an opaque blob.
    pub fn save_state(&self) -> Result<Vec<u8>> {
        self.memory.serialize()
    }

    /// Restore working memory from a blob produced by `save_state`.
    /// Leaves the current state untouched on parse failure.
    pub fn load_state(&self, blob: &[u8]) -> Result<()> {
        self.memory.deserialize(blob)
    }

    pub fn list_demons(&self) -> Vec<DemonInfo> {
        tk_demons::all()
            .into_iter()
            .map(|d| DemonInfo {
                id: d.id().to_string(),
                name: d.name().to_string(),
                description: d.description().to_string(),
            })
            .collect()
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }
}
