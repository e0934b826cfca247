//! Kernel configuration.
//!
//! The reasoning kernel takes almost no configuration — the orchestrator's
//! resource bounds and the graph store's on-disk path are the whole
//! surface. Everything else (which subject buckets exist, which relation
//! types are transitive, …) is a closed vocabulary fixed in code, not a
//! tunable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming the graph store's on-disk directory. This is
/// the only configuration that reaches the kernel through the environment.
pub const GRAPH_PATH_ENV: &str = "TK_GRAPH_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorConfig::default(),
            graph: GraphConfig::default(),
        }
    }
}

impl KernelConfig {
    /// Resolve the graph path from `TK_GRAPH_PATH`, falling back to the
    /// struct default when the variable is unset.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(path) = std::env::var(GRAPH_PATH_ENV) {
            cfg.graph.path = PathBuf::from(path);
        }
        cfg
    }

    /// The alternate resource profile used by the tutor kernel
    /// (15 ticks / 4 demons per tick / 80 slots / 300ms).
    pub fn tutor_profile() -> Self {
        Self {
            orchestrator: OrchestratorConfig::tutor_profile(),
            graph: GraphConfig::default(),
        }
    }
}

/// Resource bounds enforced by the orchestrator on every turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "d_max_ticks")]
    pub max_ticks_per_turn: u32,
    #[serde(default = "d_max_demons")]
    pub max_demons_per_tick: u32,
    #[serde(default = "d_max_slots")]
    pub max_memory_slots: usize,
    #[serde(default = "d_tick_timeout")]
    pub tick_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_ticks_per_turn: d_max_ticks(),
            max_demons_per_tick: d_max_demons(),
            max_memory_slots: d_max_slots(),
            tick_timeout_ms: d_tick_timeout(),
        }
    }
}

impl OrchestratorConfig {
    pub fn tutor_profile() -> Self {
        Self {
            max_ticks_per_turn: 15,
            max_demons_per_tick: 4,
            max_memory_slots: 80,
            tick_timeout_ms: 300,
        }
    }
}

fn d_max_ticks() -> u32 {
    20
}
fn d_max_demons() -> u32 {
    5
}
fn d_max_slots() -> usize {
    100
}
fn d_tick_timeout() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "d_graph_path")]
    pub path: PathBuf,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            path: d_graph_path(),
        }
    }
}

fn d_graph_path() -> PathBuf {
    PathBuf::from("./data/graph")
}
