//! Shapes returned by [`crate::Kernel::stats`].

use serde::Serialize;
use tk_graph::GraphStats;

#[derive(Debug, Clone, Serialize)]
pub struct MemoryStats {
    pub slots: usize,
    pub focused: usize,
    pub total_ticks: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemonStats {
    pub registered: usize,
    pub total_fired: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct KernelStats {
    pub memory: MemoryStats,
    pub graph: GraphStats,
    pub demons: DemonStats,
}
