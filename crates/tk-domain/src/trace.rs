use serde::Serialize;

/// Structured trace events emitted across the reasoning kernel.
///
/// Every event is also logged through `tracing` as a single JSON-encoded
/// field, so a turn can be reconstructed from log output alone even when
/// the caller didn't request an in-process trace.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    TurnStarted {
        input_chars: usize,
    },
    DemonFired {
        tick: u32,
        demon: String,
        slots_written: usize,
        slots_evicted: usize,
        chain: Vec<String>,
    },
    DemonFailed {
        tick: u32,
        demon: String,
        reason: String,
    },
    DemonSkippedTimeout {
        tick: u32,
        demon: String,
    },
    TickCompleted {
        tick: u32,
        demons_fired: usize,
        decay_evictions: usize,
        duration_ms: u64,
    },
    MemoryOverflow {
        tick: u32,
        evicted: usize,
        limit: usize,
    },
    ContradictionDetected {
        concept: String,
        claim1: String,
        claim2: String,
    },
    ResponseEmitted {
        demon: String,
        chars: usize,
    },
    TurnTerminated {
        ticks: u32,
        reason: String,
    },
    LearnPersisted {
        nouns_written: usize,
        relations_written: usize,
        link_failures: usize,
    },
    GraphLinkFailed {
        from: String,
        to: String,
        reason: String,
    },
    EphemeralSweep {
        evicted: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(kernel_event = %json, "tk_event");
    }
}
