//! In-process trace accumulated across a turn, returned to the facade when
//! a debug flag is set. Every entry here is also emitted through
//! `tk_domain::trace::TraceEvent` as it happens, so a turn is reconstructable
//! from log output alone even when no caller asked for the in-process copy.

use tk_demons::Action;

#[derive(Debug, Clone)]
pub struct TickResult {
    pub tick: u32,
    pub demons_fired: usize,
    pub slots_written: usize,
    pub slots_evicted: usize,
    pub actions: Vec<Action>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct TurnResult {
    pub text: String,
    pub ticks: Vec<TickResult>,
    pub actions: Vec<Action>,
}
