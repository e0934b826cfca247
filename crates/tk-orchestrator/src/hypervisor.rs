//! The Hypervisor: the reasoning kernel's scheduler. Drives a chain-only
//! tick loop over the demon registry, applying each demon's mutation plan
//! to working memory and the graph store as it fires.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use tk_domain::config::OrchestratorConfig;
use tk_domain::slot::{Slot, SlotContent, SlotTag};
use tk_domain::trace::TraceEvent;
use tk_graph::GraphStore;
use tk_memory::WorkingMemory;

use crate::trace::{TickResult, TurnResult};

const FALLBACK_RESPONSE: &str =
    "I'd love to help you learn! Could you tell me a bit more about what you're curious about?";

pub struct Hypervisor {
    config: OrchestratorConfig,
}

impl Hypervisor {
    pub fn new(config: OrchestratorConfig) -> Self {
        tracing::debug!(
            max_ticks_per_turn = config.max_ticks_per_turn,
            max_demons_per_tick = config.max_demons_per_tick,
            max_memory_slots = config.max_memory_slots,
            tick_timeout_ms = config.tick_timeout_ms,
            "hypervisor constructed"
        );
        Self { config }
    }

    /// Run one full turn: seed `parse`, drive the chain-only tick loop to
    /// completion or budget exhaustion, fire `learn` once, and sweep
    /// ephemeral slots. Assumes `text` has already been validated by the
    /// caller (the kernel facade).
    pub fn process(&self, text: &str, memory: &WorkingMemory, graph: &GraphStore) -> TurnResult {
        TraceEvent::TurnStarted { input_chars: text.chars().count() }.emit();
        memory.write(Slot::new("hypervisor", SlotTag::RawInput, SlotContent::RawInput { text: text.to_string() }, 1.0, 0));

        let mut pending: VecDeque<String> = VecDeque::from([String::from("parse")]);
        let mut response: Option<String> = None;
        let mut all_actions = Vec::new();
        let mut ticks = Vec::new();
        let mut terminated_early = false;

        let mut tick: u32 = 0;
        while tick < self.config.max_ticks_per_turn && !pending.is_empty() {
            tick += 1;
            let tick_start = Instant::now();

            let batch_len = (self.config.max_demons_per_tick as usize).min(pending.len());
            let batch: Vec<String> = pending.drain(..batch_len).collect();

            let mut fired_this_tick = std::collections::HashSet::new();
            let mut demons_fired = 0usize;
            let mut slots_written = 0usize;
            let mut slots_evicted = 0usize;
            let mut tick_actions = Vec::new();
            let mut next_chain: Vec<String> = Vec::new();

            for id in &batch {
                if !fired_this_tick.insert(id.clone()) {
                    continue;
                }
                if tick_start.elapsed().as_millis() as u64 > self.config.tick_timeout_ms {
                    TraceEvent::DemonSkippedTimeout { tick, demon: id.clone() }.emit();
                    break;
                }

                let Some(demon) = tk_demons::by_id(id) else { continue };
                let view = memory.snapshot();

                let outcome = catch_unwind(AssertUnwindSafe(|| demon.run(&view, graph)));
                let output = match outcome {
                    Ok(output) => output,
                    Err(_) => {
                        TraceEvent::DemonFailed { tick, demon: id.clone(), reason: "panic".to_string() }.emit();
                        continue;
                    }
                };

                demons_fired += 1;
                slots_written += output.write.len();

                for slot in &output.write {
                    if slot.tag == SlotTag::Contradiction {
                        if let SlotContent::Contradiction(fact) = &slot.content {
                            TraceEvent::ContradictionDetected {
                                concept: fact.concept.clone(),
                                claim1: fact.claim1.clone(),
                                claim2: fact.claim2.clone(),
                            }
                            .emit();
                        }
                    }
                    memory.write(slot.clone());
                }
                for evict_id in &output.evict {
                    if memory.evict(evict_id) {
                        slots_evicted += 1;
                    }
                }
                if let Some(focus) = &output.focus {
                    memory.set_focus(focus);
                }

                let overflow = memory.enforce_limit(self.config.max_memory_slots);
                if !overflow.is_empty() {
                    TraceEvent::MemoryOverflow { tick, evicted: overflow.len(), limit: self.config.max_memory_slots }.emit();
                    slots_evicted += overflow.len();
                }

                for action in &output.actions {
                    if response.is_none() {
                        if let Some(text) = action.response_text() {
                            response = Some(text.to_string());
                            TraceEvent::ResponseEmitted { demon: id.clone(), chars: text.chars().count() }.emit();
                        }
                    }
                }
                tick_actions.extend(output.actions.clone());

                TraceEvent::DemonFired {
                    tick,
                    demon: id.clone(),
                    slots_written: output.write.len(),
                    slots_evicted: output.evict.len(),
                    chain: output.chain.clone(),
                }
                .emit();

                // Chain hints are ignored once a response exists.
                if response.is_none() {
                    next_chain.extend(output.chain.clone());
                } else if output.chain.is_empty() {
                    terminated_early = true;
                    break;
                }
            }

            all_actions.extend(tick_actions.clone());

            let decay_evictions = memory.tick();
            slots_evicted += decay_evictions.len();

            let duration_ms = tick_start.elapsed().as_millis() as u64;
            TraceEvent::TickCompleted { tick, demons_fired, decay_evictions: decay_evictions.len(), duration_ms }.emit();
            ticks.push(TickResult { tick, demons_fired, slots_written, slots_evicted, actions: tick_actions, duration_ms });

            if terminated_early {
                break;
            }

            for id in next_chain {
                if !pending.contains(&id) {
                    pending.push_back(id);
                }
            }

            if pending.is_empty() && response.is_some() {
                break;
            }
        }

        let reason = if terminated_early {
            "terminal respond"
        } else if pending.is_empty() {
            "queue empty"
        } else {
            "tick budget exhausted"
        };
        TraceEvent::TurnTerminated { ticks: tick, reason: reason.to_string() }.emit();

        self.fire_learn(memory, graph);
        self.sweep_ephemeral(memory);

        TurnResult { text: response.unwrap_or_else(|| FALLBACK_RESPONSE.to_string()), ticks, actions: all_actions }
    }

    /// Fired exactly once per turn, independent of the chain model.
    fn fire_learn(&self, memory: &WorkingMemory, graph: &GraphStore) {
        let Some(learn) = tk_demons::by_id("learn") else { return };
        let view = memory.snapshot();
        let outcome = catch_unwind(AssertUnwindSafe(|| learn.run(&view, graph)));
        match outcome {
            Ok(output) => {
                for slot in output.write {
                    memory.write(slot);
                }
            }
            Err(_) => TraceEvent::DemonFailed { tick: 0, demon: "learn".to_string(), reason: "panic".to_string() }.emit(),
        }
    }

    fn sweep_ephemeral(&self, memory: &WorkingMemory) {
        let mut evicted = 0usize;
        for tag in SlotTag::EPHEMERAL {
            for slot in memory.find_by_tag(*tag) {
                if memory.evict(&slot.id) {
                    evicted += 1;
                }
            }
        }
        TraceEvent::EphemeralSweep { evicted }.emit();
    }
}
