use tk_domain::{Slot, SlotContent, SlotTag};
use tk_memory::WorkingMemory;

fn slot(tag: SlotTag, confidence: f64, ttl: u32) -> Slot {
    Slot::new("test", tag, SlotContent::Raw(serde_json::json!(null)), confidence, ttl)
}

#[test]
fn tick_decrements_ttl_and_evicts_at_zero() {
    let mem = WorkingMemory::new();
    let s = mem.write(slot(SlotTag::NounPhrase, 0.8, 2));

    let evicted = mem.tick();
    assert!(evicted.is_empty());
    assert_eq!(mem.read(&s.id).unwrap().ttl, 1);

    let evicted = mem.tick();
    assert_eq!(evicted, vec![s.id.clone()]);
    assert!(mem.read(&s.id).is_none());
}

#[test]
fn ttl_zero_slots_survive_ticks() {
    let mem = WorkingMemory::new();
    let s = mem.write(slot(SlotTag::Intent, 0.9, 0));
    for _ in 0..10 {
        mem.tick();
    }
    assert!(mem.read(&s.id).is_some());
}

#[test]
fn enforce_limit_prefers_unfocused_low_confidence_slots() {
    let mem = WorkingMemory::new();
    let keep = mem.write(slot(SlotTag::Relation, 0.9, 0));
    let drop_candidate = mem.write(slot(SlotTag::ContextFact, 0.1, 0));
    mem.set_focus(&[keep.id.clone()]);

    let evicted = mem.enforce_limit(1);
    assert_eq!(evicted, vec![drop_candidate.id]);
    assert_eq!(mem.len(), 1);
    assert!(mem.read(&keep.id).is_some());
}

#[test]
fn enforce_limit_evicts_focused_slots_only_as_last_resort() {
    let mem = WorkingMemory::new();
    let a = mem.write(slot(SlotTag::Relation, 0.5, 0));
    let b = mem.write(slot(SlotTag::Relation, 0.5, 0));
    mem.set_focus(&[a.id.clone(), b.id.clone()]);

    let evicted = mem.enforce_limit(1);
    assert_eq!(evicted.len(), 1);
    assert_eq!(mem.len(), 1);
}

#[test]
fn set_focus_silently_drops_unknown_ids() {
    let mem = WorkingMemory::new();
    let s = mem.write(slot(SlotTag::Intent, 0.5, 0));
    mem.set_focus(&[s.id.clone(), "nonexistent".to_string()]);
    assert_eq!(mem.focused().len(), 1);
}

#[test]
fn evict_removes_from_focus_too() {
    let mem = WorkingMemory::new();
    let s = mem.write(slot(SlotTag::Intent, 0.5, 0));
    mem.set_focus(&[s.id.clone()]);
    assert!(mem.evict(&s.id));
    assert!(mem.focused().is_empty());
}

#[test]
fn round_trip_serialize_deserialize() {
    let mem = WorkingMemory::new();
    let s = mem.write(slot(SlotTag::NounPhrase, 0.7, 5));
    mem.set_focus(&[s.id.clone()]);

    let blob = mem.serialize().unwrap();

    let restored = WorkingMemory::new();
    restored.deserialize(&blob).unwrap();

    assert_eq!(restored.len(), mem.len());
    assert_eq!(restored.focused().len(), 1);
    assert_eq!(restored.read(&s.id).unwrap().ttl, 5);
}
