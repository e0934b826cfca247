use tk_domain::config::{KernelConfig, OrchestratorConfig};

#[test]
fn default_orchestrator_bounds_match_spec() {
    let cfg = OrchestratorConfig::default();
    assert_eq!(cfg.max_ticks_per_turn, 20);
    assert_eq!(cfg.max_demons_per_tick, 5);
    assert_eq!(cfg.max_memory_slots, 100);
    assert_eq!(cfg.tick_timeout_ms, 500);
}

#[test]
fn tutor_profile_overrides_bounds() {
    let cfg = OrchestratorConfig::tutor_profile();
    assert_eq!(cfg.max_ticks_per_turn, 15);
    assert_eq!(cfg.max_demons_per_tick, 4);
    assert_eq!(cfg.max_memory_slots, 80);
    assert_eq!(cfg.tick_timeout_ms, 300);
}

#[test]
fn kernel_config_from_env_reads_graph_path() {
    std::env::set_var("TK_GRAPH_PATH", "/tmp/tk-test-graph-path");
    let cfg = KernelConfig::from_env();
    assert_eq!(cfg.graph.path.to_str().unwrap(), "/tmp/tk-test-graph-path");
    std::env::remove_var("TK_GRAPH_PATH");
}
