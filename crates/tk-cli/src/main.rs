use std::path::PathBuf;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tk_domain::config::{KernelConfig, GRAPH_PATH_ENV};
use tk_kernel::Kernel;
use tracing_subscriber::EnvFilter;

/// Local REPL for the reasoning kernel. Talks to a `Kernel` instance
/// entirely through its public facade — no direct graph or memory access.
#[derive(Parser, Debug)]
#[command(name = "tk", version, about = "Socratic tutor reasoning kernel REPL")]
struct Cli {
    /// Path to a TOML config file. Falls back to TK_GRAPH_PATH / defaults
    /// when absent or unreadable.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the graph store's on-disk directory.
    #[arg(long)]
    graph_path: Option<PathBuf>,

    /// Print the structured per-tick trace after every turn.
    #[arg(long)]
    debug: bool,
}

fn load_config(cli: &Cli) -> KernelConfig {
    let mut config = match &cli.config {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %path.display(), "failed to parse config, using defaults");
                KernelConfig::tutor_profile()
            }),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "failed to read config, using defaults");
                KernelConfig::tutor_profile()
            }
        },
        None => KernelConfig::from_env(),
    };

    if let Some(graph_path) = &cli.graph_path {
        config.graph.path = graph_path.clone();
    } else if std::env::var(GRAPH_PATH_ENV).is_err() && cli.config.is_none() {
        if let Some(data_dir) = dirs::data_dir() {
            config.graph.path = data_dir.join("tk-tutor").join("graph");
        }
    }
    config
}

fn print_help() {
    println!(
        "commands: :stats  :demons  :save <path>  :load <path>  :debug on|off  :help  :quit"
    );
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tk_kernel=info,tk_orchestrator=info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli);
    tracing::info!(graph_path = %config.graph.path.display(), "tk starting");

    let kernel = Kernel::init(config)?;
    let mut debug = cli.debug;

    println!("Socratic tutor reasoning kernel. Type :help for commands, :quit to exit.");

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Some(rest) = line.strip_prefix(':') {
                    let mut parts = rest.splitn(2, char::is_whitespace);
                    match parts.next().unwrap_or("") {
                        "quit" | "q" | "exit" => break,
                        "help" => print_help(),
                        "stats" => {
                            let stats = kernel.stats();
                            println!("{}", serde_json::to_string_pretty(&stats)?);
                        }
                        "demons" => {
                            for d in kernel.list_demons() {
                                println!("{:<10} {:<10} {}", d.id, d.name, d.description);
                            }
                        }
                        "save" => {
                            let path = parts.next().unwrap_or("").trim();
                            if path.is_empty() {
                                println!("usage: :save <path>");
                            } else {
                                let blob = kernel.save_state()?;
                                std::fs::write(path, blob)?;
                                println!("saved working memory to {path}");
                            }
                        }
                        "load" => {
                            let path = parts.next().unwrap_or("").trim();
                            if path.is_empty() {
                                println!("usage: :load <path>");
                            } else {
                                match std::fs::read(path) {
                                    Ok(blob) => match kernel.load_state(&blob) {
                                        Ok(()) => println!("loaded working memory from {path}"),
                                        Err(e) => println!("load failed: {e}"),
                                    },
                                    Err(e) => println!("could not read {path}: {e}"),
                                }
                            }
                        }
                        "debug" => {
                            let arg = parts.next().unwrap_or("").trim();
                            debug = matches!(arg, "on" | "true" | "1");
                            println!("debug trace {}", if debug { "on" } else { "off" });
                        }
                        other => println!("unknown command: :{other} (try :help)"),
                    }
                    continue;
                }

                match kernel.process(line, debug) {
                    Ok(result) => {
                        println!("tutor> {}", result.text);
                        if let Some(trace) = result.debug {
                            for tick in &trace.ticks {
                                println!(
                                    "  tick {:>2}: {} demon(s), +{} slots, -{} slots, {}ms",
                                    tick.tick, tick.demons_fired, tick.slots_written, tick.slots_evicted, tick.duration_ms
                                );
                            }
                        }
                    }
                    Err(e) => println!("error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!(error = %e, "readline error");
                break;
            }
        }
    }

    Ok(())
}
