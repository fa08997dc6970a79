//! Tomasulo scheduling simulator CLI.
//!
//! This binary runs a program text file through the simulator. It provides:
//! 1. **Run:** Simulate a program and print each cycle's tables, a JSON trace, or a summary.
//! 2. **Config:** Print the default machine configuration as JSON, as a starting point for `-c`.

mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tomasulo_core::Config;
use tomasulo_core::core::CycleSnapshot;
use tomasulo_core::sim::{RunSummary, Simulator, loader};
use tomasulo_core::stats::{STATS_SECTIONS, SimStats};

#[derive(Parser, Debug)]
#[command(
    name = "tomasulo",
    author,
    version,
    about = "Tomasulo dynamic-scheduling simulator",
    long_about = "Simulate a floating-point program on a Tomasulo machine and print its cycle-by-cycle schedule.\n\nExamples:\n  tomasulo run -f programs/daxpy.txt\n  tomasulo run -f programs/daxpy.txt -c machine.json --format summary --stats\n  tomasulo config > machine.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a program to completion.
    Run {
        /// Program text file, one instruction per line.
        #[arg(short, long)]
        file: PathBuf,

        /// JSON machine configuration; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Print statistics afterwards; give section names to restrict the output.
        #[arg(
            long,
            num_args = 0..,
            value_parser = PossibleValuesParser::new(STATS_SECTIONS.iter().copied())
        )]
        stats: Option<Vec<String>>,

        /// Log every scheduler event and per-cycle snapshot to stderr.
        #[arg(long)]
        trace: bool,
    },

    /// Print the default configuration as JSON.
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Four tables per cycle.
    Table,
    /// One JSON document with every cycle snapshot, the final state and statistics.
    Json,
    /// Final timeline and register values only.
    Summary,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    cycles: &'a [CycleSnapshot],
    summary: &'a RunSummary,
    stats: &'a SimStats,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run {
            file,
            config,
            format,
            stats,
            trace,
        }) => cmd_run(&file, config.as_deref(), format, stats.as_deref(), trace),
        Some(Commands::Config) => cmd_config(),
        None => {
            eprintln!("Tomasulo Simulator - pass a subcommand");
            eprintln!();
            eprintln!("  tomasulo run -f <program>   Simulate a program");
            eprintln!("  tomasulo config             Print the default configuration");
            eprintln!();
            eprintln!("  tomasulo --help  for full options");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Loads the configuration and program, runs to completion and prints in `format`.
fn cmd_run(
    file: &Path,
    config_path: Option<&Path>,
    format: Format,
    stats: Option<&[String]>,
    trace: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(trace);

    let mut config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.general.trace |= trace;
    tracing::debug!(?config, "configuration");

    let program = loader::load_program(file)?;
    let mut sim = Simulator::new(program, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        Format::Table => {
            let mut failed = None;
            let _ = sim.run_with(|snap| {
                if failed.is_none() {
                    failed = render::write_cycle(&mut out, snap).err();
                }
            })?;
            if let Some(e) = failed {
                return Err(e.into());
            }
        }
        Format::Json => {
            let mut cycles = Vec::new();
            let summary = sim.run_with(|snap| cycles.push(snap.clone()))?;
            let report = JsonReport {
                cycles: &cycles,
                summary: &summary,
                stats: sim.stats(),
            };
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
        Format::Summary => {
            let summary = sim.run()?;
            render::write_summary(&mut out, &summary)?;
        }
    }

    if let Some(sections) = stats {
        sim.stats().write_sections(&mut out, sections)?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_config() -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &Config::default())?;
    writeln!(out)?;
    Ok(())
}
