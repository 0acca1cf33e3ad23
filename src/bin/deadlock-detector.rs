//! Deadlock Detector CLI
//!
//! Usage:
//!   deadlock-detector run                      (reads mode.txt and dispatches)
//!   deadlock-detector run --mode rag --show-cycle
//!   deadlock-detector rag graph.txt
//!   deadlock-detector banker banker_input.txt --table
//!   deadlock-detector --format json banker

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use deadlock_detector::config::{AnalyzerConfig, ConfigBuilder};
use deadlock_detector::detection::report::{self, RenderOptions};
use deadlock_detector::{observability, Analysis, Analyzer, Mode, ScanOrder};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deadlock-detector")]
#[command(about = "Detect deadlocks with resource-allocation graphs or the Banker's algorithm")]
#[command(long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON configuration file
    #[arg(short, long, env = "DEADLOCK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding mode.txt, graph.txt and banker_input.txt
    #[arg(short, long, global = true)]
    base_dir: Option<PathBuf>,

    /// Safety check scan order: continue, restart
    #[arg(long, global = true)]
    scan_order: Option<ScanOrder>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the mode file and run the analysis it selects
    Run {
        /// Use this mode instead of reading the mode file
        #[arg(long)]
        mode: Option<Mode>,

        /// Print the cycle found by the graph analysis
        #[arg(long)]
        show_cycle: bool,

        /// Print the Max/Allocation/Need table for Banker's results
        #[arg(long)]
        table: bool,
    },

    /// Detect a cycle in a resource-allocation graph
    Rag {
        /// Graph input file (defaults to the configured graph file)
        file: Option<PathBuf>,

        /// Print the cycle found
        #[arg(long)]
        show_cycle: bool,
    },

    /// Check whether a resource state is safe
    Banker {
        /// Resource-state input file (defaults to the configured banker file)
        file: Option<PathBuf>,

        /// Print the Max/Allocation/Need table
        #[arg(long)]
        table: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    observability::init_logging(&config.logging).context("failed to initialise logging")?;

    let analyzer = Analyzer::new(config);
    let command = cli.command.unwrap_or(Commands::Run {
        mode: None,
        show_cycle: false,
        table: false,
    });

    let (analysis, options) = match command {
        Commands::Run {
            mode,
            show_cycle,
            table,
        } => {
            let mode = match mode {
                Some(mode) => mode,
                None => analyzer.mode().context("failed to read mode selector")?,
            };
            let analysis = analyzer.run_mode(mode).context("analysis failed")?;
            (
                analysis,
                RenderOptions {
                    show_cycle,
                    show_table: table,
                },
            )
        }
        Commands::Rag { file, show_cycle } => {
            let path = file.unwrap_or_else(|| analyzer.config().graph_path());
            let analysis = analyzer
                .analyze_graph_file(&path)
                .with_context(|| format!("graph analysis of {} failed", path.display()))?;
            (
                analysis,
                RenderOptions {
                    show_cycle,
                    show_table: false,
                },
            )
        }
        Commands::Banker { file, table } => {
            let path = file.unwrap_or_else(|| analyzer.config().banker_path());
            let analysis = analyzer
                .analyze_resource_file(&path)
                .with_context(|| format!("safety check of {} failed", path.display()))?;
            (
                analysis,
                RenderOptions {
                    show_cycle: false,
                    show_table: table,
                },
            )
        }
    };

    match cli.format {
        OutputFormat::Text => print_text(&analysis, &options),
        OutputFormat::Json => println!("{}", report::render_json(&analysis)?),
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let base = match &cli.config {
        Some(path) => AnalyzerConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalyzerConfig::from_env().context("invalid configuration")?,
    };

    let mut builder = ConfigBuilder::from_config(base);
    if let Some(dir) = &cli.base_dir {
        builder = builder.with_base_dir(dir);
    }
    if let Some(order) = cli.scan_order {
        builder = builder.with_scan_order(order);
    }
    if let Some(level) = &cli.log_level {
        builder = builder.with_log_level(level.to_lowercase());
    }

    builder.build().context("invalid configuration")
}

fn print_text(analysis: &Analysis, options: &RenderOptions) {
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let text = report::render_text(analysis, options);
    let headline = report::decision_line(analysis);
    let rest = text.strip_prefix(headline).unwrap_or("");

    if analysis.is_deadlocked() {
        println!("{}{}", headline.red().bold(), rest);
    } else {
        println!("{}{}", headline.green(), rest);
    }
}
