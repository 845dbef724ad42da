//! Luma CLI — the command-line driver for the luma pixel pipeline simulator.
//!
//! Provides `luma run` for streaming a pixel file through the simulated
//! pipeline (optionally recording a VCD waveform) and `luma signals` for
//! inspecting the model's signal declaration table.

#![warn(missing_docs)]

mod config;
mod run;
mod signals;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Luma — a cycle-based simulator for the RGB-to-greyscale pixel pipeline.
#[derive(Parser, Debug)]
#[command(name = "luma", version, about = "Luma pixel pipeline simulator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (per-pixel) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `luma.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream pixels through the pipeline and collect greyscale output.
    Run(RunArgs),
    /// Print the signal declaration table.
    Signals(SignalsArgs),
}

/// Arguments for the `luma run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Pixel input file: one hex value per line, `#` comments allowed.
    pub pixels: Option<String>,

    /// Inline pixel values (e.g. `--pixel 0xFF8000`). May be repeated.
    #[arg(long = "pixel", value_name = "HEX", num_args = 1..)]
    pub pixel: Vec<String>,

    /// Output path for the greyscale values (default: stdout).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output path for the VCD waveform.
    #[arg(long)]
    pub waveform: Option<String>,

    /// Disable waveform recording.
    #[arg(long)]
    pub no_waveform: bool,

    /// Clock cycles held in reset before streaming.
    #[arg(long)]
    pub reset_cycles: Option<u32>,

    /// Fill power-on state with seeded pseudo-random values.
    #[arg(long)]
    pub randomize: bool,

    /// Seed for randomized power-on state.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the `luma signals` subcommand.
#[derive(Parser, Debug)]
pub struct SignalsArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Declaration table output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print per-pixel information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => atty_is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Signals(ref args) => signals::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Rough terminal detection — checks if stdout is a terminal.
fn atty_is_terminal() -> bool {
    // Use a simple heuristic: check the TERM env var.
    std::env::var("TERM").is_ok()
}
