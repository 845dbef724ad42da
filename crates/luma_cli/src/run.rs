//! `luma run` — stream pixels through the simulated pipeline.
//!
//! Collects pixel input from a file and/or inline `--pixel` values,
//! resolves the run configuration, drives the simulation, and writes the
//! greyscale results to stdout or a file. Progress goes to stderr unless
//! `--quiet` is set.

use std::io::Write;
use std::path::PathBuf;

use luma_common::Rgb24;
use luma_sim::{ResetPolicy, SimConfig};

use crate::config::{self, RunConfig};
use crate::{GlobalArgs, RunArgs};

/// Runs the `luma run` command.
///
/// Returns exit code 0 on success; all failures propagate as errors.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = config::resolve_config(global.config.as_deref())?;
    let pixels = collect_pixels(args)?;

    if pixels.is_empty() {
        return Err("no pixel input: provide a pixel file or --pixel values".into());
    }

    let sim_config = build_sim_config(args, &config);

    if !global.quiet {
        eprintln!("   Streaming {} pixel(s)", pixels.len());
    }

    let summary = luma_sim::run_pixels(&pixels, &sim_config)?;

    if global.verbose {
        for (px, gray) in pixels.iter().zip(&summary.gray) {
            eprintln!("   {px} -> {gray:#04x}");
        }
    }

    let mut rendered = String::with_capacity(summary.gray.len() * 3);
    for gray in &summary.gray {
        rendered.push_str(&format!("{gray:02X}\n"));
    }
    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => {
            std::io::stdout().write_all(rendered.as_bytes())?;
        }
    }

    if !global.quiet {
        let heading = if global.color {
            "\x1b[32mFinished\x1b[0m"
        } else {
            "Finished"
        };
        eprintln!(
            "   {heading}: {} cycle(s), {} region pass(es)",
            summary.cycles, summary.region_passes
        );
        if let Some(path) = &sim_config.waveform_path {
            if sim_config.record_waveform {
                eprintln!("   Waveform: {}", path.display());
            }
        }
    }

    Ok(0)
}

/// Combines file and CLI configuration into the simulator config.
///
/// CLI flags win over `luma.toml` values; `--no-waveform` wins over both.
fn build_sim_config(args: &RunArgs, config: &RunConfig) -> SimConfig {
    let reset_cycles = args.reset_cycles.unwrap_or(config.sim.reset_cycles);

    let randomize = args.randomize || config.sim.randomize;
    let seed = args.seed.unwrap_or(config.sim.seed);
    let reset_policy = if randomize {
        ResetPolicy::Randomize { seed }
    } else {
        ResetPolicy::Zeros
    };

    let waveform_path: Option<PathBuf> = match &args.waveform {
        Some(path) => Some(PathBuf::from(path)),
        None if config.trace.enabled => config.trace.output.clone(),
        None => None,
    };
    let record_waveform = waveform_path.is_some() && !args.no_waveform;

    SimConfig {
        reset_cycles,
        reset_policy,
        waveform_path,
        record_waveform,
    }
}

/// Gathers pixels from the input file (if any) followed by inline values.
fn collect_pixels(args: &RunArgs) -> Result<Vec<Rgb24>, Box<dyn std::error::Error>> {
    let mut pixels = Vec::new();
    if let Some(path) = &args.pixels {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read pixel file '{path}': {e}"))?;
        pixels.extend(parse_pixel_lines(&text)?);
    }
    for value in &args.pixel {
        pixels.push(value.parse::<Rgb24>()?);
    }
    Ok(pixels)
}

/// Parses pixel-file text: one hex value per line, blank lines and `#`
/// comment lines skipped, trailing `#` comments allowed.
fn parse_pixel_lines(text: &str) -> Result<Vec<Rgb24>, Box<dyn std::error::Error>> {
    let mut pixels = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        // A whole-line `#RRGGBB` value is a pixel, not a comment.
        if let Ok(px) = trimmed.parse::<Rgb24>() {
            pixels.push(px);
            continue;
        }
        let value = match trimmed.find('#') {
            Some(pos) => trimmed[..pos].trim(),
            None => trimmed,
        };
        if value.is_empty() {
            continue;
        }
        let px = value
            .parse::<Rgb24>()
            .map_err(|e| format!("line {}: {e}", lineno + 1))?;
        pixels.push(px);
    }
    Ok(pixels)
}
