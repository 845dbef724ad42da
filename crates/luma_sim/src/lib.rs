//! Cycle-based evaluation kernel for the luma pixel pipeline.
//!
//! This crate simulates a fixed synchronous circuit: a packed 24-bit RGB
//! pixel in, an 8-bit greyscale (luma) value out, driven by a clock and an
//! active-low reset. The engine is event-driven: each evaluation step
//! detects which clock/reset edges occurred, then alternates the active
//! (zero-delay combinational) and NBA (registered update) regions to a
//! fixed point, with bounded iteration to catch oscillating designs.
//!
//! # Architecture
//!
//! The model owns the signal state and the reactions; the kernel owns the
//! trigger vectors and the region sequencing. The host toggles input pins
//! between steps and calls [`EvalKernel::eval_step`] once per time step —
//! there is no internal clock and no delay queue.
//!
//! # Usage
//!
//! ```ignore
//! use luma_sim::{run_pixels, SimConfig};
//! use luma_common::Rgb24;
//!
//! let pixels = vec![Rgb24::new(0xFF8000)];
//! let summary = run_pixels(&pixels, &SimConfig::default())?;
//! assert_eq!(summary.gray, vec![151]);
//! ```
//!
//! # Modules
//!
//! - `error` — fault taxonomy (non-convergence, width overflow, zero-delay
//!   contract violations)
//! - `signal` — signal identity and declaration records
//! - `trigger` — edge triggers and the tagged trigger set
//! - `model` — the fixed pipeline model and its region evaluators
//! - `kernel` — the convergence loop and phase orchestration
//! - `waveform` — waveform recording (VCD format)
//! - `trace` — declaration and sampling passes over a model

#![warn(missing_docs)]

pub mod error;
pub mod kernel;
pub mod model;
pub mod signal;
pub mod trace;
pub mod trigger;
pub mod waveform;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use luma_common::Rgb24;

pub use error::{Region, SimError};
pub use kernel::{EvalKernel, EvalModel, CONVERGENCE_LIMIT};
pub use model::{LumaModel, ResetPolicy};
pub use signal::{SignalDecl, SignalDir, SignalId, SignalKind};
pub use trace::{TraceSession, Traceable};
pub use trigger::{Edge, Trigger, TriggerSet};
pub use waveform::{VcdRecorder, WaveformRecorder};

/// Nanoseconds per clock half-period in recorded waveforms.
const HALF_PERIOD_NS: u64 = 5;

/// Configuration for a pixel-stream simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Clock cycles held in reset before pixels are streamed.
    pub reset_cycles: u32,
    /// How model state is filled at construction.
    pub reset_policy: ResetPolicy,
    /// Optional path for waveform output.
    pub waveform_path: Option<PathBuf>,
    /// Whether to record waveform data. Ignored if `waveform_path` is `None`.
    pub record_waveform: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            reset_cycles: 2,
            reset_policy: ResetPolicy::Zeros,
            waveform_path: None,
            record_waveform: false,
        }
    }
}

/// The result of a completed pixel-stream run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Greyscale values collected while `out_valid` was asserted, one per
    /// streamed pixel.
    pub gray: Vec<u8>,
    /// Total clock cycles driven (reset, stream, and trailing drain).
    pub cycles: u64,
    /// Total region passes executed by the kernel.
    pub region_passes: u64,
}

/// High-level entry point: streams pixels through the pipeline.
///
/// Creates a model and kernel per `config`, holds reset for
/// `reset_cycles` cycles, then feeds one pixel per clock cycle with
/// `in_valid` asserted, collecting `gray_out` at every cycle whose
/// `out_valid` is set. A trailing cycle with `in_valid` deasserted drains
/// the valid flag. Optionally records a VCD waveform of the whole run.
pub fn run_pixels(pixels: &[Rgb24], config: &SimConfig) -> Result<RunSummary, SimError> {
    let mut kernel = EvalKernel::new(LumaModel::new(config.reset_policy));
    {
        let m = kernel.model_mut();
        m.clk = false;
        m.rst_n = false;
        m.in_valid = false;
        m.pixel_in = 0;
    }

    let mut trace = if config.record_waveform {
        match &config.waveform_path {
            Some(path) => {
                let file = File::create(path)?;
                let recorder = VcdRecorder::new(BufWriter::new(file));
                Some(TraceSession::new(kernel.model(), "luma", recorder)?)
            }
            None => None,
        }
    } else {
        None
    };

    let mut time = 0u64;
    let mut cycles = 0u64;
    let mut gray = Vec::with_capacity(pixels.len());

    // Establish a consistent start state before any edges.
    kernel.eval_step()?;
    if let Some(t) = trace.as_mut() {
        t.dump(time, kernel.model())?;
    }

    let mut clock_cycle = |kernel: &mut EvalKernel<LumaModel>,
                           trace: &mut Option<TraceSession<VcdRecorder<BufWriter<File>>>>,
                           gray: Option<&mut Vec<u8>>|
     -> Result<(), SimError> {
        kernel.model_mut().clk = true;
        kernel.eval_step()?;
        time += HALF_PERIOD_NS;
        if let Some(t) = trace.as_mut() {
            t.dump(time, kernel.model())?;
        }
        if let Some(gray) = gray {
            if kernel.model().out_valid {
                gray.push(kernel.model().gray_out);
            }
        }
        kernel.model_mut().clk = false;
        kernel.eval_step()?;
        time += HALF_PERIOD_NS;
        if let Some(t) = trace.as_mut() {
            t.dump(time, kernel.model())?;
        }
        cycles += 1;
        Ok(())
    };

    for _ in 0..config.reset_cycles {
        clock_cycle(&mut kernel, &mut trace, None)?;
    }

    kernel.model_mut().rst_n = true;
    for px in pixels {
        {
            let m = kernel.model_mut();
            m.in_valid = true;
            m.set_pixel(*px);
        }
        clock_cycle(&mut kernel, &mut trace, Some(&mut gray))?;
    }

    // Drain: one cycle with valid deasserted so out_valid falls in the trace.
    kernel.model_mut().in_valid = false;
    clock_cycle(&mut kernel, &mut trace, None)?;

    kernel.finalize();
    if let Some(t) = trace.as_mut() {
        t.finalize()?;
    }

    Ok(RunSummary {
        gray,
        cycles,
        region_passes: kernel.region_passes(),
    })
}
