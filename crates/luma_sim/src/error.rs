//! Simulation error types for the evaluation kernel.
//!
//! Every fault the kernel can detect is a variant of [`SimError`]. None of
//! them are recoverable mid-step: a non-convergent region or an out-of-width
//! pin indicates a defect in the simulated design or in the host harness,
//! not a transient runtime condition.

use std::fmt;
use std::io;

/// The evaluation region in which a fault was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The zero-delay combinational (active) region.
    Active,
    /// The non-blocking-assignment region.
    Nba,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Active => write!(f, "active"),
            Region::Nba => write!(f, "NBA"),
        }
    }
}

/// Errors that can occur during an evaluation step or while tracing.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A region's fixed-point iteration exceeded its bound, indicating an
    /// oscillating or ill-formed dependency graph in the simulated design.
    #[error("{region} region did not converge (iteration bound {bound})")]
    NonConvergence {
        /// The region that failed to settle.
        region: Region,
        /// The iteration bound that was exceeded.
        bound: u32,
    },

    /// A host-writable pin holds bits outside its declared width.
    ///
    /// Only raised by the diagnostic-build width checker; release builds
    /// skip the check entirely.
    #[error("signal '{signal}' exceeds its {width}-bit width (value {value:#x})")]
    WidthOverflow {
        /// Name of the offending signal.
        signal: &'static str,
        /// The signal's declared bit width.
        width: u32,
        /// The out-of-range value found.
        value: u32,
    },

    /// A timed-event query was made against a zero-delay design.
    ///
    /// The pipeline has no delay queue; every edge is applied by the caller
    /// between steps. Asking for the next scheduled time slot is a harness
    /// contract violation.
    #[error("no timed events: the design is zero-delay only")]
    ZeroDelayOnly,

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}
