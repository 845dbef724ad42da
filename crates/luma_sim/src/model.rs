//! The luma pipeline model: signal state, trigger detection, and the
//! region evaluators for the fixed RGB-to-greyscale circuit.
//!
//! [`LumaModel`] holds every pin and register of the design as a flat set of
//! width-bounded fields, persisted across evaluation steps. The host writes
//! input pins directly between steps; the kernel drives the evaluators. The
//! registered state (`gray_out`, `out_valid`, `acc`) is written only inside
//! the NBA evaluator, so reads during a step always observe pre-step values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use luma_common::bits;
use luma_common::rgb::{Rgb24, PIXEL_WIDTH};

use crate::error::SimError;
use crate::kernel::EvalModel;
use crate::signal::{SignalDecl, SignalDir, SignalId, SignalKind};
use crate::trace::Traceable;
use crate::trigger::{detect_edge, Edge, Trigger, TriggerSet};

/// Red channel weight in the luma sum.
pub const WEIGHT_R: u32 = 0x4D;
/// Green channel weight in the luma sum.
pub const WEIGHT_G: u32 = 0x96;
/// Blue channel weight in the luma sum.
pub const WEIGHT_B: u32 = 0x1D;

/// Bit width of the greyscale output register.
pub const GRAY_WIDTH: u32 = 8;
/// Bit width of the diagnostic accumulator register.
pub const ACC_WIDTH: u32 = 18;

/// How model state is filled at construction.
///
/// `Randomize` mirrors hardware power-on uncertainty: every state variable,
/// including the previous-value sample slots, is filled with seeded
/// pseudo-random bits masked to its declared width. Two models built with
/// the same seed are identical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetPolicy {
    /// All state starts at zero.
    #[default]
    Zeros,
    /// All state starts at seeded pseudo-random values.
    Randomize {
        /// Seed for the state-fill RNG.
        seed: u64,
    },
}

/// Signal state for the luma pipeline.
///
/// Input and output pins are public fields; the host toggles inputs between
/// evaluation steps and reads outputs afterwards. The accumulator is
/// diagnostic-only and exposed read-only via [`acc`](LumaModel::acc).
#[derive(Clone, Debug)]
pub struct LumaModel {
    /// Clock input.
    pub clk: bool,
    /// Active-low reset input.
    pub rst_n: bool,
    /// Input-valid strobe.
    pub in_valid: bool,
    /// Packed 24-bit RGB pixel input.
    pub pixel_in: u32,
    /// Output-valid flag, registered.
    pub out_valid: bool,
    /// 8-bit greyscale output, registered.
    pub gray_out: u8,
    /// 18-bit unshifted weighted sum, registered. Diagnostic only.
    acc: u32,
    /// Previous clock sample for edge detection.
    prev_clk: bool,
    /// Previous reset sample for edge detection.
    prev_rst_n: bool,
}

impl LumaModel {
    /// Creates a model with state filled per the given policy.
    pub fn new(policy: ResetPolicy) -> Self {
        match policy {
            ResetPolicy::Zeros => Self {
                clk: false,
                rst_n: false,
                in_valid: false,
                pixel_in: 0,
                out_valid: false,
                gray_out: 0,
                acc: 0,
                prev_clk: false,
                prev_rst_n: false,
            },
            ResetPolicy::Randomize { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                Self {
                    clk: rng.gen(),
                    rst_n: rng.gen(),
                    in_valid: rng.gen(),
                    pixel_in: bits::truncate(rng.gen(), PIXEL_WIDTH),
                    out_valid: rng.gen(),
                    gray_out: rng.gen(),
                    acc: bits::truncate(rng.gen(), ACC_WIDTH),
                    prev_clk: rng.gen(),
                    prev_rst_n: rng.gen(),
                }
            }
        }
    }

    /// Returns the diagnostic accumulator value.
    pub fn acc(&self) -> u32 {
        self.acc
    }

    /// Sets the pixel input from a packed pixel value.
    pub fn set_pixel(&mut self, px: Rgb24) {
        self.pixel_in = px.packed();
    }

    /// The registered reaction fired on a clock or reset edge.
    ///
    /// `out_valid` is recomputed on every fired edge, before and independent
    /// of the reset branch below; when reset is asserted it therefore
    /// deasserts in the same cycle the data registers clear.
    fn nba_sequent(&mut self) {
        self.out_valid = self.rst_n && self.in_valid;
        if self.rst_n {
            if self.in_valid {
                let px = Rgb24::new(self.pixel_in);
                let sum = WEIGHT_R * u32::from(px.r())
                    + WEIGHT_G * u32::from(px.g())
                    + WEIGHT_B * u32::from(px.b());
                self.gray_out = bits::truncate(sum >> 8, GRAY_WIDTH) as u8;
                self.acc = bits::truncate(sum, ACC_WIDTH);
            }
        } else {
            self.gray_out = 0;
            self.acc = 0;
        }
    }

    /// The model's declaration table, in [`SignalId`] order.
    ///
    /// Covers the pin boundary, the diagnostic internals (the derived
    /// channel slices and the accumulator), and the weight parameters.
    pub const DECLS: &'static [SignalDecl] = &[
        SignalDecl {
            id: SignalId::from_raw(0),
            name: "clk",
            width: 1,
            dir: SignalDir::Input,
            kind: SignalKind::Wire,
        },
        SignalDecl {
            id: SignalId::from_raw(1),
            name: "rst_n",
            width: 1,
            dir: SignalDir::Input,
            kind: SignalKind::Wire,
        },
        SignalDecl {
            id: SignalId::from_raw(2),
            name: "in_valid",
            width: 1,
            dir: SignalDir::Input,
            kind: SignalKind::Wire,
        },
        SignalDecl {
            id: SignalId::from_raw(3),
            name: "pixel_in",
            width: 24,
            dir: SignalDir::Input,
            kind: SignalKind::Wire,
        },
        SignalDecl {
            id: SignalId::from_raw(4),
            name: "out_valid",
            width: 1,
            dir: SignalDir::Output,
            kind: SignalKind::Wire,
        },
        SignalDecl {
            id: SignalId::from_raw(5),
            name: "gray_out",
            width: 8,
            dir: SignalDir::Output,
            kind: SignalKind::Wire,
        },
        SignalDecl {
            id: SignalId::from_raw(6),
            name: "R",
            width: 8,
            dir: SignalDir::Internal,
            kind: SignalKind::Wire,
        },
        SignalDecl {
            id: SignalId::from_raw(7),
            name: "G",
            width: 8,
            dir: SignalDir::Internal,
            kind: SignalKind::Wire,
        },
        SignalDecl {
            id: SignalId::from_raw(8),
            name: "B",
            width: 8,
            dir: SignalDir::Internal,
            kind: SignalKind::Wire,
        },
        SignalDecl {
            id: SignalId::from_raw(9),
            name: "acc",
            width: 18,
            dir: SignalDir::Internal,
            kind: SignalKind::Wire,
        },
        SignalDecl {
            id: SignalId::from_raw(10),
            name: "C_R",
            width: 32,
            dir: SignalDir::Internal,
            kind: SignalKind::Parameter,
        },
        SignalDecl {
            id: SignalId::from_raw(11),
            name: "C_G",
            width: 32,
            dir: SignalDir::Internal,
            kind: SignalKind::Parameter,
        },
        SignalDecl {
            id: SignalId::from_raw(12),
            name: "C_B",
            width: 32,
            dir: SignalDir::Internal,
            kind: SignalKind::Parameter,
        },
    ];

    /// Samples the current bit-exact value of a declared signal.
    ///
    /// Values are truncated to the signal's declared width. The derived
    /// slices `R`/`G`/`B` are computed from the pixel bus on the fly.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in [`DECLS`](Self::DECLS).
    pub fn sample(&self, id: SignalId) -> u32 {
        let px = Rgb24::new(self.pixel_in);
        match id.as_raw() {
            0 => u32::from(self.clk),
            1 => u32::from(self.rst_n),
            2 => u32::from(self.in_valid),
            3 => bits::truncate(self.pixel_in, PIXEL_WIDTH),
            4 => u32::from(self.out_valid),
            5 => u32::from(self.gray_out),
            6 => u32::from(px.r()),
            7 => u32::from(px.g()),
            8 => u32::from(px.b()),
            9 => self.acc,
            10 => WEIGHT_R,
            11 => WEIGHT_G,
            12 => WEIGHT_B,
            other => panic!("unknown signal id {other}"),
        }
    }
}

impl Default for LumaModel {
    fn default() -> Self {
        Self::new(ResetPolicy::Zeros)
    }
}

impl Traceable for LumaModel {
    fn declarations(&self) -> &'static [SignalDecl] {
        Self::DECLS
    }

    fn sample(&self, id: SignalId) -> u32 {
        LumaModel::sample(self, id)
    }
}

impl EvalModel for LumaModel {
    fn capture_baseline(&mut self) {
        self.prev_clk = self.clk;
        self.prev_rst_n = self.rst_n;
    }

    fn detect_triggers(&mut self) -> TriggerSet {
        let mut fired = TriggerSet::new();
        if detect_edge(self.prev_clk, self.clk, Edge::Rising) {
            fired.insert(Trigger::ClkRise);
        }
        if detect_edge(self.prev_rst_n, self.rst_n, Edge::Falling) {
            fired.insert(Trigger::RstFall);
        }
        self.prev_clk = self.clk;
        self.prev_rst_n = self.rst_n;
        fired
    }

    fn eval_active(&mut self, _fired: &TriggerSet) {
        // The transform is fully registered; nothing settles in the active
        // region of this design.
    }

    fn eval_nba(&mut self, fired: &TriggerSet) {
        if fired.contains(Trigger::ClkRise) || fired.contains(Trigger::RstFall) {
            self.nba_sequent();
        }
    }

    fn check_widths(&self) -> Result<(), SimError> {
        // The 1-bit pins are type-bound and the registered outputs are
        // masked on every assignment; only the pixel bus can be driven
        // out of width by the host.
        if bits::exceeds_width(self.pixel_in, PIXEL_WIDTH) {
            return Err(SimError::WidthOverflow {
                signal: "pixel_in",
                width: PIXEL_WIDTH,
                value: self.pixel_in,
            });
        }
        Ok(())
    }
}
