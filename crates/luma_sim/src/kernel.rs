//! Evaluation kernel: trigger-vector ownership, two-phase region iteration,
//! and per-step phase orchestration.
//!
//! [`EvalKernel`] advances a model by exactly one time step per
//! [`eval_step`](EvalKernel::eval_step) call. Each step alternates the
//! active region (zero-delay combinational reactions) and the NBA region
//! (registered updates) until neither produces new triggers, with both
//! spins bounded by [`CONVERGENCE_LIMIT`]. The kernel is generic over
//! [`EvalModel`] so the convergence machinery can be exercised against
//! synthetic designs as well as the pipeline model.

use crate::error::{Region, SimError};
use crate::trigger::TriggerSet;

/// Iteration bound shared by the active and NBA region spins.
///
/// A well-formed design settles in a handful of passes; a spin still
/// producing triggers past this bound is oscillating and the step is
/// aborted with [`SimError::NonConvergence`].
pub const CONVERGENCE_LIMIT: u32 = 100;

/// The evaluation surface a model exposes to the kernel.
///
/// The kernel owns sequencing and the trigger vectors; the model owns the
/// signal state and the reactions. All hooks are invoked from
/// [`EvalKernel::eval_step`] only.
pub trait EvalModel {
    /// Captures the initial previous-value samples of the control signals.
    ///
    /// Runs once, before the first evaluation, so the first edge detection
    /// has a baseline and the pin levels the host forced before that call
    /// do not themselves register as edges.
    fn capture_baseline(&mut self);

    /// Runs zero-time initial logic. The pipeline has none.
    fn run_initial(&mut self) {}

    /// Compares current control-signal values against the previous samples,
    /// returns the set of fired triggers, and updates the samples.
    ///
    /// Called exactly once per active-region pass on the then-current
    /// values; must have no other side effects.
    fn detect_triggers(&mut self) -> TriggerSet;

    /// Runs zero-delay combinational reactions gated by `fired`.
    ///
    /// Must not write registered state; any purely combinational dependency
    /// executes here, before the NBA region.
    fn eval_active(&mut self, fired: &TriggerSet);

    /// Computes new registered values for every register gated by a trigger
    /// in `fired`. Values take effect before the next pass observes them.
    fn eval_nba(&mut self, fired: &TriggerSet);

    /// Runs end-of-simulation final logic. The pipeline has none.
    fn run_final(&mut self) {}

    /// Verifies no stored signal value exceeds its declared width.
    ///
    /// Invoked by the kernel at step entry in diagnostic builds only.
    fn check_widths(&self) -> Result<(), SimError> {
        Ok(())
    }
}

/// The evaluation kernel for a single model instance.
///
/// Construct with [`EvalKernel::new`], force input pins through
/// [`model_mut`](EvalKernel::model_mut) between steps, and call
/// [`eval_step`](EvalKernel::eval_step) once per desired time step.
pub struct EvalKernel<M> {
    model: M,
    /// Triggers detected by the current active-region pass.
    act_triggered: TriggerSet,
    /// Triggers accumulated for the NBA region across active passes.
    nba_triggered: TriggerSet,
    /// Set by the first `eval_step`; gates static setup and settling.
    did_init: bool,
    steps: u64,
    region_passes: u64,
}

impl<M: EvalModel> EvalKernel<M> {
    /// Creates a kernel wrapping the given model.
    pub fn new(model: M) -> Self {
        Self {
            model,
            act_triggered: TriggerSet::new(),
            nba_triggered: TriggerSet::new(),
            did_init: false,
            steps: 0,
            region_passes: 0,
        }
    }

    /// Returns a shared reference to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns a mutable reference to the model, for forcing input pins
    /// between evaluation steps.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Consumes the kernel, returning the model.
    pub fn into_model(self) -> M {
        self.model
    }

    /// Number of completed evaluation steps (excluding the settle pass).
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Total region passes executed across all steps.
    pub fn region_passes(&self) -> u64 {
        self.region_passes
    }

    /// Advances the simulation by one time step.
    ///
    /// The first call performs static setup (previous-value baselines),
    /// initial-value logic, and one settle pass of the convergence loop;
    /// every call then runs the convergence loop once. In diagnostic builds
    /// the width checker runs first and a violation aborts the step.
    pub fn eval_step(&mut self) -> Result<(), SimError> {
        #[cfg(debug_assertions)]
        self.model.check_widths()?;

        if !self.did_init {
            self.did_init = true;
            self.model.capture_baseline();
            self.model.run_initial();
            self.converge()?;
        }
        self.steps += 1;
        self.converge()
    }

    /// Reports whether any timed event is scheduled. Always false: the
    /// design is zero-delay and nothing is ever queued.
    pub fn events_pending(&self) -> bool {
        false
    }

    /// Returns the time of the next scheduled event.
    ///
    /// Always fails with [`SimError::ZeroDelayOnly`]; asking is a harness
    /// contract violation.
    pub fn next_time_slot(&self) -> Result<u64, SimError> {
        Err(SimError::ZeroDelayOnly)
    }

    /// Runs the model's final blocks. Call once at end of run, before the
    /// model is dropped.
    pub fn finalize(&mut self) {
        self.model.run_final();
    }

    /// Iterates the active and NBA regions to a fixed point.
    fn converge(&mut self) -> Result<(), SimError> {
        let mut nba_iters = 0u32;
        let mut nba_continue = true;
        while nba_continue {
            if nba_iters > CONVERGENCE_LIMIT {
                return Err(SimError::NonConvergence {
                    region: Region::Nba,
                    bound: CONVERGENCE_LIMIT,
                });
            }
            nba_iters += 1;
            nba_continue = false;

            let mut act_iters = 0u32;
            let mut act_continue = true;
            while act_continue {
                if act_iters > CONVERGENCE_LIMIT {
                    return Err(SimError::NonConvergence {
                        region: Region::Active,
                        bound: CONVERGENCE_LIMIT,
                    });
                }
                act_iters += 1;
                act_continue = self.active_phase();
            }

            if self.nba_phase() {
                nba_continue = true;
            }
        }
        Ok(())
    }

    /// One active-region pass: detect triggers, and if any fired, merge
    /// them into the accumulated NBA set and run the active evaluator.
    /// Returns whether the pass fired.
    fn active_phase(&mut self) -> bool {
        self.act_triggered = self.model.detect_triggers();
        if self.act_triggered.any() {
            let fired = self.act_triggered;
            // A trigger consumed here must still reach the NBA region of
            // the same step.
            self.nba_triggered.merge(&fired);
            self.model.eval_active(&fired);
            self.region_passes += 1;
            true
        } else {
            false
        }
    }

    /// One NBA-region pass: if any triggers accumulated, run the NBA
    /// evaluator and clear the set. Returns whether the pass fired.
    fn nba_phase(&mut self) -> bool {
        if self.nba_triggered.any() {
            let pending = self.nba_triggered;
            self.model.eval_nba(&pending);
            self.nba_triggered.clear();
            self.region_passes += 1;
            true
        } else {
            false
        }
    }
}
