//! Tracing sessions: the declaration pass and per-step sampling passes.
//!
//! A [`TraceSession`] binds a [`Traceable`] model to a
//! [`WaveformRecorder`]. Construction runs the declaration pass once;
//! afterwards the host samples at whatever points it considers
//! interesting, either in full ([`dump_full`](TraceSession::dump_full))
//! or emitting only the signals whose value changed since the previous
//! sample ([`dump`](TraceSession::dump)).

use crate::error::SimError;
use crate::signal::{SignalDecl, SignalId};
use crate::waveform::WaveformRecorder;

/// A model whose signal set can be declared and sampled for tracing.
pub trait Traceable {
    /// The declaration table, enumerating every signal with name, width,
    /// direction, and kind.
    fn declarations(&self) -> &'static [SignalDecl];

    /// Returns the current bit-exact value of a declared signal.
    fn sample(&self, id: SignalId) -> u32;
}

/// An open tracing session against a recorder.
pub struct TraceSession<R> {
    recorder: R,
    /// Last emitted value per declaration index; `None` until first sampled.
    last: Vec<Option<u32>>,
}

impl<R: WaveformRecorder> TraceSession<R> {
    /// Opens a session: runs the declaration pass inside a module scope
    /// named `scope`.
    pub fn new<M: Traceable>(
        model: &M,
        scope: &str,
        mut recorder: R,
    ) -> Result<Self, SimError> {
        let decls = model.declarations();
        recorder.begin_scope(scope)?;
        for decl in decls {
            recorder.declare_signal(decl.id, decl.name, decl.width, decl.dir, decl.kind)?;
        }
        recorder.end_scope()?;
        Ok(Self {
            recorder,
            last: vec![None; decls.len()],
        })
    }

    /// Samples every declared signal, emitting only those whose value
    /// changed since the last sample. The first call emits everything.
    pub fn dump<M: Traceable>(&mut self, time: u64, model: &M) -> Result<(), SimError> {
        for decl in model.declarations() {
            let value = model.sample(decl.id);
            let slot = &mut self.last[decl.id.as_raw() as usize];
            if *slot != Some(value) {
                self.recorder.record_change(time, decl.id, value)?;
                *slot = Some(value);
            }
        }
        Ok(())
    }

    /// Samples and emits every declared signal unconditionally.
    pub fn dump_full<M: Traceable>(&mut self, time: u64, model: &M) -> Result<(), SimError> {
        for decl in model.declarations() {
            let value = model.sample(decl.id);
            self.recorder.record_change(time, decl.id, value)?;
            self.last[decl.id.as_raw() as usize] = Some(value);
        }
        Ok(())
    }

    /// Finalizes the underlying recorder.
    pub fn finalize(&mut self) -> Result<(), SimError> {
        self.recorder.finalize()
    }

    /// Consumes the session, returning the recorder.
    pub fn into_recorder(self) -> R {
        self.recorder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LumaModel, ResetPolicy};
    use crate::signal::{SignalDir, SignalKind};
    use crate::waveform::VcdRecorder;

    /// Test double that counts recorder calls.
    #[derive(Default)]
    struct CountingRecorder {
        declared: Vec<String>,
        changes: Vec<(u64, u32, u32)>, // (time, id, value)
        scopes: u32,
        finalized: bool,
    }

    impl WaveformRecorder for CountingRecorder {
        fn begin_scope(&mut self, _name: &str) -> Result<(), SimError> {
            self.scopes += 1;
            Ok(())
        }

        fn end_scope(&mut self) -> Result<(), SimError> {
            Ok(())
        }

        fn declare_signal(
            &mut self,
            _id: SignalId,
            name: &str,
            _width: u32,
            _dir: SignalDir,
            _kind: SignalKind,
        ) -> Result<(), SimError> {
            self.declared.push(name.to_string());
            Ok(())
        }

        fn record_change(&mut self, time: u64, id: SignalId, value: u32) -> Result<(), SimError> {
            self.changes.push((time, id.as_raw(), value));
            Ok(())
        }

        fn finalize(&mut self) -> Result<(), SimError> {
            self.finalized = true;
            Ok(())
        }
    }

    fn model() -> LumaModel {
        LumaModel::new(ResetPolicy::Zeros)
    }

    #[test]
    fn declaration_pass_runs_once_at_open() {
        let m = model();
        let session = TraceSession::new(&m, "luma", CountingRecorder::default()).unwrap();
        let rec = session.into_recorder();
        assert_eq!(rec.scopes, 1);
        assert_eq!(rec.declared.len(), LumaModel::DECLS.len());
        assert_eq!(rec.declared[0], "clk");
        assert!(rec.declared.contains(&"C_R".to_string()));
    }

    #[test]
    fn first_dump_emits_everything() {
        let m = model();
        let mut session = TraceSession::new(&m, "luma", CountingRecorder::default()).unwrap();
        session.dump(0, &m).unwrap();
        let rec = session.into_recorder();
        assert_eq!(rec.changes.len(), LumaModel::DECLS.len());
    }

    #[test]
    fn second_dump_emits_only_changes() {
        let mut m = model();
        let mut session = TraceSession::new(&m, "luma", CountingRecorder::default()).unwrap();
        session.dump(0, &m).unwrap();

        m.clk = true;
        session.dump(1, &m).unwrap();
        let rec = session.into_recorder();
        let at_t1: Vec<_> = rec.changes.iter().filter(|(t, _, _)| *t == 1).collect();
        assert_eq!(at_t1.len(), 1);
        assert_eq!(at_t1[0].1, 0); // clk
        assert_eq!(at_t1[0].2, 1);
    }

    #[test]
    fn unchanged_dump_emits_nothing() {
        let m = model();
        let mut session = TraceSession::new(&m, "luma", CountingRecorder::default()).unwrap();
        session.dump(0, &m).unwrap();
        session.dump(1, &m).unwrap();
        let rec = session.into_recorder();
        assert!(rec.changes.iter().all(|(t, _, _)| *t == 0));
    }

    #[test]
    fn pixel_change_emits_derived_slices() {
        let mut m = model();
        let mut session = TraceSession::new(&m, "luma", CountingRecorder::default()).unwrap();
        session.dump(0, &m).unwrap();

        m.pixel_in = 0xFF8000;
        session.dump(1, &m).unwrap();
        let rec = session.into_recorder();
        // pixel_in plus the R and G slices changed; B stayed 0.
        let ids_at_t1: Vec<u32> = rec
            .changes
            .iter()
            .filter(|(t, _, _)| *t == 1)
            .map(|(_, id, _)| *id)
            .collect();
        assert!(ids_at_t1.contains(&3)); // pixel_in
        assert!(ids_at_t1.contains(&6)); // R
        assert!(ids_at_t1.contains(&7)); // G
        assert!(!ids_at_t1.contains(&8)); // B unchanged
    }

    #[test]
    fn dump_full_always_emits_everything() {
        let m = model();
        let mut session = TraceSession::new(&m, "luma", CountingRecorder::default()).unwrap();
        session.dump_full(0, &m).unwrap();
        session.dump_full(1, &m).unwrap();
        let rec = session.into_recorder();
        assert_eq!(rec.changes.len(), 2 * LumaModel::DECLS.len());
    }

    #[test]
    fn parameters_emit_once_under_changed_only() {
        let m = model();
        let mut session = TraceSession::new(&m, "luma", CountingRecorder::default()).unwrap();
        session.dump(0, &m).unwrap();
        session.dump(1, &m).unwrap();
        session.dump(2, &m).unwrap();
        let rec = session.into_recorder();
        let c_r_changes = rec.changes.iter().filter(|(_, id, _)| *id == 10).count();
        assert_eq!(c_r_changes, 1);
    }

    #[test]
    fn finalize_reaches_recorder() {
        let m = model();
        let mut session = TraceSession::new(&m, "luma", CountingRecorder::default()).unwrap();
        session.finalize().unwrap();
        assert!(session.into_recorder().finalized);
    }

    #[test]
    fn vcd_end_to_end() {
        let mut m = model();
        let mut session =
            TraceSession::new(&m, "luma", VcdRecorder::new(Vec::new())).unwrap();
        session.dump(0, &m).unwrap();
        m.clk = true;
        session.dump(5, &m).unwrap();
        session.finalize().unwrap();

        let output = String::from_utf8(session.into_recorder().into_inner()).unwrap();
        assert!(output.contains("$scope module luma $end"));
        assert!(output.contains("$var wire 24 $ pixel_in $end"));
        assert!(output.contains("$var parameter 32"));
        assert!(output.contains("#0"));
        assert!(output.contains("#5"));
    }
}
