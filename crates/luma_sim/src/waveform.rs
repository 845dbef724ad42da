//! Waveform recording for simulation output.
//!
//! The [`WaveformRecorder`] trait abstracts waveform output behind the
//! declaration/change/finalize passes the tracer drives. [`VcdRecorder`]
//! implements the IEEE 1364 Value Change Dump (VCD) format, producing text
//! files viewable in GTKWave, Surfer, or other waveform viewers.

use std::io::Write;

use luma_common::bits;

use crate::error::SimError;
use crate::signal::{SignalDir, SignalId, SignalKind};

/// Trait for recording simulation waveforms.
///
/// Implementations write signal declarations and value changes in a
/// particular format. Declarations happen once, inside a scope; changes are
/// streamed afterwards in non-decreasing time order.
pub trait WaveformRecorder {
    /// Opens a new scope (hierarchy level) in the waveform.
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError>;

    /// Closes the current scope.
    fn end_scope(&mut self) -> Result<(), SimError>;

    /// Declares a signal for recording within the current scope.
    fn declare_signal(
        &mut self,
        id: SignalId,
        name: &str,
        width: u32,
        dir: SignalDir,
        kind: SignalKind,
    ) -> Result<(), SimError>;

    /// Records a value change at the given time step.
    fn record_change(&mut self, time: u64, id: SignalId, value: u32) -> Result<(), SimError>;

    /// Finalizes the waveform output (flush, write trailer, etc.).
    fn finalize(&mut self) -> Result<(), SimError>;
}

/// VCD (Value Change Dump) format recorder following IEEE 1364.
///
/// Produces human-readable text output with timestamps and signal value
/// changes. Signal identifiers use printable ASCII characters starting
/// from `!` (0x21).
pub struct VcdRecorder<W: Write> {
    writer: W,
    id_map: Vec<(SignalId, String, u32)>, // (signal_id, id_code, width)
    next_id: u32,
    header_written: bool,
    current_time: Option<u64>,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a new VCD recorder writing to the given output.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            id_map: Vec::new(),
            next_id: 0,
            header_written: false,
            current_time: None,
        }
    }

    /// Consumes the recorder, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes the VCD header section.
    fn write_header(&mut self) -> Result<(), SimError> {
        writeln!(self.writer, "$date")?;
        writeln!(self.writer, "  Simulation date")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  Luma pipeline simulator")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  1ns")?;
        writeln!(self.writer, "$end")?;
        Ok(())
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Uses printable ASCII characters starting from `!` (0x21), with
    /// multi-character codes for indices >= 94.
    fn id_code(index: u32) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            let c = (b'!' + (idx % 94) as u8) as char;
            result.push(c);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    /// Formats a value as a VCD value string for the given width.
    fn format_value(value: u32, width: u32) -> String {
        let value = bits::truncate(value, width);
        if width == 1 {
            if value != 0 { "1".into() } else { "0".into() }
        } else {
            let mut s = String::with_capacity(width as usize + 1);
            s.push('b');
            for i in (0..width).rev() {
                s.push(if (value >> i) & 1 != 0 { '1' } else { '0' });
            }
            s
        }
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError> {
        if !self.header_written {
            self.write_header()?;
            self.header_written = true;
        }
        writeln!(self.writer, "$scope module {name} $end")?;
        Ok(())
    }

    fn end_scope(&mut self) -> Result<(), SimError> {
        writeln!(self.writer, "$upscope $end")?;
        Ok(())
    }

    fn declare_signal(
        &mut self,
        id: SignalId,
        name: &str,
        width: u32,
        _dir: SignalDir,
        kind: SignalKind,
    ) -> Result<(), SimError> {
        // VCD has no direction annotation on $var entries; only the kind
        // survives into the output.
        let id_code = Self::id_code(self.next_id);
        self.next_id += 1;

        let var_type = match kind {
            SignalKind::Wire => "wire",
            SignalKind::Parameter => "parameter",
        };
        writeln!(self.writer, "$var {var_type} {width} {id_code} {name} $end")?;

        self.id_map.push((id, id_code, width));
        Ok(())
    }

    fn record_change(&mut self, time: u64, id: SignalId, value: u32) -> Result<(), SimError> {
        if !self.header_written {
            self.write_header()?;
            self.header_written = true;
        }

        // Emit timestamp if changed
        if self.current_time != Some(time) {
            if self.current_time.is_none() {
                writeln!(self.writer, "$enddefinitions $end")?;
                writeln!(self.writer, "$dumpvars")?;
            }
            writeln!(self.writer, "#{time}")?;
            self.current_time = Some(time);
        }

        let (_, id_code, width) = self
            .id_map
            .iter()
            .find(|(sid, _, _)| *sid == id)
            .ok_or_else(|| {
                SimError::WaveformIo(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("unregistered VCD signal {}", id.as_raw()),
                ))
            })?;

        let val_str = Self::format_value(value, *width);
        if *width == 1 {
            writeln!(self.writer, "{val_str}{id_code}")?;
        } else {
            writeln!(self.writer, "{val_str} {id_code}")?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SimError> {
        if self.current_time.is_none() {
            // No changes recorded, still close the definitions section
            if !self.header_written {
                self.write_header()?;
                self.header_written = true;
            }
            writeln!(self.writer, "$enddefinitions $end")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_recorder() -> VcdRecorder<Vec<u8>> {
        VcdRecorder::new(Vec::new())
    }

    #[test]
    fn id_code_first() {
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(0), "!");
    }

    #[test]
    fn id_code_sequential() {
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(1), "\"");
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(93), "~");
    }

    #[test]
    fn id_code_multi_char() {
        // 94 wraps to two characters
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(94).len(), 2);
    }

    #[test]
    fn declare_signal_writes_var() {
        let mut rec = make_recorder();
        rec.begin_scope("luma").unwrap();
        rec.declare_signal(SignalId::from_raw(0), "clk", 1, SignalDir::Input, SignalKind::Wire)
            .unwrap();
        rec.end_scope().unwrap();

        let output = String::from_utf8(rec.writer.clone()).unwrap();
        assert!(output.contains("$scope module luma $end"));
        assert!(output.contains("$var wire 1 ! clk $end"));
        assert!(output.contains("$upscope $end"));
    }

    #[test]
    fn declare_parameter_kind() {
        let mut rec = make_recorder();
        rec.begin_scope("luma").unwrap();
        rec.declare_signal(SignalId::from_raw(0), "C_R", 32, SignalDir::Internal, SignalKind::Parameter)
            .unwrap();
        rec.end_scope().unwrap();

        let output = String::from_utf8(rec.writer.clone()).unwrap();
        assert!(output.contains("$var parameter 32 ! C_R $end"));
    }

    #[test]
    fn record_single_bit_change() {
        let mut rec = make_recorder();
        rec.begin_scope("luma").unwrap();
        rec.declare_signal(SignalId::from_raw(0), "clk", 1, SignalDir::Input, SignalKind::Wire)
            .unwrap();
        rec.end_scope().unwrap();

        rec.record_change(0, SignalId::from_raw(0), 0).unwrap();
        rec.record_change(5, SignalId::from_raw(0), 1).unwrap();
        rec.finalize().unwrap();

        let output = String::from_utf8(rec.writer).unwrap();
        assert!(output.contains("#0"));
        assert!(output.contains("0!"));
        assert!(output.contains("#5"));
        assert!(output.contains("1!"));
    }

    #[test]
    fn record_multi_bit_change() {
        let mut rec = make_recorder();
        rec.begin_scope("luma").unwrap();
        rec.declare_signal(SignalId::from_raw(0), "gray_out", 8, SignalDir::Output, SignalKind::Wire)
            .unwrap();
        rec.end_scope().unwrap();

        rec.record_change(0, SignalId::from_raw(0), 0x97).unwrap();
        rec.finalize().unwrap();

        let output = String::from_utf8(rec.writer).unwrap();
        assert!(output.contains("b10010111 !"));
    }

    #[test]
    fn values_masked_to_declared_width() {
        assert_eq!(VcdRecorder::<Vec<u8>>::format_value(0x1FF, 8), "b11111111");
    }

    #[test]
    fn format_value_single_bit() {
        assert_eq!(VcdRecorder::<Vec<u8>>::format_value(0, 1), "0");
        assert_eq!(VcdRecorder::<Vec<u8>>::format_value(1, 1), "1");
    }

    #[test]
    fn format_value_multi_bit() {
        assert_eq!(VcdRecorder::<Vec<u8>>::format_value(0b1010, 4), "b1010");
    }

    #[test]
    fn unregistered_signal_errors() {
        let mut rec = make_recorder();
        rec.begin_scope("luma").unwrap();
        rec.end_scope().unwrap();
        assert!(rec.record_change(0, SignalId::from_raw(9), 1).is_err());
    }

    #[test]
    fn finalize_empty_recorder() {
        let mut rec = make_recorder();
        rec.finalize().unwrap();
        let output = String::from_utf8(rec.writer).unwrap();
        assert!(output.contains("$enddefinitions $end"));
    }

    #[test]
    fn vcd_header_contents() {
        let mut rec = make_recorder();
        rec.begin_scope("luma").unwrap();
        rec.end_scope().unwrap();
        rec.finalize().unwrap();

        let output = String::from_utf8(rec.writer).unwrap();
        assert!(output.contains("$date"));
        assert!(output.contains("$version"));
        assert!(output.contains("Luma pipeline simulator"));
        assert!(output.contains("$timescale"));
        assert!(output.contains("1ns"));
    }

    #[test]
    fn dumpvars_before_first_change() {
        let mut rec = make_recorder();
        rec.begin_scope("luma").unwrap();
        rec.declare_signal(SignalId::from_raw(0), "clk", 1, SignalDir::Input, SignalKind::Wire)
            .unwrap();
        rec.end_scope().unwrap();

        rec.record_change(0, SignalId::from_raw(0), 0).unwrap();
        rec.finalize().unwrap();

        let output = String::from_utf8(rec.writer).unwrap();
        assert!(output.contains("$dumpvars"));
        assert!(output.contains("$enddefinitions $end"));
    }

    #[test]
    fn multiple_signals_get_distinct_codes() {
        let mut rec = make_recorder();
        rec.begin_scope("luma").unwrap();
        rec.declare_signal(SignalId::from_raw(0), "a", 1, SignalDir::Input, SignalKind::Wire)
            .unwrap();
        rec.declare_signal(SignalId::from_raw(1), "b", 1, SignalDir::Input, SignalKind::Wire)
            .unwrap();
        rec.end_scope().unwrap();

        let output = String::from_utf8(rec.writer.clone()).unwrap();
        assert!(output.contains("$var wire 1 ! a $end"));
        assert!(output.contains("$var wire 1 \" b $end"));
    }

    #[test]
    fn timestamp_not_repeated_for_same_time() {
        let mut rec = make_recorder();
        rec.begin_scope("luma").unwrap();
        rec.declare_signal(SignalId::from_raw(0), "a", 1, SignalDir::Input, SignalKind::Wire)
            .unwrap();
        rec.declare_signal(SignalId::from_raw(1), "b", 1, SignalDir::Input, SignalKind::Wire)
            .unwrap();
        rec.end_scope().unwrap();

        rec.record_change(3, SignalId::from_raw(0), 1).unwrap();
        rec.record_change(3, SignalId::from_raw(1), 1).unwrap();
        rec.finalize().unwrap();

        let output = String::from_utf8(rec.writer).unwrap();
        assert_eq!(output.matches("#3").count(), 1);
    }
}
