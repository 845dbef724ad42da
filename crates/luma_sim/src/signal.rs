//! Signal identity and declaration records for the tracing interface.
//!
//! The pipeline's signal set is fixed at compile time, so declarations are
//! static [`SignalDecl`] records rather than runtime allocations. A
//! [`SignalId`] indexes the model's declaration table and doubles as the
//! stable key a waveform recorder uses for value changes.

use serde::{Deserialize, Serialize};

/// Opaque ID for a declared signal.
///
/// IDs are indices into the owning model's declaration table and are dense
/// from zero, so recorders and samplers can use them directly as array
/// offsets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SignalId(u32);

impl SignalId {
    /// Creates a `SignalId` from a raw index.
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

/// Direction of a declared signal relative to the model boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDir {
    /// Host-driven input pin.
    Input,
    /// Model-driven output pin.
    Output,
    /// Internal register or derived value, exposed for diagnostics only.
    Internal,
}

/// Kind of a declared signal, mirroring the var kinds a waveform viewer
/// distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// An ordinary wire or register.
    Wire,
    /// A fixed elaboration-time constant.
    Parameter,
}

/// A single entry in a model's declaration table.
///
/// Declarations carry everything the tracing declaration pass needs: a
/// stable ID, the display name, the bit width, and the direction/kind
/// annotations written into the waveform header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SignalDecl {
    /// Stable ID, equal to this entry's index in the table.
    pub id: SignalId,
    /// Display name, as written to waveform output.
    pub name: &'static str,
    /// Declared bit width.
    pub width: u32,
    /// Direction relative to the model boundary.
    pub dir: SignalDir,
    /// Wire or parameter.
    pub kind: SignalKind,
}
