//! Edge triggers and the tagged trigger set consumed by the region
//! evaluators.
//!
//! A trigger is a named edge condition on a control signal. The kernel keeps
//! two [`TriggerSet`]s per step: the set detected in the current active-region
//! pass, and the accumulated set the NBA region consumes. Sets are addressed
//! by [`Trigger`] name, never by raw bit position.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The edge-triggered conditions this design reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Rising edge on the clock.
    ClkRise,
    /// Falling edge on the active-low reset.
    RstFall,
}

impl Trigger {
    /// All triggers, in declaration order.
    pub const ALL: [Trigger; 2] = [Trigger::ClkRise, Trigger::RstFall];

    fn index(self) -> u8 {
        match self {
            Trigger::ClkRise => 0,
            Trigger::RstFall => 1,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::ClkRise => write!(f, "posedge clk"),
            Trigger::RstFall => write!(f, "negedge rst_n"),
        }
    }
}

/// A set of fired triggers.
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSet(u8);

impl TriggerSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self(0)
    }

    /// Adds a trigger to the set.
    pub fn insert(&mut self, trigger: Trigger) {
        self.0 |= 1 << trigger.index();
    }

    /// Returns true if the trigger is in the set.
    pub fn contains(&self, trigger: Trigger) -> bool {
        self.0 & (1 << trigger.index()) != 0
    }

    /// Returns true if any trigger is in the set.
    pub fn any(&self) -> bool {
        self.0 != 0
    }

    /// Merges all triggers from `other` into this set.
    pub fn merge(&mut self, other: &TriggerSet) {
        self.0 |= other.0;
    }

    /// Removes all triggers.
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterates over the fired triggers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Trigger> + '_ {
        Trigger::ALL.into_iter().filter(|t| self.contains(*t))
    }
}

impl fmt::Debug for TriggerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Edge direction for trigger detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Low-to-high transition.
    Rising,
    /// High-to-low transition.
    Falling,
}

/// Returns true if the previous/current sample pair forms the given edge.
pub fn detect_edge(prev: bool, curr: bool, edge: Edge) -> bool {
    match edge {
        Edge::Rising => !prev && curr,
        Edge::Falling => prev && !curr,
    }
}
