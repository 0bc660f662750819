//! Signal Records
//!
//! This module defines the per-wire record stored in the [`Netlist`] arena
//! and the small value types used to address and describe it.
//!
//! [`Netlist`]: super::Netlist

use smallvec::SmallVec;

/// Index of a signal inside its owning netlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(usize);

impl SignalId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The role a signal plays in the connection graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// A receiving signal. Consumes exactly one active driver; a second
    /// active driver is a bus conflict.
    Input,

    /// A driven signal. Set by its owning element, or aggregated from any
    /// number of upstream sources with first-active-wins resolution.
    Output,
}

/// Logic level plus drive state of one wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalState {
    pub value: bool,
    pub high_impedance: bool,
}

impl SignalState {
    /// An actively driven level.
    pub fn driven(value: bool) -> Self {
        Self {
            value,
            high_impedance: false,
        }
    }

    /// Whether downstream consumers should take this value into account.
    pub fn is_active(&self) -> bool {
        !self.high_impedance
    }
}

/// One wire in the netlist.
#[derive(Debug)]
pub(crate) struct SignalRecord {
    /// Qualified label, `"{TypeName}_{ordinal}.{name}"` for element signals.
    pub(crate) name: String,

    pub(crate) kind: SignalKind,

    pub(crate) state: SignalState,

    /// Upstream signals, in connection order. The order is the tie-break for
    /// driven signals with several active sources.
    pub(crate) sources: SmallVec<[SignalId; 2]>,

    /// Downstream signals notified when this one changes.
    pub(crate) sinks: SmallVec<[SignalId; 4]>,
}

impl SignalRecord {
    pub(crate) fn new(name: String, kind: SignalKind) -> Self {
        Self {
            name,
            kind,
            state: SignalState::default(),
            sources: SmallVec::new(),
            sinks: SmallVec::new(),
        }
    }
}
