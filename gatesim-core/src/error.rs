//! Error types for the gatesim engine.
//!
//! Every fallible operation in the crate returns [`Result`]. None of these
//! errors are recoverable in the simulation sense: they all mean the circuit
//! was wired incorrectly, and the only fix is to change the topology.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Unified error type for wiring and evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    // ============ Propagation Errors ============
    /// More than one active driver on a receiving signal.
    #[error("Bus conflict on '{signal}': {} active drivers ({})", drivers.len(), drivers.join(", "))]
    BusConflict {
        signal: String,
        drivers: Vec<String>,
    },

    // ============ Wiring Errors ============
    /// Signal id does not belong to this netlist.
    #[error("Unknown signal index {index}")]
    UnknownSignal { index: usize },

    /// A signal was connected to itself.
    #[error("Signal '{signal}' cannot be connected to itself")]
    SelfConnection { signal: String },

    /// Receiving signals are never high impedance.
    #[error("Receiving signal '{signal}' cannot be put into high impedance")]
    HighImpedanceInput { signal: String },

    /// A width or arity parameter outside the supported range.
    #[error("Invalid width {width} for {element}")]
    InvalidWidth { element: &'static str, width: usize },
}

impl SimError {
    /// Create a bus conflict error
    pub fn bus_conflict(signal: impl Into<String>, drivers: Vec<String>) -> Self {
        Self::BusConflict {
            signal: signal.into(),
            drivers,
        }
    }

    /// Create an invalid width error
    pub fn invalid_width(element: &'static str, width: usize) -> Self {
        Self::InvalidWidth { element, width }
    }

    /// Whether this error came from a conflicting bus rather than bad wiring.
    pub fn is_bus_conflict(&self) -> bool {
        matches!(self, Self::BusConflict { .. })
    }
}
