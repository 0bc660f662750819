//! Logic gates.
//!
//! All gates share one element type parameterised by [`GateKind`]. A gate is
//! purely combinational: one update with stable inputs leaves it at its fixed
//! point.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::element::{Element, ElementHeader};
use crate::error::{Result, SimError};
use crate::signal::{Netlist, SignalId};

/// Boolean function computed by a [`Gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
    /// Unary inverter.
    Not,
}

impl GateKind {
    /// Element type name used in identifiers.
    pub fn type_name(self) -> &'static str {
        match self {
            GateKind::And => "AndGate",
            GateKind::Or => "OrGate",
            GateKind::Nand => "NandGate",
            GateKind::Nor => "NorGate",
            GateKind::Xor => "XorGate",
            GateKind::Xnor => "XnorGate",
            GateKind::Not => "NotGate",
        }
    }

    /// Evaluate the function over `inputs`.
    pub fn apply<I>(self, inputs: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut inputs = inputs.into_iter();
        match self {
            GateKind::And => inputs.all(|v| v),
            GateKind::Or => inputs.any(|v| v),
            GateKind::Nand => !inputs.all(|v| v),
            GateKind::Nor => !inputs.any(|v| v),
            GateKind::Xor => inputs.fold(false, |acc, v| acc ^ v),
            GateKind::Xnor => !inputs.fold(false, |acc, v| acc ^ v),
            GateKind::Not => !inputs.next().unwrap_or(false),
        }
    }
}

/// A logic gate with one or more inputs and output `Q`.
///
/// Inputs are named `A`, `B` for one- and two-input gates and `In[i]`
/// otherwise. The gate evaluates once while it is built, so its output starts
/// out consistent with unconnected (low) inputs.
#[derive(Debug)]
pub struct Gate {
    header: ElementHeader,
    kind: GateKind,
    inputs: SmallVec<[SignalId; 2]>,
    output: SignalId,
}

impl Gate {
    /// Build a gate with `arity` inputs.
    pub fn new(net: &mut Netlist, kind: GateKind, arity: usize) -> Result<Self> {
        let valid = match kind {
            GateKind::Not => arity == 1,
            _ => arity >= 1,
        };
        if !valid {
            return Err(SimError::invalid_width(kind.type_name(), arity));
        }

        let header = ElementHeader::new(kind.type_name(), net);
        let inputs: SmallVec<[SignalId; 2]> = match arity {
            1 => smallvec::smallvec![net.input(header.qualify("A"))],
            2 => smallvec::smallvec![
                net.input(header.qualify("A")),
                net.input(header.qualify("B")),
            ],
            _ => net
                .input_bus(&header.qualify("In"), arity)
                .into_iter()
                .collect(),
        };
        let output = net.output(header.qualify("Q"));

        let mut gate = Self {
            header,
            kind,
            inputs,
            output,
        };
        gate.evaluate(net)?;
        Ok(gate)
    }

    /// Two-input gate.
    pub fn binary(net: &mut Netlist, kind: GateKind) -> Result<Self> {
        Self::new(net, kind, 2)
    }

    pub fn nor(net: &mut Netlist) -> Result<Self> {
        Self::binary(net, GateKind::Nor)
    }

    pub fn not(net: &mut Netlist) -> Result<Self> {
        Self::new(net, GateKind::Not, 1)
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Input `index`, `0` being `A`.
    pub fn input(&self, index: usize) -> SignalId {
        self.inputs[index]
    }

    pub fn inputs(&self) -> &[SignalId] {
        &self.inputs
    }

    pub fn output(&self) -> SignalId {
        self.output
    }
}

impl Element for Gate {
    fn header(&self) -> &ElementHeader {
        &self.header
    }

    fn signals(&self) -> Vec<SignalId> {
        let mut signals: Vec<SignalId> = if self.inputs.len() > 2 {
            self.inputs.iter().rev().copied().collect()
        } else {
            self.inputs.to_vec()
        };
        signals.push(self.output);
        signals
    }

    fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        let value = self.kind.apply(self.inputs.iter().map(|&id| net.value(id)));
        net.set(self.output, value)
    }
}
