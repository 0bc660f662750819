//! Tri-state buffer.

use crate::element::{Element, ElementHeader};
use crate::error::Result;
use crate::signal::{Netlist, SignalId};

/// Copies `A` to `Q` while `Enable` is high and floats `Q` otherwise.
///
/// Several buffers can feed one driven signal to form a shared bus. Driven
/// signals resolve multiple active sources by connection order instead of
/// failing, so a bus never raises a conflict on its own.
#[derive(Debug)]
pub struct TriStateBuffer {
    header: ElementHeader,
    input: SignalId,
    enable: SignalId,
    output: SignalId,
}

impl TriStateBuffer {
    pub fn new(net: &mut Netlist) -> Result<Self> {
        let header = ElementHeader::new("TriStateBuffer", net);
        let input = net.input(header.qualify("A"));
        let enable = net.input(header.qualify("Enable"));
        let output = net.output(header.qualify("Q"));

        let mut buffer = Self {
            header,
            input,
            enable,
            output,
        };
        buffer.evaluate(net)?;
        Ok(buffer)
    }

    pub fn input(&self) -> SignalId {
        self.input
    }

    pub fn enable(&self) -> SignalId {
        self.enable
    }

    pub fn output(&self) -> SignalId {
        self.output
    }
}

impl Element for TriStateBuffer {
    fn header(&self) -> &ElementHeader {
        &self.header
    }

    fn signals(&self) -> Vec<SignalId> {
        vec![self.input, self.enable, self.output]
    }

    fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        let level = net.value(self.enable).then(|| net.value(self.input));
        net.drive(self.output, level)
    }
}
