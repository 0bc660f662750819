//! Binary decoder.

use crate::element::{bus_signals, Element, ElementHeader};
use crate::error::{Result, SimError};
use crate::signal::{Netlist, SignalId};

use super::gate::{Gate, GateKind};

/// One-hot decoder: `Y[k]` is high exactly when the address `A` equals `k`.
///
/// Combinational. Inverters update before the AND plane, so one update
/// settles the outputs.
#[derive(Debug)]
pub struct Decoder {
    header: ElementHeader,
    address: Vec<SignalId>,
    outputs: Vec<SignalId>,
    inverters: Vec<Gate>,
    selectors: Vec<Gate>,
}

impl Decoder {
    /// Widest supported address.
    pub const MAX_BITS: usize = 12;

    pub fn new(net: &mut Netlist, bits: usize) -> Result<Self> {
        if bits == 0 || bits > Self::MAX_BITS {
            return Err(SimError::invalid_width("Decoder", bits));
        }

        let header = ElementHeader::new("Decoder", net);
        let address = net.input_bus(&header.qualify("A"), bits);
        let outputs = net.output_bus(&header.qualify("Y"), 1 << bits);

        let inverters = (0..bits)
            .map(|_| Gate::not(net))
            .collect::<Result<Vec<_>>>()?;
        for (inverter, &bit) in inverters.iter().zip(&address) {
            net.connect(inverter.input(0), bit)?;
        }

        let mut selectors = Vec::with_capacity(outputs.len());
        for (line, &output) in outputs.iter().enumerate() {
            let selector = Gate::new(net, GateKind::And, bits)?;
            for bit in 0..bits {
                let source = if (line >> bit) & 1 == 1 {
                    address[bit]
                } else {
                    inverters[bit].output()
                };
                net.connect(selector.input(bit), source)?;
            }
            net.connect(output, selector.output())?;
            selectors.push(selector);
        }

        Ok(Self {
            header,
            address,
            outputs,
            inverters,
            selectors,
        })
    }

    /// Address bits, index 0 least significant.
    pub fn address(&self) -> &[SignalId] {
        &self.address
    }

    /// Select lines, one per address.
    pub fn outputs(&self) -> &[SignalId] {
        &self.outputs
    }
}

impl Element for Decoder {
    fn header(&self) -> &ElementHeader {
        &self.header
    }

    fn signals(&self) -> Vec<SignalId> {
        bus_signals([self.address.as_slice(), self.outputs.as_slice()])
    }

    fn children(&self) -> Vec<&dyn Element> {
        self.inverters
            .iter()
            .chain(&self.selectors)
            .map(|gate| gate as &dyn Element)
            .collect()
    }

    fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        for inverter in &mut self.inverters {
            inverter.update(net)?;
        }
        for selector in &mut self.selectors {
            selector.update(net)?;
        }
        Ok(())
    }
}
