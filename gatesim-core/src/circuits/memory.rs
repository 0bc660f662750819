//! Memory built from level-triggered latches.

use crate::element::{bus_signals, Element, ElementHeader};
use crate::error::{Result, SimError};
use crate::signal::{read_bus, Netlist, SignalId};

use super::buffer::TriStateBuffer;
use super::decoder::Decoder;
use super::gate::{Gate, GateKind};
use super::latch::DLatch;

/// Data width of one RAM word.
pub const WORD_BITS: usize = 8;

/// A word of level-triggered storage.
///
/// While `Write` is high, `Q` follows `D`; while it is low, `Q` holds the last
/// written word.
#[derive(Debug)]
pub struct MemoryCell {
    header: ElementHeader,
    data: Vec<SignalId>,
    write: SignalId,
    outputs: Vec<SignalId>,
    bits: Vec<DLatch>,
}

impl MemoryCell {
    pub fn new(net: &mut Netlist, width: usize) -> Result<Self> {
        if width == 0 || width > 64 {
            return Err(SimError::invalid_width("MemoryCell", width));
        }

        let header = ElementHeader::new("MemoryCell", net);
        let data = net.input_bus(&header.qualify("D"), width);
        let write = net.input(header.qualify("Write"));
        let outputs = net.output_bus(&header.qualify("Q"), width);

        let bits = (0..width)
            .map(|_| DLatch::new(net))
            .collect::<Result<Vec<_>>>()?;
        for (index, bit) in bits.iter().enumerate() {
            net.connect(bit.data(), data[index])?;
            net.connect(bit.enable(), write)?;
            net.connect(outputs[index], bit.q())?;
        }

        Ok(Self {
            header,
            data,
            write,
            outputs,
            bits,
        })
    }

    pub fn data(&self) -> &[SignalId] {
        &self.data
    }

    pub fn write(&self) -> SignalId {
        self.write
    }

    pub fn outputs(&self) -> &[SignalId] {
        &self.outputs
    }

    /// Stored word.
    pub fn read(&self, net: &Netlist) -> u64 {
        read_bus(net, &self.outputs)
    }
}

impl Element for MemoryCell {
    fn header(&self) -> &ElementHeader {
        &self.header
    }

    fn signals(&self) -> Vec<SignalId> {
        let mut signals = bus_signals([self.data.as_slice()]);
        signals.push(self.write);
        signals.extend(bus_signals([self.outputs.as_slice()]));
        signals
    }

    fn children(&self) -> Vec<&dyn Element> {
        self.bits.iter().map(|bit| bit as &dyn Element).collect()
    }

    fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        for bit in &mut self.bits {
            bit.update(net)?;
        }
        Ok(())
    }
}

/// One addressable word: its write gate, storage and output drivers.
#[derive(Debug)]
struct Word {
    write_gate: Gate,
    cell: MemoryCell,
    drivers: Vec<TriStateBuffer>,
}

/// Random-access memory of `2^address_bits` words of [`WORD_BITS`] bits.
///
/// The addressed word is written while `Write` is high and is always driven
/// onto `Out`. Every word's output buffers share the `Out` bus; the decoder
/// guarantees that only the addressed word drives it after an update.
///
/// One update settles a read or a write: decoder, write gates, cells, then
/// output buffers.
#[derive(Debug)]
pub struct Ram {
    header: ElementHeader,
    address: Vec<SignalId>,
    data: Vec<SignalId>,
    write: SignalId,
    outputs: Vec<SignalId>,
    decoder: Decoder,
    words: Vec<Word>,
}

impl Ram {
    pub fn new(net: &mut Netlist, address_bits: usize) -> Result<Self> {
        if address_bits == 0 || address_bits > Decoder::MAX_BITS {
            return Err(SimError::invalid_width("Ram", address_bits));
        }

        let header = ElementHeader::new("Ram", net);
        let address = net.input_bus(&header.qualify("Address"), address_bits);
        let data = net.input_bus(&header.qualify("Data"), WORD_BITS);
        let write = net.input(header.qualify("Write"));
        let outputs = net.output_bus(&header.qualify("Out"), WORD_BITS);

        let decoder = Decoder::new(net, address_bits)?;
        for (&decoder_bit, &bit) in decoder.address().iter().zip(&address) {
            net.connect(decoder_bit, bit)?;
        }

        let mut words = Vec::with_capacity(decoder.outputs().len());
        for &select in decoder.outputs() {
            let write_gate = Gate::binary(net, GateKind::And)?;
            net.connect(write_gate.input(0), select)?;
            net.connect(write_gate.input(1), write)?;

            let cell = MemoryCell::new(net, WORD_BITS)?;
            net.connect(cell.write(), write_gate.output())?;
            for (&cell_bit, &bit) in cell.data().iter().zip(&data) {
                net.connect(cell_bit, bit)?;
            }

            let mut drivers = Vec::with_capacity(WORD_BITS);
            for (index, &stored) in cell.outputs().iter().enumerate() {
                let driver = TriStateBuffer::new(net)?;
                net.connect(driver.input(), stored)?;
                net.connect(driver.enable(), select)?;
                net.connect(outputs[index], driver.output())?;
                drivers.push(driver);
            }

            words.push(Word {
                write_gate,
                cell,
                drivers,
            });
        }

        Ok(Self {
            header,
            address,
            data,
            write,
            outputs,
            decoder,
            words,
        })
    }

    /// Address bits, index 0 least significant.
    pub fn address(&self) -> &[SignalId] {
        &self.address
    }

    pub fn data(&self) -> &[SignalId] {
        &self.data
    }

    pub fn write(&self) -> SignalId {
        self.write
    }

    pub fn outputs(&self) -> &[SignalId] {
        &self.outputs
    }

    /// Number of addressable words.
    pub fn words(&self) -> usize {
        self.words.len()
    }

    /// The word on `Out`, or `None` while nothing drives the bus.
    pub fn read(&self, net: &Netlist) -> Option<u64> {
        if self.outputs.iter().any(|&bit| net.is_high_impedance(bit)) {
            return None;
        }
        Some(read_bus(net, &self.outputs))
    }
}

impl Element for Ram {
    fn header(&self) -> &ElementHeader {
        &self.header
    }

    fn signals(&self) -> Vec<SignalId> {
        let mut signals = bus_signals([self.address.as_slice(), self.data.as_slice()]);
        signals.push(self.write);
        signals.extend(bus_signals([self.outputs.as_slice()]));
        signals
    }

    fn children(&self) -> Vec<&dyn Element> {
        let mut children: Vec<&dyn Element> = vec![&self.decoder];
        for word in &self.words {
            children.push(&word.write_gate);
            children.push(&word.cell);
            children.extend(word.drivers.iter().map(|driver| driver as &dyn Element));
        }
        children
    }

    fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        self.decoder.update(net)?;
        for word in &mut self.words {
            word.write_gate.update(net)?;
        }
        for word in &mut self.words {
            word.cell.update(net)?;
        }
        for word in &mut self.words {
            for driver in &mut word.drivers {
                driver.update(net)?;
            }
        }
        Ok(())
    }
}
