//! Edge-triggered flip-flops.

use crate::element::{Element, ElementHeader};
use crate::error::Result;
use crate::signal::{Netlist, SignalId};

use super::latch::GatedLatch;

/// Rising-edge-triggered D flip-flop.
///
/// `Q` takes the value of `D` only on an update where `Clock` is high and was
/// low on the previous update. A clock held at either level never re-latches
/// `D`. The very first update has no previous level to compare against, so it
/// only records the clock and settles the latch to `Q = 0`.
///
/// Internally the edge produces a one-update `Pulse`, which drives the same
/// six-NOR gated latch as [`DLatch`](super::DLatch). The gating (master) stage
/// is fully updated before the latch (slave) stage reads it.
#[derive(Debug)]
pub struct DFlipFlop {
    header: ElementHeader,
    data: SignalId,
    clock: SignalId,
    pulse: SignalId,
    q: SignalId,
    nq: SignalId,
    last_clock: Option<bool>,
    core: GatedLatch,
}

impl DFlipFlop {
    pub fn new(net: &mut Netlist) -> Result<Self> {
        let header = ElementHeader::new("DFlipFlop", net);
        let data = net.input(header.qualify("D"));
        let clock = net.input(header.qualify("Clock"));
        let pulse = net.output(header.qualify("Pulse"));
        let q = net.output(header.qualify("Q"));
        let nq = net.output(header.qualify("NQ"));

        let core = GatedLatch::new(net, data, pulse)?;
        net.connect(q, core.q())?;
        net.connect(nq, core.nq())?;

        Ok(Self {
            header,
            data,
            clock,
            pulse,
            q,
            nq,
            last_clock: None,
            core,
        })
    }

    pub fn data(&self) -> SignalId {
        self.data
    }

    pub fn clock(&self) -> SignalId {
        self.clock
    }

    pub fn q(&self) -> SignalId {
        self.q
    }

    pub fn nq(&self) -> SignalId {
        self.nq
    }
}

impl Element for DFlipFlop {
    fn header(&self) -> &ElementHeader {
        &self.header
    }

    fn signals(&self) -> Vec<SignalId> {
        vec![self.data, self.clock, self.pulse, self.q, self.nq]
    }

    fn children(&self) -> Vec<&dyn Element> {
        self.core.children()
    }

    fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        let clock = net.value(self.clock);
        let rising = clock && self.last_clock == Some(false);
        self.last_clock = Some(clock);

        net.set(self.pulse, rising)?;
        self.core.evaluate(net)
    }
}

/// Toggle flip-flop: a [`DFlipFlop`] whose `D` follows its own `NQ`.
///
/// Every rising clock edge inverts `Q`.
#[derive(Debug)]
pub struct TFlipFlop {
    header: ElementHeader,
    clock: SignalId,
    q: SignalId,
    nq: SignalId,
    flip_flop: DFlipFlop,
}

impl TFlipFlop {
    pub fn new(net: &mut Netlist) -> Result<Self> {
        let header = ElementHeader::new("TFlipFlop", net);
        let clock = net.input(header.qualify("Clock"));
        let q = net.output(header.qualify("Q"));
        let nq = net.output(header.qualify("NQ"));

        let flip_flop = DFlipFlop::new(net)?;
        net.connect(flip_flop.clock(), clock)?;
        net.connect(flip_flop.data(), flip_flop.nq())?;
        net.connect(q, flip_flop.q())?;
        net.connect(nq, flip_flop.nq())?;

        Ok(Self {
            header,
            clock,
            q,
            nq,
            flip_flop,
        })
    }

    pub fn clock(&self) -> SignalId {
        self.clock
    }

    pub fn q(&self) -> SignalId {
        self.q
    }

    pub fn nq(&self) -> SignalId {
        self.nq
    }
}

impl Element for TFlipFlop {
    fn header(&self) -> &ElementHeader {
        &self.header
    }

    fn signals(&self) -> Vec<SignalId> {
        vec![self.clock, self.q, self.nq]
    }

    fn children(&self) -> Vec<&dyn Element> {
        vec![&self.flip_flop]
    }

    fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        self.flip_flop.update(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::OrdinalAllocator;
    use std::sync::Arc;

    fn netlist() -> Netlist {
        Netlist::with_allocator(Arc::new(OrdinalAllocator::new()))
    }

    #[test]
    fn latches_on_rising_edge() {
        let mut net = netlist();
        let mut ff = DFlipFlop::new(&mut net).unwrap();

        net.set(ff.data(), true).unwrap();
        ff.update(&mut net).unwrap();
        assert!(!net.value(ff.q()));

        net.set(ff.clock(), true).unwrap();
        ff.update(&mut net).unwrap();
        assert!(net.value(ff.q()));
        assert!(!net.value(ff.nq()));
    }

    #[test]
    fn steady_clock_never_relatches() {
        let mut net = netlist();
        let mut ff = DFlipFlop::new(&mut net).unwrap();
        net.set(ff.data(), true).unwrap();
        ff.update(&mut net).unwrap();
        net.set(ff.clock(), true).unwrap();
        ff.update(&mut net).unwrap();

        for data in [false, true, false, false] {
            net.set(ff.data(), data).unwrap();
            ff.update(&mut net).unwrap();
            assert!(net.value(ff.q()));
        }

        net.set(ff.clock(), false).unwrap();
        for _ in 0..3 {
            ff.update(&mut net).unwrap();
            assert!(net.value(ff.q()));
        }

        net.set(ff.clock(), true).unwrap();
        ff.update(&mut net).unwrap();
        assert!(!net.value(ff.q()));
    }

    #[test]
    fn first_update_only_records_clock() {
        let mut net = netlist();
        let mut ff = DFlipFlop::new(&mut net).unwrap();
        net.set(ff.data(), true).unwrap();
        net.set(ff.clock(), true).unwrap();

        ff.update(&mut net).unwrap();
        assert!(!net.value(ff.q()));
        assert!(net.value(ff.nq()));
    }

    #[test]
    fn toggle_inverts_on_each_edge() {
        let mut net = netlist();
        let mut tff = TFlipFlop::new(&mut net).unwrap();
        tff.update(&mut net).unwrap();

        let mut expected = false;
        for _ in 0..5 {
            net.set(tff.clock(), true).unwrap();
            tff.update(&mut net).unwrap();
            expected = !expected;
            assert_eq!(net.value(tff.q()), expected);

            // holding the clock high must not toggle again
            tff.update(&mut net).unwrap();
            assert_eq!(net.value(tff.q()), expected);

            net.set(tff.clock(), false).unwrap();
            tff.update(&mut net).unwrap();
            assert_eq!(net.value(tff.q()), expected);
        }
    }
}
