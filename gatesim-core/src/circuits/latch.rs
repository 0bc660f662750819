//! Latches built from cross-coupled NOR gates.
//!
//! The update order inside these elements is part of their behaviour.
//! Reordering the gate updates changes which state a latch falls into when
//! its inputs change, so treat any reordering as a functional change.

use crate::element::{Element, ElementHeader};
use crate::error::Result;
use crate::signal::{Netlist, SignalId};

use super::gate::Gate;

/// Set/reset latch made of two cross-coupled NOR gates.
///
/// | R | S | Q after update |
/// |---|---|----------------|
/// | 0 | 0 | unchanged      |
/// | 0 | 1 | 1              |
/// | 1 | 0 | 0              |
/// | 1 | 1 | Q = NQ = 0     |
///
/// Each update evaluates the `Q` gate then the `NQ` gate, twice. The second
/// round lets the side that switched first feed back into the other, so one
/// update is enough for any input change.
#[derive(Debug)]
pub struct RsLatch {
    header: ElementHeader,
    reset: SignalId,
    set: SignalId,
    q: SignalId,
    nq: SignalId,
    nor_q: Gate,
    nor_nq: Gate,
}

impl RsLatch {
    pub fn new(net: &mut Netlist) -> Result<Self> {
        let header = ElementHeader::new("RsLatch", net);
        let reset = net.input(header.qualify("R"));
        let set = net.input(header.qualify("S"));
        let q = net.output(header.qualify("Q"));
        let nq = net.output(header.qualify("NQ"));

        let nor_q = Gate::nor(net)?;
        let nor_nq = Gate::nor(net)?;

        net.connect(nor_q.input(0), reset)?;
        net.connect(nor_q.input(1), nor_nq.output())?;
        net.connect(nor_nq.input(0), set)?;
        net.connect(nor_nq.input(1), nor_q.output())?;
        net.connect(q, nor_q.output())?;
        net.connect(nq, nor_nq.output())?;

        Ok(Self {
            header,
            reset,
            set,
            q,
            nq,
            nor_q,
            nor_nq,
        })
    }

    pub fn reset(&self) -> SignalId {
        self.reset
    }

    pub fn set(&self) -> SignalId {
        self.set
    }

    pub fn q(&self) -> SignalId {
        self.q
    }

    pub fn nq(&self) -> SignalId {
        self.nq
    }
}

impl Element for RsLatch {
    fn header(&self) -> &ElementHeader {
        &self.header
    }

    fn signals(&self) -> Vec<SignalId> {
        vec![self.reset, self.set, self.q, self.nq]
    }

    fn children(&self) -> Vec<&dyn Element> {
        vec![&self.nor_q, &self.nor_nq]
    }

    fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        for _ in 0..2 {
            self.nor_q.update(net)?;
            self.nor_nq.update(net)?;
        }
        Ok(())
    }
}

/// Gating stage plus RS latch, shared by [`DLatch`] and the edge-triggered
/// flip-flop.
///
/// Four NOR gates turn `(data, enable)` into set/reset requests, two more
/// form the latch: six NOR gates in total. The gating stage always finishes
/// before the latch reads it.
#[derive(Debug)]
pub(crate) struct GatedLatch {
    not_data: Gate,
    not_enable: Gate,
    set_gate: Gate,
    reset_gate: Gate,
    latch: RsLatch,
}

impl GatedLatch {
    pub(crate) fn new(net: &mut Netlist, data: SignalId, enable: SignalId) -> Result<Self> {
        let not_data = Gate::nor(net)?;
        let not_enable = Gate::nor(net)?;
        let set_gate = Gate::nor(net)?;
        let reset_gate = Gate::nor(net)?;
        let latch = RsLatch::new(net)?;

        net.connect(not_data.input(0), data)?;
        net.connect(not_data.input(1), data)?;
        net.connect(not_enable.input(0), enable)?;
        net.connect(not_enable.input(1), enable)?;

        // S = D and E
        net.connect(set_gate.input(0), not_data.output())?;
        net.connect(set_gate.input(1), not_enable.output())?;
        // R = !D and E
        net.connect(reset_gate.input(0), data)?;
        net.connect(reset_gate.input(1), not_enable.output())?;

        net.connect(latch.set(), set_gate.output())?;
        net.connect(latch.reset(), reset_gate.output())?;

        Ok(Self {
            not_data,
            not_enable,
            set_gate,
            reset_gate,
            latch,
        })
    }

    pub(crate) fn q(&self) -> SignalId {
        self.latch.q()
    }

    pub(crate) fn nq(&self) -> SignalId {
        self.latch.nq()
    }

    pub(crate) fn children(&self) -> Vec<&dyn Element> {
        vec![
            &self.not_data,
            &self.not_enable,
            &self.set_gate,
            &self.reset_gate,
            &self.latch,
        ]
    }

    pub(crate) fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        self.not_data.update(net)?;
        self.not_enable.update(net)?;
        self.set_gate.update(net)?;
        self.reset_gate.update(net)?;
        self.latch.update(net)
    }
}

/// Level-triggered D latch.
///
/// While `Enable` is high, `Q` tracks `D` on every update. While it is low,
/// `Q` holds. The first update after construction settles the latch to
/// `Q = 0` unless it is enabled.
#[derive(Debug)]
pub struct DLatch {
    header: ElementHeader,
    data: SignalId,
    enable: SignalId,
    q: SignalId,
    nq: SignalId,
    core: GatedLatch,
}

impl DLatch {
    pub fn new(net: &mut Netlist) -> Result<Self> {
        let header = ElementHeader::new("DLatch", net);
        let data = net.input(header.qualify("D"));
        let enable = net.input(header.qualify("Enable"));
        let q = net.output(header.qualify("Q"));
        let nq = net.output(header.qualify("NQ"));

        let core = GatedLatch::new(net, data, enable)?;
        net.connect(q, core.q())?;
        net.connect(nq, core.nq())?;

        Ok(Self {
            header,
            data,
            enable,
            q,
            nq,
            core,
        })
    }

    pub fn data(&self) -> SignalId {
        self.data
    }

    pub fn enable(&self) -> SignalId {
        self.enable
    }

    pub fn q(&self) -> SignalId {
        self.q
    }

    pub fn nq(&self) -> SignalId {
        self.nq
    }
}

impl Element for DLatch {
    fn header(&self) -> &ElementHeader {
        &self.header
    }

    fn signals(&self) -> Vec<SignalId> {
        vec![self.data, self.enable, self.q, self.nq]
    }

    fn children(&self) -> Vec<&dyn Element> {
        self.core.children()
    }

    fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        self.core.evaluate(net)
    }
}
