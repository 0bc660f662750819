//! Ripple counter.
//!
//! A chain of toggle flip-flops where each stage is clocked by the inverted
//! output of the stage below it. A carry therefore reaches stage `k` only
//! after stage `k - 1` has toggled, and each stage reacts to its clock on its
//! own update. The counter runs several internal passes per update so that a
//! full-width ripple (`0x7F -> 0x80`) completes before `update` returns.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::{bus_signals, Element, ElementHeader};
use crate::error::{Result, SimError};
use crate::signal::{read_bus, Netlist, SignalId};

use super::flip_flop::TFlipFlop;

/// How many internal passes a [`RippleCounter`] runs per update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassPolicy {
    /// One pass per stage: the shortest bound that always completes a ripple.
    #[default]
    PerStage,

    /// A fixed number of passes regardless of width. Counters wider than the
    /// bound report carries into their upper stages late.
    Fixed(usize),
}

impl PassPolicy {
    /// Resolve the pass count for a counter of `width` stages.
    pub fn passes(self, width: usize) -> usize {
        match self {
            PassPolicy::PerStage => width,
            PassPolicy::Fixed(passes) => passes,
        }
    }
}

/// Up-counter of `width` toggle flip-flops, counting rising edges on `Clock`
/// modulo `2^width`.
///
/// Within a pass, stages are updated from the most significant down to stage
/// 0, so a carry advances exactly one stage per pass. The counter settles once
/// while it is built; afterwards its value is 0 and the first rising edge
/// counts.
#[derive(Debug)]
pub struct RippleCounter {
    header: ElementHeader,
    clock: SignalId,
    outputs: Vec<SignalId>,
    stages: Vec<TFlipFlop>,
    passes: usize,
}

impl RippleCounter {
    /// Widest supported counter.
    pub const MAX_WIDTH: usize = 64;

    pub fn new(net: &mut Netlist, width: usize, policy: PassPolicy) -> Result<Self> {
        if width == 0 || width > Self::MAX_WIDTH {
            return Err(SimError::invalid_width("RippleCounter", width));
        }
        let passes = policy.passes(width);
        if passes == 0 {
            return Err(SimError::invalid_width("RippleCounter passes", passes));
        }

        let header = ElementHeader::new("RippleCounter", net);
        let clock = net.input(header.qualify("Clock"));
        let outputs = net.output_bus(&header.qualify("Q"), width);

        let stages = (0..width)
            .map(|_| TFlipFlop::new(net))
            .collect::<Result<Vec<_>>>()?;

        for (index, stage) in stages.iter().enumerate() {
            let stage_clock = match index {
                0 => clock,
                _ => stages[index - 1].nq(),
            };
            net.connect(stage.clock(), stage_clock)?;
            net.connect(outputs[index], stage.q())?;
        }

        let mut counter = Self {
            header,
            clock,
            outputs,
            stages,
            passes,
        };
        counter.update(net)?;
        Ok(counter)
    }

    pub fn clock(&self) -> SignalId {
        self.clock
    }

    /// Output bits, index 0 least significant.
    pub fn outputs(&self) -> &[SignalId] {
        &self.outputs
    }

    pub fn width(&self) -> usize {
        self.stages.len()
    }

    /// Internal passes per update.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Current count.
    pub fn count(&self, net: &Netlist) -> u64 {
        read_bus(net, &self.outputs)
    }

    /// Drive one full clock cycle: rising edge, update, falling edge, update.
    pub fn tick(&mut self, net: &mut Netlist) -> Result<()> {
        net.set(self.clock, true)?;
        self.update(net)?;
        net.set(self.clock, false)?;
        self.update(net)
    }
}

impl Element for RippleCounter {
    fn header(&self) -> &ElementHeader {
        &self.header
    }

    fn signals(&self) -> Vec<SignalId> {
        let mut signals = vec![self.clock];
        signals.extend(bus_signals([self.outputs.as_slice()]));
        signals
    }

    fn children(&self) -> Vec<&dyn Element> {
        self.stages.iter().map(|stage| stage as &dyn Element).collect()
    }

    fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
        for _ in 0..self.passes {
            for stage in self.stages.iter_mut().rev() {
                stage.update(net)?;
            }
        }
        debug!(
            counter = %self.header.prefix(),
            passes = self.passes,
            count = self.count(net),
            "counter updated"
        );
        Ok(())
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
    fn starts_at_zero() {
        let mut net = netlist();
        let counter = RippleCounter::new(&mut net, 8, PassPolicy::PerStage).unwrap();
        assert_eq!(counter.count(&net), 0);
        assert_eq!(counter.passes(), 8);
    }

    #[test]
    fn counts_rising_edges() {
        let mut net = netlist();
        let mut counter = RippleCounter::new(&mut net, 4, PassPolicy::default()).unwrap();

        for expected in 1..=20u64 {
            counter.tick(&mut net).unwrap();
            assert_eq!(counter.count(&net), expected % 16);
        }
    }

    #[test]
    fn extra_updates_without_edges_do_not_count() {
        let mut net = netlist();
        let mut counter = RippleCounter::new(&mut net, 3, PassPolicy::default()).unwrap();

        net.set(counter.clock(), true).unwrap();
        counter.update(&mut net).unwrap();
        counter.update(&mut net).unwrap();
        counter.update(&mut net).unwrap();
        assert_eq!(counter.count(&net), 1);
    }

    #[test]
    fn too_few_passes_delay_the_carry() {
        let mut net = netlist();
        let mut counter = RippleCounter::new(&mut net, 4, PassPolicy::Fixed(1)).unwrap();
        counter.tick(&mut net).unwrap();
        assert_eq!(counter.count(&net), 1);

        // stage 1 sees its clock edge one update late
        net.set(counter.clock(), true).unwrap();
        counter.update(&mut net).unwrap();
        assert_eq!(counter.count(&net), 0);

        net.set(counter.clock(), false).unwrap();
        counter.update(&mut net).unwrap();
        assert_eq!(counter.count(&net), 2);
    }

    #[test]
    fn width_is_validated() {
        let mut net = netlist();
        assert!(RippleCounter::new(&mut net, 0, PassPolicy::PerStage).is_err());
        assert!(RippleCounter::new(&mut net, 65, PassPolicy::PerStage).is_err());
        assert!(RippleCounter::new(&mut net, 4, PassPolicy::Fixed(0)).is_err());
    }

    #[test]
    fn pass_policy_round_trips_through_json() {
        let policy: PassPolicy = serde_json::from_str(r#"{"fixed":8}"#).unwrap();
        assert_eq!(policy, PassPolicy::Fixed(8));
        assert_eq!(policy.passes(16), 8);

        let json = serde_json::to_string(&PassPolicy::PerStage).unwrap();
        assert_eq!(json, r#""per_stage""#);
    }
}
