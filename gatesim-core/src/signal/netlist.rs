//! Netlist
//!
//! The netlist is the arena that owns every wire of one circuit and the
//! one-way subscriptions between them.
//!
//! # Propagation
//!
//! Assigning a new state to a signal pushes its sinks onto a FIFO work-list.
//! Each popped sink recomputes its derived state from its sources; if that
//! state changed, its own sinks are queued in turn. The walk runs to
//! completion before the assigning call returns, so a single `set` can ripple
//! through an entire fan-out tree. Edges are never removed.
//!
//! # Resolution Policies
//!
//! - Receiving signals ([`SignalKind::Input`]) accept at most one active
//!   source. None active keeps the previous value, one active is adopted, two
//!   or more is a [`SimError::BusConflict`].
//! - Driven signals ([`SignalKind::Output`]) with sources float only when all
//!   of their sources float. Otherwise the earliest-connected active source
//!   wins and extra active sources are tolerated.

use std::collections::VecDeque;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use super::ordinal::OrdinalAllocator;
use super::state::{SignalId, SignalKind, SignalRecord, SignalState};
use crate::error::{Result, SimError};

/// Driver label reported when a direct write collides with a connected source.
const EXTERNAL_DRIVER: &str = "<external write>";

/// Arena of signal records for one circuit.
#[derive(Debug)]
pub struct Netlist {
    signals: Vec<SignalRecord>,
    ordinals: Arc<OrdinalAllocator>,
}

impl Netlist {
    /// Create an empty netlist backed by the process-wide ordinal allocator.
    pub fn new() -> Self {
        Self::with_allocator(OrdinalAllocator::global())
    }

    /// Create an empty netlist with an injected ordinal allocator.
    pub fn with_allocator(ordinals: Arc<OrdinalAllocator>) -> Self {
        Self {
            signals: Vec::new(),
            ordinals,
        }
    }

    /// Hand out the next element ordinal.
    pub fn next_ordinal(&self) -> u64 {
        self.ordinals.next()
    }

    // ------------------------------------------------------------------------
    // Allocation
    // ------------------------------------------------------------------------

    /// Allocate a receiving signal.
    pub fn input(&mut self, name: impl Into<String>) -> SignalId {
        self.add(name.into(), SignalKind::Input)
    }

    /// Allocate a driven signal.
    pub fn output(&mut self, name: impl Into<String>) -> SignalId {
        self.add(name.into(), SignalKind::Output)
    }

    /// Allocate `width` receiving signals named `name[0]..name[width-1]`.
    ///
    /// Index 0 is the least significant bit.
    pub fn input_bus(&mut self, name: &str, width: usize) -> Vec<SignalId> {
        (0..width).map(|i| self.input(format!("{name}[{i}]"))).collect()
    }

    /// Allocate `width` driven signals named `name[0]..name[width-1]`.
    pub fn output_bus(&mut self, name: &str, width: usize) -> Vec<SignalId> {
        (0..width).map(|i| self.output(format!("{name}[{i}]"))).collect()
    }

    fn add(&mut self, name: String, kind: SignalKind) -> SignalId {
        let id = SignalId::new(self.signals.len());
        self.signals.push(SignalRecord::new(name, kind));
        id
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    fn record(&self, id: SignalId) -> Result<&SignalRecord> {
        self.signals
            .get(id.index())
            .ok_or(SimError::UnknownSignal { index: id.index() })
    }

    /// Current logic level.
    ///
    /// # Panics
    ///
    /// Panics if `id` was allocated by a different netlist.
    pub fn value(&self, id: SignalId) -> bool {
        self.signals[id.index()].state.value
    }

    /// Whether the signal is currently floating.
    pub fn is_high_impedance(&self, id: SignalId) -> bool {
        self.signals[id.index()].state.high_impedance
    }

    /// Level and drive state together.
    pub fn state(&self, id: SignalId) -> SignalState {
        self.signals[id.index()].state
    }

    /// Qualified label of the signal.
    pub fn name(&self, id: SignalId) -> &str {
        &self.signals[id.index()].name
    }

    /// Receiving or driven role.
    pub fn kind(&self, id: SignalId) -> SignalKind {
        self.signals[id.index()].kind
    }

    /// Upstream signals in connection order.
    pub fn sources(&self, id: SignalId) -> &[SignalId] {
        &self.signals[id.index()].sources
    }

    /// Downstream signals.
    pub fn sinks(&self, id: SignalId) -> &[SignalId] {
        &self.signals[id.index()].sinks
    }

    /// Number of signals in the netlist.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Whether no signal has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    // ------------------------------------------------------------------------
    // Wiring and assignment
    // ------------------------------------------------------------------------

    /// Subscribe `sink` to `source`.
    ///
    /// The sink's state is recomputed immediately, so connecting a second
    /// active driver to a receiving signal fails right here.
    pub fn connect(&mut self, sink: SignalId, source: SignalId) -> Result<()> {
        self.record(sink)?;
        self.record(source)?;

        if sink == source {
            return Err(SimError::SelfConnection {
                signal: self.name(sink).to_string(),
            });
        }

        if self.signals[sink.index()].sources.contains(&source) {
            trace!(sink = self.name(sink), source = self.name(source), "edge already present");
            return Ok(());
        }

        self.signals[sink.index()].sources.push(source);
        self.signals[source.index()].sinks.push(sink);
        trace!(sink = self.name(sink), source = self.name(source), "connect");

        if self.recompute(sink)? {
            self.propagate(sink)?;
        }
        Ok(())
    }

    /// Drive a signal to `value`, clearing any high-impedance state.
    ///
    /// A receiving signal that already has an active source rejects the write
    /// with [`SimError::BusConflict`].
    pub fn set(&mut self, id: SignalId, value: bool) -> Result<()> {
        self.assign(id, SignalState::driven(value))
    }

    /// Enable or disable the drive of a driven signal.
    ///
    /// The carried value is kept; only the impedance flag changes. Sinks are
    /// notified even though the value itself did not move.
    pub fn set_high_impedance(&mut self, id: SignalId, high_impedance: bool) -> Result<()> {
        let record = self.record(id)?;
        if high_impedance && record.kind == SignalKind::Input {
            return Err(SimError::HighImpedanceInput {
                signal: record.name.clone(),
            });
        }

        let state = SignalState {
            value: record.state.value,
            high_impedance,
        };
        self.assign(id, state)
    }

    /// Drive `Some(level)`, or float on `None`.
    pub fn drive(&mut self, id: SignalId, level: Option<bool>) -> Result<()> {
        match level {
            Some(value) => self.set(id, value),
            None => self.set_high_impedance(id, true),
        }
    }

    fn assign(&mut self, id: SignalId, state: SignalState) -> Result<()> {
        let record = self.record(id)?;
        if record.kind == SignalKind::Input {
            let mut drivers: Vec<String> = record
                .sources
                .iter()
                .filter(|source| self.signals[source.index()].state.is_active())
                .map(|source| self.signals[source.index()].name.clone())
                .collect();
            if !drivers.is_empty() {
                drivers.push(EXTERNAL_DRIVER.to_string());
                warn!(signal = %record.name, ?drivers, "write to a driven input");
                return Err(SimError::bus_conflict(record.name.clone(), drivers));
            }
        }

        let record = &mut self.signals[id.index()];
        if record.state == state {
            return Ok(());
        }
        record.state = state;
        self.propagate(id)
    }

    /// Walk the sinks of `origin` until nothing changes any more.
    fn propagate(&mut self, origin: SignalId) -> Result<()> {
        let mut queue: VecDeque<SignalId> =
            self.signals[origin.index()].sinks.iter().copied().collect();
        let mut visits = 0usize;

        while let Some(id) = queue.pop_front() {
            visits += 1;
            if self.recompute(id)? {
                queue.extend(self.signals[id.index()].sinks.iter().copied());
            }
        }

        if visits > 0 {
            trace!(origin = self.name(origin), visits, "propagated");
        }
        Ok(())
    }

    /// Re-derive a sink's state from its sources.
    ///
    /// Returns whether the state changed.
    fn recompute(&mut self, id: SignalId) -> Result<bool> {
        let record = &self.signals[id.index()];
        if record.sources.is_empty() {
            return Ok(false);
        }

        let active: SmallVec<[SignalId; 4]> = record
            .sources
            .iter()
            .copied()
            .filter(|source| self.signals[source.index()].state.is_active())
            .collect();

        let next = match record.kind {
            SignalKind::Input => match active.as_slice() {
                [] => record.state,
                [driver] => SignalState::driven(self.signals[driver.index()].state.value),
                drivers => {
                    let drivers: Vec<String> = drivers
                        .iter()
                        .map(|driver| self.signals[driver.index()].name.clone())
                        .collect();
                    warn!(signal = %record.name, ?drivers, "bus conflict");
                    return Err(SimError::bus_conflict(record.name.clone(), drivers));
                }
            },
            SignalKind::Output => match active.first() {
                None => SignalState {
                    value: record.state.value,
                    high_impedance: true,
                },
                Some(first) => {
                    if active.len() > 1 {
                        debug!(
                            signal = %record.name,
                            active = active.len(),
                            winner = %self.signals[first.index()].name,
                            "multiple active sources on driven signal"
                        );
                    }
                    SignalState::driven(self.signals[first.index()].state.value)
                }
            },
        };

        let record = &mut self.signals[id.index()];
        if record.state == next {
            return Ok(false);
        }
        record.state = next;
        Ok(true)
    }
}

impl Default for Netlist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn netlist() -> Netlist {
        Netlist::with_allocator(Arc::new(OrdinalAllocator::new()))
    }

    #[test]
    fn input_adopts_single_driver() {
        let mut net = netlist();
        let src = net.output("src");
        let dst = net.input("dst");

        net.set(src, true).unwrap();
        net.connect(dst, src).unwrap();
        assert!(net.value(dst));

        net.set(src, false).unwrap();
        assert!(!net.value(dst));
    }

    #[test]
    fn two_active_drivers_conflict_on_connect() {
        let mut net = netlist();
        let a = net.output("a");
        let b = net.output("b");
        let dst = net.input("dst");

        net.connect(dst, a).unwrap();
        let err = net.connect(dst, b).unwrap_err();
        assert_eq!(
            err,
            SimError::bus_conflict("dst", vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn one_active_driver_among_floating_ones() {
        let mut net = netlist();
        let floating: Vec<_> = (0..3).map(|i| net.output(format!("z{i}"))).collect();
        let active = net.output("active");
        let dst = net.input("dst");

        for &z in &floating {
            net.set_high_impedance(z, true).unwrap();
            net.connect(dst, z).unwrap();
        }
        net.set(active, true).unwrap();
        net.connect(dst, active).unwrap();

        assert!(net.value(dst));
        assert!(!net.is_high_impedance(dst));
    }

    #[test]
    fn conflict_detected_after_later_change() {
        let mut net = netlist();
        let a = net.output("a");
        let b = net.output("b");
        let dst = net.input("dst");

        net.set_high_impedance(b, true).unwrap();
        net.connect(dst, a).unwrap();
        net.connect(dst, b).unwrap();

        let err = net.set(b, true).unwrap_err();
        assert!(err.is_bus_conflict());
    }

    #[test]
    fn direct_write_to_driven_input_conflicts() {
        let mut net = netlist();
        let src = net.output("src");
        let dst = net.input("dst");

        net.set(src, true).unwrap();
        net.connect(dst, src).unwrap();

        let err = net.set(dst, false).unwrap_err();
        assert_eq!(
            err,
            SimError::bus_conflict("dst", vec!["src".to_string(), EXTERNAL_DRIVER.to_string()])
        );
        // The driver's value is left in place.
        assert!(net.value(dst));

        // Once the driver floats, the input may be written directly again.
        net.set_high_impedance(src, true).unwrap();
        net.set(dst, false).unwrap();
        assert!(!net.value(dst));
    }

    #[test]
    fn floating_input_keeps_last_value() {
        let mut net = netlist();
        let src = net.output("src");
        let dst = net.input("dst");

        net.set(src, true).unwrap();
        net.connect(dst, src).unwrap();
        net.set_high_impedance(src, true).unwrap();

        assert!(net.value(dst));
        assert!(!net.is_high_impedance(dst));
    }

    #[test]
    fn driven_signal_floats_only_when_all_sources_float() {
        let mut net = netlist();
        let a = net.output("a");
        let b = net.output("b");
        let bus = net.output("bus");

        net.connect(bus, a).unwrap();
        net.connect(bus, b).unwrap();
        assert!(!net.is_high_impedance(bus));

        net.set_high_impedance(a, true).unwrap();
        assert!(!net.is_high_impedance(bus));

        net.set_high_impedance(b, true).unwrap();
        assert!(net.is_high_impedance(bus));
    }

    #[test]
    fn driven_signal_without_sources_is_not_floating() {
        let mut net = netlist();
        let out = net.output("out");
        assert!(!net.is_high_impedance(out));
        assert!(net.sources(out).is_empty());
    }

    #[test]
    fn driven_signal_prefers_earliest_active_source() {
        let mut net = netlist();
        let first = net.output("first");
        let second = net.output("second");
        let bus = net.output("bus");

        net.set(second, true).unwrap();
        net.connect(bus, first).unwrap();
        net.connect(bus, second).unwrap();
        // both active: first wins, no error
        assert!(!net.value(bus));

        net.set_high_impedance(first, true).unwrap();
        assert!(net.value(bus));
    }

    #[test]
    fn assignment_cascades_through_fan_out() {
        let mut net = netlist();
        let root = net.output("root");
        let mid: Vec<_> = (0..3).map(|i| net.input(format!("mid{i}"))).collect();
        let leaves: Vec<_> = (0..6).map(|i| net.input(format!("leaf{i}"))).collect();

        for (i, &m) in mid.iter().enumerate() {
            net.connect(m, root).unwrap();
            net.connect(leaves[2 * i], m).unwrap();
            net.connect(leaves[2 * i + 1], m).unwrap();
        }

        net.set(root, true).unwrap();
        assert!(leaves.iter().all(|&leaf| net.value(leaf)));
    }

    #[test]
    fn impedance_change_notifies_without_value_change() {
        let mut net = netlist();
        let src = net.output("src");
        let bus = net.output("bus");
        let tail = net.output("tail");

        net.connect(bus, src).unwrap();
        net.connect(tail, bus).unwrap();

        net.set_high_impedance(src, true).unwrap();
        assert!(net.is_high_impedance(bus));
        assert!(net.is_high_impedance(tail));
        assert!(!net.value(tail));
    }

    #[test]
    fn feedback_edges_settle() {
        let mut net = netlist();
        let a = net.input("a");
        let b = net.input("b");

        net.connect(b, a).unwrap();
        net.connect(a, b).unwrap();
        net.set(a, true).unwrap();

        assert!(net.value(a));
        assert!(net.value(b));
    }

    #[test]
    fn wiring_errors() {
        let mut net = netlist();
        let a = net.input("a");
        let out = net.output("out");

        assert_eq!(
            net.connect(a, a).unwrap_err(),
            SimError::SelfConnection { signal: "a".into() }
        );
        assert_eq!(
            net.set_high_impedance(a, true).unwrap_err(),
            SimError::HighImpedanceInput { signal: "a".into() }
        );

        let foreign = SignalId::new(99);
        assert_eq!(
            net.connect(a, foreign).unwrap_err(),
            SimError::UnknownSignal { index: 99 }
        );

        net.connect(a, out).unwrap();
        net.connect(a, out).unwrap();
        assert_eq!(net.sources(a), &[out]);
        assert_eq!(net.sinks(out), &[a]);
    }

    #[test]
    fn buses_are_named_by_bit() {
        let mut net = netlist();
        let bus = net.input_bus("D", 3);
        assert_eq!(net.name(bus[0]), "D[0]");
        assert_eq!(net.name(bus[2]), "D[2]");
        assert_eq!(net.len(), 3);
    }
}
