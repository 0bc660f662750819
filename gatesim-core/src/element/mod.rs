//! Elements
//!
//! An element is a circuit node: it owns some local signals and, for
//! composites, a fixed set of child elements. Children are owned outright and
//! never shared between parents, so identifiers read as a dotted path from the
//! root element down to a leaf signal.
//!
//! # Convergence
//!
//! Nothing settles on its own. Signal assignments propagate along wires
//! immediately, but an element only recomputes its outputs inside
//! [`Element::update`]. How many updates a circuit needs is part of each
//! element's contract:
//!
//! - combinational elements reach their fixed point in one update, and
//!   further updates with the same inputs change nothing;
//! - feedback elements fix the order in which they update their children, and
//!   that order is observable;
//! - chained feedback (ripple counters) runs its own bounded number of
//!   internal passes per update.
//!
//! Drivers set inputs, call `update` as many times as the element requires,
//! then read outputs or the flattened [`DebugSnapshot`].

mod header;
mod snapshot;

pub use header::ElementHeader;
pub use snapshot::{collect_ids, collect_values, DebugSnapshot, SnapshotCache};

use std::sync::Arc;

use crate::error::Result;
use crate::signal::{Netlist, SignalId};

/// The capability every circuit node implements.
pub trait Element {
    /// Identity and snapshot cache.
    fn header(&self) -> &ElementHeader;

    /// Local signals in display order. Buses are listed from the highest
    /// index down to index 0.
    fn signals(&self) -> Vec<SignalId>;

    /// Owned children, in snapshot order.
    fn children(&self) -> Vec<&dyn Element> {
        Vec::new()
    }

    /// Recompute this element's outputs from its inputs.
    ///
    /// Composites update their children from here, in their fixed order.
    fn evaluate(&mut self, net: &mut Netlist) -> Result<()>;

    /// Evaluate once, dropping the cached snapshot values first.
    fn update(&mut self, net: &mut Netlist) -> Result<()> {
        self.header().cache().invalidate_values();
        self.evaluate(net)
    }

    /// Qualified identifiers of every signal in this subtree.
    fn ids(&self, net: &Netlist) -> Arc<[String]> {
        self.header()
            .cache()
            .ids_or_insert_with(|| collect_ids(self, net))
    }

    /// Current values, aligned with [`Element::ids`].
    fn values(&self, net: &Netlist) -> Arc<[bool]> {
        self.header()
            .cache()
            .values_or_insert_with(|| collect_values(self, net))
    }

    /// Owned copy of identifiers and values.
    fn snapshot(&self, net: &Netlist) -> DebugSnapshot {
        DebugSnapshot {
            ids: self.ids(net).to_vec(),
            values: self.values(net).to_vec(),
        }
    }

    /// Drop both cached sequences in this whole subtree.
    ///
    /// Only needed to check that cached and freshly built snapshots agree.
    fn clear_debug_caches(&self) {
        self.header().cache().invalidate_all();
        for child in self.children() {
            child.clear_debug_caches();
        }
    }
}

/// Call `update` `passes` times in a row.
pub fn update_passes<E>(element: &mut E, net: &mut Netlist, passes: usize) -> Result<()>
where
    E: Element + ?Sized,
{
    for _ in 0..passes {
        element.update(net)?;
    }
    Ok(())
}

/// Local signals of several buses, each listed high index first.
pub(crate) fn bus_signals<'a>(buses: impl IntoIterator<Item = &'a [SignalId]>) -> Vec<SignalId> {
    buses
        .into_iter()
        .flat_map(|bus| bus.iter().rev().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::OrdinalAllocator;

    struct Wire {
        header: ElementHeader,
        input: SignalId,
        output: SignalId,
        evaluations: usize,
    }

    impl Wire {
        fn new(net: &mut Netlist) -> Self {
            let header = ElementHeader::new("Wire", net);
            let input = net.input(header.qualify("A"));
            let output = net.output(header.qualify("Q"));
            Self {
                header,
                input,
                output,
                evaluations: 0,
            }
        }
    }

    impl Element for Wire {
        fn header(&self) -> &ElementHeader {
            &self.header
        }

        fn signals(&self) -> Vec<SignalId> {
            vec![self.input, self.output]
        }

        fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
            self.evaluations += 1;
            net.set(self.output, net.value(self.input))
        }
    }

    struct Pair {
        header: ElementHeader,
        input: SignalId,
        first: Wire,
        second: Wire,
    }

    impl Pair {
        fn new(net: &mut Netlist) -> Result<Self> {
            let header = ElementHeader::new("Pair", net);
            let input = net.input(header.qualify("A"));
            let first = Wire::new(net);
            let second = Wire::new(net);
            net.connect(first.input, input)?;
            net.connect(second.input, first.output)?;
            Ok(Self {
                header,
                input,
                first,
                second,
            })
        }
    }

    impl Element for Pair {
        fn header(&self) -> &ElementHeader {
            &self.header
        }

        fn signals(&self) -> Vec<SignalId> {
            vec![self.input]
        }

        fn children(&self) -> Vec<&dyn Element> {
            vec![&self.first, &self.second]
        }

        fn evaluate(&mut self, net: &mut Netlist) -> Result<()> {
            self.first.update(net)?;
            self.second.update(net)
        }
    }

    fn netlist() -> Netlist {
        Netlist::with_allocator(Arc::new(OrdinalAllocator::new()))
    }

    #[test]
    fn ids_are_prefixed_by_owner() {
        let mut net = netlist();
        let pair = Pair::new(&mut net).unwrap();

        let ids = pair.ids(&net);
        assert_eq!(
            &*ids,
            &[
                "Pair_0.A".to_string(),
                "Pair_0.Wire_1.A".to_string(),
                "Pair_0.Wire_1.Q".to_string(),
                "Pair_0.Wire_2.A".to_string(),
                "Pair_0.Wire_2.Q".to_string(),
            ]
        );
        assert_eq!(ids.len(), pair.values(&net).len());
    }

    #[test]
    fn update_refreshes_values() {
        let mut net = netlist();
        let mut pair = Pair::new(&mut net).unwrap();
        assert_eq!(&*pair.values(&net), &[false; 5]);

        net.set(pair.input, true).unwrap();
        pair.update(&mut net).unwrap();
        assert_eq!(&*pair.values(&net), &[true; 5]);
    }

    #[test]
    fn values_are_cached_until_update() {
        let mut net = netlist();
        let mut pair = Pair::new(&mut net).unwrap();
        pair.update(&mut net).unwrap();
        let before = pair.values(&net);

        net.set(pair.input, true).unwrap();
        assert!(Arc::ptr_eq(&before, &pair.values(&net)));

        pair.update(&mut net).unwrap();
        assert!(pair.values(&net)[0]);
    }

    #[test]
    fn clear_debug_caches_reaches_children() {
        let mut net = netlist();
        let pair = Pair::new(&mut net).unwrap();
        pair.ids(&net);
        pair.values(&net);
        assert!(pair.first.header().cache().has_ids());

        pair.clear_debug_caches();
        assert!(!pair.header().cache().has_ids());
        assert!(!pair.first.header().cache().has_values());
        assert!(!pair.second.header().cache().has_ids());
    }

    #[test]
    fn update_passes_repeats() {
        let mut net = netlist();
        let mut wire = Wire::new(&mut net);
        update_passes(&mut wire, &mut net, 3).unwrap();
        assert_eq!(wire.evaluations, 3);
    }

    #[test]
    fn bus_signals_list_high_bit_first() {
        let mut net = netlist();
        let a = net.input_bus("A", 2);
        let b = net.input_bus("B", 2);
        assert_eq!(bus_signals([a.as_slice(), b.as_slice()]), vec![a[1], a[0], b[1], b[0]]);
    }
}
