//! Signals and the Connection Graph
//!
//! This module implements wires and the one-way subscriptions between them.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A signal carries a logic level and a high-impedance flag. It plays one of
//! two roles:
//!
//! - a *receiving* signal (`Input`) belongs to the element that consumes it
//!   and must never see more than one active driver;
//! - a *driven* signal (`Output`) belongs to the element that computes it and
//!   may also aggregate several upstream sources, like a wired bus.
//!
//! ## Connections
//!
//! `connect(sink, source)` makes `sink` follow `source`. Connections are
//! created while a circuit is built and live as long as the netlist. Cycles
//! are allowed; sequential circuits need them.
//!
//! # Implementation Notes
//!
//! Signals live in an arena ([`Netlist`]) and refer to each other by index.
//! Change notification is an explicit work-list walk over those indices
//! rather than callbacks, so feedback loops never alias a live borrow.

mod netlist;
mod ordinal;
mod state;

pub use netlist::Netlist;
pub use ordinal::OrdinalAllocator;
pub use state::{SignalId, SignalKind, SignalState};

/// Drive a bus with the low `ids.len()` bits of `value`.
///
/// Bit `i` of `value` goes to `ids[i]`.
pub fn write_bus(net: &mut Netlist, ids: &[SignalId], value: u64) -> crate::Result<()> {
    for (bit, &id) in ids.iter().enumerate() {
        net.set(id, (value >> bit) & 1 == 1)?;
    }
    Ok(())
}

/// Read a bus as an unsigned integer, `ids[0]` being the least significant bit.
pub fn read_bus(net: &Netlist, ids: &[SignalId]) -> u64 {
    ids.iter()
        .enumerate()
        .filter(|&(_, &id)| net.value(id))
        .fold(0u64, |acc, (bit, _)| acc | (1u64 << bit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn bus_helpers_round_trip() {
        let mut net = Netlist::with_allocator(Arc::new(OrdinalAllocator::new()));
        let bus = net.input_bus("D", 8);

        write_bus(&mut net, &bus, 0xA5).unwrap();
        assert_eq!(read_bus(&net, &bus), 0xA5);
        assert!(net.value(bus[0]));
        assert!(!net.value(bus[1]));
        assert!(net.value(bus[7]));
    }

    #[test]
    fn write_bus_truncates_to_width() {
        let mut net = Netlist::with_allocator(Arc::new(OrdinalAllocator::new()));
        let bus = net.input_bus("D", 4);

        write_bus(&mut net, &bus, 0x1F).unwrap();
        assert_eq!(read_bus(&net, &bus), 0xF);
    }
}
