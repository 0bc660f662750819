//! Gatesim Core
//!
//! This crate provides the evaluation engine for the gatesim gate-level
//! logic simulator. It implements:
//!
//! - Signals with tri-state (high-impedance) semantics and bus conflict
//!   detection
//! - A connection graph with synchronous change propagation, cycles included
//! - The element contract (`update`, identifier and value introspection) and
//!   its convergence rules
//! - Cached debug snapshots aligned across arbitrarily deep composition
//! - A catalog of elements built on top: gates, buffers, latches,
//!   flip-flops, a ripple counter, a decoder and RAM
//!
//! There is no notion of propagation delay. Elements recompute only when
//! `update` is called, and each element documents how many updates it needs
//! to settle.
//!
//! # Architecture
//!
//! - `signal`: the [`Netlist`] arena, connections and propagation
//! - `element`: the [`Element`] trait, identity and snapshot caching
//! - `circuits`: concrete elements
//! - `error`: the [`SimError`] taxonomy
//!
//! # Example
//!
//! ```rust
//! use gatesim_core::circuits::RsLatch;
//! use gatesim_core::{Element, Netlist};
//!
//! let mut net = Netlist::new();
//! let mut latch = RsLatch::new(&mut net)?;
//!
//! net.set(latch.set(), true)?;
//! latch.update(&mut net)?;
//! assert!(net.value(latch.q()));
//!
//! // The snapshot lists the latch's own signals, then its gates'.
//! let snapshot = latch.snapshot(&net);
//! assert_eq!(snapshot.ids.len(), snapshot.values.len());
//! # Ok::<(), gatesim_core::SimError>(())
//! ```

pub mod circuits;
pub mod element;
pub mod error;
pub mod signal;

pub use element::{update_passes, DebugSnapshot, Element, ElementHeader};
pub use error::{Result, SimError};
pub use signal::{read_bus, write_bus, Netlist, OrdinalAllocator, SignalId, SignalKind, SignalState};
