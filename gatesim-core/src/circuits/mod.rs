//! Circuit Catalog
//!
//! Concrete elements built on the signal and element layers. Each one wires
//! its children together in its constructor and updates them in a fixed order
//! from `evaluate`.
//!
//! | Element          | Kind                       | Updates to settle        |
//! |------------------|----------------------------|--------------------------|
//! | [`Gate`]         | combinational              | 1                        |
//! | [`TriStateBuffer`] | combinational            | 1                        |
//! | [`Decoder`]      | combinational              | 1                        |
//! | [`RsLatch`]      | cross-coupled feedback     | 1                        |
//! | [`DLatch`]       | level-triggered            | 1                        |
//! | [`MemoryCell`]   | level-triggered            | 1                        |
//! | [`Ram`]          | level-triggered            | 1                        |
//! | [`DFlipFlop`]    | edge-triggered             | 1 per clock level change |
//! | [`TFlipFlop`]    | edge-triggered             | 1 per clock level change |
//! | [`RippleCounter`] | chained edge-triggered    | 1 (runs its own passes)  |

mod buffer;
mod counter;
mod decoder;
mod flip_flop;
mod gate;
mod latch;
mod memory;

pub use buffer::TriStateBuffer;
pub use counter::{PassPolicy, RippleCounter};
pub use decoder::Decoder;
pub use flip_flop::{DFlipFlop, TFlipFlop};
pub use gate::{Gate, GateKind};
pub use latch::{DLatch, RsLatch};
pub use memory::{MemoryCell, Ram, WORD_BITS};
