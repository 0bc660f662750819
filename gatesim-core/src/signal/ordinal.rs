//! Element ordinals.
//!
//! Every element gets a number when it is constructed. The number is folded
//! into the element's identifier prefix (`NorGate_12`), so it has to be
//! unique across every netlist in the process, including netlists built on
//! different threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Arc<OrdinalAllocator>> = OnceLock::new();

/// Atomic source of element ordinals.
///
/// Netlists created with [`Netlist::new`](super::Netlist::new) share the
/// process-wide instance. Tests that want reproducible identifiers can inject
/// a private allocator through
/// [`Netlist::with_allocator`](super::Netlist::with_allocator).
#[derive(Debug, Default)]
pub struct OrdinalAllocator {
    next: AtomicU64,
}

impl OrdinalAllocator {
    /// Create an allocator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide allocator.
    pub fn global() -> Arc<OrdinalAllocator> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(OrdinalAllocator::new())))
    }

    /// Hand out the next ordinal.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
