//! Element identity.

use super::snapshot::SnapshotCache;
use crate::signal::Netlist;

/// Identity and snapshot cache shared by every element.
#[derive(Debug)]
pub struct ElementHeader {
    type_name: &'static str,
    ordinal: u64,
    cache: SnapshotCache,
}

impl ElementHeader {
    /// Take the next ordinal from `net`'s allocator.
    pub fn new(type_name: &'static str, net: &Netlist) -> Self {
        Self {
            type_name,
            ordinal: net.next_ordinal(),
            cache: SnapshotCache::new(),
        }
    }

    /// Element type label, e.g. `NorGate`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Process-wide ordinal assigned at construction.
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// `"{TypeName}_{ordinal}"`, the first segment of every identifier this
    /// element reports.
    pub fn prefix(&self) -> String {
        format!("{}_{}", self.type_name, self.ordinal)
    }

    /// Qualified label for a local signal.
    pub fn qualify(&self, signal: &str) -> String {
        format!("{}.{}", self.prefix(), signal)
    }

    /// Snapshot cache owned by this element.
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }
}
