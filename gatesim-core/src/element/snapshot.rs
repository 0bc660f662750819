//! Debug Snapshots
//!
//! A snapshot is a pair of equal-length sequences: qualified signal
//! identifiers and the values those signals currently carry, position for
//! position.
//!
//! # How Snapshots Are Built
//!
//! 1. The element lists its own signals first, in its display order.
//!
//! 2. Each owned child's snapshot is appended, every child identifier
//!    re-prefixed with the parent's `TypeName_ordinal`.
//!
//! Because the identifier list and the value list are produced by the same
//! walk, they can never drift apart.
//!
//! # Caching
//!
//! The identifier list only depends on topology, which is frozen once the
//! element is constructed, so it is cached for good. The value list is
//! dropped on every `update` and rebuilt lazily on the next read.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;

use super::Element;
use crate::signal::Netlist;

/// Per-element cache for the two snapshot sequences.
///
/// The two slots have independent lifetimes.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    ids: RwLock<Option<Arc<[String]>>>,
    values: RwLock<Option<Arc<[bool]>>>,
}

impl SnapshotCache {
    /// Empty cache with both slots unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached identifiers, building them with `build` on a miss.
    pub fn ids_or_insert_with<F>(&self, build: F) -> Arc<[String]>
    where
        F: FnOnce() -> Vec<String>,
    {
        if let Some(ids) = self.ids.read().as_ref() {
            return Arc::clone(ids);
        }

        let ids: Arc<[String]> = build().into();
        *self.ids.write() = Some(Arc::clone(&ids));
        ids
    }

    /// Return the cached values, building them with `build` on a miss.
    pub fn values_or_insert_with<F>(&self, build: F) -> Arc<[bool]>
    where
        F: FnOnce() -> Vec<bool>,
    {
        if let Some(values) = self.values.read().as_ref() {
            return Arc::clone(values);
        }

        let values: Arc<[bool]> = build().into();
        *self.values.write() = Some(Arc::clone(&values));
        values
    }

    /// Drop the cached values.
    pub fn invalidate_values(&self) {
        *self.values.write() = None;
    }

    /// Drop both sequences.
    pub fn invalidate_all(&self) {
        *self.ids.write() = None;
        *self.values.write() = None;
    }

    /// Whether identifiers are cached.
    pub fn has_ids(&self) -> bool {
        self.ids.read().is_some()
    }

    /// Whether values are cached.
    pub fn has_values(&self) -> bool {
        self.values.read().is_some()
    }
}

/// Build the identifier sequence of `element`.
pub fn collect_ids<E>(element: &E, net: &Netlist) -> Vec<String>
where
    E: Element + ?Sized,
{
    let prefix = element.header().prefix();
    let mut ids: Vec<String> = element
        .signals()
        .into_iter()
        .map(|id| net.name(id).to_string())
        .collect();

    for child in element.children() {
        ids.extend(child.ids(net).iter().map(|id| format!("{prefix}.{id}")));
    }
    ids
}

/// Build the value sequence of `element`, in the same order as [`collect_ids`].
pub fn collect_values<E>(element: &E, net: &Netlist) -> Vec<bool>
where
    E: Element + ?Sized,
{
    let mut values: Vec<bool> = element
        .signals()
        .into_iter()
        .map(|id| net.value(id))
        .collect();

    for child in element.children() {
        values.extend(child.values(net).iter().copied());
    }
    values
}

/// Owned, serialisable copy of an element's identifiers and values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugSnapshot {
    pub ids: Vec<String>,
    pub values: Vec<bool>,
}

impl DebugSnapshot {
    /// Number of reported signals.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the snapshot reports no signals.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Look up the value reported for a qualified identifier.
    pub fn get(&self, id: &str) -> Option<bool> {
        self.ids
            .iter()
            .position(|candidate| candidate == id)
            .map(|index| self.values[index])
    }

    /// Identifier to value, in snapshot order.
    pub fn to_map(&self) -> IndexMap<String, bool> {
        self.ids
            .iter()
            .cloned()
            .zip(self.values.iter().copied())
            .collect()
    }
}
