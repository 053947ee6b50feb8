// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Composite memoization.
//!
//! A composite type resolves once per resolution context; every field
//! that references it shares the same entry. While a composite is being
//! resolved it is marked in progress, so a composite that reaches itself
//! through its own fields is reported as a cycle instead of recursing.
//! A failed composite stays failed, and later references fail fast
//! without re-running resolution.

use std::{collections::HashMap, sync::Arc};

use super::signature::FieldMetadataSignature;
use crate::wire::WireType;

/// Cached result of one resolved composite.
#[derive(Debug, Clone)]
pub struct CompositeEntry {
    /// UDT name on the wire.
    pub udt: String,

    /// Resolved member signatures, shared by all referencing fields.
    pub fields: Arc<Vec<FieldMetadataSignature>>,

    /// Wire type of the whole composite.
    pub wire: WireType
}

/// Resolution state of one composite type.
#[derive(Debug, Clone)]
pub enum CacheState {
    /// Not resolved in this context yet.
    Absent,

    /// Resolution has started and not finished. Observing this state
    /// from a member resolution means the type references itself.
    InProgress,

    /// Resolved. Clones share the member list through its [`Arc`].
    Resolved(CompositeEntry),

    /// Resolution failed. Dependents fail without retrying.
    Failed
}

#[derive(Debug)]
enum Entry {
    InProgress,
    Resolved(CompositeEntry),
    Failed
}

/// Per-context cache of composite resolutions, keyed by record name.
#[derive(Debug, Default)]
pub struct CompositeCache {
    entries: HashMap<String, Entry>
}

impl CompositeCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of the composite named `key`.
    #[must_use]
    pub fn state(&self, key: &str) -> CacheState {
        match self.entries.get(key) {
            None => CacheState::Absent,
            Some(Entry::InProgress) => CacheState::InProgress,
            Some(Entry::Resolved(entry)) => CacheState::Resolved(entry.clone()),
            Some(Entry::Failed) => CacheState::Failed
        }
    }

    /// Mark `key` as being resolved.
    pub fn begin(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), Entry::InProgress);
    }

    /// Store the resolved entry for `key` and hand it back.
    pub fn resolve(&mut self, key: impl Into<String>, entry: CompositeEntry) -> CompositeEntry {
        self.entries.insert(key.into(), Entry::Resolved(entry.clone()));
        entry
    }

    /// Mark `key` as failed.
    pub fn fail(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), Entry::Failed);
    }
}
