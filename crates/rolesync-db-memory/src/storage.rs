use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use rolesync_core::{DynamicObject, ObjectKey};

pub type StorageKey = String; // Format: "Kind/name" or "Kind/namespace/name"

pub(crate) fn make_storage_key(kind: &str, key: &ObjectKey) -> StorageKey {
    format!("{kind}/{key}")
}

/// In-memory object store.
///
/// - Per-key atomic writes via `DashMap` entries
/// - Monotonic resource versions shared across all kinds
/// - Store-assigned UIDs and creation timestamps
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub(crate) data: DashMap<StorageKey, DynamicObject>,
    /// Atomic counter for generating resource versions
    pub(crate) version_counter: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            version_counter: AtomicU64::new(1),
        }
    }

    /// Generates the next resource version.
    pub(crate) fn next_version(&self) -> String {
        self.version_counter
            .fetch_add(1, Ordering::SeqCst)
            .to_string()
    }

    /// Number of stored objects across all kinds.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
