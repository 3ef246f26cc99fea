//! In-memory listing store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::Result;

use tutoria_core::traits::{ListingKind, ListingStore};

/// Keeps listings in a map and counts calls, so tests can assert on how a
/// marketplace used its store.
#[derive(Default)]
pub struct MemoryStore {
    listings: Mutex<HashMap<ListingKind, String>>,
    save_count: AtomicU32,
    clear_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls made.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }

    /// Number of `clear` calls made.
    pub fn clear_count(&self) -> u32 {
        self.clear_count.load(Ordering::Relaxed)
    }

    fn listings(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ListingKind, String>>> {
        self.listings
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

impl ListingStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn save(&self, kind: ListingKind, listing: &str) -> Result<()> {
        self.save_count.fetch_add(1, Ordering::Relaxed);
        self.listings()?.insert(kind, listing.to_string());
        Ok(())
    }

    fn load(&self, kind: ListingKind) -> Result<String> {
        Ok(self.listings()?.get(&kind).cloned().unwrap_or_default())
    }

    fn clear(&self, kind: ListingKind) -> Result<()> {
        self.clear_count.fetch_add(1, Ordering::Relaxed);
        self.listings()?.remove(&kind);
        Ok(())
    }
}
