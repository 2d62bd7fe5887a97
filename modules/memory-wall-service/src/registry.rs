//! Pending images: uploaded but not yet claimed by a memory.
//!
//! Entries live in a moka cache with a time-to-live. Each entry carries a
//! one-shot ownership flag: a claim and the expiry listener both race to
//! set it, and only the winner gets the image. An entry moka already sees
//! as expired is handed to the expiry hook and can no longer be claimed.

use memory_wall_types::ImageRef;
use moka::notification::RemovalCause;
use moka::sync::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Called with entries that expired without being claimed.
pub type ExpiryHook = Arc<dyn Fn(ImageRef) + Send + Sync>;

struct PendingEntry {
    image: ImageRef,
    taken: AtomicBool,
}

impl PendingEntry {
    /// True for exactly one caller.
    fn take(&self) -> bool {
        !self.taken.swap(true, Ordering::AcqRel)
    }
}

pub struct PendingImages {
    entries: Cache<String, Arc<PendingEntry>>,
}

impl PendingImages {
    pub fn new(ttl: Duration, on_expire: Option<ExpiryHook>) -> Self {
        let mut builder = Cache::<String, Arc<PendingEntry>>::builder().time_to_live(ttl);
        if let Some(hook) = on_expire {
            builder = builder.eviction_listener(
                move |id: Arc<String>, entry: Arc<PendingEntry>, cause: RemovalCause| {
                    if cause == RemovalCause::Expired && entry.take() {
                        log::warn!("Pending image {} expired unclaimed", id);
                        hook(entry.image.clone());
                    }
                },
            );
        }
        Self {
            entries: builder.build(),
        }
    }

    /// Insert or overwrite.
    pub fn register(&self, image: ImageRef) {
        let entry = PendingEntry {
            image,
            taken: AtomicBool::new(false),
        };
        self.entries.insert(entry.image.id.clone(), Arc::new(entry));
    }

    /// Read without removing.
    pub fn lookup(&self, id: &str) -> Option<ImageRef> {
        self.entries
            .get(id)
            .filter(|entry| !entry.taken.load(Ordering::Acquire))
            .map(|entry| entry.image.clone())
    }

    /// Remove and return every known id, in request order. Unknown,
    /// expired or already-claimed ids are skipped.
    pub fn claim(&self, ids: &[String]) -> Vec<ImageRef> {
        // Evict anything past its TTL first so expiry wins over a late claim.
        self.entries.run_pending_tasks();
        ids.iter()
            .filter_map(|id| self.entries.remove(id))
            .filter(|entry| entry.take())
            .map(|entry| entry.image.clone())
            .collect()
    }

    /// Put claimed entries back after the memory failed to persist.
    pub fn restore(&self, images: Vec<ImageRef>) {
        for image in images {
            self.register(image);
        }
    }

    pub fn pending_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}
