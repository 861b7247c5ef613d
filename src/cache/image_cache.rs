use std::{
    collections::{HashMap, HashSet, VecDeque},
    hash::Hash,
    sync::{Arc, Mutex},
};

use crate::{
    foundation::core::ImageRgba,
    imaging::codec,
    store::repository::PhotoFileRepository,
};

/// Default capacity of the full-size tier.
pub const FULL_CAPACITY: usize = 50;
/// Default capacity of the thumbnail tier.
pub const THUMBNAIL_CAPACITY: usize = 100;

/// Capacity-bounded map with least-recently-used eviction.
struct LruTier<K: Eq + Hash + Clone> {
    entries: HashMap<K, ImageRgba>,
    lru: VecDeque<K>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone> LruTier<K> {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&mut self, key: &K) -> Option<ImageRgba> {
        let img = self.entries.get(key).cloned()?;
        self.touch(key.clone());
        Some(img)
    }

    /// Insert and return the evicted key, if capacity forced one out.
    fn insert(&mut self, key: K, img: ImageRgba) -> Option<K> {
        self.entries.insert(key.clone(), img);
        self.touch(key);
        if self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.entries.remove(&old);
                return Some(old);
            }
        }
        None
    }

    fn remove(&mut self, key: &K) {
        if self.entries.remove(key).is_some() {
            if let Some(pos) = self.lru.iter().position(|k| k == key) {
                self.lru.remove(pos);
            }
        }
    }

    fn touch(&mut self, key: K) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Thumbnail tier plus the size-variants seen per file name, so invalidation
/// can drop every variant without scanning the whole map.
struct ThumbTier {
    tier: LruTier<(String, u32)>,
    sizes_seen: HashMap<String, HashSet<u32>>,
}

/// Two independently bounded decoded-image caches over the file repository.
///
/// Entries are weakly authoritative: always reconstructable from
/// [`PhotoFileRepository`], never a source of truth. The cache serializes its
/// own mutations internally; callers hold no external lock. Decoding happens
/// outside the lock, so two racing misses may both decode; the duplicate
/// work is acceptable and the results are identical.
pub struct ImageCache {
    repo: Arc<PhotoFileRepository>,
    full: Mutex<LruTier<String>>,
    thumbs: Mutex<ThumbTier>,
}

impl ImageCache {
    /// Cache with the default tier capacities.
    pub fn new(repo: Arc<PhotoFileRepository>) -> Self {
        Self::with_capacities(repo, FULL_CAPACITY, THUMBNAIL_CAPACITY)
    }

    /// Cache with explicit tier capacities.
    pub fn with_capacities(
        repo: Arc<PhotoFileRepository>,
        full_capacity: usize,
        thumbnail_capacity: usize,
    ) -> Self {
        Self {
            repo,
            full: Mutex::new(LruTier::new(full_capacity)),
            thumbs: Mutex::new(ThumbTier {
                tier: LruTier::new(thumbnail_capacity),
                sizes_seen: HashMap::new(),
            }),
        }
    }

    /// Full-size image for `file_name`, loading and decoding on miss.
    ///
    /// Load or decode failure is reported as absence; callers cannot and
    /// should not distinguish the cause.
    pub fn get(&self, file_name: &str) -> Option<ImageRgba> {
        if let Some(img) = self.full.lock().ok()?.get(&file_name.to_string()) {
            return Some(img);
        }

        let bytes = match self.repo.load(file_name) {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!(file_name, error = %e, "full-size cache load miss");
                return None;
            }
        };
        let img = match codec::decode_image(&bytes) {
            Ok(i) => i,
            Err(e) => {
                tracing::debug!(file_name, error = %e, "full-size cache decode failure");
                return None;
            }
        };

        let mut tier = self.full.lock().ok()?;
        if let Some(evicted) = tier.insert(file_name.to_string(), img.clone()) {
            tracing::debug!(evicted, "full-size cache eviction");
        }
        Some(img)
    }

    /// Thumbnail of `file_name` fitting within `size x size`.
    ///
    /// Prefers the repository's precomputed thumbnail payload; falls back to
    /// downscaling the full-size image.
    pub fn get_thumbnail(&self, file_name: &str, size: u32) -> Option<ImageRgba> {
        if size == 0 {
            return None;
        }
        let key = (file_name.to_string(), size);
        if let Some(img) = self.thumbs.lock().ok()?.tier.get(&key) {
            return Some(img);
        }

        let source = match self.repo.load_thumbnail(file_name) {
            Some(bytes) => codec::decode_image(&bytes).ok(),
            None => None,
        };
        let thumb = match source {
            Some(pre) => codec::fit_within(&pre, size).ok()?,
            None => {
                let full = self.get(file_name)?;
                codec::fit_within(&full, size).ok()?
            }
        };

        let mut thumbs = self.thumbs.lock().ok()?;
        thumbs
            .sizes_seen
            .entry(file_name.to_string())
            .or_default()
            .insert(size);
        if let Some((name, evicted_size)) = thumbs.tier.insert(key, thumb.clone()) {
            if let Some(sizes) = thumbs.sizes_seen.get_mut(&name) {
                sizes.remove(&evicted_size);
                if sizes.is_empty() {
                    thumbs.sizes_seen.remove(&name);
                }
            }
            tracing::debug!(name, evicted_size, "thumbnail cache eviction");
        }
        Some(thumb)
    }

    /// Drop the full-size entry and every known thumbnail variant.
    pub fn invalidate(&self, file_name: &str) {
        if let Ok(mut tier) = self.full.lock() {
            tier.remove(&file_name.to_string());
        }
        if let Ok(mut thumbs) = self.thumbs.lock() {
            if let Some(sizes) = thumbs.sizes_seen.remove(file_name) {
                for size in sizes {
                    thumbs.tier.remove(&(file_name.to_string(), size));
                }
            }
        }
    }

    /// Drop all entries in both tiers.
    pub fn clear(&self) {
        if let Ok(mut tier) = self.full.lock() {
            tier.clear();
        }
        if let Ok(mut thumbs) = self.thumbs.lock() {
            thumbs.tier.clear();
            thumbs.sizes_seen.clear();
        }
    }

    /// Whether a full-size entry is resident, without touching LRU order.
    pub fn contains(&self, file_name: &str) -> bool {
        self.full
            .lock()
            .map(|t| t.entries.contains_key(file_name))
            .unwrap_or(false)
    }

    /// Number of resident full-size entries.
    pub fn full_len(&self) -> usize {
        self.full.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// Number of resident thumbnail entries.
    pub fn thumbnail_len(&self) -> usize {
        self.thumbs.lock().map(|t| t.tier.len()).unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/image_cache.rs"]
mod tests;
