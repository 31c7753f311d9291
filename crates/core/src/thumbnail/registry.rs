//! Identity-keyed cache of thumbnail pyramids.
//!
//! Entries are shared through `Arc`; the registry holds one reference and
//! every [`SampleThumbnail`](super::SampleThumbnail) built from the entry
//! holds another. Nothing is evicted automatically: [`ThumbnailRegistry::cleanup`]
//! drops entries the registry alone still references.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::pyramid::Thumbnail;
use super::raster::RasterSet;
use crate::config::ThumbnailConfig;

/// Levels and prerendered rasters of one sample.
#[derive(Debug)]
pub struct CacheContents {
    /// Finest level first.
    pub levels: Vec<Thumbnail>,
    pub rasters: RasterSet,
}

/// A cache entry. Reserved empty, populated once, read-only afterwards.
#[derive(Debug, Default)]
pub struct ThumbnailCache {
    contents: OnceLock<CacheContents>,
}

impl ThumbnailCache {
    /// Fill a reserved entry. Returns `false` if it was already populated,
    /// in which case the existing contents are kept.
    pub fn populate(&self, levels: Vec<Thumbnail>, rasters: RasterSet) -> bool {
        self.contents.set(CacheContents { levels, rasters }).is_ok()
    }

    pub fn is_populated(&self) -> bool {
        self.contents.get().is_some()
    }

    pub fn contents(&self) -> Option<&CacheContents> {
        self.contents.get()
    }

    /// Pyramid levels; empty until populated.
    pub fn levels(&self) -> &[Thumbnail] {
        self.contents
            .get()
            .map(|contents| contents.levels.as_slice())
            .unwrap_or(&[])
    }

    pub fn rasters(&self) -> Option<&RasterSet> {
        self.contents.get().map(|contents| &contents.rasters)
    }
}

/// Maps sample identity to its shared cache entry.
///
/// Not internally synchronized; wrap it in a lock to share across threads.
#[derive(Debug, Default)]
pub struct ThumbnailRegistry {
    config: ThumbnailConfig,
    entries: HashMap<String, Arc<ThumbnailCache>>,
}

impl ThumbnailRegistry {
    pub fn new(config: ThumbnailConfig) -> Self {
        Self {
            config: config.normalized(),
            entries: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ThumbnailConfig {
        &self.config
    }

    /// Existing entry for `identity` with `true`, or a freshly reserved empty
    /// entry with `false`.
    pub fn lookup_or_reserve(&mut self, identity: &str) -> (Arc<ThumbnailCache>, bool) {
        if let Some(entry) = self.entries.get(identity) {
            log::debug!("Thumbnail cache hit: {}", identity);
            return (Arc::clone(entry), true);
        }

        let entry = Arc::new(ThumbnailCache::default());
        self.entries.insert(identity.to_string(), Arc::clone(&entry));
        (entry, false)
    }

    /// Remove every entry no thumbnail holds anymore. Returns how many were
    /// removed.
    pub fn cleanup(&mut self) -> usize {
        let unused: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| Arc::strong_count(entry) == 1)
            .map(|(identity, _)| identity.clone())
            .collect();

        for identity in &unused {
            self.entries.remove(identity);
            log::debug!("Evicted thumbnail cache: {}", identity);
        }
        unused.len()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn get(&self, identity: &str) -> Option<&Arc<ThumbnailCache>> {
        self.entries.get(identity)
    }

    /// Number of outside holders of `identity`'s entry.
    pub fn holders(&self, identity: &str) -> usize {
        self.entries
            .get(identity)
            .map(|entry| Arc::strong_count(entry) - 1)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
