//! Per-sample thumbnail handle.

use std::sync::Arc;

use super::canvas::Canvas;
use super::pyramid::{self, Thumbnail};
use super::raster::RasterSet;
use super::registry::{ThumbnailCache, ThumbnailRegistry};
use super::render::{render, VisualizeParameters};
use crate::error::ThumbnailError;
use crate::types::Sample;

/// Handle onto the shared cache entry of one sample.
///
/// Building a thumbnail for an identity the registry already knows reuses
/// the existing pyramid; otherwise the pyramid and rasters are built here.
/// The entry lives as long as the last handle, plus until the next
/// [`ThumbnailRegistry::cleanup`].
#[derive(Debug, Clone, Default)]
pub struct SampleThumbnail {
    cache: Option<Arc<ThumbnailCache>>,
}

impl SampleThumbnail {
    pub fn new(sample: &Sample, registry: &mut ThumbnailRegistry) -> Self {
        let (cache, found) = registry.lookup_or_reserve(sample.identity());
        if found {
            return Self { cache: Some(cache) };
        }

        registry.cleanup();

        let levels = pyramid::build(sample.frames());
        let rasters = RasterSet::prerender(&levels, registry.config());
        if !cache.populate(levels, rasters) {
            log::warn!(
                "Thumbnail for {} was already populated, keeping it",
                sample.identity()
            );
        }
        log::debug!(
            "Built thumbnail for {} ({} frames)",
            sample.identity(),
            sample.len()
        );
        Self { cache: Some(cache) }
    }

    /// Attach to the registry entry for `sample`, reserving an empty one if
    /// needed. Returns whether the entry already existed.
    ///
    /// Kept for tests; [`SampleThumbnail::new`] is the normal entry point.
    pub fn select_from_registry(&mut self, sample: &Sample, registry: &mut ThumbnailRegistry) -> bool {
        let (cache, found) = registry.lookup_or_reserve(sample.identity());
        self.cache = Some(cache);
        found
    }

    pub fn cache(&self) -> Option<&Arc<ThumbnailCache>> {
        self.cache.as_ref()
    }

    /// Pyramid levels, finest first; empty when uninitialized.
    pub fn levels(&self) -> &[Thumbnail] {
        self.cache
            .as_deref()
            .map(ThumbnailCache::levels)
            .unwrap_or(&[])
    }

    pub fn shares_cache_with(&self, other: &SampleThumbnail) -> bool {
        match (&self.cache, &other.cache) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn populated(&self) -> Result<&ThumbnailCache, ThumbnailError> {
        self.cache
            .as_deref()
            .filter(|cache| cache.is_populated())
            .ok_or(ThumbnailError::UninitializedCache)
    }

    /// Draw using a prerendered raster when one fits, otherwise render
    /// from the pyramid.
    pub fn visualize(
        &self,
        params: &VisualizeParameters,
        canvas: &mut dyn Canvas,
    ) -> Result<(), ThumbnailError> {
        let cache = self.populated()?;
        let width = params.sample_rect().width;

        match cache.rasters().and_then(|rasters| rasters.select(width).map(|r| (rasters, r))) {
            Some((rasters, raster)) => {
                rasters.draw(params, raster, canvas);
                Ok(())
            }
            None => {
                log::trace!("No raster for {}px, rendering directly", width);
                render(params, cache.levels(), canvas)
            }
        }
    }

    /// Always render from the pyramid.
    pub fn visualize_direct(
        &self,
        params: &VisualizeParameters,
        canvas: &mut dyn Canvas,
    ) -> Result<(), ThumbnailError> {
        let cache = self.populated()?;
        render(params, cache.levels(), canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThumbnailConfig;
    use crate::thumbnail::canvas::{DrawCommand, DrawList, RasterCanvas};
    use crate::types::{Color, Rect, SampleFrame};

    fn constant_sample(identity: &str, len: usize, value: f32) -> Sample {
        Sample::new(identity, vec![SampleFrame::mono(value); len])
    }

    fn registry() -> ThumbnailRegistry {
        ThumbnailRegistry::new(ThumbnailConfig::default())
    }

    #[test]
    fn test_constant_sample_pyramid() {
        let mut registry = registry();
        let thumbnail = SampleThumbnail::new(&constant_sample("a.wav", 4096, 0.5), &mut registry);
        let levels = thumbnail.levels();
        assert_eq!(levels[0].len(), 1024);
        assert!(levels[0].iter().all(|bit| bit.min == 0.5 && bit.max == 0.5));
        // RMS is the root mean square of the frame averages, so a constant
        // 0.5 signal keeps 0.5 rather than dropping to zero.
        assert!(levels[0].iter().all(|bit| (bit.rms - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_new_registers_populated_entry() {
        let mut registry = registry();
        let thumbnail = SampleThumbnail::new(&constant_sample("a.wav", 256, 0.1), &mut registry);
        let cache = thumbnail.cache().unwrap();
        assert!(cache.is_populated());
        assert!(Arc::ptr_eq(cache, registry.get("a.wav").unwrap()));
        assert_eq!(registry.holders("a.wav"), 1);
    }

    #[test]
    fn test_fast_and_direct_paths_cover_same_columns() {
        let mut registry = registry();
        let thumbnail = SampleThumbnail::new(&constant_sample("a.wav", 44100, 0.5), &mut registry);
        let params = VisualizeParameters::new(Rect::new(0, 0, 100, 64))
            .with_samp_rect(Rect::new(0, 0, 200, 64))
            .with_view_rect(Rect::new(50, 0, 100, 64));

        let mut fast = DrawList::new();
        thumbnail.visualize(&params, &mut fast).unwrap();
        let blits = fast.blits();
        assert_eq!(blits.len(), 1);
        assert_eq!(blits[0].0, Rect::new(50, 0, 50, 64));

        let mut direct = DrawList::new();
        thumbnail.visualize_direct(&params, &mut direct).unwrap();
        let columns: Vec<i64> = direct.columns().iter().map(|(x, _)| *x as i64).collect();
        assert_eq!(columns, (50..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_identity_shares_entry() {
        let mut registry = registry();
        let sample = constant_sample("a.wav", 4096, 0.5);
        let first = SampleThumbnail::new(&sample, &mut registry);

        // Different frames under the same identity are not rebuilt.
        let impostor = constant_sample("a.wav", 4096, -0.25);
        let second = SampleThumbnail::new(&impostor, &mut registry);

        assert!(first.shares_cache_with(&second));
        assert_eq!(second.levels()[0][0].max, 0.5);
        assert_eq!(registry.holders("a.wav"), 2);
    }

    #[test]
    fn test_released_identity_is_rebuilt() {
        let mut registry = registry();
        let thumbnail = SampleThumbnail::new(&constant_sample("a.wav", 4096, 0.5), &mut registry);
        drop(thumbnail);

        registry.cleanup();
        assert!(!registry.contains("a.wav"));

        let rebuilt = SampleThumbnail::new(&constant_sample("a.wav", 4096, -0.25), &mut registry);
        assert_eq!(rebuilt.levels()[0][0].max, -0.25);
    }

    #[test]
    fn test_construction_evicts_released_entries() {
        let mut registry = registry();
        let kept = SampleThumbnail::new(&constant_sample("kept.wav", 256, 0.1), &mut registry);
        let released = SampleThumbnail::new(&constant_sample("gone.wav", 256, 0.1), &mut registry);
        drop(released);

        let _fresh = SampleThumbnail::new(&constant_sample("new.wav", 256, 0.1), &mut registry);
        assert!(registry.contains("kept.wav"));
        assert!(registry.contains("new.wav"));
        assert!(!registry.contains("gone.wav"));
        drop(kept);
    }

    #[test]
    fn test_default_thumbnail_is_uninitialized() {
        let thumbnail = SampleThumbnail::default();
        let params = VisualizeParameters::new(Rect::new(0, 0, 100, 20));
        let mut list = DrawList::new();
        assert_eq!(
            thumbnail.visualize(&params, &mut list),
            Err(ThumbnailError::UninitializedCache)
        );
        assert_eq!(
            thumbnail.visualize_direct(&params, &mut list),
            Err(ThumbnailError::UninitializedCache)
        );
    }

    #[test]
    fn test_reserved_but_unbuilt_entry_is_uninitialized() {
        let mut registry = registry();
        let mut thumbnail = SampleThumbnail::default();
        assert!(!thumbnail.select_from_registry(&constant_sample("a.wav", 16, 0.0), &mut registry));

        let mut list = DrawList::new();
        let params = VisualizeParameters::new(Rect::new(0, 0, 100, 20));
        assert_eq!(
            thumbnail.visualize(&params, &mut list),
            Err(ThumbnailError::UninitializedCache)
        );
    }

    #[test]
    fn test_wide_request_bypasses_rasters() {
        let mut registry = registry();
        let thumbnail = SampleThumbnail::new(&constant_sample("a.wav", 44100, 0.5), &mut registry);

        let params = VisualizeParameters::new(Rect::new(0, 0, 2000, 64));
        let mut list = DrawList::new();
        thumbnail.visualize(&params, &mut list).unwrap();
        assert!(list.blits().is_empty());
        assert!(!list.columns().is_empty());
    }

    #[test]
    fn test_small_request_uses_raster() {
        let mut registry = registry();
        let thumbnail = SampleThumbnail::new(&constant_sample("a.wav", 44100, 0.5), &mut registry);

        let params = VisualizeParameters::new(Rect::new(0, 0, 300, 64));
        let mut list = DrawList::new();
        thumbnail.visualize(&params, &mut list).unwrap();
        assert_eq!(list.commands.len(), 1);
        assert!(matches!(list.commands[0], DrawCommand::Blit { .. }));

        let mut direct = DrawList::new();
        thumbnail.visualize_direct(&params, &mut direct).unwrap();
        assert!(direct.blits().is_empty());
        assert_eq!(direct.columns().len(), 300);
    }

    #[test]
    fn test_narrower_than_every_raster_renders_directly() {
        let mut registry = registry();
        let thumbnail = SampleThumbnail::new(&constant_sample("a.wav", 44100, 0.5), &mut registry);

        let params = VisualizeParameters::new(Rect::new(0, 0, 16, 64));
        let mut list = DrawList::new();
        thumbnail.visualize(&params, &mut list).unwrap();
        assert!(list.blits().is_empty());
        assert_eq!(list.columns().len(), 16);
    }

    #[test]
    fn test_fast_path_paints_waveform() {
        let mut registry = registry();
        let sample = Sample::new("wide.wav", vec![SampleFrame::new(0.5, -0.5); 44100]);
        let thumbnail = SampleThumbnail::new(&sample, &mut registry);

        let mut canvas = RasterCanvas::new(300, 64);
        let params = VisualizeParameters::new(Rect::new(0, 0, 300, 64));
        thumbnail.visualize(&params, &mut canvas).unwrap();

        // Every column spans -0.5..0.5: rows 16..48 after scaling.
        let raster = canvas.raster();
        for x in [0, 150, 299] {
            assert_ne!(raster.pixel(x, 32), Some(Color::TRANSPARENT));
            assert_eq!(raster.pixel(x, 2), Some(Color::TRANSPARENT));
            assert_eq!(raster.pixel(x, 62), Some(Color::TRANSPARENT));
        }
    }
}
