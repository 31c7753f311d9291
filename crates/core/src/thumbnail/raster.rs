//! Raster fast path: full-range waveforms prerendered at a few fixed widths,
//! stretched onto the canvas for small render requests.

use super::canvas::{Canvas, Raster, RasterCanvas};
use super::pyramid::Thumbnail;
use super::render::{render, VisualizeParameters};
use crate::config::ThumbnailConfig;
use crate::types::Rect;

/// Prerendered rasters of one sample, widest first.
#[derive(Debug, Clone, Default)]
pub struct RasterSet {
    height: u32,
    width_limit: u32,
    rasters: Vec<Raster>,
}

impl RasterSet {
    /// Render every configured width from `levels`.
    ///
    /// Each raster holds the whole sample at full resolution, unamplified
    /// and not reversed.
    pub fn prerender(levels: &[Thumbnail], config: &ThumbnailConfig) -> Self {
        let config = config.clone().normalized();
        let height = config.raster_height;
        let mut rasters = Vec::with_capacity(config.raster_widths.len());

        for &width in &config.raster_widths {
            let mut canvas = RasterCanvas::new(width, height);
            let params = VisualizeParameters::new(Rect::new(0, 0, width as i64, height as i64))
                .with_high_resolution(true)
                .with_color(config.raster_color);

            if let Err(err) = render(&params, levels, &mut canvas) {
                log::warn!("Skipping {}px raster: {}", width, err);
                continue;
            }
            rasters.push(canvas.into_raster());
        }

        log::debug!(
            "Prerendered {} rasters at height {}",
            rasters.len(),
            height
        );
        Self {
            height,
            width_limit: config.raster_width_limit,
            rasters,
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width_limit(&self) -> u32 {
        self.width_limit
    }

    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }

    pub fn widths(&self) -> Vec<u32> {
        self.rasters.iter().map(Raster::width).collect()
    }

    pub fn rasters(&self) -> &[Raster] {
        &self.rasters
    }

    /// The widest raster no wider than `width`.
    ///
    /// `None` when `width` is above the limit or every raster is wider,
    /// in which case the caller renders directly.
    pub fn select(&self, width: i64) -> Option<&Raster> {
        if width > self.width_limit as i64 {
            return None;
        }
        self.rasters
            .iter()
            .find(|raster| raster.width() as i64 <= width)
    }

    /// Stretch `raster` over the sample rect and blit the visible part.
    ///
    /// Only the raster columns behind the visible span are scaled; the
    /// horizontal scale is negated when the sample is reversed.
    pub fn draw(&self, params: &VisualizeParameters, raster: &Raster, canvas: &mut dyn Canvas) {
        let samp = params.sample_rect();
        let visible = samp
            .intersected(&params.clip_rect)
            .intersected(&params.visible_rect());
        if visible.is_empty() || raster.width() == 0 || raster.height() == 0 {
            return;
        }

        let raster_width = raster.width() as f32;
        let width_ratio = samp.width as f32 / raster_width;
        let height_ratio = samp.height as f32 / raster.height() as f32;

        let left = (visible.x - samp.x) as f32 / width_ratio;
        let right = (visible.right() - samp.x) as f32 / width_ratio;
        let (from, to) = if params.reversed {
            (raster_width - right, raster_width - left)
        } else {
            (left, right)
        };
        let crop_from = from.floor().max(0.0);
        let crop_to = to.ceil().min(raster_width);
        if crop_to <= crop_from {
            return;
        }

        let crop = Rect::new(
            crop_from as i64,
            0,
            (crop_to - crop_from) as i64,
            raster.height() as i64,
        );
        // Raster column that ends up leftmost after scaling.
        let origin = if params.reversed { raster_width - crop_to } else { crop_from };
        let skip = ((visible.x - samp.x) as f32 - origin * width_ratio)
            .round()
            .max(0.0) as i64;

        let sign = if params.reversed { -1.0 } else { 1.0 };
        let scaled = raster.crop(crop).scaled(sign * width_ratio, height_ratio);
        let trimmed = scaled.crop(Rect::new(skip, 0, visible.width, scaled.height() as i64));

        canvas.blit(
            Rect::new(visible.x, samp.y, visible.width, samp.height),
            &trimmed,
        );
    }
}
