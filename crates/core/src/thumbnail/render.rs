//! Window renderer: maps a fractional sample window onto a pixel range,
//! picks a pyramid level and draws one aggregated unit per column.

use super::bit::Bit;
use super::canvas::Canvas;
use super::pyramid::Thumbnail;
use crate::error::ThumbnailError;
use crate::types::{Color, Rect};

/// Waveform color used when the caller does not pick one.
pub const DEFAULT_COLOR: Color = Color::rgb(192, 192, 192);

/// How much lighter the RMS span is than the peak span.
pub const RMS_LIGHTNESS: u32 = 123;

/// A single render request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualizeParameters {
    pub amplification: f32,
    pub reversed: bool,

    /// Fraction of the sample where drawing begins.
    pub sample_start: f32,
    /// Fraction of the sample where drawing ends.
    pub sample_end: f32,

    /// Area that may be painted.
    pub clip_rect: Rect,
    /// Area the whole sample window is stretched over. Defaults to the clip
    /// rect when unset or null.
    pub samp_rect: Option<Rect>,
    /// Currently visible area. Defaults to the clip rect when unset or null.
    pub view_rect: Option<Rect>,

    /// Allow the finest pyramid level to be used.
    pub allow_high_resolution: bool,
    pub color: Color,
}

impl Default for VisualizeParameters {
    fn default() -> Self {
        Self {
            amplification: 1.0,
            reversed: false,
            sample_start: 0.0,
            sample_end: 1.0,
            clip_rect: Rect::default(),
            samp_rect: None,
            view_rect: None,
            allow_high_resolution: false,
            color: DEFAULT_COLOR,
        }
    }
}

impl VisualizeParameters {
    pub fn new(clip_rect: Rect) -> Self {
        Self {
            clip_rect,
            ..Self::default()
        }
    }

    pub fn with_window(mut self, sample_start: f32, sample_end: f32) -> Self {
        self.sample_start = sample_start;
        self.sample_end = sample_end;
        self
    }

    pub fn with_amplification(mut self, amplification: f32) -> Self {
        self.amplification = amplification;
        self
    }

    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn with_samp_rect(mut self, rect: Rect) -> Self {
        self.samp_rect = Some(rect);
        self
    }

    pub fn with_view_rect(mut self, rect: Rect) -> Self {
        self.view_rect = Some(rect);
        self
    }

    pub fn with_high_resolution(mut self, allow: bool) -> Self {
        self.allow_high_resolution = allow;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Effective sample rect.
    pub fn sample_rect(&self) -> Rect {
        or_clip(self.samp_rect, self.clip_rect)
    }

    /// Effective view rect.
    pub fn visible_rect(&self) -> Rect {
        or_clip(self.view_rect, self.clip_rect)
    }

    /// The sample window clamped to `0..=1`, or `None` when it is empty.
    pub fn window(&self) -> Option<(f32, f32)> {
        let start = self.sample_start.clamp(0.0, 1.0);
        let end = self.sample_end.clamp(0.0, 1.0);
        if end <= start {
            return None;
        }
        Some((start, end))
    }
}

fn or_clip(rect: Option<Rect>, clip: Rect) -> Rect {
    match rect {
        Some(rect) if !rect.is_null() => rect,
        _ => clip,
    }
}

/// Index of the level to render from.
///
/// Walks from the coarsest level toward finer ones and stops at the first
/// level holding at least `width_select` units. Level 0 is only reachable
/// when high resolution is allowed or it is the only level.
pub fn select_level(levels: &[Thumbnail], width_select: usize, allow_high_resolution: bool) -> usize {
    if levels.is_empty() {
        return 0;
    }
    let stop = if allow_high_resolution || levels.len() == 1 { 0 } else { 1 };
    let mut index = levels.len() - 1;
    while index > stop && levels[index].len() < width_select {
        index -= 1;
    }
    index
}

/// Draw `params`' sample window from `levels` onto `canvas`.
///
/// A zero-width target or an empty window draws nothing.
pub fn render(
    params: &VisualizeParameters,
    levels: &[Thumbnail],
    canvas: &mut dyn Canvas,
) -> Result<(), ThumbnailError> {
    if levels.is_empty() {
        return Err(ThumbnailError::UninitializedCache);
    }

    let clip = params.clip_rect;
    let samp = params.sample_rect();
    let view = params.visible_rect();

    let width = samp.width;
    if width < 1 {
        return Ok(());
    }
    let Some((start, end)) = params.window() else {
        return Ok(());
    };

    let half_height = clip.height / 2;
    let center_y = (clip.y + half_height) as f32;
    let scale = half_height as f32 * params.amplification;
    let rms_color = params.color.lighter(RMS_LIGHTNESS);

    let width_select = (width as f32 / (end - start)) as usize;
    let thumbnail = &levels[select_level(levels, width_select, params.allow_high_resolution)];

    let size = thumbnail.len() as i64;
    if size == 0 {
        return Ok(());
    }
    let last = ((end * size as f32) as i64).max(1) - 1;
    let t_start = (start * size as f32) as i64;
    let view_size = last + 1 - t_start;
    let t_last = last.min(size - 1);
    if view_size < 1 {
        return Ok(());
    }
    let chunk = (view_size + width - 1) / width;

    let visible = samp.intersected(&clip).intersected(&view);

    for pixel in visible.x..visible.right() {
        let mut t = t_start + (pixel - samp.x) * view_size / width;
        if t > t_last {
            break;
        }

        let bound = (t + chunk).min(t_last + 1);
        let mut bit = Bit::default();
        while t < bound {
            let index = if params.reversed { t_last - t } else { t };
            bit.merge(&thumbnail[index as usize]);
            t += 1;
        }

        canvas.draw_segment_pair(pixel as f32, center_y, scale, &bit, params.color, rms_color);
    }

    Ok(())
}
