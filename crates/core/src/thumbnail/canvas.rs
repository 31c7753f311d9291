//! Drawing capabilities the renderer depends on.
//!
//! The renderer only talks to [`Canvas`]; two variants are provided:
//! [`RasterCanvas`] paints into an RGBA image, [`DrawList`] records each
//! call so an external painter can replay it.

use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{Pixel, RgbaImage};

use super::bit::Bit;
use crate::types::{Color, Rect};

/// An owned RGBA raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Fully transparent raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        Some(Color::rgba(r, g, b, a))
    }

    /// Copy of the part of `rect` that lies inside the raster.
    pub fn crop(&self, rect: Rect) -> Raster {
        let bounds = Rect::new(0, 0, self.width() as i64, self.height() as i64);
        let area = rect.intersected(&bounds);
        if area.is_empty() {
            return Raster::new(0, 0);
        }
        let image = imageops::crop_imm(
            &self.image,
            area.x as u32,
            area.y as u32,
            area.width as u32,
            area.height as u32,
        )
        .to_image();
        Raster { image }
    }

    /// Scale by `(sx, sy)`; a negative `sx` also mirrors horizontally.
    pub fn scaled(&self, sx: f32, sy: f32) -> Raster {
        if self.width() == 0 || self.height() == 0 {
            return self.clone();
        }
        let width = ((self.width() as f32 * sx.abs()).round() as u32).max(1);
        let height = ((self.height() as f32 * sy.abs()).round() as u32).max(1);
        let mut image = imageops::resize(&self.image, width, height, FilterType::Nearest);
        if sx < 0.0 {
            imageops::flip_horizontal_in_place(&mut image);
        }
        Raster { image }
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write PNG: {}", path.display()))
    }
}

/// Clamp without panicking when the bounds are inverted.
fn clamp_between(value: f32, low: f32, high: f32) -> f32 {
    value.max(low).min(high)
}

/// Drawing surface used by the window renderer and the raster fast path.
pub trait Canvas {
    /// Stroke a one pixel wide vertical line from `y1` to `y2`.
    fn stroke_vertical(&mut self, x: f32, y1: f32, y2: f32, color: Color);

    /// Draw `raster` with its top-left corner at the target origin, clipped
    /// to the target size.
    fn blit(&mut self, target: Rect, raster: &Raster);

    /// Draw one waveform column: the min..max span in `color`, then the
    /// RMS span (clamped to min..max) in `rms_color` on top.
    fn draw_segment_pair(
        &mut self,
        column: f32,
        center_y: f32,
        scale: f32,
        bit: &Bit,
        color: Color,
        rms_color: Color,
    ) {
        let line_y1 = center_y - bit.max * scale;
        let line_y2 = center_y - bit.min * scale;

        let max_rms = clamp_between(bit.rms, bit.min, bit.max);
        let min_rms = clamp_between(-bit.rms, bit.min, bit.max);

        self.stroke_vertical(column, line_y1, line_y2, color);
        self.stroke_vertical(
            column,
            center_y - max_rms * scale,
            center_y - min_rms * scale,
            rms_color,
        );
    }
}

/// Canvas backed by a [`Raster`].
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    raster: Raster,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: Raster::new(width, height),
        }
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let image = RgbaImage::from_pixel(width, height, color.into());
        Self {
            raster: Raster { image },
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn into_raster(self) -> Raster {
        self.raster
    }
}

impl Canvas for RasterCanvas {
    fn stroke_vertical(&mut self, x: f32, y1: f32, y2: f32, color: Color) {
        let column = x.floor() as i64;
        let height = self.raster.height() as i64;
        if column < 0 || column >= self.raster.width() as i64 || height == 0 {
            return;
        }
        let top = (y1.min(y2).round() as i64).max(0);
        let bottom = (y1.max(y2).round() as i64).min(height - 1);

        let paint: image::Rgba<u8> = color.into();
        for row in top..=bottom {
            self.raster
                .image
                .get_pixel_mut(column as u32, row as u32)
                .blend(&paint);
        }
    }

    fn blit(&mut self, target: Rect, raster: &Raster) {
        let bounds = Rect::new(
            0,
            0,
            self.raster.width() as i64,
            self.raster.height() as i64,
        );
        let placed = Rect::new(
            target.x,
            target.y,
            target.width.min(raster.width() as i64),
            target.height.min(raster.height() as i64),
        );
        let area = placed.intersected(&bounds);
        if area.is_empty() {
            return;
        }

        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let source = *raster
                    .image
                    .get_pixel((x - target.x) as u32, (y - target.y) as u32);
                self.raster
                    .image
                    .get_pixel_mut(x as u32, y as u32)
                    .blend(&source);
            }
        }
    }
}

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Segment {
        x: f32,
        y1: f32,
        y2: f32,
        color: Color,
    },
    SegmentPair {
        column: f32,
        center_y: f32,
        scale: f32,
        bit: Bit,
        color: Color,
        rms_color: Color,
    },
    Blit {
        target: Rect,
        raster: Raster,
    },
}

/// Immediate-draw canvas: keeps every call in order instead of painting.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Columns and units of every recorded waveform column, in call order.
    pub fn columns(&self) -> Vec<(f32, Bit)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::SegmentPair { column, bit, .. } => Some((*column, *bit)),
                _ => None,
            })
            .collect()
    }

    pub fn blits(&self) -> Vec<(Rect, &Raster)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Blit { target, raster } => Some((*target, raster)),
                _ => None,
            })
            .collect()
    }

    /// Replay the recorded calls onto another canvas.
    pub fn replay(&self, canvas: &mut dyn Canvas) {
        for command in &self.commands {
            match command {
                DrawCommand::Segment { x, y1, y2, color } => {
                    canvas.stroke_vertical(*x, *y1, *y2, *color)
                }
                DrawCommand::SegmentPair {
                    column,
                    center_y,
                    scale,
                    bit,
                    color,
                    rms_color,
                } => canvas.draw_segment_pair(*column, *center_y, *scale, bit, *color, *rms_color),
                DrawCommand::Blit { target, raster } => canvas.blit(*target, raster),
            }
        }
    }
}

impl Canvas for DrawList {
    fn stroke_vertical(&mut self, x: f32, y1: f32, y2: f32, color: Color) {
        self.commands.push(DrawCommand::Segment { x, y1, y2, color });
    }

    fn blit(&mut self, target: Rect, raster: &Raster) {
        self.commands.push(DrawCommand::Blit {
            target,
            raster: raster.clone(),
        });
    }

    fn draw_segment_pair(
        &mut self,
        column: f32,
        center_y: f32,
        scale: f32,
        bit: &Bit,
        color: Color,
        rms_color: Color,
    ) {
        self.commands.push(DrawCommand::SegmentPair {
            column,
            center_y,
            scale,
            bit: *bit,
            color,
            rms_color,
        });
    }
}
