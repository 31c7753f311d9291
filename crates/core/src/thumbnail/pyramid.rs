//! Downsampling pyramid: raw frames reduced into successively coarser
//! thumbnails.
//!
//! Only the finest level reads the frame buffer. Every coarser level is
//! merged from the level directly above it, so deep levels compound the
//! rounding of each reduction.

use super::bit::Bit;
use crate::types::SampleFrame;

/// One resolution tier of summary units.
pub type Thumbnail = Vec<Bit>;

/// Smallest level the pyramid will contain.
pub const MIN_THUMBNAIL_SIZE: usize = 1;

/// Lower bound on the size ratio between neighbouring levels.
pub const MIN_SIZE_DIVISOR: usize = 32;

/// Frames per unit in the finest level.
pub const FIRST_LEVEL_RATIO: usize = 4;

/// Size ratio between neighbouring levels: `max(32, round(3 * log2(total)))`.
pub fn size_divisor(total_frames: usize) -> usize {
    if total_frames == 0 {
        return MIN_SIZE_DIVISOR;
    }
    let scaled = (3.0 * (total_frames as f64).log2()).round() as usize;
    scaled.max(MIN_SIZE_DIVISOR)
}

pub fn first_level_size(total_frames: usize) -> usize {
    (total_frames / FIRST_LEVEL_RATIO).max(1)
}

/// Sizes of every level, finest first.
pub fn level_sizes(total_frames: usize) -> Vec<usize> {
    let divisor = size_divisor(total_frames);
    let mut sizes = vec![first_level_size(total_frames)];
    let mut size = sizes[0] / divisor;
    while size >= MIN_THUMBNAIL_SIZE {
        sizes.push(size);
        size /= divisor;
    }
    sizes
}

/// Reduce raw frames into `level_size` units.
///
/// Unit `i` covers `[i * len / level_size, i * len / level_size + chunk)`
/// clipped to the buffer, where `chunk = (len + level_size) / level_size`.
/// Neighbouring ranges may share a frame. Min and max come from the
/// per-frame units; RMS is the root of the mean squared frame average.
pub fn generate(level_size: usize, frames: &[SampleFrame]) -> Thumbnail {
    let len = frames.len();
    if level_size == 0 {
        return Thumbnail::new();
    }
    let chunk = (len + level_size) / level_size;

    (0..level_size)
        .map(|index| {
            let start = index * len / level_size;
            let end = (start + chunk).min(len);
            let span = &frames[start.min(end)..end];
            if span.is_empty() {
                return Bit::SILENT;
            }

            let mut bit = Bit::default();
            let mut sum_sq = 0.0f64;
            for frame in span {
                bit.merge_frame(frame);
                let average = frame.average() as f64;
                sum_sq += average * average;
            }
            bit.rms = (sum_sq / span.len() as f64).sqrt() as f32;
            bit
        })
        .collect()
}

/// Merge a finer level into `size` buckets.
///
/// Finer unit `b` lands in bucket `b * size / finer.len()`. Buckets start
/// from the default unit, so their RMS is a running pairwise merge rather
/// than a true mean.
pub fn reduce(finer: &[Bit], size: usize) -> Thumbnail {
    let mut coarser = vec![Bit::default(); size];
    if size == 0 {
        return coarser;
    }
    let finer_len = finer.len();
    for (index, bit) in finer.iter().enumerate() {
        coarser[index * size / finer_len].merge(bit);
    }
    coarser
}

/// Build every level, finest to coarsest.
pub fn build(frames: &[SampleFrame]) -> Vec<Thumbnail> {
    let sizes = level_sizes(frames.len());
    let mut levels: Vec<Thumbnail> = Vec::with_capacity(sizes.len());
    levels.push(generate(sizes[0], frames));

    for &size in &sizes[1..] {
        let next = match levels.last() {
            Some(finer) => reduce(finer, size),
            None => break,
        };
        levels.push(next);
    }

    log::debug!(
        "Built thumbnail pyramid: {} frames -> levels {:?}",
        frames.len(),
        sizes
    );
    levels
}
