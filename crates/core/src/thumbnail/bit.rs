//! Min/max/RMS summary of a span of sample frames.

use crate::types::SampleFrame;

/// The atomic summary statistic of a thumbnail.
///
/// A default unit is "inverted" (max below min) so the first merge
/// replaces both bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bit {
    pub max: f32,
    pub min: f32,
    pub rms: f32,
}

impl Default for Bit {
    fn default() -> Self {
        Self {
            max: -100.0,
            min: 100.0,
            rms: 0.0,
        }
    }
}

impl From<&SampleFrame> for Bit {
    fn from(frame: &SampleFrame) -> Self {
        Self {
            max: frame.left.max(frame.right),
            min: frame.left.min(frame.right),
            rms: 0.0,
        }
    }
}

impl Bit {
    /// A flat unit, used where a span holds no frames at all.
    pub const SILENT: Bit = Bit {
        max: 0.0,
        min: 0.0,
        rms: 0.0,
    };

    pub fn merge(&mut self, other: &Bit) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.rms = ((self.rms * self.rms + other.rms * other.rms) / 2.0).sqrt();
    }

    pub fn merge_frame(&mut self, frame: &SampleFrame) {
        self.merge(&Bit::from(frame));
    }

    /// Merged copy, leaving `self` untouched.
    pub fn merged(mut self, other: &Bit) -> Bit {
        self.merge(other);
        self
    }
}
