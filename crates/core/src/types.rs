use serde::{Deserialize, Serialize};

/// One stereo frame of sample data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleFrame {
    pub left: f32,
    pub right: f32,
}

impl SampleFrame {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Same value on both sides.
    pub fn mono(value: f32) -> Self {
        Self { left: value, right: value }
    }

    /// Mean of the two channels.
    pub fn average(&self) -> f32 {
        (self.left + self.right) / 2.0
    }
}

/// A loaded sample: a fixed-length frame sequence plus the identity used
/// as the thumbnail cache key.
#[derive(Debug, Clone)]
pub struct Sample {
    identity: String,
    frames: Vec<SampleFrame>,
}

impl Sample {
    pub fn new(identity: impl Into<String>, frames: Vec<SampleFrame>) -> Self {
        Self {
            identity: identity.into(),
            frames,
        }
    }

    /// Cache key, unique per distinct underlying audio resource.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Same frames under a different cache key.
    pub fn with_identity(self, identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            ..self
        }
    }

    pub fn frames(&self) -> &[SampleFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Integer pixel rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    /// A rect with zero width and zero height counts as "unset".
    pub fn is_null(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// One past the last column.
    pub fn right(&self) -> i64 {
        self.x + self.width
    }

    /// One past the last row.
    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }

    /// Overlap of two rects; zero-sized when they do not touch.
    pub fn intersected(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect {
            x,
            y,
            width: (right - x).max(0),
            height: (bottom - y).max(0),
        }
    }
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Brighten by `factor` percent in HSV space.
    ///
    /// Value is scaled by `factor / 100`; when it overflows, the excess is
    /// taken out of the saturation instead, so bright colors wash toward
    /// white. Factors below 100 leave the color untouched.
    pub fn lighter(&self, factor: u32) -> Color {
        if factor <= 100 {
            return *self;
        }
        let (h, s, v) = self.to_hsv();
        let mut s = s;
        let mut v = v * factor as f32 / 100.0;
        if v > 255.0 {
            s = (s - (v - 255.0)).max(0.0);
            v = 255.0;
        }
        Color::from_hsv(h, s, v, self.a)
    }

    /// Hue in degrees, saturation and value in 0..=255.
    fn to_hsv(&self) -> (f32, f32, f32) {
        let r = self.r as f32;
        let g = self.g as f32;
        let b = self.b as f32;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let s = if max > 0.0 { delta / max * 255.0 } else { 0.0 };
        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        (h, s, max)
    }

    fn from_hsv(h: f32, s: f32, v: f32, a: u8) -> Color {
        let s = s / 255.0;
        let c = v * s;
        let hp = h / 60.0;
        let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = v - c;
        let channel = |value: f32| (value + m).round().clamp(0.0, 255.0) as u8;
        Color::rgba(channel(r), channel(g), channel(b), a)
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(color: Color) -> Self {
        image::Rgba([color.r, color.g, color.b, color.a])
    }
}
