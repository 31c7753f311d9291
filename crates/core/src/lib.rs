//! Multi-resolution waveform thumbnails for audio samples.

pub mod audio;
pub mod config;
pub mod error;
pub mod thumbnail;
pub mod types;

pub use config::ThumbnailConfig;
pub use error::ThumbnailError;
pub use thumbnail::{SampleThumbnail, ThumbnailRegistry, VisualizeParameters};
pub use types::{Color, Rect, Sample, SampleFrame};
