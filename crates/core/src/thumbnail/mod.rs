//! Waveform thumbnails: downsampling pyramid, shared cache, window renderer
//! and raster fast path.

pub mod bit;
pub mod canvas;
pub mod pyramid;
pub mod raster;
pub mod registry;
pub mod render;
pub mod sample_thumbnail;

pub use bit::Bit;
pub use canvas::{Canvas, DrawCommand, DrawList, Raster, RasterCanvas};
pub use pyramid::Thumbnail;
pub use raster::RasterSet;
pub use registry::{ThumbnailCache, ThumbnailRegistry};
pub use render::VisualizeParameters;
pub use sample_thumbnail::SampleThumbnail;
