//! Pixel sinks: where rendered colors go

use std::path::{Path, PathBuf};

use image::RgbImage;
use log::info;

use crate::error::Result;
use crate::utils::get_pixel;
use crate::Color;

/// Destination for rendered pixels
///
/// Colors are unclamped, with 255 as full intensity per channel.
pub trait PixelSink {
    /// Width in pixels
    fn nx(&self) -> usize;
    /// Height in pixels
    fn ny(&self) -> usize;
    fn write_pixel(&mut self, x: usize, y: usize, color: &Color);
    /// Persist everything written so far
    fn write(&mut self) -> Result<()>;
}

/// Image file writer, the format follows the file extension
#[derive(Debug, Clone)]
pub struct ImageWriter {
    path: PathBuf,
    image: RgbImage,
}
impl ImageWriter {
    pub fn new(path: impl AsRef<Path>, nx: u32, ny: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            image: RgbImage::new(nx, ny),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}
impl PixelSink for ImageWriter {
    fn nx(&self) -> usize {
        self.image.width() as usize
    }

    fn ny(&self) -> usize {
        self.image.height() as usize
    }

    fn write_pixel(&mut self, x: usize, y: usize, color: &Color) {
        self.image.put_pixel(x as u32, y as u32, get_pixel(color));
    }

    fn write(&mut self) -> Result<()> {
        self.image.save(&self.path)?;
        info!("Image saved to {}", self.path.display());
        Ok(())
    }
}
