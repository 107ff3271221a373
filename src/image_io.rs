use crate::error::{PipelineError, PipelineResult};
use image::DynamicImage;
use std::path::Path;

/// Grayscale image with samples widened to 16 bits, row-major.
#[derive(Debug, Clone)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub bit_depth: u8,
    pub data: Vec<u16>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize, bit_depth: u8, data: Vec<u16>) -> PipelineResult<Self> {
        if data.len() != width * height {
            return Err(PipelineError::InvalidImage(format!(
                "data size mismatch: expected {} pixels, got {}",
                width * height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bit_depth,
            data,
        })
    }

    /// Load a grayscale raster with the `image` crate.
    ///
    /// 8 and 16 bit grayscale keep their raw values, colour images are
    /// converted to 16 bit luma.
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        let dynamic = image::open(path).map_err(|e| load_error(path, e.to_string()))?;
        let (bit_depth, width, height, data) = match dynamic {
            DynamicImage::ImageLuma8(buf) => {
                let (w, h) = buf.dimensions();
                (8, w, h, buf.into_raw().into_iter().map(u16::from).collect())
            }
            DynamicImage::ImageLuma16(buf) => {
                let (w, h) = buf.dimensions();
                (16, w, h, buf.into_raw())
            }
            other => {
                let buf = other.to_luma16();
                let (w, h) = buf.dimensions();
                (16, w, h, buf.into_raw())
            }
        };
        Self::new(width as usize, height as usize, bit_depth, data)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u16 {
        self.data[row * self.width + col]
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Stretch to 8 bits between the image's own min and max, for display only.
    pub fn to_display_u8(&self) -> Vec<u8> {
        let min = self.data.iter().copied().min().unwrap_or(0) as f64;
        let max = self.data.iter().copied().max().unwrap_or(0) as f64;
        let range = (max - min).max(1.0);
        self.data
            .iter()
            .map(|&v| (((v as f64 - min) / range) * 255.0).round() as u8)
            .collect()
    }
}

fn load_error(path: &Path, message: String) -> PipelineError {
    PipelineError::ImageLoad {
        path: path.to_path_buf(),
        message,
    }
}
