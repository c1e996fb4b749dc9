//! Crop an uploaded image to the region the user selected on screen and
//! hand it back as a base64 data URL.

use std::path::Path;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use thiserror::Error;

pub const DEFAULT_QUALITY: u8 = 92;

#[derive(Debug, Error)]
pub enum CropError {
    #[error("could not read image file: {0}")]
    Read(#[from] std::io::Error),

    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("unsupported image format")]
    UnsupportedFormat,

    #[error("invalid scale factor {0}")]
    InvalidScale(f64),

    #[error("crop region is empty or outside the image")]
    EmptyRegion,

    #[error("could not encode cropped image: {0}")]
    Encode(String),
}

/// Selection in displayed (on-screen) pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// natural / displayed size ratio on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactors {
    pub fn from_sizes(natural: (u32, u32), displayed: (f64, f64)) -> Result<Self, CropError> {
        let scale = ScaleFactors { x: natural.0 as f64 / displayed.0, y: natural.1 as f64 / displayed.1 };
        scale.validate()?;
        Ok(scale)
    }

    fn validate(&self) -> Result<(), CropError> {
        for s in [self.x, self.y] {
            if !s.is_finite() || s <= 0.0 {
                return Err(CropError::InvalidScale(s));
            }
        }
        Ok(())
    }
}

/// Crop `source` (any format `image` can decode) and encode the region as a
/// JPEG data URL at `quality`.
pub fn crop_to_data_url(source: &[u8], rect: CropRect, scale: ScaleFactors, quality: u8) -> Result<String, CropError> {
    scale.validate()?;
    let img = image::load_from_memory(source).map_err(|e| CropError::Decode(e.to_string()))?;
    let cropped = crop_scaled(&img, rect, scale)?;

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    DynamicImage::ImageRgb8(cropped.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| CropError::Encode(e.to_string()))?;
    Ok(data_url("image/jpeg", &buf))
}

fn crop_scaled(img: &DynamicImage, rect: CropRect, scale: ScaleFactors) -> Result<DynamicImage, CropError> {
    let (w, h) = img.dimensions();
    let x0 = (rect.x * scale.x).round().max(0.0);
    let y0 = (rect.y * scale.y).round().max(0.0);
    let x1 = ((rect.x + rect.width) * scale.x).round().min(w as f64);
    let y1 = ((rect.y + rect.height) * scale.y).round().min(h as f64);
    if !(x1 > x0 && y1 > y0) {
        return Err(CropError::EmptyRegion);
    }
    Ok(img.crop_imm(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// Read an image file into a data URL without re-encoding it.
pub async fn file_to_data_url(path: &Path) -> Result<String, CropError> {
    let bytes = tokio::fs::read(path).await?;
    bytes_to_data_url(&bytes)
}

pub fn bytes_to_data_url(bytes: &[u8]) -> Result<String, CropError> {
    let format = image::guess_format(bytes).map_err(|_| CropError::UnsupportedFormat)?;
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        _ => return Err(CropError::UnsupportedFormat),
    };
    Ok(data_url(mime, bytes))
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, _| if x < width / 2 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) });
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    fn decode_data_url(url: &str) -> DynamicImage {
        let b64 = url.strip_prefix("data:image/jpeg;base64,").expect("jpeg data url");
        let bytes = base64::engine::general_purpose::STANDARD.decode(b64).unwrap();
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn crop_scales_displayed_coordinates() {
        let source = png(200, 100);
        // displayed at half size
        let scale = ScaleFactors::from_sizes((200, 100), (100.0, 50.0)).unwrap();
        let rect = CropRect { x: 10.0, y: 5.0, width: 30.0, height: 20.0 };
        let url = crop_to_data_url(&source, rect, scale, DEFAULT_QUALITY).unwrap();
        assert_eq!(decode_data_url(&url).dimensions(), (60, 40));
    }

    #[test]
    fn crop_is_clamped_to_image_bounds() {
        let source = png(40, 40);
        let rect = CropRect { x: 30.0, y: 30.0, width: 50.0, height: 50.0 };
        let url = crop_to_data_url(&source, rect, ScaleFactors { x: 1.0, y: 1.0 }, 80).unwrap();
        assert_eq!(decode_data_url(&url).dimensions(), (10, 10));
    }

    #[test]
    fn failures_are_reported() {
        let source = png(10, 10);
        let unit = ScaleFactors { x: 1.0, y: 1.0 };
        let outside = CropRect { x: 20.0, y: 20.0, width: 5.0, height: 5.0 };
        assert!(matches!(crop_to_data_url(&source, outside, unit, 90), Err(CropError::EmptyRegion)));
        let rect = CropRect { x: 0.0, y: 0.0, width: 5.0, height: 5.0 };
        assert!(matches!(crop_to_data_url(b"not an image", rect, unit, 90), Err(CropError::Decode(_))));
        assert!(matches!(ScaleFactors::from_sizes((10, 10), (0.0, 10.0)), Err(CropError::InvalidScale(_))));
        assert!(matches!(crop_to_data_url(&source, rect, ScaleFactors { x: -1.0, y: 1.0 }, 90), Err(CropError::InvalidScale(_))));
    }

    #[test]
    fn raw_bytes_keep_their_mime_type() {
        let url = bytes_to_data_url(&png(2, 2)).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(matches!(bytes_to_data_url(b"plain text"), Err(CropError::UnsupportedFormat)));
    }

    #[tokio::test]
    async fn reads_file_to_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.png");
        std::fs::write(&path, png(3, 3)).unwrap();
        assert!(file_to_data_url(&path).await.unwrap().starts_with("data:image/png;base64,"));
        assert!(matches!(file_to_data_url(&dir.path().join("missing.png")).await, Err(CropError::Read(_))));
    }
}
