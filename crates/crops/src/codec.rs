use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::CropError;

/// Output encoding for crops and the framed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "format")]
pub enum CropFormat {
    Jpeg {
        #[serde(default = "default_quality")]
        quality: u8,
    },
    Png,
}

fn default_quality() -> u8 {
    95
}

impl Default for CropFormat {
    fn default() -> Self {
        CropFormat::Jpeg {
            quality: default_quality(),
        }
    }
}

impl CropFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            CropFormat::Jpeg { .. } => "jpg",
            CropFormat::Png => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            CropFormat::Jpeg { .. } => "image/jpeg",
            CropFormat::Png => "image/png",
        }
    }
}

/// Decodes encoded image bytes (JPEG, PNG) into an RGB buffer.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, CropError> {
    if bytes.is_empty() {
        return Err(CropError::InvalidImage("image bytes are empty".into()));
    }
    let decoded = image::load_from_memory(bytes)?;
    Ok(decoded.to_rgb8())
}

/// Encodes an RGB buffer in `format`.
pub fn encode_image(image: &RgbImage, format: CropFormat) -> Result<Vec<u8>, CropError> {
    let mut out = Cursor::new(Vec::new());
    match format {
        CropFormat::Jpeg { quality } => {
            let encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
            image
                .write_with_encoder(encoder)
                .map_err(|e| CropError::Encode(e.to_string()))?;
        }
        CropFormat::Png => {
            DynamicImage::ImageRgb8(image.clone())
                .write_to(&mut out, ImageFormat::Png)
                .map_err(|e| CropError::Encode(e.to_string()))?;
        }
    }
    Ok(out.into_inner())
}
