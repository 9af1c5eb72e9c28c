//! DendroScan crop extraction
//!
//! A photo goes in, the detector says where the plants are, and this crate
//! cuts one encoded crop per detection. It also draws the "framed" overview
//! image with every box outlined.
//!
//! Boxes are clamped to the image; boxes left without area are skipped.
//! Zero detections is a normal outcome and yields zero crops.

pub mod codec;
pub mod detector;
pub mod error;
pub mod types;

mod annotate;
mod extract;

pub use crate::annotate::annotate;
pub use crate::codec::{decode_image, encode_image, CropFormat};
pub use crate::detector::{build_detector, ApiDetector, Detector, DetectorConfig, StaticDetector};
pub use crate::error::CropError;
pub use crate::extract::extract_crops;
pub use crate::types::{Crop, Detection, PixelBox};
