use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One object reported by the detector, in source-image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    #[serde(default)]
    pub class_name: String,
    /// `[x1, y1, x2, y2]`, not necessarily inside the image.
    pub bbox: [f32; 4],
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl Detection {
    pub fn new(class_id: u32, class_name: impl Into<String>, bbox: [f32; 4]) -> Self {
        Self {
            class_id,
            class_name: class_name.into(),
            bbox,
            confidence: None,
        }
    }
}

/// Pixel rectangle clamped to the source image. `x2`/`y2` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelBox {
    /// Clamps a float box to a `width` x `height` image. `None` when the
    /// clamped region has no area or the box is not finite.
    pub fn clamp(bbox: [f32; 4], width: u32, height: u32) -> Option<Self> {
        if bbox.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let [x1, y1, x2, y2] = bbox;
        let clamp_x = |v: f32| v.round().clamp(0.0, width as f32) as u32;
        let clamp_y = |v: f32| v.round().clamp(0.0, height as f32) as u32;
        let (x1, x2) = (clamp_x(x1.min(x2)), clamp_x(x1.max(x2)));
        let (y1, y2) = (clamp_y(y1.min(y2)), clamp_y(y1.max(y2)));
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self { x1, y1, x2, y2 })
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

/// A cut-out of one detected object, encoded and ready to classify or upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Crop {
    /// Index of the originating detection; unique within the photo.
    pub id: usize,
    pub class_id: u32,
    pub class_name: String,
    pub bbox: PixelBox,
    pub width: u32,
    pub height: u32,
    pub bytes: Bytes,
    pub url: Option<String>,
}

impl Crop {
    /// Attaches the storage URL. Done once, before the crop is shared.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Object-store file name for this crop.
    pub fn file_name(&self, extension: &str) -> String {
        format!("crop_{}.{extension}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_inside_image() {
        let b = PixelBox::clamp([10.0, 5.0, 30.0, 25.0], 100, 100).unwrap();
        assert_eq!((b.x1, b.y1, b.x2, b.y2), (10, 5, 30, 25));
        assert_eq!((b.width(), b.height()), (20, 20));
    }

    #[test]
    fn clamp_trims_overflow_and_swaps_reversed_corners() {
        let b = PixelBox::clamp([120.0, -8.0, 90.0, 40.0], 100, 50).unwrap();
        assert_eq!((b.x1, b.y1, b.x2, b.y2), (90, 0, 100, 40));
    }

    #[test]
    fn clamp_rejects_empty_regions() {
        assert!(PixelBox::clamp([10.0, 10.0, 10.0, 40.0], 100, 100).is_none());
        assert!(PixelBox::clamp([150.0, 0.0, 200.0, 50.0], 100, 100).is_none());
        assert!(PixelBox::clamp([0.0, f32::NAN, 10.0, 10.0], 100, 100).is_none());
    }

    #[test]
    fn detection_deserializes_with_defaults() {
        let d: Detection =
            serde_json::from_value(serde_json::json!({"class_id": 0, "bbox": [1, 2, 3, 4]}))
                .unwrap();
        assert_eq!(d.bbox, [1.0, 2.0, 3.0, 4.0]);
        assert!(d.class_name.is_empty());
        assert!(d.confidence.is_none());
    }

    #[test]
    fn crop_file_name() {
        let crop = Crop {
            id: 3,
            class_id: 0,
            class_name: "plant".into(),
            bbox: PixelBox { x1: 0, y1: 0, x2: 1, y2: 1 },
            width: 1,
            height: 1,
            bytes: Bytes::new(),
            url: None,
        };
        assert_eq!(crop.file_name("jpg"), "crop_3.jpg");
        assert_eq!(crop.with_url("http://x/y").url.as_deref(), Some("http://x/y"));
    }
}
