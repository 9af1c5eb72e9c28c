use bytes::Bytes;
use image::imageops;
use image::RgbImage;
use tracing::{debug, warn};

use crate::codec::encode_image;
use crate::{Crop, CropError, CropFormat, Detection, PixelBox};

/// Cuts one crop per detection out of `image`.
///
/// Boxes are clamped to the image first. A detection whose clamped box has no
/// area is skipped with a warning; the remaining crops keep the index of their
/// detection as id, so ids stay stable and unique even with gaps. No
/// detections means no crops.
pub fn extract_crops(
    image: &RgbImage,
    detections: &[Detection],
    format: CropFormat,
) -> Result<Vec<Crop>, CropError> {
    let (width, height) = image.dimensions();
    let mut crops = Vec::with_capacity(detections.len());

    for (id, detection) in detections.iter().enumerate() {
        let Some(bbox) = PixelBox::clamp(detection.bbox, width, height) else {
            warn!(
                crop_id = id,
                class_name = %detection.class_name,
                bbox = ?detection.bbox,
                "skipping detection with empty box"
            );
            continue;
        };

        let region = imageops::crop_imm(image, bbox.x1, bbox.y1, bbox.width(), bbox.height())
            .to_image();
        let bytes = encode_image(&region, format)?;
        debug!(crop_id = id, width = bbox.width(), height = bbox.height(), "crop extracted");

        crops.push(Crop {
            id,
            class_id: detection.class_id,
            class_name: detection.class_name.clone(),
            bbox,
            width: bbox.width(),
            height: bbox.height(),
            bytes: Bytes::from(bytes),
            url: None,
        });
    }

    Ok(crops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_image;
    use image::Rgb;

    fn two_tone(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, _| if x < w / 2 { Rgb([0, 200, 0]) } else { Rgb([200, 0, 0]) })
    }

    #[test]
    fn no_detections_no_crops() {
        let crops = extract_crops(&two_tone(10, 10), &[], CropFormat::Png).unwrap();
        assert!(crops.is_empty());
    }

    #[test]
    fn crops_follow_detection_order_and_content() {
        let image = two_tone(40, 20);
        let detections = vec![
            Detection::new(0, "tree", [22.0, 2.0, 38.0, 18.0]),
            Detection::new(1, "bush", [0.0, 0.0, 10.0, 10.0]),
        ];
        let crops = extract_crops(&image, &detections, CropFormat::Png).unwrap();
        assert_eq!(crops.len(), 2);
        assert_eq!(crops[0].id, 0);
        assert_eq!(crops[0].class_name, "tree");
        assert_eq!((crops[0].width, crops[0].height), (16, 16));
        let red = decode_image(&crops[0].bytes).unwrap();
        assert_eq!(red.get_pixel(0, 0), &Rgb([200, 0, 0]));
        let green = decode_image(&crops[1].bytes).unwrap();
        assert_eq!(green.get_pixel(5, 5), &Rgb([0, 200, 0]));
    }

    #[test]
    fn empty_boxes_are_skipped_and_ids_kept() {
        let detections = vec![
            Detection::new(0, "tree", [5.0, 5.0, 5.0, 9.0]),
            Detection::new(0, "tree", [1.0, 1.0, 9.0, 9.0]),
            Detection::new(0, "tree", [50.0, 50.0, 60.0, 60.0]),
        ];
        let crops = extract_crops(&two_tone(10, 10), &detections, CropFormat::Png).unwrap();
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].id, 1);
        assert!(crops.iter().all(|c| c.width > 0 && c.height > 0));
    }

    #[test]
    fn overflowing_box_is_clamped() {
        let crops = extract_crops(
            &two_tone(10, 10),
            &[Detection::new(0, "bush", [-5.0, -5.0, 50.0, 4.0])],
            CropFormat::default(),
        )
        .unwrap();
        assert_eq!((crops[0].width, crops[0].height), (10, 4));
        assert_eq!(decode_image(&crops[0].bytes).unwrap().dimensions(), (10, 4));
    }
}
