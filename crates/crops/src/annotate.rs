use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use once_cell::sync::Lazy;

use crate::{Detection, PixelBox};

const BORDER: u32 = 2;

static FONT: Lazy<Option<FontRef<'static>>> = Lazy::new(|| {
    match FontRef::try_from_slice(include_bytes!("../assets/DejaVuSans.ttf")) {
        Ok(font) => Some(font),
        Err(err) => {
            tracing::warn!(error = %err, "caption font unavailable, framed images get boxes only");
            None
        }
    }
});

/// Draws every detection box onto a copy of `image` (the "framed" image),
/// captioned `id={index}, {class_name}` just above the box.
///
/// The index is the crop id reported for that plant. Colors come from a fixed
/// palette keyed by detection index, so the same photo always frames the same
/// way. Boxes with no area are left out, matching the crops that were
/// produced. Captions of boxes touching the top edge are clipped.
pub fn annotate(image: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut framed = image.clone();
    let (width, height) = image.dimensions();
    let scale = caption_scale(height);

    for (idx, detection) in detections.iter().enumerate() {
        let Some(bbox) = PixelBox::clamp(detection.bbox, width, height) else {
            continue;
        };
        let color = palette(idx);
        for inset in 0..BORDER {
            let w = bbox.width().saturating_sub(2 * inset);
            let h = bbox.height().saturating_sub(2 * inset);
            if w == 0 || h == 0 {
                break;
            }
            let rect = Rect::at((bbox.x1 + inset) as i32, (bbox.y1 + inset) as i32).of_size(w, h);
            draw_hollow_rect_mut(&mut framed, rect, color);
        }
        if let Some(font) = FONT.as_ref() {
            let caption = format!("id={idx}, {}", detection.class_name);
            let y = bbox.y1 as i32 - scale.y.ceil() as i32 - 1;
            draw_text_mut(&mut framed, color, bbox.x1 as i32, y, scale, font, &caption);
        }
    }

    framed
}

fn caption_scale(image_height: u32) -> PxScale {
    PxScale::from((image_height as f32 / 30.0).clamp(12.0, 48.0))
}

/// Evenly spaced hues, cycling every 12 boxes.
fn palette(idx: usize) -> Rgb<u8> {
    let hue = (idx % 12) as f32 * 30.0;
    hsv_to_rgb(hue, 0.85, 0.95)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb<u8> {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Rgb([
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    ])
}
