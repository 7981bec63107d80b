use std::io::Cursor;

use image::{RgbImage, codecs::jpeg::JpegEncoder, imageops, imageops::FilterType};

use crate::core::errors::CameraError;

pub const STILL_WIDTH: u32 = 800;
pub const STILL_HEIGHT: u32 = 450;
const STILL_QUALITY: u8 = 80;

/// A single still image extracted from the live preview, ready for upload.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Re-encode a raw preview frame as an 800x450 JPEG still. The source is
/// center-cropped to the target aspect and scaled to fill, never letterboxed.
pub fn encode_still(preview_frame: &[u8]) -> Result<CapturedFrame, CameraError> {
    let decoded = image::load_from_memory(preview_frame)
        .map_err(|err| CameraError::CaptureUnavailable(format!("preview frame decode: {err}")))?;
    let src = decoded.to_rgb8();

    let cropped = crop_to_aspect(&src, STILL_WIDTH, STILL_HEIGHT);
    let resized = imageops::resize(&cropped, STILL_WIDTH, STILL_HEIGHT, FilterType::Triangle);

    let mut out = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut out, STILL_QUALITY);
    encoder
        .encode(
            resized.as_raw(),
            STILL_WIDTH,
            STILL_HEIGHT,
            image::ColorType::Rgb8.into(),
        )
        .map_err(|err| CameraError::CaptureUnavailable(format!("still encode: {err}")))?;

    let data = out.into_inner();
    if data.is_empty() {
        return Err(CameraError::CaptureUnavailable(
            "still encoder produced no data".to_owned(),
        ));
    }

    Ok(CapturedFrame {
        width: STILL_WIDTH,
        height: STILL_HEIGHT,
        data,
    })
}

fn crop_to_aspect(src: &RgbImage, target_w: u32, target_h: u32) -> RgbImage {
    let (src_w, src_h) = src.dimensions();
    let target_aspect = target_w as f64 / target_h as f64;
    let src_aspect = src_w as f64 / src_h as f64;

    let (crop_x, crop_y, crop_w, crop_h) = if src_aspect > target_aspect {
        // Wider than target: trim the sides.
        let crop_w = ((src_h as f64) * target_aspect).round() as u32;
        let crop_x = (src_w.saturating_sub(crop_w)) / 2;
        (crop_x, 0, crop_w.min(src_w), src_h)
    } else {
        // Taller than target: trim top and bottom.
        let crop_h = ((src_w as f64) / target_aspect).round() as u32;
        let crop_y = (src_h.saturating_sub(crop_h)) / 2;
        (0, crop_y, src_w, crop_h.min(src_h))
    };

    imageops::crop_imm(src, crop_x, crop_y, crop_w, crop_h).to_image()
}
