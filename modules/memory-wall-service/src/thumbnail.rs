//! Thumbnail derivation: fit inside a square box, never upscale, JPEG out.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, GenericImageView};

/// Decode `data`, shrink it to fit within `max_dimension` on both axes and
/// re-encode as JPEG at `quality`.
pub fn make_thumbnail(data: &[u8], max_dimension: u32, quality: u8) -> Result<Vec<u8>, String> {
    let img = image::load_from_memory(data).map_err(|e| format!("cannot decode image: {}", e))?;

    let (width, height) = img.dimensions();
    let img = if width > max_dimension || height > max_dimension {
        img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| format!("cannot encode thumbnail: {}", e))?;
    Ok(out)
}

/// File extension to store an original under, from its declared MIME type.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        _ => "img",
    }
}
