//! Collage compositor.
//!
//! # spawn_blocking pattern
//! Decoding, resampling and JPEG encoding are CPU-bound. `compose` moves owned
//! payloads into `tokio::task::spawn_blocking` and runs `compose_sync` there so
//! the async executor stays responsive while a 4096px collage renders.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use thiserror::Error;
use tracing::debug;

use super::layout::{CollageLayout, Region};
use crate::models::media::{decode_base64, encode_base64, AlbumImage};

pub const PREVIEW_WIDTH: u32 = 300;
pub const EXPORT_WIDTH: u32 = 1080;
pub const MIN_WIDTH: u32 = 100;
pub const MAX_WIDTH: u32 = 4096;

const JPEG_QUALITY: u8 = 90;
/// Fill visible through the gaps between regions.
const BACKGROUND: Rgb<u8> = Rgb([0x11, 0x18, 0x27]);

#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("image {index} could not be decoded: {reason}")]
    Decode { index: usize, reason: String },

    #[error("collage encoding failed: {0}")]
    Encode(String),

    #[error("compositor task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Source rectangle `(x, y, width, height)` inside an image of `src_w × src_h`
/// that has the target aspect ratio. The longer axis is cropped symmetrically.
pub fn cover_crop(src_w: u32, src_h: u32, target: &Region) -> (u32, u32, u32, u32) {
    let img_ratio = src_w as f64 / src_h as f64;
    let container_ratio = target.ratio();

    if img_ratio > container_ratio {
        let crop_w = ((src_h as f64 * container_ratio).round() as u32).clamp(1, src_w);
        ((src_w - crop_w) / 2, 0, crop_w, src_h)
    } else {
        let crop_h = ((src_w as f64 / container_ratio).round() as u32).clamp(1, src_h);
        (0, (src_h - crop_h) / 2, src_w, crop_h)
    }
}

/// Cover-fits `image` into `region` on `canvas`: crop to the region's ratio,
/// then resample to exactly the region's size.
fn draw_cover(canvas: &mut RgbImage, image: &DynamicImage, region: &Region) {
    let (sx, sy, sw, sh) = cover_crop(image.width(), image.height(), region);
    let tile = image
        .crop_imm(sx, sy, sw, sh)
        .resize_exact(region.width, region.height, FilterType::Lanczos3)
        .to_rgb8();
    imageops::replace(canvas, &tile, region.x as i64, region.y as i64);
}

/// Draws decoded images (hero first) onto a fresh background canvas.
fn render_canvas(layout: CollageLayout, images: &[DynamicImage], width: u32) -> RgbImage {
    let (w, h) = layout.canvas_size(width);
    let mut canvas = RgbImage::from_pixel(w, h, BACKGROUND);
    for (image, region) in images.iter().zip(layout.regions(width).iter()) {
        draw_cover(&mut canvas, image, region);
    }
    canvas
}

fn decode_all(images: &[AlbumImage; 4]) -> Result<Vec<DynamicImage>, CompositeError> {
    images
        .iter()
        .enumerate()
        .map(|(index, img)| {
            let bytes = decode_base64(&img.data).map_err(|e| CompositeError::Decode {
                index,
                reason: e.to_string(),
            })?;
            image::load_from_memory(&bytes).map_err(|e| CompositeError::Decode {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Synchronous composition. Every input is decoded before anything is drawn,
/// so a bad image never yields a partial collage.
pub fn compose_sync(
    layout: CollageLayout,
    images: &[AlbumImage; 4],
    width: u32,
) -> Result<Vec<u8>, CompositeError> {
    let decoded = decode_all(images)?;
    let canvas = render_canvas(layout, &decoded, width);
    let (w, h) = canvas.dimensions();

    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode_image(&canvas)
        .map_err(|e| CompositeError::Encode(e.to_string()))?;

    debug!(layout = layout.as_str(), w, h, "Collage composed");
    Ok(buf.into_inner())
}

/// Renders one collage as JPEG bytes. Images are hero first, then three details.
pub async fn compose(
    layout: CollageLayout,
    images: [AlbumImage; 4],
    width: u32,
) -> Result<Vec<u8>, CompositeError> {
    tokio::task::spawn_blocking(move || compose_sync(layout, &images, width)).await?
}

/// A rendered preview, ready for an `<img src>`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CollagePreview {
    pub layout: CollageLayout,
    pub data_url: String,
}

/// All three layouts at `PREVIEW_WIDTH`.
pub async fn render_previews(images: [AlbumImage; 4]) -> Result<Vec<CollagePreview>, CompositeError> {
    tokio::task::spawn_blocking(move || {
        CollageLayout::ALL
            .iter()
            .map(|&layout| -> Result<CollagePreview, CompositeError> {
                let jpeg = compose_sync(layout, &images, PREVIEW_WIDTH)?;
                Ok(CollagePreview {
                    layout,
                    data_url: format!("data:image/jpeg;base64,{}", encode_base64(&jpeg)),
                })
            })
            .collect()
    })
    .await?
}

/// `{stem}-{layout}-collage.jpg`, where `stem` is the source name without its
/// last extension, or `album` when there is no usable name.
pub fn collage_file_name(source_name: Option<&str>, layout: CollageLayout) -> String {
    format!("{}-{}-collage.jpg", file_stem(source_name), layout.as_str())
}

pub fn file_stem(source_name: Option<&str>) -> &str {
    let name = source_name.map(str::trim).unwrap_or_default();
    let stem = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    };
    if stem.is_empty() {
        "album"
    } else {
        stem
    }
}
