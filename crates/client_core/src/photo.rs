//! Pure conversion from a preview frame to the submitted photo payload:
//! fixed 640x480 output, mirrored to match the preview the user saw,
//! JPEG at quality 80, plus the display data URL and generated filename.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use camera_integration::CameraFrame;
use chrono::{DateTime, Utc};
use image::{codecs::jpeg::JpegEncoder, imageops, DynamicImage, RgbaImage};
use shared::{
    domain::AttendanceKind,
    protocol::{attendance_filename, PhotoAttachment},
};

pub const PHOTO_WIDTH: u32 = 640;
pub const PHOTO_HEIGHT: u32 = 480;
pub const PHOTO_JPEG_QUALITY: u8 = 80;

pub fn encode_capture(
    frame: &CameraFrame,
    kind: AttendanceKind,
    captured_at: DateTime<Utc>,
) -> Result<PhotoAttachment> {
    let buffer: RgbaImage = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        .context("preview frame dimensions do not match its pixel buffer")?;

    let scaled = if (frame.width, frame.height) == (PHOTO_WIDTH, PHOTO_HEIGHT) {
        buffer
    } else {
        imageops::resize(
            &buffer,
            PHOTO_WIDTH,
            PHOTO_HEIGHT,
            imageops::FilterType::Triangle,
        )
    };
    let mirrored = imageops::flip_horizontal(&scaled);
    let rgb = DynamicImage::ImageRgba8(mirrored).to_rgb8();

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, PHOTO_JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .context("jpeg encoding of the captured frame failed")?;

    let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(&bytes));
    Ok(PhotoAttachment {
        bytes,
        data_url,
        filename: attendance_filename(kind, captured_at),
        width: PHOTO_WIDTH,
        height: PHOTO_HEIGHT,
    })
}
