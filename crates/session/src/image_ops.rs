use crate::SessionError;
use image::{ImageFormat, Rgb, RgbaImage};
use std::io::Cursor;

/// Tint of the screen's only filter
pub const FILTER_TINT: Rgb<u8> = Rgb([255, 0, 0]);

pub fn decode(data: &[u8]) -> Result<RgbaImage, SessionError> {
    Ok(image::load_from_memory(data)?.to_rgba8())
}

/// "Lighten" blend against a solid color: each channel becomes max(pixel, tint).
/// Alpha is untouched.
pub fn lighten(image: &mut RgbaImage, tint: Rgb<u8>) {
    for pixel in image.pixels_mut() {
        for channel in 0..3 {
            pixel[channel] = pixel[channel].max(tint[channel]);
        }
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, SessionError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
