use image::GrayImage;
use log::trace;

use super::format::TileFormat;
use crate::{
    bits::{bits_to_int, unpack_bits},
    error::{Result, RipError},
};

/// Decode one tile into a grayscale image.
///
/// Pixels are produced in offset-table order (`y` outer, `x` inner) and written row-major,
/// so table position `(x, y)` lands on image pixel `(x, y)`. Each value is scaled into the
/// top bits of the output byte, e.g. a 4bpp nibble `0xF` becomes `0xF0`.
///
/// `format` is expected to have passed [`TileFormat::validate`].
pub fn decode_tile(bytes: &[u8], format: &TileFormat) -> Result<GrayImage> {
    let bits = unpack_bits(bytes);
    let required_bits = format.bits_per_tile();
    if bits.len() < required_bits {
        return Err(RipError::InsufficientData {
            required_bits,
            available_bits: bits.len(),
        });
    }

    let bpp = format.bits_per_pixel as usize;
    let shift = 8 - format.bits_per_pixel;
    let mut pixels = Vec::with_capacity(format.pixel_count());

    for &y_offset in &format.y_offsets {
        for &x_offset in &format.x_offsets {
            let start = (y_offset + x_offset) as usize;
            let value = bits
                .get(start..start + bpp)
                .map(bits_to_int)
                .ok_or(RipError::InsufficientData {
                    required_bits: start + bpp,
                    available_bits: bits.len(),
                })?;
            pixels.push((value << shift) as u8);
        }
    }

    trace!("Decoded {} pixels from {} bytes", pixels.len(), bytes.len());

    let produced = pixels.len();
    GrayImage::from_raw(format.width, format.height, pixels).ok_or_else(|| {
        RipError::InvalidFormat(format!(
            "{}: produced {} pixels for a {}x{} tile",
            format.name, produced, format.width, format.height
        ))
    })
}
