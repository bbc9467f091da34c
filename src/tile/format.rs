//! # Tile Formats
//!
//! A tile format describes how a tile's pixels are scattered over its bytes. Each pixel's
//! value starts at bit `y_offsets[y] + x_offsets[x]` of the tile and spans `bits_per_pixel`
//! bits. Formats are plain data, so other hardware layouts can be added (or loaded from a
//! config file) without touching the decoder.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RipError};

pub const DJMAIN_SPRITE: &str = "djmain-sprite";
pub const PACKED_4BPP: &str = "packed-4bpp";

/// Sprite layout of Konami's DJ Main board (as decoded by MAME's `djmain` driver).
/// 16x16 tiles, 4 bits per pixel, 128 bytes each.
const DJMAIN_X_OFFSETS: [u32; 16] = [
    4, 0, 12, 8, 20, 16, 28, 24, 260, 256, 268, 264, 276, 272, 284, 280,
];
const DJMAIN_Y_OFFSETS: [u32; 16] = [
    0, 32, 64, 96, 128, 160, 192, 224, 512, 544, 576, 608, 640, 672, 704, 736,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileFormat {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
    pub x_offsets: Vec<u32>,
    pub y_offsets: Vec<u32>,
}

impl TileFormat {
    pub fn djmain_sprite() -> Self {
        TileFormat {
            name: DJMAIN_SPRITE.to_string(),
            width: 16,
            height: 16,
            bits_per_pixel: 4,
            x_offsets: DJMAIN_X_OFFSETS.to_vec(),
            y_offsets: DJMAIN_Y_OFFSETS.to_vec(),
        }
    }

    /// 16x16 4bpp tile with pixels packed row by row, high nibble first.
    pub fn packed_4bpp() -> Self {
        TileFormat {
            name: PACKED_4BPP.to_string(),
            width: 16,
            height: 16,
            bits_per_pixel: 4,
            x_offsets: (0..16).map(|x| x * 4).collect(),
            y_offsets: (0..16).map(|y| y * 64).collect(),
        }
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &[DJMAIN_SPRITE, PACKED_4BPP]
    }

    pub fn builtin(name: &str) -> Result<Self> {
        match name {
            DJMAIN_SPRITE => Ok(Self::djmain_sprite()),
            PACKED_4BPP => Ok(Self::packed_4bpp()),
            other => Err(RipError::UnknownFormat(other.to_string())),
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn bits_per_tile(&self) -> usize {
        self.pixel_count() * self.bits_per_pixel as usize
    }

    pub fn bytes_per_tile(&self) -> usize {
        self.bits_per_tile().div_ceil(8)
    }

    /// Check the table shapes and that no pixel reaches past the end of the tile.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RipError::InvalidFormat(format!(
                "{}: tile dimensions must be non-zero ({}x{})",
                self.name, self.width, self.height
            )));
        }
        if !(1..=8).contains(&self.bits_per_pixel) {
            return Err(RipError::InvalidFormat(format!(
                "{}: bits_per_pixel must be between 1 and 8, got {}",
                self.name, self.bits_per_pixel
            )));
        }
        if self.x_offsets.len() != self.width as usize {
            return Err(RipError::InvalidFormat(format!(
                "{}: {} x offsets for a tile {} pixels wide",
                self.name,
                self.x_offsets.len(),
                self.width
            )));
        }
        if self.y_offsets.len() != self.height as usize {
            return Err(RipError::InvalidFormat(format!(
                "{}: {} y offsets for a tile {} pixels high",
                self.name,
                self.y_offsets.len(),
                self.height
            )));
        }

        let max_x = self.x_offsets.iter().copied().max().unwrap_or(0) as usize;
        let max_y = self.y_offsets.iter().copied().max().unwrap_or(0) as usize;
        let last_bit = max_y + max_x + self.bits_per_pixel as usize;
        let available = self.bytes_per_tile() * 8;
        if last_bit > available {
            return Err(RipError::InvalidFormat(format!(
                "{}: pixel data reaches bit {} but a tile only holds {} bits",
                self.name, last_bit, available
            )));
        }

        Ok(())
    }
}

impl Default for TileFormat {
    fn default() -> Self {
        Self::djmain_sprite()
    }
}
