//! # Sheet Composition
//!
//! Pulls tile-sized chunks off the interleaved byte stream, decodes them and pastes them into a
//! single grayscale sheet.

use std::{
    collections::{hash_map::Entry, HashMap},
    hash::{Hash, Hasher},
};

use image::{imageops, GrayImage};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

use crate::{
    error::{Result, RipError},
    stream::ByteStream,
    tile::{decode_tile, TileFormat},
};

/// Order in which decoded tiles are placed on the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Layout {
    /// Row-major over the whole sheet
    #[default]
    Grid,
    /// Vertical bands of `strip_width` tile columns, each filled top to bottom (row-major
    /// inside the band) before moving on to the next band.
    Strips { strip_width: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSpec {
    /// Sheet width in tiles
    pub columns: u32,
    /// Sheet height in tiles
    pub rows: u32,
    pub layout: Layout,
    /// Tiles skipped at the front of the stream
    pub start_tile: usize,
}

impl Default for SheetSpec {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 80,
            layout: Layout::Grid,
            start_tile: 0,
        }
    }
}

impl SheetSpec {
    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            return Err(RipError::InvalidConfig(format!(
                "sheet must be at least 1x1 tiles, got {}x{}",
                self.columns, self.rows
            )));
        }
        if let Layout::Strips { strip_width } = self.layout {
            if strip_width == 0 || !self.columns.is_multiple_of(strip_width) {
                return Err(RipError::InvalidConfig(format!(
                    "{} columns cannot be split into strips {} tiles wide",
                    self.columns, strip_width
                )));
            }
        }
        Ok(())
    }

    /// Tile cell `(column, row)` for every tile, in the order tiles are consumed.
    pub fn placements(&self) -> Vec<(u32, u32)> {
        match self.layout {
            Layout::Grid => (0..self.rows)
                .flat_map(|row| (0..self.columns).map(move |col| (col, row)))
                .collect(),
            Layout::Strips { strip_width } => {
                let rows = self.rows;
                (0..self.columns / strip_width)
                    .flat_map(|strip| {
                        (0..rows).flat_map(move |row| {
                            (0..strip_width).map(move |x| (strip * strip_width + x, row))
                        })
                    })
                    .collect()
            }
        }
    }
}

/// A composed sheet along with a fingerprint of every tile placed on it
#[derive(Debug)]
pub struct Sheet {
    pub image: GrayImage,
    pub tile_hashes: Vec<u64>,
    pub blank_tiles: usize,
    /// Tiles with distinct pixel data (hash matches are confirmed pixel for pixel)
    pub unique_tiles: usize,
}

impl Sheet {
    pub fn image_hash(&self) -> u64 {
        calculate_image_hash(&self.image)
    }
}

/// Decode tiles from the stream's cursor onwards until every cell of the sheet is filled.
///
/// The sheet's pixel size and the stream length are checked before the canvas is allocated.
pub fn compose_sheet(
    stream: &mut ByteStream,
    format: &TileFormat,
    spec: &SheetSpec,
) -> Result<Sheet> {
    format.validate()?;
    spec.validate()?;

    let (width, height) = match (
        spec.columns.checked_mul(format.width),
        spec.rows.checked_mul(format.height),
    ) {
        (Some(width), Some(height)) => (width, height),
        _ => {
            return Err(RipError::InvalidConfig(format!(
                "{}x{} tiles of {}x{} pixels is too large for an image",
                spec.columns, spec.rows, format.width, format.height
            )))
        }
    };

    let tile_bytes = format.bytes_per_tile();
    let tiles_required = spec.tile_count();

    let needed = spec
        .start_tile
        .checked_add(tiles_required)
        .and_then(|tiles| tiles.checked_mul(tile_bytes));
    match needed {
        Some(needed) if needed <= stream.remaining() => {}
        _ => {
            return Err(RipError::StreamExhausted {
                requested: needed.unwrap_or(usize::MAX),
                remaining: stream.remaining(),
                tiles_placed: 0,
                tiles_required,
            })
        }
    }

    if spec.start_tile > 0 {
        stream
            .skip(spec.start_tile * tile_bytes)
            .map_err(|e| with_progress(e, 0, tiles_required))?;
        debug!("Skipped {} tiles", spec.start_tile);
    }

    let mut image = GrayImage::new(width, height);
    let mut tile_hashes = Vec::with_capacity(tiles_required);
    let mut unique: HashMap<u64, Vec<GrayImage>> = HashMap::new();
    let mut unique_tiles = 0;
    let mut blank_tiles = 0;

    info!(
        "Composing {}x{} tile sheet ({}x{} px) from {} bytes",
        spec.columns,
        spec.rows,
        width,
        height,
        stream.remaining()
    );

    for (placed, (col, row)) in spec.placements().into_iter().enumerate() {
        let chunk = stream
            .take(tile_bytes)
            .map_err(|e| with_progress(e, placed, tiles_required))?;
        let tile = decode_tile(chunk, format)?;

        if tile.as_raw().iter().all(|&p| p == 0) {
            blank_tiles += 1;
        }

        let hash = calculate_image_hash(&tile);
        match unique.entry(hash) {
            Entry::Occupied(mut entry) => {
                // Confirm the match to rule out hash collisions
                if !entry.get().iter().any(|seen| tiles_are_identical(seen, &tile)) {
                    entry.get_mut().push(tile.clone());
                    unique_tiles += 1;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(vec![tile.clone()]);
                unique_tiles += 1;
            }
        }
        tile_hashes.push(hash);

        imageops::replace(
            &mut image,
            &tile,
            i64::from(col * format.width),
            i64::from(row * format.height),
        );
    }

    debug!(
        "Placed {} tiles, stream at byte {} with {} left",
        tile_hashes.len(),
        stream.position(),
        stream.remaining()
    );

    Ok(Sheet {
        image,
        tile_hashes,
        blank_tiles,
        unique_tiles,
    })
}

fn with_progress(err: RipError, tiles_placed: usize, tiles_required: usize) -> RipError {
    match err {
        RipError::StreamExhausted {
            requested,
            remaining,
            ..
        } => RipError::StreamExhausted {
            requested,
            remaining,
            tiles_placed,
            tiles_required,
        },
        other => other,
    }
}

fn tiles_are_identical(a: &GrayImage, b: &GrayImage) -> bool {
    a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw()
}

/// 64-bit hash of an image's pixel data
fn calculate_image_hash(image: &GrayImage) -> u64 {
    let mut hasher = XxHash64::default();
    image.as_raw().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn patterned_stream(tiles: usize) -> Vec<u8> {
        (0..tiles * 128)
            .map(|i| ((i / 128) as u8).wrapping_mul(37) ^ (i as u8))
            .collect()
    }

    fn spec(columns: u32, rows: u32, layout: Layout) -> SheetSpec {
        SheetSpec {
            columns,
            rows,
            layout,
            start_tile: 0,
        }
    }

    #[test]
    fn test_grid_quadrants_match_decoded_tiles() {
        let data = patterned_stream(4);
        let format = TileFormat::djmain_sprite();
        let mut stream = ByteStream::new(data.clone());

        let sheet = compose_sheet(&mut stream, &format, &spec(2, 2, Layout::Grid)).unwrap();
        assert_eq!(sheet.image.dimensions(), (32, 32));
        assert_eq!(stream.remaining(), 0);

        let cells = [(0, 0), (16, 0), (0, 16), (16, 16)];
        for (i, (x, y)) in cells.iter().enumerate() {
            let expected = decode_tile(&data[i * 128..(i + 1) * 128], &format).unwrap();
            let quadrant = sheet.image.view(*x, *y, 16, 16).to_image();
            assert_eq!(quadrant, expected, "tile {} misplaced", i);
        }
    }

    #[test]
    fn test_stream_exhausted() {
        let mut stream = ByteStream::new(patterned_stream(3));
        match compose_sheet(
            &mut stream,
            &TileFormat::djmain_sprite(),
            &spec(2, 2, Layout::Grid),
        ) {
            Err(RipError::StreamExhausted {
                tiles_placed,
                tiles_required,
                requested,
                remaining,
            }) => {
                assert_eq!(tiles_placed, 0);
                assert_eq!(tiles_required, 4);
                assert_eq!(requested, 512);
                assert_eq!(remaining, 384);
            }
            other => panic!("expected StreamExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_strip_placements() {
        let placements = spec(4, 2, Layout::Strips { strip_width: 2 }).placements();
        assert_eq!(
            placements,
            vec![
                (0, 0),
                (1, 0),
                (0, 1),
                (1, 1),
                (2, 0),
                (3, 0),
                (2, 1),
                (3, 1)
            ]
        );
    }

    #[test]
    fn test_grid_placements_are_row_major() {
        let placements = spec(3, 2, Layout::Grid).placements();
        assert_eq!(
            placements,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn test_strip_layout_pastes_third_tile_below_first() {
        let data = patterned_stream(8);
        let format = TileFormat::djmain_sprite();
        let mut stream = ByteStream::new(data.clone());

        let sheet =
            compose_sheet(&mut stream, &format, &spec(4, 2, Layout::Strips { strip_width: 2 }))
                .unwrap();
        let expected = decode_tile(&data[2 * 128..3 * 128], &format).unwrap();
        assert_eq!(sheet.image.view(0, 16, 16, 16).to_image(), expected);
    }

    #[test]
    fn test_start_tile_skips_chunks() {
        let data = patterned_stream(5);
        let format = TileFormat::djmain_sprite();
        let mut stream = ByteStream::new(data.clone());
        let sheet_spec = SheetSpec {
            start_tile: 3,
            ..spec(1, 1, Layout::Grid)
        };

        let sheet = compose_sheet(&mut stream, &format, &sheet_spec).unwrap();
        let expected = decode_tile(&data[3 * 128..4 * 128], &format).unwrap();
        assert_eq!(sheet.image, expected);

        let mut short = ByteStream::new(patterned_stream(2));
        assert!(matches!(
            compose_sheet(&mut short, &format, &sheet_spec),
            Err(RipError::StreamExhausted { .. })
        ));
    }

    #[test]
    fn test_tile_statistics() {
        let mut data = vec![0u8; 128 * 2];
        data.extend(patterned_stream(1));
        data.extend(patterned_stream(1));
        let mut stream = ByteStream::new(data);

        let sheet = compose_sheet(
            &mut stream,
            &TileFormat::djmain_sprite(),
            &spec(4, 1, Layout::Grid),
        )
        .unwrap();
        assert_eq!(sheet.blank_tiles, 2);
        assert_eq!(sheet.unique_tiles, 2);
    }

    #[test]
    fn test_invalid_sheet_specs() {
        assert!(spec(0, 1, Layout::Grid).validate().is_err());
        assert!(spec(3, 1, Layout::Strips { strip_width: 2 }).validate().is_err());
        assert!(spec(4, 1, Layout::Strips { strip_width: 0 }).validate().is_err());
        assert!(spec(4, 1, Layout::Strips { strip_width: 2 }).validate().is_ok());
    }

    #[test]
    fn test_huge_start_tile_is_exhaustion() {
        let mut stream = ByteStream::new(patterned_stream(2));
        let sheet_spec = SheetSpec {
            start_tile: 1 << 57,
            ..spec(1, 1, Layout::Grid)
        };

        match compose_sheet(&mut stream, &TileFormat::djmain_sprite(), &sheet_spec) {
            Err(RipError::StreamExhausted {
                requested,
                remaining,
                tiles_placed,
                tiles_required,
            }) => {
                assert_eq!(requested, usize::MAX);
                assert_eq!(remaining, 256);
                assert_eq!(tiles_placed, 0);
                assert_eq!(tiles_required, 1);
            }
            other => panic!("expected StreamExhausted, got {:?}", other),
        }
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_oversized_sheet_is_rejected_before_allocating() {
        let format = TileFormat::djmain_sprite();

        let mut stream = ByteStream::new(patterned_stream(1));
        assert!(matches!(
            compose_sheet(&mut stream, &format, &spec(300_000_000, 1, Layout::Grid)),
            Err(RipError::InvalidConfig(_))
        ));

        // Fits in u32 pixels but the stream cannot fill it.
        let mut stream = ByteStream::new(patterned_stream(1));
        match compose_sheet(&mut stream, &format, &spec(100_000, 100_000, Layout::Grid)) {
            Err(RipError::StreamExhausted {
                tiles_required,
                remaining,
                ..
            }) => {
                assert_eq!(tiles_required, 10_000_000_000);
                assert_eq!(remaining, 128);
            }
            other => panic!("expected StreamExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_tiles_are_identical() {
        let format = TileFormat::djmain_sprite();
        let data = patterned_stream(2);
        let a = decode_tile(&data[..128], &format).unwrap();
        let b = decode_tile(&data[128..], &format).unwrap();
        assert!(tiles_are_identical(&a, &a.clone()));
        assert!(!tiles_are_identical(&a, &b));
        assert!(!tiles_are_identical(&a, &GrayImage::new(8, 8)));
    }
}
