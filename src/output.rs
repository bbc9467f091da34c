//! Writing the finished sheet and its metadata sidecar.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use image::GrayImage;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    interleave::RomSet,
    sheet::{Layout, Sheet, SheetSpec},
    tile::TileFormat,
};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RomInfo {
    pub path: String,
    pub size: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SheetMetadata {
    /// File name of the PNG this metadata describes.
    pub image: String,
    pub width: u32,
    pub height: u32,
    pub columns: u32,
    pub rows: u32,
    pub layout: Layout,
    pub format: TileFormat,
    pub roms: Vec<RomInfo>,
    pub bytes_per_rom: usize,
    pub bytes_per_read: usize,
    pub start_tile: usize,
    pub tiles_placed: usize,
    pub blank_tiles: usize,
    pub unique_tiles: usize,
    /// XxHash64 of the raw sheet pixels, hex encoded.
    pub sheet_hash: String,
}

impl SheetMetadata {
    pub fn new(
        image_path: &Path,
        sheet: &Sheet,
        spec: &SheetSpec,
        format: &TileFormat,
        roms: &RomSet,
        bytes_per_rom: usize,
        bytes_per_read: usize,
    ) -> Self {
        SheetMetadata {
            image: image_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            width: sheet.image.width(),
            height: sheet.image.height(),
            columns: spec.columns,
            rows: spec.rows,
            layout: spec.layout,
            format: format.clone(),
            roms: roms
                .roms()
                .iter()
                .map(|rom| RomInfo {
                    path: rom.path.display().to_string(),
                    size: rom.data.len(),
                })
                .collect(),
            bytes_per_rom,
            bytes_per_read,
            start_tile: spec.start_tile,
            tiles_placed: sheet.tile_hashes.len(),
            blank_tiles: sheet.blank_tiles,
            unique_tiles: sheet.unique_tiles,
            sheet_hash: format!("{:016x}", sheet.image_hash()),
        }
    }
}

/// Path of the metadata file written next to `image_path`: `sheet.png` -> `sheet.meta.json`.
///
/// The extra `meta` component keeps it clear of a `sheet.json` run configuration.
pub fn metadata_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("meta.json")
}

pub fn write_metadata(metadata: &SheetMetadata, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, metadata)?;
    debug!("Wrote metadata to {}", path.display());
    Ok(())
}

/// Save the sheet as a grayscale PNG, optionally running it through oxipng.
///
/// Optimisation failures are not fatal; the unoptimised file is kept instead.
pub fn save_sheet(image: &GrayImage, path: &Path, optimise: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    if !optimise {
        image.save(path)?;
        info!("Saved sheet to {}", path.display());
        return Ok(());
    }

    let temp_path = path.with_extension("tmp.png");
    image.save(&temp_path)?;

    let mut options = oxipng::Options::from_preset(2);
    options.bit_depth_reduction = true;

    match oxipng::optimize(
        &oxipng::InFile::Path(temp_path.clone()),
        &oxipng::OutFile::Path(Some(path.to_path_buf())),
        &options,
    ) {
        Ok(_) => {
            if let Err(e) = fs::remove_file(&temp_path) {
                warn!("Failed to remove temporary file {}: {}", temp_path.display(), e);
            }
        }
        Err(e) => {
            fs::rename(&temp_path, path)?;
            warn!(
                "oxipng optimisation failed for {}: {}. File saved unoptimised.",
                path.display(),
                e
            );
        }
    }

    info!("Saved sheet to {}", path.display());
    Ok(())
}
