//! Run configuration.
//!
//! Values come from built-in defaults, then an optional JSON file, then command line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, RipError},
    sheet::SheetSpec,
    tile::TileFormat,
};

/// Tile format selection: a built-in by name or a full custom table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatChoice {
    Builtin(String),
    Custom(TileFormat),
}

impl Default for FormatChoice {
    fn default() -> Self {
        FormatChoice::Builtin(crate::tile::format::DJMAIN_SPRITE.to_string())
    }
}

impl FormatChoice {
    pub fn resolve(&self) -> Result<TileFormat> {
        let format = match self {
            FormatChoice::Builtin(name) => TileFormat::builtin(name)?,
            FormatChoice::Custom(format) => format.clone(),
        };
        format.validate()?;
        Ok(format)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RipConfig {
    /// ROM chip dumps in interleave order
    pub roms: Vec<PathBuf>,
    pub bytes_per_rom: usize,
    pub bytes_per_read: usize,
    pub format: FormatChoice,
    pub sheet: SheetSpec,
    pub output: PathBuf,
    pub optimise: bool,
    pub metadata: bool,
}

impl Default for RipConfig {
    fn default() -> Self {
        Self {
            roms: Vec::new(),
            bytes_per_rom: 524288, // 512 KiB sprite chips
            bytes_per_read: 1,
            format: FormatChoice::default(),
            sheet: SheetSpec::default(),
            output: PathBuf::from("sheet.png"),
            optimise: true,
            metadata: true,
        }
    }
}

impl RipConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: RipConfig = serde_json::from_str(&contents)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    #[cfg(test)]
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject settings that would fail halfway through a run.
    pub fn validate(&self) -> Result<()> {
        if self.roms.is_empty() {
            return Err(RipError::NoRoms);
        }
        if self.bytes_per_read == 0 || !self.bytes_per_rom.is_multiple_of(self.bytes_per_read) {
            return Err(RipError::InvalidConfig(format!(
                "bytes_per_rom ({}) must be a multiple of bytes_per_read ({})",
                self.bytes_per_rom, self.bytes_per_read
            )));
        }
        self.sheet.validate()?;
        self.format.resolve()?;
        Ok(())
    }
}
