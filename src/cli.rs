use std::path::PathBuf;

use clap::Parser;

use crate::{
    config::{FormatChoice, RipConfig},
    error::Result,
    sheet::Layout,
};

/// Rip 16x16 tile graphics out of interleaved arcade ROM dumps into a grayscale sheet.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// ROM chip dumps, in interleave order
    pub roms: Vec<PathBuf>,

    /// JSON configuration file; flags given here override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bytes read from each ROM
    #[arg(short = 'n', long)]
    pub bytes_per_rom: Option<usize>,

    /// Bytes taken from one ROM before moving to the next
    #[arg(long)]
    pub bytes_per_read: Option<usize>,

    /// Built-in tile format (see --list-formats)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Sheet width in tiles
    #[arg(long)]
    pub columns: Option<u32>,

    /// Sheet height in tiles
    #[arg(long)]
    pub rows: Option<u32>,

    /// Place tiles in vertical strips this many tiles wide instead of a plain grid
    #[arg(long)]
    pub strip_width: Option<u32>,

    /// Number of tiles to skip before the first one placed
    #[arg(long)]
    pub start_tile: Option<usize>,

    /// Write the PNG without oxipng optimisation
    #[arg(long, default_value_t = false)]
    pub no_optimise: bool,

    /// Do not write the JSON metadata file next to the sheet
    #[arg(long, default_value_t = false)]
    pub no_metadata: bool,

    /// Print the built-in tile formats and exit
    #[arg(long, default_value_t = false)]
    pub list_formats: bool,
}

impl Args {
    /// Build the run configuration: defaults, then the config file, then flags.
    pub fn into_config(self) -> Result<RipConfig> {
        let mut config = match &self.config {
            Some(path) => RipConfig::load(path)?,
            None => RipConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(self, config: &mut RipConfig) {
        if !self.roms.is_empty() {
            config.roms = self.roms;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(n) = self.bytes_per_rom {
            config.bytes_per_rom = n;
        }
        if let Some(n) = self.bytes_per_read {
            config.bytes_per_read = n;
        }
        if let Some(name) = self.format {
            config.format = FormatChoice::Builtin(name);
        }
        if let Some(columns) = self.columns {
            config.sheet.columns = columns;
        }
        if let Some(rows) = self.rows {
            config.sheet.rows = rows;
        }
        if let Some(strip_width) = self.strip_width {
            config.sheet.layout = Layout::Strips { strip_width };
        }
        if let Some(start_tile) = self.start_tile {
            config.sheet.start_tile = start_tile;
        }
        if self.no_optimise {
            config.optimise = false;
        }
        if self.no_metadata {
            config.metadata = false;
        }
    }
}
