mod bits;
mod cli;
mod config;
mod error;
mod interleave;
mod output;
mod sheet;
mod stream;
mod tile;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cli::Args;
use config::RipConfig;
use interleave::RomSet;
use output::{metadata_path, save_sheet, write_metadata, SheetMetadata};
use sheet::compose_sheet;
use tile::TileFormat;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list_formats {
        for name in TileFormat::builtin_names() {
            let format = TileFormat::builtin(name)?;
            println!(
                "{:<16} {}x{} {}bpp, {} bytes per tile",
                name,
                format.width,
                format.height,
                format.bits_per_pixel,
                format.bytes_per_tile()
            );
        }
        return Ok(());
    }

    let config = args.into_config().context("Failed to load configuration")?;
    run(&config)
}

fn run(config: &RipConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let format = config.format.resolve()?;
    info!(
        "Tile format {}: {}x{} @ {}bpp",
        format.name, format.width, format.height, format.bits_per_pixel
    );

    let roms = RomSet::load(&config.roms).context("Failed to load ROMs")?;
    let mut stream = roms
        .interleave(config.bytes_per_rom, config.bytes_per_read)
        .context("Failed to interleave ROMs")?;

    let sheet = compose_sheet(&mut stream, &format, &config.sheet)
        .context("Failed to compose tile sheet")?;

    save_sheet(&sheet.image, &config.output, config.optimise)
        .with_context(|| format!("Failed to save {}", config.output.display()))?;

    if config.metadata {
        let metadata = SheetMetadata::new(
            &config.output,
            &sheet,
            &config.sheet,
            &format,
            &roms,
            config.bytes_per_rom,
            config.bytes_per_read,
        );
        write_metadata(&metadata, &metadata_path(&config.output))
            .context("Failed to write metadata")?;
        info!(
            "{} tiles placed, {} unique, {} blank",
            metadata.tiles_placed, metadata.unique_tiles, metadata.blank_tiles
        );
    }

    info!("Processing complete!");
    Ok(())
}
