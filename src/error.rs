use std::{io, path::PathBuf};

use image::ImageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RipError {
    #[error("Failed to read ROM {}: {source}", .path.display())]
    RomRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ROM {} is too short: {required} bytes requested, {available} available", .path.display())]
    ShortRom {
        path: PathBuf,
        required: usize,
        available: usize,
    },
    #[error("Not enough data to decode tile: {required_bits} bits required, {available_bits} available")]
    InsufficientData {
        required_bits: usize,
        available_bits: usize,
    },
    #[error(
        "Byte stream exhausted after {tiles_placed} of {tiles_required} tiles: \
         {requested} bytes requested, {remaining} remaining"
    )]
    StreamExhausted {
        requested: usize,
        remaining: usize,
        tiles_placed: usize,
        tiles_required: usize,
    },
    #[error("Invalid tile format: {0}")]
    InvalidFormat(String),
    #[error("Unknown tile format: {0}")]
    UnknownFormat(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("No ROM files given")]
    NoRoms,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RipError>;
