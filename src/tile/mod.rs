//! Tile formats and the bit-level tile decoder.

pub mod decode;
pub mod format;

pub use decode::decode_tile;
pub use format::TileFormat;
