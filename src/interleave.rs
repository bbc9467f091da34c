//! Loading ROM chip dumps and weaving them into a single byte stream.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    error::{Result, RipError},
    stream::ByteStream,
};

/// Raw dump of a single ROM chip
#[derive(Debug, Clone)]
pub struct RomImage {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl RomImage {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let read = |path: &Path| -> std::io::Result<Vec<u8>> {
            let mut file = File::open(path)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            Ok(data)
        };

        let data = read(path.as_path()).map_err(|source| RipError::RomRead {
            path: path.clone(),
            source,
        })?;
        debug!("Read {} bytes from {}", data.len(), path.display());

        Ok(RomImage { path, data })
    }
}

/// The set of ROM chips wired to the same bus, in interleave order
#[derive(Debug, Clone)]
pub struct RomSet {
    roms: Vec<RomImage>,
}

impl RomSet {
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(RipError::NoRoms);
        }

        let roms = paths
            .iter()
            .map(RomImage::load)
            .collect::<Result<Vec<_>>>()?;

        info!("Loaded {} ROM files", roms.len());
        Ok(RomSet { roms })
    }

    #[cfg(test)]
    pub fn from_images(roms: Vec<RomImage>) -> Result<Self> {
        if roms.is_empty() {
            return Err(RipError::NoRoms);
        }
        Ok(RomSet { roms })
    }

    pub fn roms(&self) -> &[RomImage] {
        &self.roms
    }

    /// Take `bytes_per_read` bytes from each ROM in turn until `bytes_per_rom`
    /// bytes have been read from every ROM.
    pub fn interleave(&self, bytes_per_rom: usize, bytes_per_read: usize) -> Result<ByteStream> {
        if bytes_per_read == 0 {
            return Err(RipError::InvalidConfig(
                "bytes_per_read must be at least 1".to_string(),
            ));
        }
        if !bytes_per_rom.is_multiple_of(bytes_per_read) {
            return Err(RipError::InvalidConfig(format!(
                "bytes_per_rom ({}) is not a multiple of bytes_per_read ({})",
                bytes_per_rom, bytes_per_read
            )));
        }

        for rom in &self.roms {
            if rom.data.len() < bytes_per_rom {
                return Err(RipError::ShortRom {
                    path: rom.path.clone(),
                    required: bytes_per_rom,
                    available: rom.data.len(),
                });
            }
        }

        let mut interleaved = Vec::with_capacity(bytes_per_rom * self.roms.len());
        for offset in (0..bytes_per_rom).step_by(bytes_per_read) {
            for rom in &self.roms {
                interleaved.extend_from_slice(&rom.data[offset..offset + bytes_per_read]);
            }
        }

        let stream = ByteStream::new(interleaved);
        info!(
            "Interleaved {} ROMs into {} bytes ({} bytes per read)",
            self.roms.len(),
            stream.len(),
            bytes_per_read
        );
        Ok(stream)
    }
}
