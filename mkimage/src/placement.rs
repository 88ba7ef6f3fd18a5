//! Copies firmware components into an output image at fixed offsets

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MkImageError, Result};

/// Largest zero run written by one call when filling to size
pub const PAD_CHUNK_SIZE: usize = 4096;

static ZEROS: [u8; PAD_CHUNK_SIZE] = [0; PAD_CHUNK_SIZE];

/// Padding written after a placed component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PadMode {
    /// Source bytes only
    #[default]
    #[serde(rename = "none")]
    None,
    /// Round the component up to a 4-byte boundary
    #[serde(rename = "align4")]
    AlignTo4,
    /// Pad the component with zeros up to the target size
    #[serde(rename = "fill")]
    FillToSize,
}

/// Size of a component file
pub fn file_size<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MkImageError::file(path, e))?;
    let meta = file.metadata().map_err(|e| MkImageError::file(path, e))?;
    Ok(meta.len())
}

/// Open an image for placement, creating it when missing
pub fn open_output<P: AsRef<Path>>(path: P, truncate: bool) -> Result<File> {
    let path = path.as_ref();
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(truncate)
        .open(path)
        .map_err(|e| MkImageError::file(path, e))
}

fn write_zeros<W: Write>(output: &mut W, mut len: u64) -> std::io::Result<()> {
    while len > 0 {
        let todo = len.min(PAD_CHUNK_SIZE as u64) as usize;
        output.write_all(&ZEROS[..todo])?;
        len -= todo as u64;
    }
    Ok(())
}

/// Copy `source` into `output` at `offset` and pad it as requested.
///
/// `target_size` is only used by [`PadMode::FillToSize`]; a source larger
/// than the target gets no padding. An empty source writes nothing.
/// Returns the number of bytes written.
pub fn place<W, P>(
    output: &mut W,
    source: P,
    target_size: u64,
    offset: u64,
    pad: PadMode,
) -> Result<u64>
where
    W: Write + Seek,
    P: AsRef<Path>,
{
    let source = source.as_ref();
    let data = std::fs::read(source).map_err(|e| MkImageError::file(source, e))?;

    output.seek(SeekFrom::Start(offset))?;
    if data.is_empty() {
        debug!("{}: empty, nothing placed", source.display());
        return Ok(0);
    }

    output.write_all(&data)?;
    let size = data.len() as u64;

    let padding = match pad {
        PadMode::None => 0,
        PadMode::AlignTo4 => match size % 4 {
            0 => 0,
            tail => 4 - tail,
        },
        PadMode::FillToSize => target_size.saturating_sub(size),
    };
    write_zeros(output, padding)?;

    info!(
        "{}: {} bytes at offset 0x{:x}, {} bytes padding",
        source.display(),
        size,
        offset,
        padding
    );
    Ok(size + padding)
}
