//! Splits a device tree blob appended to a firmware binary

use std::path::Path;

use crate::error::{MkImageError, Result};

/// Flattened device tree magic, big-endian on disk
pub const FDT_MAGIC: u32 = 0xD00D_FEED;

pub const DEFAULT_FIRMWARE_OUT: &str = "gen-u-boot-nodtb.bin";
pub const DEFAULT_DTB_OUT: &str = "gen-uboot.dtb";

fn be32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Location of the device tree found in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtbLocation {
    pub offset: usize,
    /// Value of the length word following the magic
    pub length: usize,
}

/// Find the last 4-byte aligned FDT header in `data`.
///
/// The scan walks backward from the highest aligned offset that still holds
/// a magic and a length word, down to offset 0.
pub fn locate_dtb(data: &[u8]) -> Result<DtbLocation> {
    if data.len() >= 8 {
        let start = (data.len() - 8) & !3;
        for offset in (0..=start).rev().step_by(4) {
            if be32(data, offset) == Some(FDT_MAGIC) {
                let length = be32(data, offset + 4).unwrap_or_default() as usize;
                return Ok(DtbLocation { offset, length });
            }
        }
    }
    Err(MkImageError::format("no device tree found"))
}

/// Split `data` into the bytes before the device tree and the tree itself
pub fn split_dtb(data: &[u8]) -> Result<(&[u8], &[u8])> {
    let loc = locate_dtb(data)?;
    let end = loc
        .offset
        .checked_add(loc.length)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            MkImageError::format(format!(
                "device tree at offset 0x{:x} declares 0x{:x} bytes, only 0x{:x} available",
                loc.offset,
                loc.length,
                data.len() - loc.offset
            ))
        })?;
    Ok((&data[..loc.offset], &data[loc.offset..end]))
}

/// Split `input` into `firmware_out` and `dtb_out`
pub fn split_dtb_file<P, Q, R>(input: P, firmware_out: Q, dtb_out: R) -> Result<DtbLocation>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let input = input.as_ref();
    let data = std::fs::read(input).map_err(|e| MkImageError::file(input, e))?;

    let (firmware, dtb) = split_dtb(&data).map_err(|e| match e {
        MkImageError::Format(msg) => MkImageError::Format(format!("{msg} in {}", input.display())),
        other => other,
    })?;
    let loc = DtbLocation {
        offset: firmware.len(),
        length: dtb.len(),
    };
    info!(
        "DTB locates at offset 0x{:x}, size 0x{:x}",
        loc.offset, loc.length
    );

    let firmware_out = firmware_out.as_ref();
    std::fs::write(firmware_out, firmware).map_err(|e| MkImageError::file(firmware_out, e))?;
    info!("Generated {}", firmware_out.display());

    let dtb_out = dtb_out.as_ref();
    std::fs::write(dtb_out, dtb).map_err(|e| MkImageError::file(dtb_out, e))?;
    info!("Generated {}", dtb_out.display());

    Ok(loc)
}
