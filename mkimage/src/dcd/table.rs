//! DCD command table encoder
//!
//! [`DcdBuilder`] turns a stream of register operations into packed command
//! entries. Consecutive write-class operations with the same parameter are
//! coalesced into one multi-pair entry; check-class operations always get an
//! entry of their own. [`DcdBuilder::finalize`] stamps the header and hands
//! out the read-only [`DcdTable`].

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use super::command::Operation;
use crate::error::{MkImageError, Result};

/// Tag byte of the DCD header
pub const DCD_HEADER_TAG: u8 = 0xD2;
/// Version byte of the DCD header
pub const DCD_VERSION: u8 = 0x43;
/// Maximum number of address/value pairs the boot ROM accepts
pub const MAX_HW_CFG_SIZE_V2: usize = 359;

/// Size of the table header and of each entry header
pub const DCD_HEADER_SIZE: usize = 4;
/// Size of one address/value pair
pub const DCD_PAIR_SIZE: usize = 8;

/// Table header as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DcdHeader {
    pub tag: u8,
    pub length: u16,
    pub version: u8,
}

/// One register address and the value or mask applied to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddrData {
    pub addr: u32,
    pub value: u32,
}

/// A packed command entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    op: Operation,
    pairs: Vec<AddrData>,
    // address waiting for its value, lives in slot `pairs.len()`
    pending: Option<u32>,
}

impl CommandEntry {
    fn new(op: Operation) -> Self {
        Self {
            op,
            pairs: Vec::new(),
            pending: None,
        }
    }

    pub fn operation(&self) -> Operation {
        self.op
    }

    pub fn tag(&self) -> u8 {
        self.op.tag
    }

    pub fn param(&self) -> u8 {
        self.op.param
    }

    pub fn pairs(&self) -> &[AddrData] {
        &self.pairs
    }

    /// Entry length in bytes, header included
    pub fn byte_len(&self) -> usize {
        DCD_HEADER_SIZE + DCD_PAIR_SIZE * self.pairs.len()
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u8(self.op.tag)?;
        writer.write_u16::<BigEndian>(self.byte_len() as u16)?;
        writer.write_u8(self.op.param)?;
        for pair in &self.pairs {
            writer.write_u32::<BigEndian>(pair.addr)?;
            writer.write_u32::<BigEndian>(pair.value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum EncoderState {
    #[default]
    Empty,
    /// The last entry may still accept pairs
    Open,
    Finalized,
}

/// Stateful encoder for one DCD table
#[derive(Debug, Clone)]
pub struct DcdBuilder {
    entries: Vec<CommandEntry>,
    state: EncoderState,
    pair_count: usize,
    max_pairs: usize,
}

impl DcdBuilder {
    pub fn new() -> Self {
        Self::with_max_pairs(MAX_HW_CFG_SIZE_V2)
    }

    pub fn with_max_pairs(max_pairs: usize) -> Self {
        Self {
            entries: Vec::new(),
            state: EncoderState::Empty,
            pair_count: 0,
            max_pairs,
        }
    }

    /// Number of complete address/value pairs encoded so far
    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    pub fn max_pairs(&self) -> usize {
        self.max_pairs
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }


    /// Byte offset from the header to the end of the last complete entry
    pub fn end_offset(&self) -> usize {
        DCD_HEADER_SIZE
            + self
                .entries
                .iter()
                .filter(|e| !e.pairs.is_empty())
                .map(CommandEntry::byte_len)
                .sum::<usize>()
    }

    /// Make sure the open entry encodes `op`, starting a new entry when needed.
    fn select(&mut self, op: Operation) -> Result<&mut CommandEntry> {
        match self.state {
            EncoderState::Finalized => {
                return Err(MkImageError::Protocol("DCD table is already finalized"));
            }
            EncoderState::Empty => {
                self.entries.push(CommandEntry::new(op));
                self.state = EncoderState::Open;
            }
            EncoderState::Open => {
                let Some(last) = self.entries.last_mut() else {
                    return Err(MkImageError::Protocol("open DCD entry is missing"));
                };
                if last.op == op && op.is_write() {
                    // coalesce
                } else if last.pairs.is_empty() {
                    // nothing committed yet, reuse the slot
                    last.op = op;
                } else {
                    self.entries.push(CommandEntry::new(op));
                }
            }
        }

        self.entries
            .last_mut()
            .ok_or(MkImageError::Protocol("open DCD entry is missing"))
    }

    /// Open an entry for `op` without storing anything in it.
    ///
    /// An open entry of another kind stops collecting pairs.
    pub fn open(&mut self, op: Operation) -> Result<()> {
        self.select(op).map(|_| ())
    }

    /// Store the address of the next pair of `op`
    pub fn set_address(&mut self, op: Operation, addr: u32) -> Result<()> {
        let entry = self.select(op)?;
        entry.pending = Some(addr);
        Ok(())
    }

    /// Store the value of the pending pair of `op` and commit the pair
    pub fn set_value(&mut self, op: Operation, value: u32) -> Result<()> {
        let max_pairs = self.max_pairs;
        let pair_count = self.pair_count;
        let entry = self.select(op)?;
        let Some(addr) = entry.pending else {
            return Err(MkImageError::Protocol("DCD value set before its address"));
        };
        if pair_count >= max_pairs {
            return Err(MkImageError::Capacity {
                what: "DCD table",
                max: max_pairs,
            });
        }
        entry.pending = None;
        entry.pairs.push(AddrData { addr, value });
        self.pair_count += 1;
        Ok(())
    }

    /// Encode one complete register operation
    pub fn push(&mut self, op: Operation, addr: u32, value: u32) -> Result<()> {
        self.set_address(op, addr)?;
        self.set_value(op, value)
    }

    /// Stamp the header and return the finished table.
    ///
    /// May be called once; any later encoding or finalization fails.
    pub fn finalize(&mut self) -> Result<DcdTable> {
        if self.state == EncoderState::Finalized {
            return Err(MkImageError::Protocol("DCD table finalized twice"));
        }

        let length = self.end_offset();
        let length = u16::try_from(length).map_err(|_| MkImageError::Capacity {
            what: "DCD table length",
            max: u16::MAX as usize,
        })?;

        self.state = EncoderState::Finalized;
        let mut entries = std::mem::take(&mut self.entries);
        entries.retain(|e| !e.pairs.is_empty());

        let table = DcdTable {
            header: DcdHeader {
                tag: DCD_HEADER_TAG,
                length,
                version: DCD_VERSION,
            },
            entries,
        };
        info!("dcd size in bytes = {}", length);
        Ok(table)
    }
}

impl Default for DcdBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finalized DCD table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcdTable {
    header: DcdHeader,
    entries: Vec<CommandEntry>,
}

impl DcdTable {
    pub fn header(&self) -> DcdHeader {
        self.header
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Total encoded size in bytes, equal to the header length field
    pub fn byte_len(&self) -> usize {
        self.header.length as usize
    }

    pub fn pair_count(&self) -> usize {
        self.entries.iter().map(|e| e.pairs.len()).sum()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.header.tag)?;
        writer.write_u16::<BigEndian>(self.header.length)?;
        writer.write_u8(self.header.version)?;
        for entry in &self.entries {
            entry.write_to(writer)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.byte_len());
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    pub fn print_info(&self) {
        println!(
            "DCD table: tag 0x{:02x}, version 0x{:02x}, {} bytes, {} entries",
            self.header.tag,
            self.header.version,
            self.header.length,
            self.entries.len()
        );
        for (i, entry) in self.entries.iter().enumerate() {
            println!(
                "  [{i}] tag 0x{:02x} param 0x{:02x} length {}",
                entry.tag(),
                entry.param(),
                entry.byte_len()
            );
            for pair in &entry.pairs {
                println!("      0x{:08x} 0x{:08x}", pair.addr, pair.value);
            }
        }
    }
}
