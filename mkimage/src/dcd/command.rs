//! DCD command names and their wire encoding

use std::fmt;
use std::str::FromStr;

use crate::error::SyntaxError;

/// Tag of every write-class command entry
pub const DCD_WRITE_DATA_COMMAND_TAG: u8 = 0xCC;
/// Tag of every check-class command entry
pub const DCD_CHECK_DATA_COMMAND_TAG: u8 = 0xCF;

/// `*address = value`
pub const DCD_WRITE_DATA_PARAM: u8 = 0x04;
/// `*address &= !mask`
pub const DCD_WRITE_CLR_BIT_PARAM: u8 = 0x0C;
/// `*address |= mask`
pub const DCD_WRITE_SET_BIT_PARAM: u8 = 0x1C;
/// `(*address & mask) == mask`
pub const DCD_CHECK_BITS_SET_PARAM: u8 = 0x14;
/// `(*address & mask) == 0`
pub const DCD_CHECK_BITS_CLR_PARAM: u8 = 0x04;
/// `(*address & mask) != mask`
pub const DCD_CHECK_ANY_BIT_CLR_PARAM: u8 = 0x0C;
/// `(*address & mask) != 0`
pub const DCD_CHECK_ANY_BIT_SET_PARAM: u8 = 0x1C;

/// Commands accepted in a DCD configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ImageVersion,
    BootFrom,
    BootOffset,
    WriteData,
    ClearBit,
    SetBit,
    CheckBitsSet,
    CheckBitsClear,
    CheckAnyBitSet,
    CheckAnyBitClear,
    Csf,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::BootFrom,
        Command::BootOffset,
        Command::WriteData,
        Command::ClearBit,
        Command::SetBit,
        Command::CheckBitsSet,
        Command::CheckBitsClear,
        Command::CheckAnyBitSet,
        Command::CheckAnyBitClear,
        Command::Csf,
        Command::ImageVersion,
    ];

    /// Name as written in a configuration file
    pub fn name(self) -> &'static str {
        match self {
            Self::ImageVersion => "IMAGE_VERSION",
            Self::BootFrom => "BOOT_FROM",
            Self::BootOffset => "BOOT_OFFSET",
            Self::WriteData => "DATA",
            Self::ClearBit => "CLR_BIT",
            Self::SetBit => "SET_BIT",
            Self::CheckBitsSet => "CHECK_BITS_SET",
            Self::CheckBitsClear => "CHECK_BITS_CLR",
            Self::CheckAnyBitSet => "CHECK_ANY_BIT_SET",
            Self::CheckAnyBitClear => "CHECK_ANY_BIT_CLR",
            Self::Csf => "CSF",
        }
    }

    /// Human readable description used in diagnostics
    pub fn description(self) -> &'static str {
        match self {
            Self::ImageVersion => "image version",
            Self::BootFrom => "boot command",
            Self::BootOffset => "Boot offset",
            Self::WriteData => "Reg Write Data",
            Self::ClearBit => "Reg clear bit",
            Self::SetBit => "Reg set bit",
            Self::CheckBitsSet => "Reg Check all bits set",
            Self::CheckBitsClear => "Reg Check all bits clr",
            Self::CheckAnyBitSet => "Reg Check any bit set",
            Self::CheckAnyBitClear => "Reg Check any bit clr",
            Self::Csf => "Command Sequence File",
        }
    }

    /// Case-insensitive lookup in the command table
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.name().eq_ignore_ascii_case(name))
    }

    /// The register operation encoded by this command, if it touches registers
    pub fn operation(self) -> Option<Operation> {
        let op = match self {
            Self::WriteData => Operation::WRITE_DATA,
            Self::ClearBit => Operation::CLEAR_BIT,
            Self::SetBit => Operation::SET_BIT,
            Self::CheckBitsSet => Operation::CHECK_BITS_SET,
            Self::CheckBitsClear => Operation::CHECK_BITS_CLR,
            Self::CheckAnyBitSet => Operation::CHECK_ANY_BIT_SET,
            Self::CheckAnyBitClear => Operation::CHECK_ANY_BIT_CLR,
            Self::ImageVersion | Self::BootFrom | Self::BootOffset | Self::Csf => return None,
        };
        Some(op)
    }
}

impl FromStr for Command {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| SyntaxError::UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// (tag, parameter) pair identifying one kind of command entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    pub tag: u8,
    pub param: u8,
}

impl Operation {
    pub const WRITE_DATA: Self = Self::write(DCD_WRITE_DATA_PARAM);
    pub const CLEAR_BIT: Self = Self::write(DCD_WRITE_CLR_BIT_PARAM);
    pub const SET_BIT: Self = Self::write(DCD_WRITE_SET_BIT_PARAM);
    pub const CHECK_BITS_SET: Self = Self::check(DCD_CHECK_BITS_SET_PARAM);
    pub const CHECK_BITS_CLR: Self = Self::check(DCD_CHECK_BITS_CLR_PARAM);
    pub const CHECK_ANY_BIT_SET: Self = Self::check(DCD_CHECK_ANY_BIT_SET_PARAM);
    pub const CHECK_ANY_BIT_CLR: Self = Self::check(DCD_CHECK_ANY_BIT_CLR_PARAM);

    const fn write(param: u8) -> Self {
        Self {
            tag: DCD_WRITE_DATA_COMMAND_TAG,
            param,
        }
    }

    const fn check(param: u8) -> Self {
        Self {
            tag: DCD_CHECK_DATA_COMMAND_TAG,
            param,
        }
    }

    /// Write-class entries may hold several address/value pairs
    pub fn is_write(self) -> bool {
        self.tag == DCD_WRITE_DATA_COMMAND_TAG
    }

    pub fn is_check(self) -> bool {
        self.tag == DCD_CHECK_DATA_COMMAND_TAG
    }
}
