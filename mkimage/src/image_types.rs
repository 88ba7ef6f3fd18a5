//! Image kinds, processor cores and routing ids for container components

use std::fmt;
use std::str::FromStr;

use crate::error::{MkImageError, Result};

/// Role of one component in a boot container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// Terminal sentinel closing an image list
    End,
    /// Device configuration data
    Dcd,
    /// System controller firmware
    Scfw,
    /// Security controller firmware
    Seco,
    /// Cortex-M4/M33 image
    M4,
    /// Cortex-M7 image
    M7,
    /// Application processor image
    Ap,
    /// System controller board configuration data
    Scd,
    /// Command sequence file (signature payload)
    Csf,
    /// Container flags word
    Flag,
    /// Start of the next container
    NewContainer,
    /// Pre-built container appended verbatim
    Append,
    /// Raw data placed for a core
    Data,
    /// Partition switch
    Partition,
    /// Explicit file offset for the next image
    FileOffset,
    /// Message block for the security controller
    MsgBlock,
    /// EdgeLock secure enclave firmware
    Sentinel,
    /// uPower firmware
    Upower,
    /// FlexSPI configuration block
    Fcb,
    /// Placeholder V2X image
    DummyV2x,
    /// Optional executable image run before the bootloader
    Oei,
    /// Reserved hole in the image
    Hold,
    /// Boot mode select
    Msel,
}

impl ImageKind {
    /// True when a component of this kind is read from a file
    pub fn has_source(self) -> bool {
        matches!(
            self,
            Self::Dcd
                | Self::Scfw
                | Self::Seco
                | Self::M4
                | Self::M7
                | Self::Ap
                | Self::Scd
                | Self::Csf
                | Self::Append
                | Self::Data
                | Self::MsgBlock
                | Self::Sentinel
                | Self::Upower
                | Self::Fcb
                | Self::Oei
        )
    }
}

impl FromStr for ImageKind {
    type Err = MkImageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dcd" => Ok(Self::Dcd),
            "scfw" => Ok(Self::Scfw),
            "seco" => Ok(Self::Seco),
            "m4" | "m33" => Ok(Self::M4),
            "m7" => Ok(Self::M7),
            "ap" => Ok(Self::Ap),
            "scd" => Ok(Self::Scd),
            "csf" => Ok(Self::Csf),
            "flag" | "flags" => Ok(Self::Flag),
            "container" | "new_container" => Ok(Self::NewContainer),
            "append" => Ok(Self::Append),
            "data" => Ok(Self::Data),
            "partition" => Ok(Self::Partition),
            "fileoff" | "file_offset" => Ok(Self::FileOffset),
            "msg_blk" | "msg_block" => Ok(Self::MsgBlock),
            "sentinel" => Ok(Self::Sentinel),
            "upower" => Ok(Self::Upower),
            "fcb" => Ok(Self::Fcb),
            "dummy" | "dummy_v2x" => Ok(Self::DummyV2x),
            "oei" => Ok(Self::Oei),
            "hold" => Ok(Self::Hold),
            "msel" => Ok(Self::Msel),
            _ => Err(MkImageError::unsupported("image kind", s)),
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::End => "end",
            Self::Dcd => "dcd",
            Self::Scfw => "scfw",
            Self::Seco => "seco",
            Self::M4 => "m4",
            Self::M7 => "m7",
            Self::Ap => "ap",
            Self::Scd => "scd",
            Self::Csf => "csf",
            Self::Flag => "flag",
            Self::NewContainer => "container",
            Self::Append => "append",
            Self::Data => "data",
            Self::Partition => "partition",
            Self::FileOffset => "fileoff",
            Self::MsgBlock => "msg_blk",
            Self::Sentinel => "sentinel",
            Self::Upower => "upower",
            Self::Fcb => "fcb",
            Self::DummyV2x => "dummy",
            Self::Oei => "oei",
            Self::Hold => "hold",
            Self::Msel => "msel",
        };
        write!(f, "{}", name)
    }
}

/// Processor cores an image can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreId {
    Sc,
    Cm4_0,
    Cm4_1,
    Ca53,
    Ca35,
    Ca72,
    Seco,
}

impl CoreId {
    /// Numeric core id stored in the container image entry
    pub fn id(self) -> u32 {
        match self {
            Self::Sc => 0x1,
            Self::Cm4_0 => 0x2,
            Self::Cm4_1 => 0x3,
            Self::Ca53 | Self::Ca35 => 0x4,
            Self::Ca72 => 0x5,
            Self::Seco => 0x6,
        }
    }
}

impl FromStr for CoreId {
    type Err = MkImageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sc" => Ok(Self::Sc),
            "m4" | "m4_0" | "m33" => Ok(Self::Cm4_0),
            "m4_1" => Ok(Self::Cm4_1),
            "a53" => Ok(Self::Ca53),
            // a55 shares the a35 id
            "a35" | "a55" => Ok(Self::Ca35),
            "a72" => Ok(Self::Ca72),
            "seco" => Ok(Self::Seco),
            _ => Err(MkImageError::unsupported("core", s)),
        }
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sc => "sc",
            Self::Cm4_0 => "m4",
            Self::Cm4_1 => "m4_1",
            Self::Ca53 => "a53",
            Self::Ca35 => "a35",
            Self::Ca72 => "a72",
            Self::Seco => "seco",
        };
        write!(f, "{}", name)
    }
}

/// Messaging unit an application image talks to the system controller through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageUnit {
    #[default]
    Mu0A,
    Mu3A,
}

impl MessageUnit {
    /// System controller resource id of the messaging unit
    pub fn resource_id(self) -> u32 {
        match self {
            Self::Mu0A => 213,
            Self::Mu3A => 216,
        }
    }
}

impl FromStr for MessageUnit {
    type Err = MkImageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mu0" => Ok(Self::Mu0A),
            "mu3" => Ok(Self::Mu3A),
            _ => Err(MkImageError::unsupported("MU number", s)),
        }
    }
}

impl fmt::Display for MessageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mu0A => write!(f, "mu0"),
            Self::Mu3A => write!(f, "mu3"),
        }
    }
}
