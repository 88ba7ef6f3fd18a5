//! # imx-mkimage
//!
//! Building blocks for i.MX8 family boot images.
//!
//! This crate compiles DCD (Device Configuration Data) scripts into the
//! packed command table the boot ROM executes, places firmware components
//! into an output image at fixed offsets, keeps the ordered component list
//! handed to a container assembler and splits device trees appended to
//! firmware binaries.
//!
//! ## Example
//!
//! ```rust
//! use mkimage::dcd::compile_str;
//!
//! let image = compile_str(
//!     "imx8qm_dcd.cfg",
//!     "DATA 4 0x30391000 0x2\nDATA 4 0x30391004 0x3\n",
//! )?;
//! assert_eq!(image.table.entries().len(), 1);
//! let bytes = image.table.to_bytes()?;
//! assert_eq!(bytes.len(), 4 + 4 + 2 * 8);
//! # Ok::<(), mkimage::MkImageError>(())
//! ```

#[macro_use]
extern crate log;

pub mod cli;
pub mod dcd;
pub mod dtb;
pub mod error;
pub mod image_list;
pub mod image_types;
pub mod layout;
pub mod placement;

pub use dcd::{DcdBuilder, DcdCompiler, DcdImage, DcdTable};
pub use dtb::{FDT_MAGIC, split_dtb, split_dtb_file};
pub use error::{MkImageError, Result, SyntaxError};
pub use image_list::{IMG_STACK_SIZE, ImageDescriptor, ImageList};
pub use image_types::{CoreId, ImageKind, MessageUnit};
pub use layout::Layout;
pub use placement::{PAD_CHUNK_SIZE, PadMode, file_size, place};

/// Current version of the tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
