//! Device Configuration Data
//!
//! A DCD is the list of register writes and polls the boot ROM runs before
//! any program code. The configuration text is compiled line by line:
//! [`tokenizer`] splits the fields, [`parser`] interprets commands and
//! [`table`] packs them into the big-endian wire format.

pub mod command;
pub mod parser;
pub mod table;
pub mod tokenizer;

pub use command::{Command, Operation};
pub use parser::{DcdCompiler, DcdImage, compile_file, compile_str};
pub use table::{
    AddrData, CommandEntry, DCD_HEADER_TAG, DCD_VERSION, DcdBuilder, DcdHeader, DcdTable,
    MAX_HW_CFG_SIZE_V2,
};
pub use tokenizer::{Field, Fields, parse_hex};
