//! Line-driven DCD configuration compiler

use std::path::Path;

use super::command::Command;
use super::table::{DcdBuilder, DcdTable};
use super::tokenizer::{Field, Fields, parse_hex};
use crate::error::{MkImageError, Result, SyntaxError};

/// Where `IMAGE_VERSION` stands relative to the other commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum VersionOrder {
    #[default]
    Unseen,
    First,
    /// Another command came first, `IMAGE_VERSION` is no longer allowed
    Late,
}

/// Output of one compilation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcdImage {
    pub table: DcdTable,
    pub image_version: Option<u32>,
    /// IVT offset requested with `BOOT_OFFSET`
    pub boot_offset: Option<u32>,
    pub csf_size: Option<u32>,
    pub boot_from: Option<String>,
}

/// Compiles configuration text into a [`DcdImage`].
///
/// Each compiler owns its encoder, so independent compilations never share
/// state.
#[derive(Debug, Clone)]
pub struct DcdCompiler {
    name: String,
    lineno: usize,
    builder: DcdBuilder,
    order: VersionOrder,
    image_version: Option<u32>,
    boot_offset: Option<u32>,
    csf_size: Option<u32>,
    boot_from: Option<String>,
}

impl DcdCompiler {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_builder(name, DcdBuilder::new())
    }

    pub fn with_builder(name: impl Into<String>, builder: DcdBuilder) -> Self {
        Self {
            name: name.into(),
            lineno: 0,
            builder,
            order: VersionOrder::Unseen,
            image_version: None,
            boot_offset: None,
            csf_size: None,
            boot_from: None,
        }
    }

    fn syntax(&self, kind: SyntaxError) -> MkImageError {
        MkImageError::syntax(self.name.clone(), self.lineno, kind)
    }

    fn hex(&self, token: &str) -> Result<u32> {
        parse_hex(token).map_err(|kind| self.syntax(kind))
    }

    /// Any command other than `IMAGE_VERSION` closes the window for it
    fn mark_command(&mut self) {
        if self.order != VersionOrder::First {
            self.order = VersionOrder::Late;
        }
    }

    /// Compile the next line of input
    pub fn feed_line(&mut self, line: &str) -> Result<()> {
        self.lineno += 1;

        let fields = Fields::parse(line);
        let Some(name) = fields.command() else {
            return Ok(());
        };
        let cmd = name.parse::<Command>().map_err(|kind| self.syntax(kind))?;
        trace!("{}[{}]: {}", self.name, self.lineno, cmd.description());

        for (field, token) in fields.iter() {
            match field {
                Field::Command => {}
                Field::Size => self.directive(cmd, token)?,
                Field::Address | Field::Value => self.register(cmd, field, token)?,
            }
        }
        Ok(())
    }

    fn directive(&mut self, cmd: Command, token: &str) -> Result<()> {
        match cmd {
            Command::ImageVersion => {
                let version = self.hex(token)?;
                if self.order == VersionOrder::Late {
                    return Err(self.syntax(SyntaxError::ImageVersionNotFirst));
                }
                self.image_version = Some(version);
                self.order = VersionOrder::First;
            }
            Command::BootOffset => {
                self.boot_offset = Some(self.hex(token)?);
                self.mark_command();
            }
            Command::Csf => {
                if self.image_version != Some(2) {
                    return Err(self.syntax(SyntaxError::CsfRequiresVersion2(token.to_string())));
                }
                self.csf_size = Some(self.hex(token)?);
                self.mark_command();
            }
            Command::BootFrom => {
                self.boot_from = Some(token.to_string());
            }
            _ => {
                // register width, checked but not encoded
                self.hex(token)?;
                self.mark_command();
                if let Some(op) = cmd.operation() {
                    self.builder
                        .open(op)
                        .map_err(|e| e.at_line(self.name.clone(), self.lineno))?;
                }
            }
        }
        Ok(())
    }

    fn register(&mut self, cmd: Command, field: Field, token: &str) -> Result<()> {
        let Some(op) = cmd.operation() else {
            return Ok(());
        };
        let value = self.hex(token)?;
        let res = match field {
            Field::Address => self.builder.set_address(op, value),
            _ => self.builder.set_value(op, value),
        };
        res.map_err(|e| e.at_line(self.name.clone(), self.lineno))
    }

    /// Finalize the table once all input has been fed
    pub fn finish(mut self) -> Result<DcdImage> {
        let table = self
            .builder
            .finalize()
            .map_err(|e| e.at_line(self.name.clone(), self.lineno))?;
        debug!(
            "{}: {} lines, {} pairs in {} entries",
            self.name,
            self.lineno,
            table.pair_count(),
            table.entries().len()
        );
        Ok(DcdImage {
            table,
            image_version: self.image_version,
            boot_offset: self.boot_offset,
            csf_size: self.csf_size,
            boot_from: self.boot_from,
        })
    }
}

/// Compile configuration text, `name` is used in diagnostics
pub fn compile_str(name: &str, text: &str) -> Result<DcdImage> {
    let mut compiler = DcdCompiler::new(name);
    for line in text.lines() {
        compiler.feed_line(line)?;
    }
    compiler.finish()
}

/// Compile a configuration file
pub fn compile_file<P: AsRef<Path>>(path: P) -> Result<DcdImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| MkImageError::file(path, e))?;
    info!("compiling DCD file {}", path.display());
    // comments may hold bytes in any encoding
    compile_str(&path.display().to_string(), &String::from_utf8_lossy(&bytes))
}
