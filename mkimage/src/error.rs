//! Error types for the image tool

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MkImageError>;

/// Problems found in a single line of a DCD configuration file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Invalid command({0})")]
    UnknownCommand(String),

    #[error("Invalid hex data({0})")]
    InvalidHex(String),

    #[error("IMAGE_VERSION command need be the first before other valid command in the file")]
    ImageVersionNotFirst,

    #[error("CSF only supported for VERSION 2({0})")]
    CsfRequiresVersion2(String),
}

/// Errors that can occur while building boot images
#[derive(Debug, Error)]
pub enum MkImageError {
    #[error("{file}[{line}] - {kind}")]
    ConfigSyntax {
        file: String,
        line: usize,
        kind: SyntaxError,
    },

    #[error("{file}[{line}] - {source}")]
    AtLine {
        file: String,
        line: usize,
        #[source]
        source: Box<MkImageError>,
    },

    #[error("{what} exceeds maximum size({max})")]
    Capacity { what: &'static str, max: usize },

    #[error("{0}")]
    Protocol(&'static str),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Format(String),

    #[error("unsupported {what}: {value}")]
    Unsupported { what: &'static str, value: String },

    #[error("layout error: {0}")]
    Layout(String),
}

impl MkImageError {
    pub fn syntax(file: impl Into<String>, line: usize, kind: SyntaxError) -> Self {
        Self::ConfigSyntax {
            file: file.into(),
            line,
            kind,
        }
    }

    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn unsupported(what: &'static str, value: impl Into<String>) -> Self {
        Self::Unsupported {
            what,
            value: value.into(),
        }
    }

    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Attach a configuration file location to an error raised while compiling it
    pub fn at_line(self, file: impl Into<String>, line: usize) -> Self {
        match self {
            located @ (Self::ConfigSyntax { .. } | Self::AtLine { .. }) => located,
            other => Self::AtLine {
                file: file.into(),
                line,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any location wrapper removed
    pub fn root(&self) -> &MkImageError {
        match self {
            Self::AtLine { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for every variant caused by a failing file operation
    pub fn is_io(&self) -> bool {
        matches!(self.root(), Self::File { .. } | Self::Io(_))
    }
}
