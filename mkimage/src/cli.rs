//! Command line interface for imx-mkimage

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::VERSION;
use crate::dcd::compile_file;
use crate::dtb::{DEFAULT_DTB_OUT, DEFAULT_FIRMWARE_OUT, split_dtb_file};
use crate::layout::Layout;
use crate::placement::{PadMode, open_output, place};

/// Command line arguments for imx-mkimage
#[derive(Parser, Debug)]
#[command(name = "imx-mkimage")]
#[command(version = VERSION)]
#[command(about = "DCD compiler and boot image placement tool for i.MX8", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - only output errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Args {
    /// Default log filter selected by `--verbose` / `--quiet`
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a DCD configuration file into a binary command table
    Dcd(DcdArgs),
    /// Copy a component into an image at a byte offset
    Place(PlaceArgs),
    /// Split a device tree appended to a firmware binary
    SplitDtb(SplitDtbArgs),
    /// Place every component listed in a TOML layout file
    Assemble(AssembleArgs),
}

#[derive(Parser, Debug)]
pub struct DcdArgs {
    /// DCD configuration file
    pub config: PathBuf,

    /// Output table file
    #[arg(short, long, default_value = "dcd.bin")]
    pub output: PathBuf,

    /// Print the encoded entries
    #[arg(long)]
    pub print_info: bool,
}

#[derive(Parser, Debug)]
pub struct PlaceArgs {
    /// Component to copy
    pub source: PathBuf,

    /// Image to write into, created when missing
    #[arg(short, long)]
    pub output: PathBuf,

    /// Byte offset in the image (hexadecimal with 0x, or decimal)
    #[arg(long, value_parser = parse_hex_u64, default_value = "0")]
    pub offset: u64,

    /// Pad the component to a 4-byte boundary
    #[arg(long, conflicts_with = "fill")]
    pub align4: bool,

    /// Pad the component with zeros up to this size
    #[arg(long, value_parser = parse_hex_u64)]
    pub fill: Option<u64>,

    /// Truncate the image before writing
    #[arg(long)]
    pub truncate: bool,
}

impl PlaceArgs {
    fn pad(&self) -> (PadMode, u64) {
        match (self.align4, self.fill) {
            (_, Some(size)) => (PadMode::FillToSize, size),
            (true, None) => (PadMode::AlignTo4, 0),
            (false, None) => (PadMode::None, 0),
        }
    }
}

#[derive(Parser, Debug)]
pub struct SplitDtbArgs {
    /// Firmware binary with an appended device tree
    pub input: PathBuf,

    /// Output for the bytes before the device tree
    #[arg(long, default_value = DEFAULT_FIRMWARE_OUT)]
    pub firmware_out: PathBuf,

    /// Output for the device tree
    #[arg(long, default_value = DEFAULT_DTB_OUT)]
    pub dtb_out: PathBuf,
}

#[derive(Parser, Debug)]
pub struct AssembleArgs {
    /// Layout file
    pub layout: PathBuf,

    /// Output image file
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Parse hexadecimal (`0x` prefixed) or decimal string to u64
fn parse_hex_u64(s: &str) -> std::result::Result<u64, std::num::ParseIntError> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse::<u64>()
    }
}

/// Main CLI handler
pub fn run_cli(args: Args) -> anyhow::Result<()> {
    match args.command {
        Commands::Dcd(dcd_args) => handle_dcd(dcd_args),
        Commands::Place(place_args) => handle_place(place_args),
        Commands::SplitDtb(split_args) => handle_split_dtb(split_args),
        Commands::Assemble(assemble_args) => handle_assemble(assemble_args),
    }
}

fn handle_dcd(args: DcdArgs) -> anyhow::Result<()> {
    let image = compile_file(&args.config)?;
    let bytes = image.table.to_bytes()?;

    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("failed to write DCD table to '{}'", args.output.display()))?;

    if let Some(version) = image.image_version {
        info!("image version: {}", version);
    }
    if let Some(offset) = image.boot_offset {
        info!("boot offset: 0x{:x}", offset);
    }
    info!(
        "DCD table written to {} ({} bytes)",
        args.output.display(),
        bytes.len()
    );

    if args.print_info {
        image.table.print_info();
    }
    Ok(())
}

fn handle_place(args: PlaceArgs) -> anyhow::Result<()> {
    let (pad, target) = args.pad();
    let mut output = open_output(&args.output, args.truncate)?;
    let written = place(&mut output, &args.source, target, args.offset, pad).with_context(|| {
        format!(
            "failed to place '{}' into '{}'",
            args.source.display(),
            args.output.display()
        )
    })?;
    output
        .flush()
        .with_context(|| format!("failed to flush '{}'", args.output.display()))?;
    debug!("{} bytes written to {}", written, args.output.display());
    Ok(())
}

fn handle_split_dtb(args: SplitDtbArgs) -> anyhow::Result<()> {
    info!(
        "Input u-boot.bin binary to be splitted DTB: {}",
        args.input.display()
    );
    split_dtb_file(&args.input, &args.firmware_out, &args.dtb_out)?;
    Ok(())
}

fn handle_assemble(args: AssembleArgs) -> anyhow::Result<()> {
    let layout = Layout::load(&args.layout)?;
    let mut output = open_output(&args.output, true)?;
    let end = layout
        .emit(&mut output)
        .with_context(|| format!("failed to assemble '{}'", args.output.display()))?;
    output
        .flush()
        .with_context(|| format!("failed to flush '{}'", args.output.display()))?;
    info!(
        "{} components placed, image size 0x{:x}",
        layout.images.len(),
        end
    );
    Ok(())
}
