//! Compile a DCD script and place it into a flash image

use mkimage::dcd::compile_str;
use mkimage::{PadMode, place};
use std::io::{Cursor, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let script = "\
IMAGE_VERSION 3
DATA 4 0x30391000 0x00000002
DATA 4 0x30391004 0x00000003
CHECK_BITS_SET 4 0x30360060 0x80000000
";
    let image = compile_str("demo.cfg", script)?;
    image.table.print_info();

    let bytes = image.table.to_bytes()?;
    let mut dcd = tempfile::NamedTempFile::new()?;
    dcd.write_all(&bytes)?;
    dcd.flush()?;

    let mut flash = Cursor::new(Vec::new());
    let written = place(&mut flash, dcd.path(), 0x200, 0x400, PadMode::FillToSize)?;
    println!(
        "placed {} bytes of DCD at 0x400, image is {} bytes",
        written,
        flash.get_ref().len()
    );
    Ok(())
}
