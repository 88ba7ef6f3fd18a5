//! Integration tests for imx-mkimage

use mkimage::dcd::{MAX_HW_CFG_SIZE_V2, compile_file, compile_str};
use mkimage::{
    FDT_MAGIC, ImageKind, Layout, MkImageError, PadMode, SyntaxError, place, split_dtb_file,
};
use std::fs;
use std::io::{Cursor, Write};
use tempfile::{NamedTempFile, TempDir};

const BOARD_DCD: &str = "\
# i.MX8 DDR init fragment
IMAGE_VERSION 3
BOOT_FROM sd

DATA 4 0x30391000 0x00000002
DATA 4 0x30391004 0x00000003
CLR_BIT 4 0x30360068 0x00000001
SET_BIT 4 0x30360068 0x00000002
CHECK_BITS_SET 4 0x30360060 0x80000000
DATA 4 0x3d400304 0x00000001
";

fn write_data_lines(n: usize) -> String {
    (0..n)
        .map(|i| format!("DATA 4 {:08x} {:08x}\n", 0x3d40_0000 + 4 * i, i))
        .collect()
}

/// Compile a configuration file from disk and check the wire bytes
#[test]
fn test_compile_board_file() {
    let mut cfg = NamedTempFile::new().unwrap();
    cfg.write_all(BOARD_DCD.as_bytes()).unwrap();
    cfg.flush().unwrap();

    let image = compile_file(cfg.path()).unwrap();
    assert_eq!(image.image_version, Some(3));

    let bytes = image.table.to_bytes().unwrap();
    // header + (4+16) + (4+8) + (4+8) + 12 + (4+8)
    assert_eq!(bytes.len(), 4 + 20 + 12 + 12 + 12 + 12);
    assert_eq!(&bytes[..4], &[0xD2, 0x00, bytes.len() as u8, 0x43]);
    assert_eq!(&bytes[4..8], &[0xCC, 0x00, 0x14, 0x04]);
    assert_eq!(&bytes[24..28], &[0xCC, 0x00, 0x0C, 0x0C]);
    assert_eq!(&bytes[36..40], &[0xCC, 0x00, 0x0C, 0x1C]);
    assert_eq!(&bytes[48..52], &[0xCF, 0x00, 0x0C, 0x14]);
    assert_eq!(&bytes[60..64], &[0xCC, 0x00, 0x0C, 0x04]);
}

/// N consecutive writes always collapse into one entry of 4 + 8N bytes
#[test]
fn test_write_runs_coalesce() {
    for n in [1, 2, 7, 64, MAX_HW_CFG_SIZE_V2] {
        let image = compile_str("run.cfg", &write_data_lines(n)).unwrap();
        let entries = image.table.entries();
        assert_eq!(entries.len(), 1, "n = {n}");
        assert_eq!(entries[0].byte_len(), 4 + 8 * n);
        assert_eq!(image.table.byte_len(), 8 + 8 * n);
    }
}

/// A check between two write runs yields write, check, write
#[test]
fn test_check_between_write_runs() {
    let text = format!(
        "{}CHECK_BITS_SET 4 30360060 80000000\n{}",
        write_data_lines(3),
        write_data_lines(2)
    );
    let image = compile_str("split.cfg", &text).unwrap();
    let tags: Vec<u8> = image.table.entries().iter().map(|e| e.tag()).collect();
    assert_eq!(tags, vec![0xCC, 0xCF, 0xCC]);
    assert_eq!(image.table.entries()[1].byte_len(), 12);
}

/// Comments are skipped even when they are not valid UTF-8
#[test]
fn test_compile_file_with_latin1_comment() {
    let mut cfg = NamedTempFile::new().unwrap();
    cfg.write_all(b"# (\xa9) vendor\nDATA 4 10 20 # r\xe9glage\n").unwrap();
    cfg.flush().unwrap();

    let image = compile_file(cfg.path()).unwrap();
    assert_eq!(image.table.pair_count(), 1);
    assert_eq!(image.table.entries()[0].pairs()[0].value, 0x20);
}

#[test]
fn test_image_version_after_register_command() {
    let err = compile_str("late.cfg", "SET_BIT 4 10 1\nIMAGE_VERSION 3\n").unwrap_err();
    match err {
        MkImageError::ConfigSyntax { line, kind, .. } => {
            assert_eq!(line, 2);
            assert_eq!(kind, SyntaxError::ImageVersionNotFirst);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_pair_budget_boundary() {
    assert!(compile_str("max.cfg", &write_data_lines(MAX_HW_CFG_SIZE_V2)).is_ok());
    let err = compile_str("max.cfg", &write_data_lines(MAX_HW_CFG_SIZE_V2 + 1)).unwrap_err();
    assert!(matches!(err.root(), MkImageError::Capacity { .. }));
}

#[test]
fn test_place_fill_to_size_on_disk() {
    let dir = TempDir::new().unwrap();
    let out_path = dir.path().join("flash.bin");

    for (i, len) in [100usize, 10_000].into_iter().enumerate() {
        let src = dir.path().join(format!("part{i}.bin"));
        fs::write(&src, vec![0xA5; len]).unwrap();

        let mut out = mkimage::placement::open_output(&out_path, true).unwrap();
        let written = place(&mut out, &src, 0x4000, 0x200, PadMode::FillToSize).unwrap();
        drop(out);

        assert_eq!(written, 0x4000);
        let image = fs::read(&out_path).unwrap();
        assert_eq!(image.len(), 0x200 + 0x4000);
        assert!(image[0x200 + len..].iter().all(|&b| b == 0));
    }
}

#[test]
fn test_place_empty_source_keeps_output() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("empty.bin");
    fs::write(&src, []).unwrap();

    let mut out = Cursor::new(vec![0xEEu8; 64]);
    assert_eq!(place(&mut out, &src, 32, 16, PadMode::AlignTo4).unwrap(), 0);
    assert_eq!(out.into_inner(), vec![0xEEu8; 64]);
}

#[test]
fn test_split_dtb_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("u-boot.bin");
    let mut data = vec![0x22u8; 200];
    data[100..104].copy_from_slice(&FDT_MAGIC.to_be_bytes());
    data[104..108].copy_from_slice(&50u32.to_be_bytes());
    fs::write(&input, &data).unwrap();

    let fw = dir.path().join("nodtb.bin");
    let dtb = dir.path().join("u-boot.dtb");
    let loc = split_dtb_file(&input, &fw, &dtb).unwrap();
    assert_eq!(loc.offset, 100);

    assert_eq!(fs::read(&fw).unwrap(), &data[..100]);
    assert_eq!(fs::read(&dtb).unwrap(), &data[100..150]);
}

#[test]
fn test_split_dtb_without_magic() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("u-boot.bin");
    fs::write(&input, vec![0u8; 1024]).unwrap();

    let err = split_dtb_file(&input, dir.path().join("a"), dir.path().join("b")).unwrap_err();
    assert!(matches!(err, MkImageError::Format(_)));
    assert!(err.to_string().contains("no device tree found"));
    assert!(!dir.path().join("a").exists());
}

#[test]
fn test_layout_emit() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("scfw.bin"), [1u8, 2, 3, 4, 5]).unwrap();
    fs::write(dir.path().join("ap.bin"), [9u8; 16]).unwrap();

    let layout_path = dir.path().join("layout.toml");
    fs::write(
        &layout_path,
        r#"
[[image]]
kind = "container"

[[image]]
kind = "scfw"
file = "scfw.bin"
offset = 0x10
pad = "align4"

[[image]]
kind = "ap"
file = "ap.bin"
offset = 0x40
pad = "fill"
size = 0x20
core = "a53"
"#,
    )
    .unwrap();

    let layout = Layout::load(&layout_path).unwrap();
    let list = layout.image_list().unwrap();
    assert_eq!(list.len(), 4);
    assert_eq!(list.iter().last().unwrap().kind, ImageKind::End);

    let mut out = Cursor::new(Vec::new());
    let end = layout.emit(&mut out).unwrap();
    assert_eq!(end, 0x60);

    let image = out.into_inner();
    assert_eq!(image.len(), 0x60);
    assert_eq!(&image[0x10..0x18], &[1, 2, 3, 4, 5, 0, 0, 0]);
    assert_eq!(&image[0x40..0x50], &[9u8; 16]);
    assert!(image[0x50..0x60].iter().all(|&b| b == 0));
}

#[test]
fn test_layout_over_capacity() {
    let mut text = String::from("capacity = 4\n");
    for _ in 0..4 {
        text.push_str("[[image]]\nkind = \"hold\"\n");
    }
    let layout: Layout = text.parse().unwrap();
    let mut out = Cursor::new(Vec::new());
    assert!(matches!(
        layout.emit(&mut out),
        Err(MkImageError::Capacity { max: 4, .. })
    ));
}
