mod common;

use std::fs;
use std::process::Command;

use anyhow::Result;

use common::{build_file, unique_root, write_file};
use ZstBlocks::ZstdCodec;

fn zstblocks() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_zstblocks"));
    cmd.env_remove("ZSTB_CODEC").env("RUST_LOG", "error");
    cmd
}

#[test]
fn binary_decodes_to_stdout() -> Result<()> {
    let root = unique_root("bin-decode");
    let path = root.join("rows.zst_blocks");
    let (bytes, _) = build_file(&ZstdCodec::default(), &[&[b"a", b"b"], &[b"c"]]);
    write_file(&path, &bytes);

    let out = zstblocks().arg("decode").arg("--path").arg(&path).output()?;
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(out.stdout, b"a\nb\nc");

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn binary_failure_exits_nonzero_and_logs_to_stderr() -> Result<()> {
    let root = unique_root("bin-fail");
    let path = root.join("rows.zst_blocks");
    let (bytes, offs) = build_file(&ZstdCodec::default(), &[&[b"only"]]);
    write_file(&path, &bytes);

    let out = zstblocks()
        .args(["get", "--row", "3", "--block-offset"])
        .arg(offs[0].to_string())
        .arg("--path")
        .arg(&path)
        .output()?;
    assert_eq!(out.status.code(), Some(1));
    // stdout пуст, ошибка (с контекстом) — в логе
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid row index 3"), "{stderr}");

    fs::remove_dir_all(&root)?;
    Ok(())
}
