use anyhow::{anyhow, Context, Result};
use base64::Engine;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::batch::RowPosition;
use crate::codec::CodecKind;
use crate::config::ReaderConfig;
use crate::file::ZstBlocksFile;
use crate::metrics;

#[derive(Parser, Debug)]
#[command(
    name = "zstblocks",
    version,
    about = "Random-access reader for .zst_blocks files",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    opts: ReadOpts,
    #[command(subcommand)]
    cmd: Cmd,
}

/// Общие опции чтения (перекрывают ENV ZSTB_*).
#[derive(Args, Debug, Clone, Default)]
pub struct ReadOpts {
    /// Codec of block payloads: zstd|gzip|none
    #[arg(long, global = true)]
    pub codec: Option<String>,
    /// Map the file into memory instead of positional reads
    #[arg(long, global = true, default_value_t = false)]
    pub mmap: bool,
    /// Resolve get-many block groups one by one
    #[arg(long, global = true, default_value_t = false)]
    pub sequential: bool,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Read one row by block offset and row index
    Get {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        block_offset: u64,
        #[arg(long)]
        row: u32,
        /// Optional file to write raw row bytes into
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Read many rows (OFFSET:ROW, any order, duplicates allowed) in one batch
    GetMany {
        #[arg(long)]
        path: PathBuf,
        #[arg(long = "pos", required = true)]
        positions: Vec<String>,
        /// JSON array output (one object per requested position)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Decode all rows of the file in order
    Decode {
        #[arg(long)]
        path: PathBuf,
        /// Output file (stdout if not set)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Do not put '\n' between rows
        #[arg(long, default_value_t = false)]
        no_line_separator: bool,
    },
    /// List blocks: offset, compressed size, row count, payload size
    Blocks {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print effective reader config and metrics
    Stat {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = reader_config(&cli.opts)?;
    let stdout = std::io::stdout();

    match cli.cmd {
        Cmd::Get {
            path,
            block_offset,
            row,
            out,
        } => cmd_get(
            &mut stdout.lock(),
            &path,
            cfg,
            RowPosition::new(block_offset, row),
            out.as_deref(),
        ),
        Cmd::GetMany {
            path,
            positions,
            json,
        } => {
            let positions = parse_positions(&positions)?;
            cmd_get_many(&mut stdout.lock(), &path, cfg, &positions, json)
        }
        Cmd::Decode {
            path,
            out,
            no_line_separator,
        } => match out {
            Some(p) => {
                let f = OpenOptions::new()
                    .create(true)
                    .truncate(true)
                    .write(true)
                    .open(&p)
                    .with_context(|| format!("open {}", p.display()))?;
                let mut w = BufWriter::new(f);
                let n = cmd_decode(&mut w, &path, cfg, !no_line_separator)?;
                w.flush()?;
                log::info!("decoded {} row(s) -> {}", n, p.display());
                Ok(())
            }
            None => {
                let mut w = BufWriter::new(stdout.lock());
                cmd_decode(&mut w, &path, cfg, !no_line_separator)?;
                w.flush()?;
                Ok(())
            }
        },
        Cmd::Blocks { path, json } => cmd_blocks(&mut stdout.lock(), &path, cfg, json),
        Cmd::Stat { json } => cmd_stat(&mut stdout.lock(), &cfg, json),
    }
}

/// ENV (ZSTB_*) + CLI-оверрайды.
pub fn reader_config(opts: &ReadOpts) -> Result<ReaderConfig> {
    let mut cfg = ReaderConfig::from_env()?;
    if let Some(c) = &opts.codec {
        cfg.codec = c.parse::<CodecKind>()?;
    }
    if opts.mmap {
        cfg.use_mmap = true;
    }
    if opts.sequential {
        cfg.parallel = false;
    }
    Ok(cfg)
}

pub fn parse_positions(raw: &[String]) -> Result<Vec<RowPosition>> {
    raw.iter()
        .map(|s| s.parse::<RowPosition>().map_err(|e| anyhow!("{}", e)))
        .collect()
}

pub fn cmd_get<W: Write>(
    w: &mut W,
    path: &Path,
    cfg: ReaderConfig,
    pos: RowPosition,
    out: Option<&Path>,
) -> Result<()> {
    let f = ZstBlocksFile::open_with_config(path, cfg)?;
    let row = f
        .read_row(pos)
        .with_context(|| format!("read row {} from {}", pos, path.display()))?;
    match out {
        Some(out_path) => {
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(out_path, &row)
                .with_context(|| format!("write {}", out_path.display()))?;
            writeln!(w, "ROW {}: {} B -> wrote to {}", pos, row.len(), out_path.display())?;
        }
        None => {
            writeln!(w, "ROW {}: {} B", pos, row.len())?;
            writeln!(w, "text: {}", display_text(&row))?;
            writeln!(w, "hex:  {}", hex_dump(&row[..row.len().min(64)]))?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RowJson<'a> {
    index: usize,
    block_offset: u64,
    row_index: u32,
    len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base64: Option<String>,
}

pub fn cmd_get_many<W: Write>(
    w: &mut W,
    path: &Path,
    cfg: ReaderConfig,
    positions: &[RowPosition],
    json: bool,
) -> Result<()> {
    let f = ZstBlocksFile::open_with_config(path, cfg)?;
    let rows = f
        .read_many(positions)
        .with_context(|| format!("batch read of {} row(s) from {}", positions.len(), path.display()))?;

    if json {
        let items: Vec<RowJson> = positions
            .iter()
            .zip(rows.iter())
            .enumerate()
            .map(|(i, (p, r))| {
                let text = std::str::from_utf8(r).ok();
                RowJson {
                    index: i,
                    block_offset: p.block_offset,
                    row_index: p.row_index,
                    len: r.len(),
                    text,
                    base64: match text {
                        Some(_) => None,
                        None => Some(base64::engine::general_purpose::STANDARD.encode(r)),
                    },
                }
            })
            .collect();
        serde_json::to_writer_pretty(&mut *w, &items).context("serialize rows json")?;
        writeln!(w)?;
    } else {
        for (p, r) in positions.iter().zip(rows.iter()) {
            writeln!(w, "{}\t{} B\t{}", p, r.len(), display_text(r))?;
        }
    }
    Ok(())
}

/// Все строки файла в `w`; возвращает число строк.
pub fn cmd_decode<W: Write>(w: &mut W, path: &Path, cfg: ReaderConfig, separate_lines: bool) -> Result<u64> {
    let f = ZstBlocksFile::open_with_config(path, cfg)?;
    let mut n = 0u64;
    for row in f.rows()? {
        let row = row.with_context(|| format!("decode {} (after {} row(s))", path.display(), n))?;
        if separate_lines && n > 0 {
            w.write_all(b"\n")?;
        }
        w.write_all(&row)?;
        n += 1;
    }
    Ok(n)
}

pub fn cmd_blocks<W: Write>(w: &mut W, path: &Path, cfg: ReaderConfig, json: bool) -> Result<()> {
    let f = ZstBlocksFile::open_with_config(path, cfg)?;
    let mut infos = Vec::new();
    for b in f.blocks()? {
        infos.push(b?.info());
    }

    if json {
        serde_json::to_writer_pretty(&mut *w, &infos).context("serialize blocks json")?;
        writeln!(w)?;
        return Ok(());
    }

    writeln!(w, "{:>12}  {:>10}  {:>8}  {:>10}", "offset", "compressed", "rows", "payload")?;
    let mut total_rows = 0u64;
    for i in &infos {
        writeln!(
            w,
            "{:>12}  {:>10}  {:>8}  {:>10}",
            i.offset, i.compressed_size, i.row_count, i.payload_len
        )?;
        total_rows += i.row_count as u64;
    }
    writeln!(w, "{} block(s), {} row(s), {} B", infos.len(), total_rows, f.len()?)?;
    Ok(())
}

pub fn cmd_stat<W: Write>(w: &mut W, cfg: &ReaderConfig, json: bool) -> Result<()> {
    let m = metrics::snapshot();
    if json {
        let v = serde_json::json!({
            "config": {
                "codec": cfg.codec.as_str(),
                "max_block_bytes": cfg.max_block_bytes,
                "parallel": cfg.parallel,
                "use_mmap": cfg.use_mmap,
            },
            "metrics": m,
        });
        serde_json::to_writer_pretty(&mut *w, &v).context("serialize stat json")?;
        writeln!(w)?;
    } else {
        writeln!(w, "{}", cfg)?;
        writeln!(w, "blocks_read           = {}", m.blocks_read)?;
        writeln!(w, "compressed_bytes_read = {}", m.compressed_bytes_read)?;
        writeln!(w, "decompressed_bytes    = {}", m.decompressed_bytes)?;
        writeln!(w, "compression_ratio     = {:.2}", m.compression_ratio())?;
        writeln!(w, "rows_returned         = {}", m.rows_returned)?;
        writeln!(w, "batch_calls           = {}", m.batch_calls)?;
        writeln!(w, "avg_groups_per_batch  = {:.2}", m.avg_groups_per_batch())?;
        writeln!(w, "read_errors           = {}", m.read_errors)?;
    }
    Ok(())
}

pub fn display_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => format!("(binary {} B)", bytes.len()),
    }
}

pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            if i % 16 == 0 {
                out.push('\n');
            } else {
                out.push(' ');
            }
        }
        out.push_str(&format!("{:02x}", b));
    }
    out
}
