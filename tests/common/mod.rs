#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{ByteOrder, LittleEndian};

use ZstBlocks::consts::{data_area_start, DEFAULT_COMPRESSION_LEVEL};
use ZstBlocks::{Codec, RowInfo, ZstdCodec};

// Генератор уникальных временных путей для тестов
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("zstbtest-{prefix}-{pid}-{t}-{id}"))
}

/// Распакованный payload: [count][RowInfo × count][data], строки подряд.
pub fn build_payload(rows: &[&[u8]]) -> Vec<u8> {
    let start = data_area_start(rows.len());
    let total: usize = rows.iter().map(|r| r.len()).sum();
    let mut buf = vec![0u8; start + total];
    LittleEndian::write_u32(&mut buf[0..4], rows.len() as u32);
    let mut off = 0usize;
    for (i, r) in rows.iter().enumerate() {
        RowInfo::new(off as u32, r.len() as u32).write(&mut buf, 4 + i * RowInfo::SIZE);
        buf[start + off..start + off + r.len()].copy_from_slice(r);
        off += r.len();
    }
    buf
}

/// Физический блок: [compressed_size u32][compressed payload].
pub fn build_block(codec: &dyn Codec, rows: &[&[u8]]) -> Vec<u8> {
    let packed = codec.compress(&build_payload(rows), DEFAULT_COMPRESSION_LEVEL).expect("compress block");
    let mut out = Vec::with_capacity(4 + packed.len());
    out.extend_from_slice(&(packed.len() as u32).to_le_bytes());
    out.extend_from_slice(&packed);
    out
}

/// Склеить блоки в один буфер; вернуть offset каждого блока.
pub fn build_file(codec: &dyn Codec, blocks: &[&[&[u8]]]) -> (Vec<u8>, Vec<u64>) {
    let mut file = Vec::new();
    let mut offsets = Vec::with_capacity(blocks.len());
    for rows in blocks {
        offsets.push(file.len() as u64);
        file.extend(build_block(codec, rows));
    }
    (file, offsets)
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create test dir");
    }
    fs::write(path, bytes).expect("write test file");
}

/// zstd-кодек, считающий вызовы decompress (всего и по входу).
pub struct CountingCodec {
    inner: ZstdCodec,
    calls: AtomicUsize,
    inputs: Mutex<Vec<Vec<u8>>>,
}

impl CountingCodec {
    pub fn new() -> Self {
        Self {
            inner: ZstdCodec::default(),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Сколько раз распаковывался именно этот сжатый payload.
    pub fn calls_for(&self, compressed: &[u8]) -> usize {
        self.inputs
            .lock()
            .expect("inputs lock")
            .iter()
            .filter(|v| v.as_slice() == compressed)
            .count()
    }
}

impl Codec for CountingCodec {
    fn name(&self) -> &'static str {
        "counting-zstd"
    }

    fn compress(&self, data: &[u8], level: i32) -> io::Result<Vec<u8>> {
        self.inner.compress(data, level)
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().expect("inputs lock").push(data.to_vec());
        self.inner.decompress(data)
    }
}
