//! Lightweight global metrics for block reads.
//!
//! Потокобезопасные атомарные счётчики (процессные):
//! - чтение блоков (кол-во, сжатые/распакованные байты)
//! - возвращённые строки
//! - batch-вызовы read_many и число групп (distinct блоков)
//! - ошибки чтения (блок не прочитан/не распакован, некорректная строка)

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// ----- Blocks -----
static BLOCKS_READ: AtomicU64 = AtomicU64::new(0);
static COMPRESSED_BYTES_READ: AtomicU64 = AtomicU64::new(0);
static DECOMPRESSED_BYTES: AtomicU64 = AtomicU64::new(0);
static READ_ERRORS: AtomicU64 = AtomicU64::new(0);

// ----- Rows / batches -----
static ROWS_RETURNED: AtomicU64 = AtomicU64::new(0);
static BATCH_CALLS: AtomicU64 = AtomicU64::new(0);
static BATCH_GROUPS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub blocks_read: u64,
    pub compressed_bytes_read: u64,
    pub decompressed_bytes: u64,
    pub read_errors: u64,

    pub rows_returned: u64,
    pub batch_calls: u64,
    pub batch_groups: u64,
}

impl MetricsSnapshot {
    /// Среднее число distinct блоков на один read_many.
    pub fn avg_groups_per_batch(&self) -> f64 {
        if self.batch_calls == 0 {
            0.0
        } else {
            self.batch_groups as f64 / self.batch_calls as f64
        }
    }

    /// Распакованные байты на сжатый байт.
    pub fn compression_ratio(&self) -> f64 {
        if self.compressed_bytes_read == 0 {
            0.0
        } else {
            self.decompressed_bytes as f64 / self.compressed_bytes_read as f64
        }
    }
}

#[inline]
pub fn record_block_read(compressed: u64, decompressed: u64) {
    BLOCKS_READ.fetch_add(1, Ordering::Relaxed);
    COMPRESSED_BYTES_READ.fetch_add(compressed, Ordering::Relaxed);
    DECOMPRESSED_BYTES.fetch_add(decompressed, Ordering::Relaxed);
}

#[inline]
pub fn record_read_error() {
    READ_ERRORS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_rows_returned(n: u64) {
    ROWS_RETURNED.fetch_add(n, Ordering::Relaxed);
}

#[inline]
pub fn record_batch(groups: u64) {
    BATCH_CALLS.fetch_add(1, Ordering::Relaxed);
    BATCH_GROUPS.fetch_add(groups, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        blocks_read: BLOCKS_READ.load(Ordering::Relaxed),
        compressed_bytes_read: COMPRESSED_BYTES_READ.load(Ordering::Relaxed),
        decompressed_bytes: DECOMPRESSED_BYTES.load(Ordering::Relaxed),
        read_errors: READ_ERRORS.load(Ordering::Relaxed),
        rows_returned: ROWS_RETURNED.load(Ordering::Relaxed),
        batch_calls: BATCH_CALLS.load(Ordering::Relaxed),
        batch_groups: BATCH_GROUPS.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    for c in [
        &BLOCKS_READ,
        &COMPRESSED_BYTES_READ,
        &DECOMPRESSED_BYTES,
        &READ_ERRORS,
        &ROWS_RETURNED,
        &BATCH_CALLS,
        &BATCH_GROUPS,
    ] {
        c.store(0, Ordering::Relaxed);
    }
}
