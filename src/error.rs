//! Error types for block reads.
//!
//! Every failure of the read path maps to one variant here. Callers that
//! only care about the broad class (I/O vs. corrupt data vs. a bad request)
//! use [`BlockError::kind`].
//!
//! - `Io`, `ShortRead`: the file could not supply the requested bytes.
//! - `Decompress`: the codec rejected the compressed payload.
//! - `InvalidRowIndex`: the caller asked for a row the block does not have.
//! - `MissingRow`: a batch produced no row for some position (batch only).
//! - `CorruptBlock`, `BlockTooLarge`: the decompressed payload or the framing
//!   is inconsistent with the format.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("io error at offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("short read at offset {offset}: expected {expected} B, got {got} B")]
    ShortRead { offset: u64, expected: usize, got: usize },

    #[error("decompression failed for block at {block_offset}: {msg}")]
    Decompress { block_offset: u64, msg: String },

    #[error("invalid row index {row_index} for block at {block_offset} (row_count={row_count})")]
    InvalidRowIndex {
        block_offset: u64,
        row_index: u32,
        row_count: u32,
    },

    #[error("missing row for batch position {position_index} (block {block_offset}, row {row_index})")]
    MissingRow {
        position_index: usize,
        block_offset: u64,
        row_index: u32,
    },

    #[error("corrupt block at {block_offset}: {msg}")]
    CorruptBlock { block_offset: u64, msg: String },

    #[error("block at {block_offset} too large: {size} B exceeds limit {limit} B")]
    BlockTooLarge {
        block_offset: u64,
        size: usize,
        limit: usize,
    },

    #[error("config error: {0}")]
    Config(String),
}

/// Грубая классификация ошибок.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Decompression,
    InvalidRowIndex,
    MissingRow,
    Corrupt,
    Config,
}

impl BlockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockError::Io { .. } | BlockError::ShortRead { .. } => ErrorKind::Io,
            BlockError::Decompress { .. } => ErrorKind::Decompression,
            BlockError::InvalidRowIndex { .. } => ErrorKind::InvalidRowIndex,
            BlockError::MissingRow { .. } => ErrorKind::MissingRow,
            BlockError::CorruptBlock { .. } | BlockError::BlockTooLarge { .. } => {
                ErrorKind::Corrupt
            }
            BlockError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn corrupt(block_offset: u64, msg: impl Into<String>) -> Self {
        BlockError::CorruptBlock {
            block_offset,
            msg: msg.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BlockError>;
