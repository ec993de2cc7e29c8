//! Centralized configuration for block readers.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - ReaderConfig::from_env() reads ZSTB_* variables; fluent `with_*` setters override.
//! - ReaderBuilder starts from env (or clean defaults) and yields a ReaderConfig.
//!
//! Defaults:
//! - codec = zstd (format default)
//! - max_block_bytes = 1 GiB (guard on declared and decompressed block size)
//! - parallel = true (read_many resolves block groups on the rayon pool)
//! - use_mmap = false (positional reads through the file handle)

use std::fmt;

use crate::codec::CodecKind;
use crate::consts::DEFAULT_MAX_BLOCK_BYTES;
use crate::error::Result;

/// Top-level configuration for ZstBlocksFile / BlockReader.
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    /// Compression provider for block payloads.
    /// Env: ZSTB_CODEC = zstd|gzip|none (default zstd)
    pub codec: CodecKind,

    /// Max declared compressed size of one block, and max decompressed size.
    /// Env: ZSTB_MAX_BLOCK_BYTES (default 1 GiB)
    pub max_block_bytes: usize,

    /// Resolve read_many groups concurrently.
    /// Env: ZSTB_PARALLEL (default true; "1|true|on|yes" => true)
    pub parallel: bool,

    /// Map the whole file into memory instead of positional reads.
    /// Env: ZSTB_MMAP (default false)
    pub use_mmap: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            codec: CodecKind::Zstd,
            max_block_bytes: DEFAULT_MAX_BLOCK_BYTES,
            parallel: true,
            use_mmap: false,
        }
    }
}

#[inline]
fn env_flag(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "yes" || s == "on"
}

impl ReaderConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparsable numbers/flags fall back to defaults; an unknown codec name is an error.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("ZSTB_CODEC") {
            cfg.codec = v.parse()?;
        }

        if let Ok(v) = std::env::var("ZSTB_MAX_BLOCK_BYTES") {
            if let Ok(n) = v.trim().parse::<usize>() {
                if n > 0 {
                    cfg.max_block_bytes = n;
                }
            }
        }

        if let Ok(v) = std::env::var("ZSTB_PARALLEL") {
            cfg.parallel = env_flag(&v);
        }

        if let Ok(v) = std::env::var("ZSTB_MMAP") {
            cfg.use_mmap = env_flag(&v);
        }

        Ok(cfg)
    }

    pub fn with_codec(mut self, codec: CodecKind) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_max_block_bytes(mut self, max: usize) -> Self {
        self.max_block_bytes = max;
        self
    }

    pub fn with_parallel(mut self, on: bool) -> Self {
        self.parallel = on;
        self
    }

    pub fn with_mmap(mut self, on: bool) -> Self {
        self.use_mmap = on;
        self
    }
}

impl fmt::Display for ReaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReaderConfig {{ \
             codec: {}, \
             max_block_bytes: {}, \
             parallel: {}, \
             use_mmap: {} \
             }}",
            self.codec, self.max_block_bytes, self.parallel, self.use_mmap,
        )
    }
}

/// Lightweight builder that produces a ReaderConfig.
#[derive(Clone, Debug, Default)]
pub struct ReaderBuilder {
    cfg: ReaderConfig,
}

impl ReaderBuilder {
    /// Start from env (falls back to defaults if env is invalid).
    pub fn new() -> Self {
        Self {
            cfg: ReaderConfig::from_env().unwrap_or_default(),
        }
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self::default()
    }

    pub fn codec(mut self, codec: CodecKind) -> Self {
        self.cfg.codec = codec;
        self
    }

    pub fn max_block_bytes(mut self, max: usize) -> Self {
        self.cfg.max_block_bytes = max;
        self
    }

    pub fn parallel(mut self, on: bool) -> Self {
        self.cfg.parallel = on;
        self
    }

    pub fn mmap(mut self, on: bool) -> Self {
        self.cfg.use_mmap = on;
        self
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> ReaderConfig {
        self.cfg
    }
}
