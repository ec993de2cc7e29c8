use std::io::{self, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::{read_limited, Codec};

/// gzip-провайдер (flate2). Уровень клампится в 0..=9.
#[derive(Clone, Debug)]
pub struct GzipCodec {
    max_output: usize,
}

impl GzipCodec {
    pub fn with_limit(max_output: usize) -> Self {
        Self { max_output }
    }
}

impl Codec for GzipCodec {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, data: &[u8], level: i32) -> io::Result<Vec<u8>> {
        let level = level.clamp(0, 9) as u32;
        let mut enc = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 64), Compression::new(level));
        enc.write_all(data)?;
        enc.finish()
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        read_limited(GzDecoder::new(data), self.max_output, data.len().saturating_mul(4))
    }
}
