//! Основной кодек формата: zstd.
//!
//! compress — zstd::bulk (один фрейм); decompress — потоковый декодер
//! с ограничением на размер результата (см. read_limited).

use std::io::{self, Cursor};

use super::{read_limited, Codec};

#[derive(Clone, Debug)]
pub struct ZstdCodec {
    max_output: usize,
}

impl ZstdCodec {
    pub fn with_limit(max_output: usize) -> Self {
        Self { max_output }
    }
}

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, data: &[u8], level: i32) -> io::Result<Vec<u8>> {
        zstd::bulk::compress(data, level)
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let decoder = zstd::stream::read::Decoder::new(Cursor::new(data))?;
        // Обычно блок сжимается в несколько раз — берём это как hint для capacity.
        read_limited(decoder, self.max_output, data.len().saturating_mul(4))
    }
}
