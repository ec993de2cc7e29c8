//! codec — провайдер сжатия (стратегия), подставляемый в BlockReader.
//!
//! Блок-ридер не знает, каким кодеком сжат payload: он получает `&dyn Codec`
//! и вызывает только `decompress`. `compress` нужен writer'у/тестам.
//!
//! Реализации:
//! - ZstdCodec  — основной (формат .zst_blocks), потоковая распаковка с лимитом.
//! - GzipCodec  — взаимозаменяемая альтернатива на flate2.
//! - PlainCodec — без сжатия (тесты/отладка).
//!
//! Ошибки кодека — `std::io::Error`; BlockReader переводит их в
//! `BlockError::Decompress` с offset блока.

use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;
use std::sync::Arc;

use crate::consts::DEFAULT_MAX_BLOCK_BYTES;
use crate::error::BlockError;

mod gzip_codec;
mod zstd_codec;

pub use self::gzip_codec::GzipCodec;
pub use self::zstd_codec::ZstdCodec;

/// Полиморфный провайдер сжатия.
pub trait Codec: Send + Sync {
    /// Короткое имя для логов/CLI.
    fn name(&self) -> &'static str;

    /// Сжать `data` с уровнем `level` (семантика уровня — у конкретного кодека).
    fn compress(&self, data: &[u8], level: i32) -> io::Result<Vec<u8>>;

    /// Распаковать `data`. Детерминировано; ошибка на повреждённом входе.
    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>>;
}

impl<C: Codec + ?Sized> Codec for Arc<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn compress(&self, data: &[u8], level: i32) -> io::Result<Vec<u8>> {
        (**self).compress(data, level)
    }
    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        (**self).decompress(data)
    }
}

/// Без сжатия: payload хранится как есть.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainCodec;

impl Codec for PlainCodec {
    fn name(&self) -> &'static str {
        "none"
    }
    fn compress(&self, data: &[u8], _level: i32) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }
    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Выбор кодека (ENV ZSTB_CODEC / CLI --codec).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CodecKind {
    None,
    Gzip,
    #[default]
    Zstd,
}

impl CodecKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecKind::None => "none",
            CodecKind::Gzip => "gzip",
            CodecKind::Zstd => "zstd",
        }
    }

    /// Построить кодек с guard'ом на размер распакованных данных.
    pub fn build(self, max_output: usize) -> Arc<dyn Codec> {
        match self {
            CodecKind::None => Arc::new(PlainCodec),
            CodecKind::Gzip => Arc::new(GzipCodec::with_limit(max_output)),
            CodecKind::Zstd => Arc::new(ZstdCodec::with_limit(max_output)),
        }
    }
}

impl FromStr for CodecKind {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "zstd" | "zst" => Ok(CodecKind::Zstd),
            "gzip" | "gz" => Ok(CodecKind::Gzip),
            "none" | "plain" => Ok(CodecKind::None),
            _ => Err(BlockError::Config(format!(
                "invalid codec '{}' (supported: none|gzip|zstd)",
                s
            ))),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        ZstdCodec::with_limit(DEFAULT_MAX_BLOCK_BYTES)
    }
}

impl Default for GzipCodec {
    fn default() -> Self {
        GzipCodec::with_limit(DEFAULT_MAX_BLOCK_BYTES)
    }
}

/// Дочитать распаковывающий Read до конца, не выходя за `limit` байт.
///
/// Читаем небольшими кусками, чтобы не аллоцировать заранее гигантский буфер
/// по недоверенному заголовку.
pub(crate) fn read_limited<R: Read>(mut r: R, limit: usize, hint: usize) -> io::Result<Vec<u8>> {
    const TMP_BUF: usize = 64 * 1024;
    let mut out = Vec::with_capacity(hint.min(limit).min(8 * 1024 * 1024));
    let mut tmp = vec![0u8; TMP_BUF];
    loop {
        let n = r.read(&mut tmp)?;
        if n == 0 {
            break;
        }
        if out.len() + n > limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("decoded data exceeds limit {} B", limit),
            ));
        }
        out.extend_from_slice(&tmp[..n]);
    }
    Ok(out)
}
