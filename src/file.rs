//! file — ZstBlocksFile: файл .zst_blocks + кодек + конфиг в одном хэндле.
//!
//! Тонкая обёртка над BlockReader/read_many/BlockScanner. Сам по себе ничего не
//! кэширует: каждый вызов заново читает и распаковывает нужные блоки.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use memmap2::Mmap;

use crate::batch::{read_many, RowPosition};
use crate::block::{BlockInfo, BlockPayload, BlockReader, BlockScanner, RowScanner};
use crate::codec::Codec;
use crate::config::ReaderConfig;
use crate::consts::FILE_EXT;
use crate::error::{BlockError, Result};
use crate::io::ReadAt;

/// Источник байт для файла, открытого по пути.
pub enum FileSource {
    File(File),
    Mmap(Mmap),
}

impl ReadAt for FileSource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            FileSource::File(f) => f.read_at(offset, buf),
            FileSource::Mmap(m) => m.read_at(offset, buf),
        }
    }

    fn len(&self) -> io::Result<u64> {
        match self {
            FileSource::File(f) => ReadAt::len(f),
            FileSource::Mmap(m) => ReadAt::len(m),
        }
    }
}

pub struct ZstBlocksFile<R: ReadAt = FileSource> {
    src: R,
    codec: Arc<dyn Codec>,
    cfg: ReaderConfig,
}

impl ZstBlocksFile<FileSource> {
    /// Открыть файл с конфигом из ENV.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, ReaderConfig::from_env()?)
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, cfg: ReaderConfig) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXT) {
            warn!("{}: expected .{} extension", path.display(), FILE_EXT);
        }
        let f = File::open(path).map_err(|e| BlockError::Io { offset: 0, source: e })?;
        let len = f
            .metadata()
            .map_err(|e| BlockError::Io { offset: 0, source: e })?
            .len();

        // Пустой файл не мапим
        let src = if cfg.use_mmap && len > 0 {
            let mmap = unsafe { Mmap::map(&f) }.map_err(|e| BlockError::Io { offset: 0, source: e })?;
            FileSource::Mmap(mmap)
        } else {
            FileSource::File(f)
        };
        debug!(
            "open {}: {} B, mmap={}, codec={}",
            path.display(),
            len,
            matches!(src, FileSource::Mmap(_)),
            cfg.codec
        );
        Ok(Self::from_source(src, cfg))
    }
}

impl<R: ReadAt> ZstBlocksFile<R> {
    /// Любой ReadAt-источник; кодек строится из `cfg.codec`.
    pub fn from_source(src: R, cfg: ReaderConfig) -> Self {
        let codec = cfg.codec.build(cfg.max_block_bytes);
        Self { src, codec, cfg }
    }

    /// Явный кодек (например, тестовый).
    pub fn with_codec(src: R, codec: Arc<dyn Codec>, cfg: ReaderConfig) -> Self {
        Self { src, codec, cfg }
    }

    pub fn reader(&self) -> BlockReader<'_, R> {
        BlockReader::new(&self.src, self.codec.as_ref()).with_max_block_bytes(self.cfg.max_block_bytes)
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.cfg
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    pub fn source(&self) -> &R {
        &self.src
    }

    pub fn len(&self) -> Result<u64> {
        self.src
            .len()
            .map_err(|e| BlockError::Io { offset: 0, source: e })
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn read_block(&self, block_offset: u64) -> Result<BlockPayload> {
        self.reader().read_block(block_offset)
    }

    pub fn block_info(&self, block_offset: u64) -> Result<BlockInfo> {
        self.reader().block_info(block_offset)
    }

    pub fn read_row(&self, pos: RowPosition) -> Result<Vec<u8>> {
        self.reader().read_row(pos.block_offset, pos.row_index)
    }

    pub fn read_rows(&self, block_offset: u64, row_indices: &[u32]) -> Result<Vec<Vec<u8>>> {
        self.reader().read_rows(block_offset, row_indices)
    }

    /// Batch-чтение по произвольным позициям (см. batch::read_many).
    pub fn read_many(&self, positions: &[RowPosition]) -> Result<Vec<Vec<u8>>> {
        read_many(&self.reader(), positions, self.cfg.parallel)
    }

    /// Последовательный обход блоков с начала файла.
    pub fn blocks(&self) -> Result<BlockScanner<'_, R>> {
        BlockScanner::new(self.reader())
    }

    /// Все строки файла по порядку.
    pub fn rows(&self) -> Result<RowScanner<'_, R>> {
        Ok(RowScanner::new(self.blocks()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecKind, PlainCodec};
    use crate::consts::data_area_start;
    use crate::row_info::RowInfo;
    use byteorder::{ByteOrder, LittleEndian};

    fn one_block(rows: &[&[u8]]) -> Vec<u8> {
        let start = data_area_start(rows.len());
        let mut payload = vec![0u8; start];
        LittleEndian::write_u32(&mut payload[0..4], rows.len() as u32);
        let mut off = 0u32;
        for (i, r) in rows.iter().enumerate() {
            RowInfo::new(off, <[u8]>::len(r) as u32).write(&mut payload, 4 + i * RowInfo::SIZE);
            payload.extend_from_slice(r);
            off += <[u8]>::len(r) as u32;
        }
        let mut out = (payload.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(&payload);
        out
    }

    #[test]
    fn in_memory_source_with_plain_codec() {
        let cfg = ReaderConfig::default().with_codec(CodecKind::None);
        let f = ZstBlocksFile::from_source(one_block(&[b"x", b"yy"]), cfg);
        assert_eq!(f.codec().name(), "none");
        assert_eq!(f.read_row(RowPosition::new(0, 1)).unwrap(), b"yy");
        assert_eq!(f.block_info(0).unwrap().row_count, 2);
        assert_eq!(f.rows().unwrap().count(), 2);
    }

    #[test]
    fn explicit_codec() {
        let f = ZstBlocksFile::with_codec(
            one_block(&[b"k"]),
            Arc::new(PlainCodec),
            ReaderConfig::default().with_parallel(false),
        );
        let got = f
            .read_many(&[RowPosition::new(0, 0), RowPosition::new(0, 0)])
            .unwrap();
        assert_eq!(got, vec![b"k".to_vec(), b"k".to_vec()]);
    }
}
