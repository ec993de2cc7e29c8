//! block/reader — чтение одного блока и извлечение строк.
//!
//! Шаги (общие для read_row и read_rows):
//! 1) u32 LE по block_offset → compressed_size;
//! 2) compressed_size байт с block_offset+4;
//! 3) распаковка кодеком;
//! 4) разбор row_count и таблицы RowInfo (BlockPayload::parse).
//!
//! read_rows выполняет шаги 1–4 ровно один раз, затем извлекает строки в порядке
//! запроса (дубликаты сохраняются позиционно). Политика ошибок — всё или ничего:
//! первый некорректный row_index проваливает весь вызов.

use log::{debug, trace};

use crate::codec::Codec;
use crate::consts::{BLOCK_LEN_PREFIX, DEFAULT_MAX_BLOCK_BYTES};
use crate::error::{BlockError, Result};
use crate::io::{read_bytes_at, read_u32_at, ReadAt};
use crate::metrics::{record_block_read, record_read_error, record_rows_returned};

use super::{BlockInfo, BlockPayload};

/// Ридер блоков поверх файла и кодека. Дешёвый (только ссылки), Copy.
pub struct BlockReader<'a, R: ReadAt + ?Sized> {
    file: &'a R,
    codec: &'a dyn Codec,
    max_block_bytes: usize,
}

impl<'a, R: ReadAt + ?Sized> Clone for BlockReader<'a, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, R: ReadAt + ?Sized> Copy for BlockReader<'a, R> {}

impl<'a, R: ReadAt + ?Sized> BlockReader<'a, R> {
    pub fn new(file: &'a R, codec: &'a dyn Codec) -> Self {
        Self {
            file,
            codec,
            max_block_bytes: DEFAULT_MAX_BLOCK_BYTES,
        }
    }

    /// Guard на объявленный размер сжатых данных блока.
    pub fn with_max_block_bytes(mut self, max: usize) -> Self {
        self.max_block_bytes = max;
        self
    }

    pub fn file(&self) -> &'a R {
        self.file
    }

    pub fn codec(&self) -> &'a dyn Codec {
        self.codec
    }

    /// Прочитать и распаковать блок по `block_offset`.
    pub fn read_block(&self, block_offset: u64) -> Result<BlockPayload> {
        self.read_block_inner(block_offset).map_err(count_error)
    }

    fn read_block_inner(&self, block_offset: u64) -> Result<BlockPayload> {
        let compressed_size = read_u32_at(self.file, block_offset)?;
        if compressed_size as usize > self.max_block_bytes {
            return Err(BlockError::BlockTooLarge {
                block_offset,
                size: compressed_size as usize,
                limit: self.max_block_bytes,
            });
        }

        let data_off = block_offset
            .checked_add(BLOCK_LEN_PREFIX as u64)
            .ok_or_else(|| BlockError::corrupt(block_offset, "block offset overflow"))?;
        let compressed = read_bytes_at(self.file, data_off, compressed_size as usize)?;

        let payload = self
            .codec
            .decompress(&compressed)
            .map_err(|e| BlockError::Decompress {
                block_offset,
                msg: e.to_string(),
            })?;

        debug!(
            "read_block: off={} compressed={} B payload={} B codec={}",
            block_offset,
            compressed_size,
            payload.len(),
            self.codec.name()
        );
        record_block_read(compressed_size as u64, payload.len() as u64);

        BlockPayload::parse(block_offset, compressed_size, payload)
    }

    /// Одна строка из блока (копия байт).
    pub fn read_row(&self, block_offset: u64, row_index: u32) -> Result<Vec<u8>> {
        let block = self.read_block(block_offset)?;
        let row = block.row(row_index).map_err(count_error)?.to_vec();
        trace!("read_row: off={} row={} len={}", block_offset, row_index, row.len());
        record_rows_returned(1);
        Ok(row)
    }

    /// Несколько строк из одного блока; результат — в порядке `row_indices`.
    /// Блок читается и распаковывается один раз.
    pub fn read_rows(&self, block_offset: u64, row_indices: &[u32]) -> Result<Vec<Vec<u8>>> {
        let block = self.read_block(block_offset)?;
        let rows = extract_rows(&block, row_indices).map_err(count_error)?;
        record_rows_returned(rows.len() as u64);
        Ok(rows)
    }

    /// Сводка по блоку (требует распаковки, т.к. row_count внутри payload).
    pub fn block_info(&self, block_offset: u64) -> Result<BlockInfo> {
        Ok(self.read_block(block_offset)?.info())
    }
}

/// Любая ошибка чтения (блок или строка) учитывается в metrics::read_errors.
fn count_error(e: BlockError) -> BlockError {
    record_read_error();
    e
}

/// Извлечь строки из уже распакованного блока в порядке `row_indices`.
pub fn extract_rows(block: &BlockPayload, row_indices: &[u32]) -> Result<Vec<Vec<u8>>> {
    let mut out = Vec::with_capacity(row_indices.len());
    for &idx in row_indices {
        let row = block.row(idx)?;
        trace!(
            "extract_rows: off={} row={} len={}",
            block.block_offset(),
            idx,
            row.len()
        );
        out.push(row.to_vec());
    }
    Ok(out)
}

/// Прочитать и распаковать блок (лимиты по умолчанию).
pub fn read_block<R: ReadAt + ?Sized>(
    file: &R,
    codec: &dyn Codec,
    block_offset: u64,
) -> Result<BlockPayload> {
    BlockReader::new(file, codec).read_block(block_offset)
}

/// Одна строка по (block_offset, row_index).
pub fn read_row<R: ReadAt + ?Sized>(
    file: &R,
    codec: &dyn Codec,
    block_offset: u64,
    row_index: u32,
) -> Result<Vec<u8>> {
    BlockReader::new(file, codec).read_row(block_offset, row_index)
}

/// Несколько строк одного блока, одна распаковка.
pub fn read_rows<R: ReadAt + ?Sized>(
    file: &R,
    codec: &dyn Codec,
    block_offset: u64,
    row_indices: &[u32],
) -> Result<Vec<Vec<u8>>> {
    BlockReader::new(file, codec).read_rows(block_offset, row_indices)
}
