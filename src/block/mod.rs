//! block — распакованный блок и чтение блоков из файла.
//!
//! Layout распакованного payload:
//! [row_count u32][row_count × RowInfo][row data area]
//!
//! Подмодули:
//! - reader: BlockReader — чтение/распаковка одного блока, read_row/read_rows.
//! - scan:   BlockScanner/RowScanner — последовательный обход файла от offset 0.
//!
//! Payload живёт только в пределах одной операции (или одной группы batch-чтения);
//! между вызовами ничего не кэшируется. Расположение строк в области данных
//! (смежность, отсутствие перекрытий) не проверяется: доверяем writer'у и
//! проверяем только, что каждая строка целиком лежит внутри payload.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::consts::{data_area_start, BLOCK_LEN_PREFIX, ROW_COUNT_SIZE};
use crate::error::{BlockError, Result};
use crate::row_info::{read_row_infos, RowInfo};

pub mod reader;
pub mod scan;

pub use reader::{read_block, read_row, read_rows, BlockReader};
pub use scan::{BlockScanner, RowScanner};

/// Распакованный блок с разобранной таблицей строк.
#[derive(Clone, Debug)]
pub struct BlockPayload {
    block_offset: u64,
    compressed_len: u32,
    data: Vec<u8>,
    rows: Vec<RowInfo>,
}

impl BlockPayload {
    /// Разобрать распакованный payload блока, лежащего в файле по `block_offset`.
    ///
    /// Ошибка CorruptBlock, если payload короче поля row_count или таблицы записей.
    pub fn parse(block_offset: u64, compressed_len: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() < ROW_COUNT_SIZE {
            return Err(BlockError::corrupt(
                block_offset,
                format!("payload too short for row count ({} B)", data.len()),
            ));
        }
        let row_count = LittleEndian::read_u32(&data[0..ROW_COUNT_SIZE]) as usize;

        // row_count * 8 может переполнить usize на 32-битных платформах
        let data_start = row_count
            .checked_mul(RowInfo::SIZE)
            .and_then(|t| t.checked_add(ROW_COUNT_SIZE))
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                BlockError::corrupt(
                    block_offset,
                    format!(
                        "row index table ({} rows) exceeds payload ({} B)",
                        row_count,
                        data.len()
                    ),
                )
            })?;
        debug_assert_eq!(data_start, data_area_start(row_count));

        let rows = read_row_infos(&data, ROW_COUNT_SIZE, row_count);
        Ok(Self {
            block_offset,
            compressed_len,
            data,
            rows,
        })
    }

    #[inline]
    pub fn block_offset(&self) -> u64 {
        self.block_offset
    }

    /// Смещение следующего блока в файле.
    #[inline]
    pub fn next_offset(&self) -> u64 {
        self.block_offset + BLOCK_LEN_PREFIX as u64 + self.compressed_len as u64
    }

    #[inline]
    pub fn compressed_len(&self) -> u32 {
        self.compressed_len
    }

    #[inline]
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    #[inline]
    pub fn data_start(&self) -> usize {
        data_area_start(self.rows.len())
    }

    /// Длина распакованного payload.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.data.len()
    }

    pub fn row_infos(&self) -> &[RowInfo] {
        &self.rows
    }

    pub fn row_info(&self, row_index: u32) -> Result<RowInfo> {
        self.rows
            .get(row_index as usize)
            .copied()
            .ok_or(BlockError::InvalidRowIndex {
                block_offset: self.block_offset,
                row_index,
                row_count: self.row_count(),
            })
    }

    /// Байты строки (view в payload).
    pub fn row(&self, row_index: u32) -> Result<&[u8]> {
        let info = self.row_info(row_index)?;
        let start = self.data_start();
        let range = info
            .end()
            .and_then(|end| start.checked_add(end))
            .filter(|&end| end <= self.data.len())
            .map(|end| (start + info.offset as usize)..end)
            .ok_or_else(|| {
                BlockError::corrupt(
                    self.block_offset,
                    format!(
                        "row {} (offset={}, size={}) exceeds payload ({} B, data starts at {})",
                        row_index,
                        info.offset,
                        info.size,
                        self.data.len(),
                        start
                    ),
                )
            })?;
        Ok(&self.data[range])
    }

    /// Все строки по порядку row index.
    pub fn rows(&self) -> impl Iterator<Item = Result<&[u8]>> + '_ {
        (0..self.row_count()).map(move |i| self.row(i))
    }

    pub fn info(&self) -> BlockInfo {
        BlockInfo {
            offset: self.block_offset,
            compressed_size: self.compressed_len,
            row_count: self.row_count(),
            payload_len: self.data.len(),
        }
    }
}

/// Краткая сводка по блоку (CLI `blocks`, диагностика).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    pub offset: u64,
    pub compressed_size: u32,
    pub row_count: u32,
    pub payload_len: usize,
}
