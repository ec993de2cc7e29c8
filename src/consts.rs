//! Общие константы формата .zst_blocks.
//!
//! Физический блок в файле:
//! [compressed_size u32 LE][compressed payload; compressed_size bytes]
//!
//! Распакованный payload блока:
//! [row_count u32 LE][row_count × RowInfo(offset u32, size u32)][row data area]
//!
//! Magic/версии/контрольной суммы в формате нет.

// -------- Block framing --------
/// Размер префикса длины сжатых данных блока.
pub const BLOCK_LEN_PREFIX: usize = 4;

// -------- Payload --------
/// Размер поля row_count в начале распакованного payload.
pub const ROW_COUNT_SIZE: usize = 4;
/// Размер одной записи row index (offset u32 + size u32).
pub const ROW_INFO_SIZE: usize = 8;

// -------- Compression --------
/// Уровень сжатия по умолчанию (для будущего writer'а).
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Guard по умолчанию на размер блока (сжатого и распакованного): 1 GiB.
pub const DEFAULT_MAX_BLOCK_BYTES: usize = 1 << 30;

// -------- Files --------
pub const FILE_EXT: &str = "zst_blocks";

/// Начало области данных для блока с `row_count` строками.
#[inline]
pub fn data_area_start(row_count: usize) -> usize {
    ROW_COUNT_SIZE + row_count * ROW_INFO_SIZE
}
