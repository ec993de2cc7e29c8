//! row_info — кодек записи row index (8 байт, LE).
//!
//! Формат записи: [offset u32][size u32].
//! offset отсчитывается от начала области данных блока (data_area_start),
//! а не от начала payload и не от начала файла.

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::ROW_INFO_SIZE;

/// Положение строки внутри области данных распакованного блока.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowInfo {
    pub offset: u32,
    pub size: u32,
}

impl RowInfo {
    pub const SIZE: usize = ROW_INFO_SIZE;

    pub fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }

    /// Прочитать запись по смещению `pos`.
    ///
    /// Предусловие: `pos + 8 <= buf.len()` (проверяет вызывающий; иначе panic).
    #[inline]
    pub fn read(buf: &[u8], pos: usize) -> Self {
        let offset = LittleEndian::read_u32(&buf[pos..pos + 4]);
        let size = LittleEndian::read_u32(&buf[pos + 4..pos + 8]);
        Self { offset, size }
    }

    /// Записать запись в `buf` по смещению `pos` (тот же layout, что и `read`).
    #[inline]
    pub fn write(&self, buf: &mut [u8], pos: usize) {
        LittleEndian::write_u32(&mut buf[pos..pos + 4], self.offset);
        LittleEndian::write_u32(&mut buf[pos + 4..pos + 8], self.size);
    }

    /// Конец строки относительно области данных (None при переполнении usize).
    #[inline]
    pub fn end(&self) -> Option<usize> {
        (self.offset as usize).checked_add(self.size as usize)
    }
}

/// Разобрать `count` записей подряд, начиная с `start`.
/// Предусловие то же: `start + count * 8 <= buf.len()`.
pub fn read_row_infos(buf: &[u8], start: usize, count: usize) -> Vec<RowInfo> {
    (0..count)
        .map(|i| RowInfo::read(buf, start + i * ROW_INFO_SIZE))
        .collect()
}
