//! block/scan — последовательный обход блоков файла с начала.
//!
//! Блоки лежат вплотную: следующий начинается с block_offset + 4 + compressed_size.
//! Обход идёт до длины файла, зафиксированной при создании сканера.
//! Хвост короче префикса или обрезанный payload → ShortRead; после первой ошибки
//! итератор завершается.

use crate::error::{BlockError, Result};
use crate::io::ReadAt;

use super::{BlockPayload, BlockReader};

pub struct BlockScanner<'a, R: ReadAt + ?Sized> {
    reader: BlockReader<'a, R>,
    pos: u64,
    end: u64,
    done: bool,
}

impl<'a, R: ReadAt + ?Sized> BlockScanner<'a, R> {
    pub fn new(reader: BlockReader<'a, R>) -> Result<Self> {
        Self::starting_at(reader, 0)
    }

    /// Начать обход с известного offset блока.
    pub fn starting_at(reader: BlockReader<'a, R>, start: u64) -> Result<Self> {
        let end = reader
            .file()
            .len()
            .map_err(|e| BlockError::Io { offset: 0, source: e })?;
        Ok(Self {
            reader,
            pos: start,
            end,
            done: false,
        })
    }
}

impl<'a, R: ReadAt + ?Sized> Iterator for BlockScanner<'a, R> {
    type Item = Result<BlockPayload>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.end {
            return None;
        }
        match self.reader.read_block(self.pos) {
            Ok(block) => {
                self.pos = block.next_offset();
                Some(Ok(block))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Все строки файла по порядку (блок за блоком), копиями.
pub struct RowScanner<'a, R: ReadAt + ?Sized> {
    blocks: BlockScanner<'a, R>,
    current: Option<BlockPayload>,
    next_row: u32,
}

impl<'a, R: ReadAt + ?Sized> RowScanner<'a, R> {
    pub fn new(blocks: BlockScanner<'a, R>) -> Self {
        Self {
            blocks,
            current: None,
            next_row: 0,
        }
    }
}

impl<'a, R: ReadAt + ?Sized> Iterator for RowScanner<'a, R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(block) = &self.current {
                if self.next_row < block.row_count() {
                    let i = self.next_row;
                    self.next_row += 1;
                    return Some(block.row(i).map(|r| r.to_vec()));
                }
            }
            // текущий блок исчерпан (или ещё не прочитан) — берём следующий
            match self.blocks.next()? {
                Ok(block) => {
                    self.current = Some(block);
                    self.next_row = 0;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
