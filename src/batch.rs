//! batch — векторное чтение строк: read_many.
//!
//! Идея:
//! - Сгруппировать позиции по block_offset (BTreeMap), сохранив глобальный индекс
//!   каждой позиции, и прочитать/распаковать каждый блок ровно один раз.
//! - Группы независимы и пишут в непересекающиеся слоты результата, поэтому
//!   их можно разрешать параллельно (rayon); scatter выполняется после join.
//!
//! Семантика:
//! - Порядок результата = порядок входа, независимо от порядка завершения групп.
//! - Дубликаты разрешаются независимо (повторное извлечение из того же payload).
//! - Всё или ничего: ошибка любой группы проваливает весь вызов; незаполненный
//!   слот после scatter → BlockError::MissingRow. Частичный результат не отдаётся.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::block::BlockReader;
use crate::error::{BlockError, Result};
use crate::io::ReadAt;
use crate::metrics::record_batch;

/// Адрес логической строки: (offset блока в файле, индекс строки в блоке).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowPosition {
    pub block_offset: u64,
    pub row_index: u32,
}

impl RowPosition {
    pub fn new(block_offset: u64, row_index: u32) -> Self {
        Self {
            block_offset,
            row_index,
        }
    }
}

impl fmt::Display for RowPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_offset, self.row_index)
    }
}

/// Формат "<block_offset>:<row_index>" (CLI --pos).
impl FromStr for RowPosition {
    type Err = BlockError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bad = || BlockError::Config(format!("invalid row position '{}' (expected OFFSET:ROW)", s));
        let (off, row) = s.trim().split_once(':').ok_or_else(bad)?;
        let block_offset = off.trim().parse::<u64>().map_err(|_| bad())?;
        let row_index = row.trim().parse::<u32>().map_err(|_| bad())?;
        Ok(Self::new(block_offset, row_index))
    }
}

/// Запрос внутри группы: глобальный индекс позиции + row_index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Req {
    idx: usize,
    row_index: u32,
}

/// Группировка по block_offset; внутри группы — исходный относительный порядок.
fn group_by_block(positions: &[RowPosition]) -> BTreeMap<u64, Vec<Req>> {
    let mut by_block: BTreeMap<u64, Vec<Req>> = BTreeMap::new();
    for (i, p) in positions.iter().enumerate() {
        by_block.entry(p.block_offset).or_default().push(Req {
            idx: i,
            row_index: p.row_index,
        });
    }
    by_block
}

/// Прочитать строки по произвольному списку позиций.
///
/// `parallel=true` — группы разрешаются на пуле rayon; иначе последовательно
/// в порядке возрастания block_offset.
pub fn read_many<R: ReadAt + ?Sized>(
    reader: &BlockReader<'_, R>,
    positions: &[RowPosition],
    parallel: bool,
) -> Result<Vec<Vec<u8>>> {
    if positions.is_empty() {
        return Ok(Vec::new());
    }

    let groups: Vec<(u64, Vec<Req>)> = group_by_block(positions).into_iter().collect();
    record_batch(groups.len() as u64);
    debug!(
        "read_many: {} position(s) in {} block group(s), parallel={}",
        positions.len(),
        groups.len(),
        parallel
    );

    // Одна распаковка на группу; результат — пары (глобальный индекс, строка).
    let resolve = |(block_offset, reqs): &(u64, Vec<Req>)| -> Result<Vec<(usize, Vec<u8>)>> {
        let indices: Vec<u32> = reqs.iter().map(|r| r.row_index).collect();
        let rows = reader.read_rows(*block_offset, &indices)?;
        Ok(reqs.iter().map(|r| r.idx).zip(rows).collect())
    };

    let resolved: Vec<Result<Vec<(usize, Vec<u8>)>>> = if parallel && groups.len() > 1 {
        groups.par_iter().map(resolve).collect()
    } else {
        groups.iter().map(resolve).collect()
    };

    // Scatter по слотам (после join, без синхронизации)
    let mut out: Vec<Option<Vec<u8>>> = vec![None; positions.len()];
    for (group, res) in groups.iter().zip(resolved) {
        let pairs = res.map_err(|e| {
            warn!(
                "read_many: block {} failed, whole batch of {} aborted: {}",
                group.0,
                positions.len(),
                e
            );
            e
        })?;
        for (idx, row) in pairs {
            out[idx] = Some(row);
        }
    }

    out.into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.ok_or(BlockError::MissingRow {
                position_index: i,
                block_offset: positions[i].block_offset,
                row_index: positions[i].row_index,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_parse_and_display() {
        let p: RowPosition = "1024:7".parse().unwrap();
        assert_eq!(p, RowPosition::new(1024, 7));
        assert_eq!(p.to_string(), "1024:7");
        assert!("1024".parse::<RowPosition>().is_err());
        assert!("x:1".parse::<RowPosition>().is_err());
        assert!("1:-1".parse::<RowPosition>().is_err());
    }

    #[test]
    fn grouping_keeps_global_indices_and_order() {
        let positions = [
            RowPosition::new(100, 1),
            RowPosition::new(0, 0),
            RowPosition::new(100, 0),
            RowPosition::new(100, 1),
        ];
        let g = group_by_block(&positions);
        assert_eq!(g.len(), 2);
        assert_eq!(g[&0], vec![Req { idx: 1, row_index: 0 }]);
        assert_eq!(
            g[&100],
            vec![
                Req { idx: 0, row_index: 1 },
                Req { idx: 2, row_index: 0 },
                Req { idx: 3, row_index: 1 },
            ]
        );
    }
}
