mod common;

use anyhow::Result;

use common::build_file;
use ZstBlocks::{metrics, read_many, BlockReader, RowPosition, ZstdCodec};

// Счётчики процессные: в этом файле один тест, дельты точные
#[test]
fn read_errors_count_block_and_row_failures() -> Result<()> {
    let codec = ZstdCodec::default();
    let (file, offs) = build_file(&codec, &[&[b"a", b"b"], &[b"c"]]);
    let reader = BlockReader::new(&file, &codec);

    let before = metrics::snapshot().read_errors;

    // Некорректный row_index: блок прочитан, строка — нет
    assert!(reader.read_row(offs[0], 5).is_err());
    assert!(reader.read_rows(offs[1], &[0, 3]).is_err());
    assert_eq!(metrics::snapshot().read_errors - before, 2);

    // Offset за концом файла: ошибка уровня блока
    assert!(reader.read_row(file.len() as u64 + 8, 0).is_err());
    assert_eq!(metrics::snapshot().read_errors - before, 3);

    // Batch: одна плохая группа — одна ошибка
    let positions = [RowPosition::new(offs[0], 0), RowPosition::new(offs[1], 9)];
    assert!(read_many(&reader, &positions, true).is_err());
    assert_eq!(metrics::snapshot().read_errors - before, 4);

    // Успешные чтения счётчик не трогают
    assert_eq!(reader.read_rows(offs[0], &[1, 0])?, vec![b"b".to_vec(), b"a".to_vec()]);
    assert_eq!(metrics::snapshot().read_errors - before, 4);
    Ok(())
}
