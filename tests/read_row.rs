mod common;

use anyhow::Result;

use common::{build_block, build_file, build_payload};
use ZstBlocks::block::BlockScanner;
use ZstBlocks::{read_block, read_row, read_rows, BlockReader, ErrorKind, PlainCodec, ZstdCodec};

#[test]
fn single_block_every_row() -> Result<()> {
    let codec = ZstdCodec::default();
    let file = build_block(&codec, &[b"a", b"bb", b"ccc"]);

    assert_eq!(read_row(&file, &codec, 0, 0)?, b"a");
    assert_eq!(read_row(&file, &codec, 0, 1)?, b"bb");
    assert_eq!(read_row(&file, &codec, 0, 2)?, b"ccc");

    // index == row_count — ошибка, не пустая строка
    let err = read_row(&file, &codec, 0, 3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRowIndex);
    Ok(())
}

#[test]
fn read_rows_follows_request_order() -> Result<()> {
    let codec = ZstdCodec::default();
    let file = build_block(&codec, &[b"r0", b"r1", b"r2", b"r3"]);

    let got = read_rows(&file, &codec, 0, &[3, 0, 3, 1])?;
    assert_eq!(got, vec![b"r3".to_vec(), b"r0".to_vec(), b"r3".to_vec(), b"r1".to_vec()]);

    // Пустой список индексов — блок всё равно валиден, результат пуст
    assert!(read_rows(&file, &codec, 0, &[])?.is_empty());
    Ok(())
}

#[test]
fn read_rows_is_all_or_nothing() -> Result<()> {
    let codec = ZstdCodec::default();
    let file = build_block(&codec, &[b"x", b"y"]);

    let err = read_rows(&file, &codec, 0, &[0, 1, 7]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRowIndex);
    Ok(())
}

#[test]
fn zero_row_block() -> Result<()> {
    let codec = ZstdCodec::default();
    let file = build_block(&codec, &[]);

    let block = read_block(&file, &codec, 0)?;
    assert_eq!(block.row_count(), 0);
    assert_eq!(block.payload_len(), 4);

    let err = read_row(&file, &codec, 0, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRowIndex);
    Ok(())
}

#[test]
fn empty_rows_and_binary_rows() -> Result<()> {
    let codec = ZstdCodec::default();
    let bin: Vec<u8> = (0u8..=255).collect();
    let file = build_block(&codec, &[b"", &bin, b""]);

    assert_eq!(read_row(&file, &codec, 0, 0)?, b"");
    assert_eq!(read_row(&file, &codec, 0, 1)?, bin);
    assert_eq!(read_row(&file, &codec, 0, 2)?, b"");
    Ok(())
}

#[test]
fn blocks_are_addressed_by_file_offset() -> Result<()> {
    let codec = ZstdCodec::default();
    let (file, offs) = build_file(
        &codec,
        &[&[b"a0", b"a1"], &[b"b0"], &[b"c0", b"c1", b"c2"]],
    );
    assert_eq!(offs[0], 0);

    let reader = BlockReader::new(&file, &codec);
    assert_eq!(reader.read_row(offs[1], 0)?, b"b0");
    assert_eq!(reader.read_row(offs[2], 2)?, b"c2");
    assert_eq!(reader.read_rows(offs[0], &[1, 0])?, vec![b"a1".to_vec(), b"a0".to_vec()]);

    // Следующий блок начинается сразу за текущим
    let b0 = reader.read_block(offs[0])?;
    assert_eq!(b0.next_offset(), offs[1]);
    let info = reader.block_info(offs[2])?;
    assert_eq!(info.offset, offs[2]);
    assert_eq!(info.row_count, 3);
    Ok(())
}

#[test]
fn plain_codec_payload_is_stored_as_is() -> Result<()> {
    let payload = build_payload(&[b"one", b"two"]);
    let mut file = (payload.len() as u32).to_le_bytes().to_vec();
    file.extend_from_slice(&payload);

    assert_eq!(read_row(&file, &PlainCodec, 0, 1)?, b"two");
    Ok(())
}

#[test]
fn scanner_walks_all_blocks() -> Result<()> {
    let codec = ZstdCodec::default();
    let (file, offs) = build_file(&codec, &[&[b"a"], &[], &[b"b", b"c"]]);

    let reader = BlockReader::new(&file, &codec);
    let mut seen = Vec::new();
    for b in BlockScanner::new(reader)? {
        let b = b?;
        seen.push((b.block_offset(), b.row_count()));
    }
    assert_eq!(seen, vec![(offs[0], 1), (offs[1], 0), (offs[2], 2)]);

    // Старт с середины файла
    let tail: Vec<u64> = BlockScanner::starting_at(reader, offs[1])?
        .map(|b| b.map(|b| b.block_offset()))
        .collect::<ZstBlocks::Result<_>>()?;
    assert_eq!(tail, vec![offs[1], offs[2]]);
    Ok(())
}
