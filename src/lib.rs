#![allow(non_snake_case)]

// Формат и кодек row index
pub mod consts;
pub mod error;
pub mod row_info;

// Провайдеры: сжатие и позиционное чтение
pub mod codec;  // src/codec/{mod,zstd_codec,gzip_codec}.rs
pub mod io;

// Чтение блоков и batch-координатор
pub mod block;  // src/block/{mod,reader,scan}.rs
pub mod batch;
pub mod file;

pub mod config;
pub mod metrics;

// CLI (используется бинарником zstblocks)
pub mod cli;

// Удобные реэкспорты
pub use batch::{read_many, RowPosition};
pub use block::{read_block, read_row, read_rows, BlockInfo, BlockPayload, BlockReader};
pub use codec::{Codec, CodecKind, GzipCodec, PlainCodec, ZstdCodec};
pub use config::{ReaderBuilder, ReaderConfig};
pub use error::{BlockError, ErrorKind, Result};
pub use file::{FileSource, ZstBlocksFile};
pub use io::ReadAt;
pub use row_info::RowInfo;
