use std::process::ExitCode;

use env_logger::{Builder, Env};
use log::error;

/// Логи zstblocks идут в stderr, stdout остаётся под строки/JSON.
/// Фильтр — RUST_LOG (например, `RUST_LOG=ZstBlocks=debug` покажет каждый read_block).
fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() -> ExitCode {
    init_logger();

    match ZstBlocks::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // {:?} у anyhow печатает всю цепочку контекста
            error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}
