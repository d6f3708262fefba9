use std::{io, process::ExitCode};

use log::{error, LevelFilter};
use memcpy_bench::{app, config::BenchConfig, sweep::Sentinels};

fn main() -> ExitCode {
    env_logger::Builder::new().filter_level(LevelFilter::Info).init();

    let result = Sentinels::new(42u8, 0)
        .and_then(|sentinels| app::run(&BenchConfig::single(), sentinels, &mut io::stdout().lock()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
