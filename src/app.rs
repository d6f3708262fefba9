use std::io::Write;

use log::info;

use crate::{
    config::BenchConfig,
    error::Result,
    report::{render, render_single},
    strategy::{default_strategies, Element},
    sweep::{single, Sentinels, Sweep},
};

/// Runs every default strategy under `config` and writes the progress lines
/// and final report to `out`.
pub fn run<T, W>(config: &BenchConfig, sentinels: Sentinels<T>, out: &mut W) -> Result<()>
where
    T: Element,
    W: Write,
{
    config.validate()?;
    let strategies = default_strategies::<T>();

    let report = match config {
        BenchConfig::Sweep(sweep) => {
            let table = Sweep::new(*sweep)?.run(&strategies, sentinels, |name, exponent| {
                writeln!(out, "{} {}", name, exponent)?;
                Ok(())
            })?;
            render(&table)?
        }
        BenchConfig::Single(config) => render_single(&single(&strategies, config, sentinels)?)?,
    };

    out.write_all(&report)?;
    out.flush()?;
    info!("done, {} strategies", strategies.len());
    Ok(())
}
