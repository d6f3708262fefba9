use core::fmt::Write as _;

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    error::{Error, Result},
    sweep::{Measurement, ResultsTable},
};

/// Renders the sweep grid: a header of strategy names, then one row per
/// exponent. Every field, header included, is comma-terminated.
pub fn render(table: &ResultsTable) -> Result<Bytes> {
    let mut out = BytesMut::new();

    for name in table.strategies() {
        out.put_slice(name.as_bytes());
        out.put_u8(b',');
    }
    out.put_u8(b'\n');

    for exponent in table.exponents() {
        write!(out, "{},", exponent)?;
        for name in table.strategies() {
            let mean = table
                .get(name, exponent)
                .ok_or_else(|| Error::MissingCell { strategy: name.to_owned(), exponent })?;
            write!(out, "{},", mean)?;
        }
        out.put_u8(b'\n');
    }

    Ok(out.freeze())
}

/// `<name>: <elapsed_microseconds>` per measurement.
pub fn render_single(measurements: &[Measurement]) -> Result<Bytes> {
    let mut out = BytesMut::new();
    for measurement in measurements {
        writeln!(out, "{}: {}", measurement.strategy, measurement.timing.elapsed_micros())?;
    }
    Ok(out.freeze())
}
