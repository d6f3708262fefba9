use std::collections::BTreeMap;

use log::{debug, info};

use crate::{
    config::{SingleConfig, SweepConfig},
    error::{Error, Result},
    strategy::{CopyStrategy, Element},
    timing::{measure, Timing, TimingParams},
};

/// Fill values for the source and destination buffers. They must differ so
/// an element the strategy never wrote stays distinguishable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sentinels<T> {
    source: T,
    destination: T,
}

impl<T: Element> Sentinels<T> {
    pub fn new(source: T, destination: T) -> Result<Self> {
        if source == destination {
            return Err(Error::InvalidConfig("sentinels must differ"));
        }
        Ok(Self { source, destination })
    }

    #[inline]
    pub fn source(&self) -> T {
        self.source
    }

    #[inline]
    pub fn destination(&self) -> T {
        self.destination
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub strategy: String,
    pub size: usize,
    pub timing: Timing,
}

impl Measurement {
    #[inline]
    pub fn mean_micros(&self) -> f64 {
        self.timing.mean_micros()
    }
}

/// Strategy name to exponent to mean microseconds. Columns keep insertion
/// order; rows are keyed by exponent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsTable {
    columns: Vec<(String, BTreeMap<u32, f64>)>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, strategy: &str, exponent: u32, mean_micros: f64) {
        match self.columns.iter_mut().find(|(name, _)| name == strategy) {
            Some((_, cells)) => {
                cells.insert(exponent, mean_micros);
            }
            None => {
                self.columns.push((strategy.to_owned(), BTreeMap::from([(exponent, mean_micros)])));
            }
        }
    }

    pub fn strategies(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, strategy: &str) -> Option<&BTreeMap<u32, f64>> {
        self.columns.iter().find(|(name, _)| name == strategy).map(|(_, cells)| cells)
    }

    #[inline]
    pub fn get(&self, strategy: &str, exponent: u32) -> Option<f64> {
        self.column(strategy)?.get(&exponent).copied()
    }

    /// Row keys, ascending, taken from the first column.
    pub fn exponents(&self) -> Vec<u32> {
        self.columns.first().map(|(_, cells)| cells.keys().copied().collect()).unwrap_or_default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Samples the copy result: the last covered element must match the source
/// and the first uncovered element must still hold the untouched sentinel.
pub fn sample_check<T, S>(strategy: &S, dst: &[T], src: &[T], untouched: T) -> Result<()>
where
    T: Element,
    S: CopyStrategy<T> + ?Sized,
{
    let covered = strategy.covered(src.len());
    let failed = |index| Error::CheckFailed { strategy: strategy.name().to_owned(), size: src.len(), index };

    if covered > 0 && dst[covered - 1] != src[covered - 1] {
        return Err(failed(covered - 1));
    }
    if covered < dst.len() && dst[covered] != untouched {
        return Err(failed(covered));
    }
    Ok(())
}

fn trial<T: Element>(
    strategy: &dyn CopyStrategy<T>,
    dst: &mut [T],
    src: &mut [T],
    sentinels: Sentinels<T>,
    params: &TimingParams,
) -> Result<Measurement> {
    src.fill(sentinels.source);
    dst.fill(sentinels.destination);

    let timing = measure(strategy, dst, src, params);
    sample_check(strategy, dst, src, sentinels.destination)?;

    debug!(
        "{} size={} repeats={} mean={:.4}us",
        strategy.name(),
        src.len(),
        timing.repeats,
        timing.mean_micros()
    );
    Ok(Measurement { strategy: strategy.name().to_owned(), size: src.len(), timing })
}

pub struct Sweep {
    config: SweepConfig,
}

impl Sweep {
    pub fn new(config: SweepConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Times every strategy at every size. `progress` is told the strategy
    /// name and exponent before each trial starts.
    pub fn run<T, F>(
        &self,
        strategies: &[Box<dyn CopyStrategy<T>>],
        sentinels: Sentinels<T>,
        mut progress: F,
    ) -> Result<ResultsTable>
    where
        T: Element,
        F: FnMut(&str, u32) -> Result<()>,
    {
        info!(
            "sweeping 2^{}..=2^{} over {} strategies",
            self.config.exponent_min,
            self.config.exponent_max,
            strategies.len()
        );

        let mut table = ResultsTable::new();
        for (exponent, size) in self.config.sizes() {
            let mut src = vec![sentinels.source; size];
            let mut dst = vec![sentinels.destination; size];

            for strategy in strategies {
                progress(strategy.name(), exponent)?;
                let measurement = trial(strategy.as_ref(), &mut dst, &mut src, sentinels, &self.config.timing)?;
                table.insert(&measurement.strategy, exponent, measurement.mean_micros());
            }
        }
        Ok(table)
    }
}

/// Times every strategy once at a fixed size, in strategy order.
pub fn single<T: Element>(
    strategies: &[Box<dyn CopyStrategy<T>>],
    config: &SingleConfig,
    sentinels: Sentinels<T>,
) -> Result<Vec<Measurement>> {
    config.validate()?;
    info!("timing {} strategies at {} elements", strategies.len(), config.size);

    let mut src = vec![sentinels.source; config.size];
    let mut dst = vec![sentinels.destination; config.size];
    strategies
        .iter()
        .map(|strategy| trial(strategy.as_ref(), &mut dst, &mut src, sentinels, &config.timing))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{default_strategies, BulkCopy, Scalar, VectorCopyInt};
    use std::time::Duration;

    const QUICK: TimingParams = TimingParams::new(3, Duration::from_micros(10));

    fn quick_sweep(exponent_min: u32, exponent_max: u32) -> Sweep {
        Sweep::new(SweepConfig { exponent_min, exponent_max, timing: QUICK }).unwrap()
    }

    /// Writes nothing at all.
    struct Noop;

    impl CopyStrategy<u8> for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        fn copy(&self, _dst: &mut [u8], _src: &[u8]) {}
    }

    /// Claims a whole-chunk prefix but also writes the remainder.
    struct Overreach;

    impl CopyStrategy<u8> for Overreach {
        fn name(&self) -> &str {
            "overreach"
        }

        fn covered(&self, len: usize) -> usize {
            len / 16 * 16
        }

        fn copy(&self, dst: &mut [u8], src: &[u8]) {
            dst.copy_from_slice(src);
        }
    }

    #[test]
    fn sentinels_must_differ() {
        assert_eq!(Sentinels::new(1u8, 1u8), Err(Error::InvalidConfig("sentinels must differ")));
        let sentinels = Sentinels::new(7u8, 0u8).unwrap();
        assert_eq!((sentinels.source(), sentinels.destination()), (7, 0));
    }

    #[test]
    fn table_keeps_insertion_order() {
        let mut table = ResultsTable::new();
        table.insert("b", 6, 2.0);
        table.insert("a", 6, 1.0);
        table.insert("b", 5, 3.0);
        assert_eq!(table.strategies().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(table.exponents(), [5, 6]);
        assert_eq!(table.get("b", 5), Some(3.0));
        assert_eq!(table.get("a", 5), None);
        assert_eq!(table.len(), 2);
        assert!(ResultsTable::new().exponents().is_empty());
    }

    #[test]
    fn sweep_fills_every_cell() {
        let strategies = default_strategies::<u8>();
        let table = quick_sweep(5, 9).run(&strategies, Sentinels::new(7, 0).unwrap(), |_, _| Ok(())).unwrap();

        assert_eq!(table.len(), strategies.len());
        for strategy in &strategies {
            let cells = table.column(strategy.name()).unwrap();
            assert_eq!(cells.keys().copied().collect::<Vec<_>>(), [5, 6, 7, 8, 9]);
            assert!(cells.values().all(|&mean| mean >= 0.0));
        }
    }

    #[test]
    fn sweep_scenario_two_strategies() {
        let strategies: Vec<Box<dyn CopyStrategy<u8>>> = vec![Box::new(Scalar), Box::new(BulkCopy)];
        let table = quick_sweep(5, 5).run(&strategies, Sentinels::new(7, 0).unwrap(), |_, _| Ok(())).unwrap();

        assert_eq!(table.strategies().collect::<Vec<_>>(), ["scalar", "std"]);
        assert!(table.get("scalar", 5).unwrap() >= 0.0);
        assert!(table.get("std", 5).unwrap() >= 0.0);
    }

    #[test]
    fn progress_order_is_size_major() {
        let strategies: Vec<Box<dyn CopyStrategy<u8>>> = vec![Box::new(Scalar), Box::new(VectorCopyInt)];
        let mut seen = Vec::new();
        quick_sweep(4, 5)
            .run(&strategies, Sentinels::new(1, 2).unwrap(), |name, exponent| {
                seen.push(format!("{} {}", name, exponent));
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, ["scalar 4", "simd 4", "scalar 5", "simd 5"]);
    }

    #[test]
    fn wide_elements_sweep() {
        let strategies = default_strategies::<f32>();
        let table = quick_sweep(2, 4).run(&strategies, Sentinels::new(1.5, -1.0).unwrap(), |_, _| Ok(())).unwrap();
        assert_eq!(table.exponents(), [2, 3, 4]);
    }

    #[test]
    fn noop_fails_check() {
        let strategies: Vec<Box<dyn CopyStrategy<u8>>> = vec![Box::new(Noop)];
        let err = quick_sweep(5, 5).run(&strategies, Sentinels::new(7, 0).unwrap(), |_, _| Ok(())).unwrap_err();
        assert_eq!(err, Error::CheckFailed { strategy: "noop".into(), size: 32, index: 31 });
    }

    #[test]
    fn overreach_fails_check() {
        let src = [7u8; 20];
        let mut dst = [0u8; 20];
        Overreach.copy(&mut dst, &src);
        let err = sample_check(&Overreach, &dst, &src, 0).unwrap_err();
        assert_eq!(err, Error::CheckFailed { strategy: "overreach".into(), size: 20, index: 16 });
    }

    #[test]
    fn vector_remainder_passes_check() {
        let simd: &dyn CopyStrategy<u8> = &VectorCopyInt;
        let src = [7u8; 20];
        let mut dst = [0u8; 20];
        simd.copy(&mut dst, &src);
        assert!(sample_check(simd, &dst, &src, 0).is_ok());
    }

    #[test]
    fn progress_error_stops_sweep() {
        let strategies = default_strategies::<u8>();
        let err = quick_sweep(5, 6)
            .run(&strategies, Sentinels::new(7, 0).unwrap(), |_, _| Err(Error::Io(std::io::ErrorKind::BrokenPipe)))
            .unwrap_err();
        assert_eq!(err, Error::Io(std::io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn single_measures_each_strategy() {
        let strategies = default_strategies::<u8>();
        let config = SingleConfig { size: 1024, timing: QUICK };
        let measurements = single(&strategies, &config, Sentinels::new(42, 0).unwrap()).unwrap();
        assert_eq!(measurements.len(), strategies.len());
        for (measurement, strategy) in measurements.iter().zip(&strategies) {
            assert_eq!(measurement.strategy, strategy.name());
            assert_eq!(measurement.size, 1024);
            assert!(measurement.timing.repeats >= 1 && measurement.timing.repeats <= 3);
        }
    }
}
