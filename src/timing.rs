use std::{
    hint::black_box,
    time::{Duration, Instant},
};

use crate::strategy::{CopyStrategy, Element};

/// Bounds for one timing loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingParams {
    pub repeat_cap: u64,
    pub min_elapsed: Duration,
}

impl TimingParams {
    pub const fn new(repeat_cap: u64, min_elapsed: Duration) -> Self {
        Self { repeat_cap, min_elapsed }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timing {
    pub repeats: u64,
    pub elapsed: Duration,
}

impl Timing {
    #[inline]
    pub fn elapsed_micros(&self) -> u128 {
        self.elapsed.as_micros()
    }

    /// Mean microseconds per repeat, 0.0 when nothing ran.
    #[inline]
    pub fn mean_micros(&self) -> f64 {
        if self.repeats == 0 {
            return 0.0;
        }
        self.elapsed.as_nanos() as f64 / 1e3 / self.repeats as f64
    }
}

/// Times `strategy` over the same buffers until either bound is hit.
/// The copy runs at least once.
pub fn measure<T, S>(strategy: &S, dst: &mut [T], src: &[T], params: &TimingParams) -> Timing
where
    T: Element,
    S: CopyStrategy<T> + ?Sized,
{
    let mut timing = Timing::default();
    loop {
        let start = Instant::now();
        strategy.copy(black_box(&mut *dst), black_box(src));
        timing.elapsed += start.elapsed();
        timing.repeats += 1;

        if timing.repeats >= params.repeat_cap || timing.elapsed >= params.min_elapsed {
            break;
        }
    }
    black_box(&*dst);
    timing
}
