use std::time::Duration;

use crate::{
    error::{Error, Result},
    timing::TimingParams,
};

pub const SWEEP_EXPONENT_MIN: u32 = 5;
pub const SWEEP_EXPONENT_MAX: u32 = 20;
pub const SWEEP_REPEAT_CAP: u64 = 1_000_000;
pub const SWEEP_MIN_ELAPSED: Duration = Duration::from_millis(100);

pub const SINGLE_SIZE: usize = 1024 * 16;
pub const SINGLE_REPEAT_CAP: u64 = 1_000;
pub const SINGLE_MIN_ELAPSED: Duration = Duration::from_micros(1_000_000);

/// Power-of-two sweep over `[exponent_min, exponent_max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    pub exponent_min: u32,
    pub exponent_max: u32,
    pub timing: TimingParams,
}

impl SweepConfig {
    pub const DEFAULT: Self = Self {
        exponent_min: SWEEP_EXPONENT_MIN,
        exponent_max: SWEEP_EXPONENT_MAX,
        timing: TimingParams::new(SWEEP_REPEAT_CAP, SWEEP_MIN_ELAPSED),
    };

    pub fn validate(&self) -> Result<()> {
        validate_timing(&self.timing)?;
        if self.exponent_min > self.exponent_max {
            return Err(Error::InvalidConfig("exponent_min is above exponent_max"));
        }
        if self.exponent_max >= usize::BITS {
            return Err(Error::InvalidConfig("exponent_max overflows usize"));
        }
        Ok(())
    }

    /// `(exponent, 2^exponent)` in ascending order.
    pub fn sizes(&self) -> impl Iterator<Item = (u32, usize)> {
        (self.exponent_min..=self.exponent_max).map(|p| (p, 1usize << p))
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.sizes().count()
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One pass at a fixed element count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SingleConfig {
    pub size: usize,
    pub timing: TimingParams,
}

impl SingleConfig {
    pub const DEFAULT: Self = Self {
        size: SINGLE_SIZE,
        timing: TimingParams::new(SINGLE_REPEAT_CAP, SINGLE_MIN_ELAPSED),
    };

    pub fn validate(&self) -> Result<()> {
        validate_timing(&self.timing)?;
        if self.size == 0 {
            return Err(Error::InvalidConfig("size must be non-zero"));
        }
        Ok(())
    }
}

impl Default for SingleConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BenchConfig {
    Sweep(SweepConfig),
    Single(SingleConfig),
}

impl BenchConfig {
    pub const fn sweep() -> Self {
        Self::Sweep(SweepConfig::DEFAULT)
    }

    pub const fn single() -> Self {
        Self::Single(SingleConfig::DEFAULT)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Sweep(config) => config.validate(),
            Self::Single(config) => config.validate(),
        }
    }
}

#[inline]
fn validate_timing(timing: &TimingParams) -> Result<()> {
    if timing.repeat_cap == 0 {
        return Err(Error::InvalidConfig("repeat_cap must be at least 1"));
    }
    Ok(())
}
