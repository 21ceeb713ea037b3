use crate::bucket::Granularity;
use crate::event::IrrigationEvent;
use crate::report::{self, Analytics};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Sum of `f64` values rounded once at the end.
///
/// Keeps the exact sum as a list of non-overlapping partials, so the
/// result does not depend on the order the values were added in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExactSum {
    partials: Vec<f64>,
    non_finite: f64,
}

impl ExactSum {
    pub fn add(&mut self, value: f64) {
        if !value.is_finite() {
            self.non_finite += value;
            return;
        }

        let mut x = value;
        let mut kept = 0;
        for j in 0..self.partials.len() {
            let mut y = self.partials[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if lo != 0.0 {
                self.partials[kept] = lo;
                kept += 1;
            }
            x = hi;
        }
        self.partials.truncate(kept);
        self.partials.push(x);
    }

    /// The exact sum rounded to the nearest `f64`, ties to even
    pub fn value(&self) -> f64 {
        if self.non_finite != 0.0 || self.non_finite.is_nan() {
            return self.non_finite;
        }

        let partials = &self.partials;
        let mut n = partials.len();
        if n == 0 {
            return 0.0;
        }
        n -= 1;
        let mut hi = partials[n];
        let mut lo = 0.0;
        while n > 0 {
            let x = hi;
            n -= 1;
            let y = partials[n];
            hi = x + y;
            lo = y - (hi - x);
            if lo != 0.0 {
                break;
            }
        }
        // half-way case: the remaining partials decide the rounding direction
        if n > 0 && ((lo < 0.0 && partials[n - 1] < 0.0) || (lo > 0.0 && partials[n - 1] > 0.0)) {
            let y = lo * 2.0;
            let x = hi + y;
            if y == x - hi {
                hi = x;
            }
        }
        hi
    }
}

/// Running statistics of a bucket or of the whole window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    nominal_sum: ExactSum,
    real_sum: ExactSum,
    efficiency_sum: ExactSum,
    count: u64,
    min_efficiency: f64,
    max_efficiency: f64,
}

impl Accumulator {
    pub fn add(&mut self, event: &IrrigationEvent) {
        let efficiency = event.efficiency;
        if self.count == 0 {
            self.min_efficiency = efficiency;
            self.max_efficiency = efficiency;
        } else {
            self.min_efficiency = self.min_efficiency.min(efficiency);
            self.max_efficiency = self.max_efficiency.max(efficiency);
        }

        self.nominal_sum.add(event.nominal_amount);
        self.real_sum.add(event.real_amount);
        self.efficiency_sum.add(efficiency);
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn nominal_sum(&self) -> f64 {
        self.nominal_sum.value()
    }

    pub fn real_sum(&self) -> f64 {
        self.real_sum.value()
    }

    pub fn efficiency_sum(&self) -> f64 {
        self.efficiency_sum.value()
    }

    /// Only meaningful if the accumulator is not empty
    pub fn min_efficiency(&self) -> f64 {
        self.min_efficiency
    }

    /// Only meaningful if the accumulator is not empty
    pub fn max_efficiency(&self) -> f64 {
        self.max_efficiency
    }
}

/// Online fold of an event stream into per-bucket and whole-window statistics.
///
/// Each event is touched exactly once, the window accumulator is fed in the
/// same pass so the series and the summary always agree on their counts.
#[derive(Debug)]
pub struct Reducer {
    granularity: Granularity,
    buckets: HashMap<DateTime<Utc>, Accumulator>,
    window: Accumulator,
}

impl Reducer {
    pub fn new(granularity: Granularity) -> Self {
        Reducer {
            granularity,
            buckets: HashMap::new(),
            window: Accumulator::default(),
        }
    }

    pub fn push(&mut self, event: &IrrigationEvent) {
        let key = self.granularity.bucket_start(event.start_time);
        self.buckets.entry(key).or_default().add(event);
        self.window.add(event);
    }

    pub fn event_count(&self) -> u64 {
        self.window.count()
    }

    pub fn finish(self) -> Analytics {
        report::finalize(self.buckets, &self.window)
    }
}
