use crate::model::Series;
use serde::{Deserialize, Serialize};

/// Value range covered by the vertical scale.
///
/// The computed candidates always include `1` in the max and `0` in the min, so `max > min`
/// holds for every domain produced by [`compute_domain`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    /// `max - min`, or `1` when the two are equal.
    ///
    /// May overflow to infinity for domains near `±f64::MAX`; scales use [`Domain::half_span`].
    pub fn span(&self) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 { 1.0 } else { span }
    }

    /// Half of [`Domain::span`], computed on halved operands so it stays finite for every
    /// finite domain.
    pub fn half_span(&self) -> f64 {
        let half = self.max / 2.0 - self.min / 2.0;
        if half == 0.0 { 0.5 } else { half }
    }

    /// Whether the data crosses zero, i.e. a zero guide line has to be drawn.
    pub fn has_zero_baseline(&self) -> bool {
        self.min < 0.0 && self.max > 0.0
    }
}

/// Per-category sums of the positive and negative bar values, saturating at `±f64::MAX`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackTotals {
    pub positive: Vec<f64>,
    pub negative: Vec<f64>,
}

pub fn stack_totals(bars: &[Series], category_count: usize) -> StackTotals {
    let mut positive = vec![0.0; category_count];
    let mut negative = vec![0.0; category_count];
    for series in bars {
        for (idx, value) in series.values.iter().take(category_count).enumerate() {
            match value {
                Some(v) if *v > 0.0 => positive[idx] = (positive[idx] + v).min(f64::MAX),
                Some(v) if *v < 0.0 => negative[idx] = (negative[idx] + v).max(f64::MIN),
                _ => {}
            }
        }
    }
    StackTotals { positive, negative }
}

fn finite_values(series: &[Series]) -> impl Iterator<Item = f64> + '_ {
    series.iter().flat_map(|s| s.values.iter().flatten().copied())
}

/// Computes the domain for bars (stacked or grouped) plus lines.
///
/// Stacked bars contribute their per-category positive and negative totals, grouped bars their
/// individual values. Line values always contribute individually.
pub fn compute_domain(
    bars: &[Series],
    lines: &[Series],
    stacked: bool,
    category_count: usize,
) -> Domain {
    let mut max = 1.0_f64;
    let mut min = 0.0_f64;

    if stacked {
        let totals = stack_totals(bars, category_count);
        for v in totals.positive {
            max = max.max(v);
        }
        for v in totals.negative {
            min = min.min(v);
        }
    } else {
        for v in finite_values(bars) {
            max = max.max(v);
            min = min.min(v);
        }
    }

    for v in finite_values(lines) {
        max = max.max(v);
        min = min.min(v);
    }

    let domain = Domain { min, max };
    tracing::trace!(min, max, stacked, "computed chart domain");
    domain
}
