use std::f64::consts::PI;

use crate::config::{AGE_INDEX, HISTOGRAM_BINS, LIMIT_BAL_INDEX};
use crate::types::{AugmentedTable, PredictedLabel};

/// Sample points for the density overlay.
const KDE_POINTS: usize = 100;

/// Whisker reach in multiples of the interquartile range.
const WHISKER_IQR: f64 = 1.5;

// ---------------------------------------------------------------------------
// Chart model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    ProbabilityHistogram,
    LabelCounts,
    AgeByLabel,
    CreditLimitByLabel,
}

impl ChartKind {
    pub fn title(self) -> &'static str {
        match self {
            ChartKind::ProbabilityHistogram => "Distribution of Default Probabilities",
            ChartKind::LabelCounts => "Classification: Default or Not",
            ChartKind::AgeByLabel => "Age Distribution by Classification",
            ChartKind::CreditLimitByLabel => "Credit Limit Distribution by Classification",
        }
    }

    pub fn x_label(self) -> &'static str {
        match self {
            ChartKind::ProbabilityHistogram => "Probability (%)",
            ChartKind::LabelCounts => "Model Prediction",
            ChartKind::AgeByLabel | ChartKind::CreditLimitByLabel => "Predicted Default",
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            ChartKind::ProbabilityHistogram => "Number of Customers",
            ChartKind::LabelCounts => "Total Customers",
            ChartKind::AgeByLabel => "Age",
            ChartKind::CreditLimitByLabel => "Credit Limit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub lo: f64,
    pub hi: f64,
    pub counts: Vec<usize>,
    /// Kernel density in count units as (x, y) points; `None` when the data
    /// has fewer than two distinct values.
    pub density: Option<Vec<(f64, f64)>>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        (self.hi - self.lo) / self.counts.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub count: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// Placeholder for a table with no rows.
    Empty,
    Histogram(Histogram),
    Counts(Vec<(PredictedLabel, usize)>),
    /// One slot per label; `None` for a group with no rows.
    Boxes(Vec<(PredictedLabel, Option<BoxStats>)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub data: ChartData,
}

// ---------------------------------------------------------------------------
// Rendering entry point
// ---------------------------------------------------------------------------

/// The four dashboard charts, in display order.
pub fn render_charts(table: &AugmentedTable) -> Vec<Chart> {
    if table.is_empty() {
        return [
            ChartKind::ProbabilityHistogram,
            ChartKind::LabelCounts,
            ChartKind::AgeByLabel,
            ChartKind::CreditLimitByLabel,
        ]
        .into_iter()
        .map(|kind| Chart {
            kind,
            data: ChartData::Empty,
        })
        .collect();
    }

    let pct: Vec<f64> = table.rows.iter().map(|r| r.probability_pct).collect();
    let counts = PredictedLabel::ALL
        .into_iter()
        .map(|l| (l, table.count_label(l)))
        .collect();

    vec![
        Chart {
            kind: ChartKind::ProbabilityHistogram,
            data: ChartData::Histogram(histogram(&pct, HISTOGRAM_BINS)),
        },
        Chart {
            kind: ChartKind::LabelCounts,
            data: ChartData::Counts(counts),
        },
        Chart {
            kind: ChartKind::AgeByLabel,
            data: grouped_boxes(table, AGE_INDEX),
        },
        Chart {
            kind: ChartKind::CreditLimitByLabel,
            data: grouped_boxes(table, LIMIT_BAL_INDEX),
        },
    ]
}

fn grouped_boxes(table: &AugmentedTable, feature: usize) -> ChartData {
    ChartData::Boxes(
        PredictedLabel::ALL
            .into_iter()
            .map(|l| (l, box_stats(&table.feature_by_label(feature, l))))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Equal-width bins over the data range. A constant column is binned over
/// `[v - 0.5, v + 0.5]`. The last bin is closed on the right.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let (mut lo, mut hi) = min_max(values).unwrap_or((0.0, 1.0));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let density = kde(values, lo, hi).map(|points| {
        let scale = values.len() as f64 * width;
        points.into_iter().map(|(x, d)| (x, d * scale)).collect()
    });

    Histogram {
        lo,
        hi,
        counts,
        density,
    }
}

/// Gaussian KDE with Scott's bandwidth, sampled across `[lo, hi]`.
fn kde(values: &[f64], lo: f64, hi: f64) -> Option<Vec<(f64, f64)>> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = var.sqrt();
    if std == 0.0 {
        return None;
    }
    let bw = std * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bw * (2.0 * PI).sqrt());

    let step = (hi - lo) / (KDE_POINTS - 1) as f64;
    Some(
        (0..KDE_POINTS)
            .map(|i| {
                let x = lo + step * i as f64;
                let d: f64 = values
                    .iter()
                    .map(|v| (-0.5 * ((x - v) / bw).powi(2)).exp())
                    .sum();
                (x, d * norm)
            })
            .collect(),
    )
}

/// Tukey box statistics; `None` for an empty group.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_IQR * iqr;
    let high_fence = q3 + WHISKER_IQR * iqr;

    let (inside, outliers): (Vec<f64>, Vec<f64>) = sorted
        .iter()
        .partition(|v| **v >= low_fence && **v <= high_fence);
    let whisker_low = inside.first().copied().unwrap_or(q1);
    let whisker_high = inside.last().copied().unwrap_or(q3);

    Some(BoxStats {
        count: sorted.len(),
        q1,
        median,
        q3,
        whisker_low,
        whisker_high,
        outliers,
    })
}

/// Linear-interpolation quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    let frac = pos - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}

pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
