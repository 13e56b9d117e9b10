//! Inline SVG rendering for dashboard charts.
//! Each chart is a self-contained `<svg>` element embedded in the page.

use std::fmt::Write;

use crate::report::charts::{min_max, BoxStats, Chart, ChartData, ChartKind, Histogram};
use crate::types::PredictedLabel;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 320.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;
const Y_TICKS: usize = 5;
const MAX_TICKS: usize = 12;

const HIST_FILL: &str = "#87ceeb";
const DENSITY_STROKE: &str = "#1f77b4";
const COUNT_FILLS: [&str; 2] = ["#2ecc71", "#e74c3c"];
const AGE_FILLS: [&str; 2] = ["#a1c9f4", "#ffb482"];
const LIMIT_FILLS: [&str; 2] = ["#66c2a5", "#fc8d62"];

/// Plot-area coordinate mapping.
struct Frame {
    x_lo: f64,
    x_hi: f64,
    y_lo: f64,
    y_hi: f64,
}

impl Frame {
    fn left() -> f64 {
        MARGIN_LEFT
    }

    fn right() -> f64 {
        WIDTH - MARGIN_RIGHT
    }

    fn top() -> f64 {
        MARGIN_TOP
    }

    fn bottom() -> f64 {
        HEIGHT - MARGIN_BOTTOM
    }

    fn x(&self, v: f64) -> f64 {
        Self::left() + unit(v, self.x_lo, self.x_hi) * (Self::right() - Self::left())
    }

    fn y(&self, v: f64) -> f64 {
        Self::bottom() - unit(v, self.y_lo, self.y_hi) * (Self::bottom() - Self::top())
    }
}

/// Position of `v` in `[lo, hi]` as a fraction. A collapsed range maps to the middle.
fn unit(v: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if span > 0.0 && span.is_finite() {
        (v - lo) / span
    } else {
        0.5
    }
}

impl Chart {
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" class="chart" font-family="sans-serif" font-size="12">"#
        );
        let _ = write!(
            out,
            r#"<text x="{:.1}" y="22" text-anchor="middle" font-size="15" font-weight="600">{}</text>"#,
            WIDTH / 2.0,
            self.kind.title()
        );

        match &self.data {
            ChartData::Empty => draw_placeholder(&mut out),
            ChartData::Histogram(h) => draw_histogram(&mut out, self.kind, h),
            ChartData::Counts(c) => draw_counts(&mut out, self.kind, c),
            ChartData::Boxes(groups) => {
                let fills = if self.kind == ChartKind::AgeByLabel {
                    AGE_FILLS
                } else {
                    LIMIT_FILLS
                };
                draw_boxes(&mut out, self.kind, groups, fills);
            }
        }

        out.push_str("</svg>");
        out
    }
}

fn draw_placeholder(out: &mut String) {
    let _ = write!(
        out,
        r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" fill="#718096">No data to display</text>"##,
        WIDTH / 2.0,
        HEIGHT / 2.0
    );
}

fn draw_histogram(out: &mut String, kind: ChartKind, h: &Histogram) {
    let count_max = h.counts.iter().copied().max().unwrap_or(0) as f64;
    let density_max = h
        .density
        .as_ref()
        .map(|d| d.iter().map(|(_, y)| *y).fold(0.0, f64::max))
        .unwrap_or(0.0);
    let frame = Frame {
        x_lo: h.lo,
        x_hi: h.hi,
        y_lo: 0.0,
        y_hi: (count_max.max(density_max) * 1.05).max(1.0),
    };
    axes(out, kind, &frame);
    for t in nice_ticks(h.lo, h.hi, Y_TICKS) {
        x_tick(out, frame.x(t), &fmt_tick(t));
    }

    let width = h.bin_width();
    for (i, count) in h.counts.iter().enumerate() {
        let x0 = frame.x(h.lo + width * i as f64);
        let x1 = frame.x(h.lo + width * (i + 1) as f64);
        let y = frame.y(*count as f64);
        let _ = write!(
            out,
            r#"<rect class="bar" x="{x0:.1}" y="{y:.1}" width="{:.1}" height="{:.1}" fill="{HIST_FILL}" stroke="white"><title>{count}</title></rect>"#,
            x1 - x0,
            Frame::bottom() - y
        );
    }

    if let Some(points) = &h.density {
        let path: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.1},{:.1}", frame.x(*x), frame.y(*y)))
            .collect();
        let _ = write!(
            out,
            r#"<polyline class="density" points="{}" fill="none" stroke="{DENSITY_STROKE}" stroke-width="2"/>"#,
            path.join(" ")
        );
    }
}

fn draw_counts(out: &mut String, kind: ChartKind, counts: &[(PredictedLabel, usize)]) {
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64;
    let frame = Frame {
        x_lo: 0.0,
        x_hi: counts.len() as f64,
        y_lo: 0.0,
        y_hi: (max * 1.1).max(1.0),
    };
    axes(out, kind, &frame);

    for (i, (label, count)) in counts.iter().enumerate() {
        let center = frame.x(i as f64 + 0.5);
        let half = (frame.x(1.0) - frame.x(0.0)) * 0.3;
        let y = frame.y(*count as f64);
        let fill = COUNT_FILLS[i % COUNT_FILLS.len()];
        let _ = write!(
            out,
            r#"<rect class="bar" x="{:.1}" y="{y:.1}" width="{:.1}" height="{:.1}" fill="{fill}"/>"#,
            center - half,
            half * 2.0,
            Frame::bottom() - y
        );
        let _ = write!(
            out,
            r#"<text x="{center:.1}" y="{:.1}" text-anchor="middle">{count}</text>"#,
            y - 6.0
        );
        x_tick(out, center, label.as_text());
    }
}

fn draw_boxes(
    out: &mut String,
    kind: ChartKind,
    groups: &[(PredictedLabel, Option<BoxStats>)],
    fills: [&str; 2],
) {
    let extremes: Vec<f64> = groups
        .iter()
        .filter_map(|(_, b)| b.as_ref())
        .flat_map(|b| {
            let mut v = vec![b.whisker_low, b.whisker_high];
            v.extend(&b.outliers);
            v
        })
        .collect();
    let (mut lo, mut hi) = min_max(&extremes).unwrap_or((0.0, 1.0));
    if lo == hi {
        let widen = lo.abs().max(1.0) * 1e-3;
        lo -= widen;
        hi += widen;
    }
    let pad = (hi - lo) * 0.05;
    let frame = Frame {
        x_lo: 0.0,
        x_hi: groups.len() as f64,
        y_lo: lo - pad,
        y_hi: hi + pad,
    };
    axes(out, kind, &frame);

    for (i, (label, stats)) in groups.iter().enumerate() {
        let center = frame.x(i as f64 + 0.5);
        x_tick(out, center, label.as_text());
        let Some(b) = stats else {
            let _ = write!(
                out,
                r##"<text x="{center:.1}" y="{:.1}" text-anchor="middle" fill="#718096">no records</text>"##,
                (Frame::top() + Frame::bottom()) / 2.0
            );
            continue;
        };

        let half = (frame.x(1.0) - frame.x(0.0)) * 0.25;
        let fill = fills[i % fills.len()];
        let (y_q1, y_q3, y_med) = (frame.y(b.q1), frame.y(b.q3), frame.y(b.median));
        let (y_lo, y_hi) = (frame.y(b.whisker_low), frame.y(b.whisker_high));

        let _ = write!(
            out,
            r##"<line x1="{center:.1}" y1="{y_lo:.1}" x2="{center:.1}" y2="{y_q1:.1}" stroke="#4a5568"/><line x1="{center:.1}" y1="{y_q3:.1}" x2="{center:.1}" y2="{y_hi:.1}" stroke="#4a5568"/>"##
        );
        for y in [y_lo, y_hi] {
            let _ = write!(
                out,
                r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#4a5568"/>"##,
                center - half / 2.0,
                center + half / 2.0
            );
        }
        let _ = write!(
            out,
            r##"<rect class="box" x="{:.1}" y="{y_q3:.1}" width="{:.1}" height="{:.1}" fill="{fill}" stroke="#4a5568"><title>n={}</title></rect>"##,
            center - half,
            half * 2.0,
            (y_q1 - y_q3).max(1.0),
            b.count
        );
        let _ = write!(
            out,
            r##"<line x1="{:.1}" y1="{y_med:.1}" x2="{:.1}" y2="{y_med:.1}" stroke="#2d3748" stroke-width="2"/>"##,
            center - half,
            center + half
        );
        for o in &b.outliers {
            let _ = write!(
                out,
                r##"<circle class="outlier" cx="{center:.1}" cy="{:.1}" r="3" fill="none" stroke="#4a5568"/>"##,
                frame.y(*o)
            );
        }
    }
}

/// Axis lines, y ticks with grid, and axis titles.
fn axes(out: &mut String, kind: ChartKind, frame: &Frame) {
    let (l, r, t, b) = (Frame::left(), Frame::right(), Frame::top(), Frame::bottom());
    let _ = write!(
        out,
        r##"<line x1="{l}" y1="{b}" x2="{r}" y2="{b}" stroke="#2d3748"/><line x1="{l}" y1="{t}" x2="{l}" y2="{b}" stroke="#2d3748"/>"##
    );
    for v in nice_ticks(frame.y_lo, frame.y_hi, Y_TICKS) {
        let y = frame.y(v);
        let _ = write!(
            out,
            r##"<line x1="{l}" y1="{y:.1}" x2="{r}" y2="{y:.1}" stroke="#e2e8f0"/><text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"##,
            l - 6.0,
            y + 4.0,
            fmt_tick(v)
        );
    }
    let _ = write!(
        out,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
        (l + r) / 2.0,
        HEIGHT - 10.0,
        kind.x_label()
    );
    let _ = write!(
        out,
        r#"<text x="16" y="{:.1}" text-anchor="middle" transform="rotate(-90 16 {:.1})">{}</text>"#,
        (t + b) / 2.0,
        (t + b) / 2.0,
        kind.y_label()
    );
}

fn x_tick(out: &mut String, x: f64, label: &str) {
    let b = Frame::bottom();
    let _ = write!(
        out,
        r##"<line x1="{x:.1}" y1="{b}" x2="{x:.1}" y2="{:.1}" stroke="#2d3748"/><text x="{x:.1}" y="{:.1}" text-anchor="middle">{label}</text>"##,
        b + 4.0,
        b + 18.0
    );
}

/// Round tick positions (steps of 1, 2 or 5 × 10^k) covering `[lo, hi]`.
fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let span = hi - lo;
    if !(span > 0.0) || !span.is_finite() {
        return vec![lo];
    }
    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    // step below the float spacing at lo: no distinct ticks to draw
    if lo + step == lo {
        return vec![lo];
    }

    let first = (lo / step).ceil() * step;
    let count = ((hi - first) / step + 1e-9).floor().max(0.0) as usize + 1;
    (0..count.min(MAX_TICKS))
        .map(|i| first + i as f64 * step)
        .collect()
}

fn fmt_tick(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if (v - v.round()).abs() < 1e-9 {
        format!("{:.0}", v)
    } else {
        let s = format!("{v:.2}");
        s.trim_end_matches('0').to_string()
    }
}
