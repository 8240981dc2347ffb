//! Indicator registry.
//!
//! An explicit, immutable value passed to the AST builder and evaluator;
//! constructed once and never mutated afterwards. Each entry fixes a name,
//! an argument signature (checked at strategy build time) and a compute
//! function producing one output value per input row, with NaN for the
//! warm-up rows where the formula is undefined. NaN inputs (for example a
//! nested indicator still inside its own warm-up) propagate to NaN outputs.
//!
//! Adding an indicator means registering one more [`IndicatorSpec`]; the
//! grammar and AST are untouched.

use std::collections::BTreeMap;

/// Argument kind in an indicator signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// A numeric series: a column reference or another indicator call.
    Series,
    /// A positive integer literal (window length).
    Int,
}

/// An evaluated indicator argument, matching the declared [`ArgKind`].
pub enum ArgValue<'a> {
    Series(&'a [f64]),
    Int(usize),
}

pub type IndicatorFn = fn(&[ArgValue]) -> Vec<f64>;

#[derive(Clone)]
pub struct IndicatorSpec {
    pub name: &'static str,
    pub args: &'static [ArgKind],
    pub compute: IndicatorFn,
}

#[derive(Clone)]
pub struct IndicatorRegistry {
    specs: BTreeMap<&'static str, IndicatorSpec>,
}

impl IndicatorRegistry {
    /// Empty registry; useful for tests and fully custom setups.
    pub fn empty() -> Self {
        Self {
            specs: BTreeMap::new(),
        }
    }

    /// The standard single-series indicators.
    pub fn standard() -> Self {
        Self::empty()
            .with(IndicatorSpec {
                name: "sma",
                args: &[ArgKind::Series, ArgKind::Int],
                compute: sma,
            })
            .with(IndicatorSpec {
                name: "ema",
                args: &[ArgKind::Series, ArgKind::Int],
                compute: ema,
            })
            .with(IndicatorSpec {
                name: "rsi",
                args: &[ArgKind::Series, ArgKind::Int],
                compute: rsi,
            })
            .with(IndicatorSpec {
                name: "roc",
                args: &[ArgKind::Series, ArgKind::Int],
                compute: roc,
            })
            .with(IndicatorSpec {
                name: "stddev",
                args: &[ArgKind::Series, ArgKind::Int],
                compute: stddev,
            })
    }

    pub fn with(mut self, spec: IndicatorSpec) -> Self {
        self.specs.insert(spec.name, spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorSpec> {
        self.specs.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.keys().copied()
    }
}

fn series_and_window<'a>(args: &'a [ArgValue]) -> (&'a [f64], usize) {
    match args {
        [ArgValue::Series(series), ArgValue::Int(n)] => (series, *n),
        // signatures are validated at strategy build time
        _ => unreachable!("indicator arguments do not match registered signature"),
    }
}

/// Simple moving average: arithmetic mean of the trailing n values.
/// Undefined (NaN) for the first n-1 rows.
fn sma(args: &[ArgValue]) -> Vec<f64> {
    let (series, n) = series_and_window(args);
    let mut out = vec![f64::NAN; series.len()];
    for i in (n - 1)..series.len() {
        let window = &series[i + 1 - n..=i];
        out[i] = window.iter().sum::<f64>() / n as f64;
    }
    out
}

/// Exponential moving average: k = 2/(n+1), seeded with the SMA of the first
/// n values, then EMA[i] = x[i]*k + EMA[i-1]*(1-k). Undefined for the first
/// n-1 rows.
fn ema(args: &[ArgValue]) -> Vec<f64> {
    let (series, n) = series_and_window(args);
    let mut out = vec![f64::NAN; series.len()];
    if series.len() < n {
        return out;
    }

    let k = 2.0 / (n as f64 + 1.0);
    let mut value = series[..n].iter().sum::<f64>() / n as f64;
    out[n - 1] = value;
    for i in n..series.len() {
        value = series[i] * k + value * (1.0 - k);
        out[i] = value;
    }
    out
}

/// Wilder RSI: first averages are simple means of the first n gains/losses,
/// then avg = (prev*(n-1) + current)/n. RSI = 100 - 100/(1 + gain/loss),
/// or 100 when the average loss is zero. Undefined for the first n rows
/// (n price changes are needed for the seed averages).
fn rsi(args: &[ArgValue]) -> Vec<f64> {
    let (series, n) = series_and_window(args);
    let mut out = vec![f64::NAN; series.len()];
    if series.len() <= n {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=n {
        let (gain, loss) = gain_loss(series[i] - series[i - 1]);
        avg_gain += gain;
        avg_loss += loss;
    }
    avg_gain /= n as f64;
    avg_loss /= n as f64;
    out[n] = rsi_value(avg_gain, avg_loss);

    for i in (n + 1)..series.len() {
        let (gain, loss) = gain_loss(series[i] - series[i - 1]);
        avg_gain = (avg_gain * (n - 1) as f64 + gain) / n as f64;
        avg_loss = (avg_loss * (n - 1) as f64 + loss) / n as f64;
        out[i] = rsi_value(avg_gain, avg_loss);
    }
    out
}

// f64::max would swallow a NaN change; keep it explicit so warm-up NaNs in a
// nested argument stay NaN.
fn gain_loss(change: f64) -> (f64, f64) {
    if change.is_nan() {
        (f64::NAN, f64::NAN)
    } else {
        (change.max(0.0), (-change).max(0.0))
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Rate of change: percent change versus the value n rows back.
/// Undefined for the first n rows.
fn roc(args: &[ArgValue]) -> Vec<f64> {
    let (series, n) = series_and_window(args);
    let mut out = vec![f64::NAN; series.len()];
    for i in n..series.len() {
        out[i] = (series[i] / series[i - n] - 1.0) * 100.0;
    }
    out
}

/// Trailing population standard deviation over n values.
/// Undefined for the first n-1 rows.
fn stddev(args: &[ArgValue]) -> Vec<f64> {
    let (series, n) = series_and_window(args);
    let mut out = vec![f64::NAN; series.len()];
    for i in (n - 1)..series.len() {
        let window = &series[i + 1 - n..=i];
        let mean = window.iter().sum::<f64>() / n as f64;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        out[i] = variance.sqrt();
    }
    out
}
