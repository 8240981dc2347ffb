//! Signal evaluator.
//!
//! Walks a rule tree bottom-up against a [`PriceSeries`], producing whole
//! columns at every step: value nodes evaluate to `Vec<f64>` (NaN through
//! indicator warm-up windows), boolean nodes to row-wise `Vec<bool>`. This is
//! the vectorized replacement for generating and executing source text at
//! runtime; the observable signals are the same.
//!
//! # Semantics
//!
//! - Comparisons are `false` on any row where either operand is NaN (IEEE
//!   comparison semantics give this directly).
//! - `CROSSES ABOVE` fires at row i iff `left[i] > right[i]` and
//!   `left[i-1] <= right[i-1]`; `CROSSES BELOW` is the mirror. Row 0 never
//!   fires.
//! - Evaluation is deterministic and side-effect-free: the same
//!   `(Expr, PriceSeries)` pair always yields the same signals.
//!
//! Unknown indicator names and malformed argument lists are rejected by the
//! builder before evaluation; if an unchecked tree reaches the evaluator
//! anyway, the offending node degrades to an all-NaN series (and therefore
//! all-`false` signals) rather than panicking.

use crate::domain::error::EvalError;
use crate::domain::expr::{CrossDir, Expr, LogicOp, Strategy};
use crate::domain::indicator::{ArgKind, ArgValue, IndicatorRegistry};
use crate::domain::series::{PriceSeries, SignalSeries};

/// Evaluate one boolean rule tree into a signal series aligned with `prices`.
pub fn evaluate(
    expr: &Expr,
    prices: &PriceSeries,
    registry: &IndicatorRegistry,
) -> Result<SignalSeries, EvalError> {
    Ok(SignalSeries::new(eval_bool(expr, prices, registry)?))
}

/// Evaluate both sections of a strategy against the same price table.
pub fn evaluate_strategy(
    strategy: &Strategy,
    prices: &PriceSeries,
    registry: &IndicatorRegistry,
) -> Result<(SignalSeries, SignalSeries), EvalError> {
    let entry = evaluate(&strategy.entry, prices, registry)?;
    let exit = evaluate(&strategy.exit, prices, registry)?;
    Ok((entry, exit))
}

fn eval_bool(
    expr: &Expr,
    prices: &PriceSeries,
    registry: &IndicatorRegistry,
) -> Result<Vec<bool>, EvalError> {
    match expr {
        Expr::Comparison { op, left, right } => {
            let left = eval_value(left, prices, registry)?;
            let right = eval_value(right, prices, registry)?;
            Ok(left
                .iter()
                .zip(&right)
                .map(|(&l, &r)| op.holds(l, r))
                .collect())
        }
        Expr::Logical { op, left, right } => {
            let left = eval_bool(left, prices, registry)?;
            let right = eval_bool(right, prices, registry)?;
            Ok(left
                .iter()
                .zip(&right)
                .map(|(&l, &r)| match op {
                    LogicOp::And => l && r,
                    LogicOp::Or => l || r,
                })
                .collect())
        }
        Expr::Cross { dir, left, right } => {
            let left = eval_value(left, prices, registry)?;
            let right = eval_value(right, prices, registry)?;
            let mut out = vec![false; left.len()];
            for i in 1..left.len() {
                out[i] = match dir {
                    CrossDir::Above => left[i] > right[i] && left[i - 1] <= right[i - 1],
                    CrossDir::Below => left[i] < right[i] && left[i - 1] >= right[i - 1],
                };
            }
            Ok(out)
        }
        // boolean roots are guaranteed by the builder; an unchecked value
        // node yields no signal anywhere
        Expr::Column(_) | Expr::Number(_) | Expr::Indicator { .. } => {
            Ok(vec![false; prices.len()])
        }
    }
}

fn eval_value(
    expr: &Expr,
    prices: &PriceSeries,
    registry: &IndicatorRegistry,
) -> Result<Vec<f64>, EvalError> {
    match expr {
        Expr::Column(name) => prices
            .column(name)
            .map(<[f64]>::to_vec)
            .ok_or_else(|| EvalError::UnknownColumn { name: name.clone() }),
        Expr::Number(value) => Ok(vec![*value; prices.len()]),
        Expr::Indicator { name, args } => eval_indicator(name, args, prices, registry),
        Expr::Comparison { .. } | Expr::Logical { .. } | Expr::Cross { .. } => {
            Ok(vec![f64::NAN; prices.len()])
        }
    }
}

fn eval_indicator(
    name: &str,
    args: &[Expr],
    prices: &PriceSeries,
    registry: &IndicatorRegistry,
) -> Result<Vec<f64>, EvalError> {
    let Some(spec) = registry.get(name) else {
        return Ok(vec![f64::NAN; prices.len()]);
    };
    if args.len() != spec.args.len() {
        return Ok(vec![f64::NAN; prices.len()]);
    }

    // evaluate series arguments first so ArgValue can borrow them
    let mut series_args: Vec<Option<Vec<f64>>> = Vec::with_capacity(args.len());
    for (arg, kind) in args.iter().zip(spec.args) {
        match kind {
            ArgKind::Series => series_args.push(Some(eval_value(arg, prices, registry)?)),
            ArgKind::Int => series_args.push(None),
        }
    }

    let mut values = Vec::with_capacity(args.len());
    for ((arg, kind), owned) in args.iter().zip(spec.args).zip(&series_args) {
        match (kind, arg, owned) {
            (ArgKind::Series, _, Some(series)) => values.push(ArgValue::Series(series)),
            (ArgKind::Int, Expr::Number(v), _) if v.fract() == 0.0 && *v >= 1.0 => {
                values.push(ArgValue::Int(*v as usize));
            }
            _ => return Ok(vec![f64::NAN; prices.len()]),
        }
    }

    Ok((spec.compute)(&values))
}
