//! Strategy builder: raw parse output → validated [`Strategy`].
//!
//! A pure validation pass against an [`IndicatorRegistry`]. Everything the
//! evaluator would otherwise only discover mid-run is rejected here: unknown
//! indicator names, wrong argument counts, argument kinds that do not match
//! the registered signature, and sections whose root is not a
//! boolean-producing expression. No side effects; the input tree is returned
//! unchanged on success.

use crate::domain::error::{BuildError, RulebenchError};
use crate::domain::expr::{Expr, Strategy};
use crate::domain::indicator::{ArgKind, IndicatorRegistry};
use crate::domain::parser;

/// Parse DSL text and validate the result against the registry.
pub fn build_strategy(
    text: &str,
    registry: &IndicatorRegistry,
) -> Result<Strategy, RulebenchError> {
    let strategy = parser::parse(text)?;
    check_strategy(&strategy, registry)?;
    Ok(strategy)
}

/// Validate an already-parsed strategy.
pub fn check_strategy(
    strategy: &Strategy,
    registry: &IndicatorRegistry,
) -> Result<(), BuildError> {
    check_boolean(&strategy.entry, registry, "ENTRY")?;
    check_boolean(&strategy.exit, registry, "EXIT")?;
    Ok(())
}

fn check_boolean(
    expr: &Expr,
    registry: &IndicatorRegistry,
    context: &str,
) -> Result<(), BuildError> {
    match expr {
        Expr::Logical { left, right, .. } => {
            check_boolean(left, registry, context)?;
            check_boolean(right, registry, context)
        }
        Expr::Comparison { left, right, .. } | Expr::Cross { left, right, .. } => {
            check_value(left, registry, context)?;
            check_value(right, registry, context)
        }
        Expr::Column(_) | Expr::Number(_) | Expr::Indicator { .. } => {
            Err(BuildError::TypeMismatch {
                context: context.to_string(),
                expected: "boolean expression (comparison, cross event, AND/OR)",
                found: format!("{} '{}'", expr.kind_name(), expr),
            })
        }
    }
}

fn check_value(
    expr: &Expr,
    registry: &IndicatorRegistry,
    context: &str,
) -> Result<(), BuildError> {
    match expr {
        Expr::Column(_) | Expr::Number(_) => Ok(()),
        Expr::Indicator { name, args } => check_indicator(name, args, registry, context),
        Expr::Comparison { .. } | Expr::Logical { .. } | Expr::Cross { .. } => {
            Err(BuildError::TypeMismatch {
                context: context.to_string(),
                expected: "numeric operand",
                found: expr.kind_name().to_string(),
            })
        }
    }
}

fn check_indicator(
    name: &str,
    args: &[Expr],
    registry: &IndicatorRegistry,
    context: &str,
) -> Result<(), BuildError> {
    let spec = registry
        .get(name)
        .ok_or_else(|| BuildError::UnknownIndicator {
            name: name.to_string(),
        })?;

    if args.len() != spec.args.len() {
        return Err(BuildError::Arity {
            name: name.to_string(),
            expected: spec.args.len(),
            found: args.len(),
        });
    }

    for (arg, kind) in args.iter().zip(spec.args) {
        match kind {
            ArgKind::Series => match arg {
                Expr::Column(_) => {}
                Expr::Indicator {
                    name: inner,
                    args: inner_args,
                } => check_indicator(inner, inner_args, registry, context)?,
                other => {
                    return Err(BuildError::TypeMismatch {
                        context: format!("{} argument of '{}'", context, name),
                        expected: "series (column or indicator)",
                        found: format!("{} '{}'", other.kind_name(), other),
                    });
                }
            },
            ArgKind::Int => match arg {
                Expr::Number(v) if v.fract() == 0.0 && *v >= 1.0 => {}
                other => {
                    return Err(BuildError::TypeMismatch {
                        context: format!("{} argument of '{}'", context, name),
                        expected: "positive integer literal",
                        found: format!("{} '{}'", other.kind_name(), other),
                    });
                }
            },
        }
    }

    Ok(())
}
