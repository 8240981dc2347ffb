//! Rule AST data structures.
//!
//! `Expr` is the closed tagged-variant tree both sections of a strategy parse
//! into. Value-producing variants (`Column`, `Number`, `Indicator`) and
//! boolean-producing variants (`Comparison`, `Logical`, `Cross`) share one
//! enum; the builder enforces that each section's root is boolean and that
//! indicator arguments have the kinds the registry declares. The tree is
//! immutable once built.

use crate::domain::lexer::CmpOp;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossDir {
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A named price/volume column or precomputed derived column.
    Column(String),
    Number(f64),
    Indicator {
        name: String,
        args: Vec<Expr>,
    },
    Comparison {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Cross {
        dir: CrossDir,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Whether this node produces a boolean series (vs a numeric one).
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            Expr::Comparison { .. } | Expr::Logical { .. } | Expr::Cross { .. }
        )
    }

    /// One-word description of the node kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Column(_) => "column",
            Expr::Number(_) => "number",
            Expr::Indicator { .. } => "indicator",
            Expr::Comparison { .. } => "comparison",
            Expr::Logical { .. } => "logical expression",
            Expr::Cross { .. } => "cross event",
        }
    }
}

/// Renders the canonical DSL form of the expression. Because the grammar has
/// no parentheses for grouping and `AND` binds tighter than `OR`, a tree is
/// only renderable verbatim when its shape matches what the parser would
/// rebuild; every parser-produced tree satisfies this, so parse → render →
/// parse is structure-preserving.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::Number(v) => write!(f, "{}", v),
            Expr::Indicator { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Comparison { op, left, right } => {
                write!(f, "{} {} {}", left, op.as_str(), right)
            }
            Expr::Logical { op, left, right } => {
                let word = match op {
                    LogicOp::And => "AND",
                    LogicOp::Or => "OR",
                };
                write!(f, "{} {} {}", left, word, right)
            }
            Expr::Cross { dir, left, right } => {
                let word = match dir {
                    CrossDir::Above => "ABOVE",
                    CrossDir::Below => "BELOW",
                };
                write!(f, "{} CROSSES {} {}", left, word, right)
            }
        }
    }
}

/// A validated strategy: one boolean rule tree per section.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub entry: Expr,
    pub exit: Expr,
}

impl Strategy {
    /// Canonical DSL text for this strategy.
    pub fn to_dsl(&self) -> String {
        format!("ENTRY: {}\nEXIT: {}", self.entry, self.exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sma20() -> Expr {
        Expr::Indicator {
            name: "sma".into(),
            args: vec![Expr::Column("close".into()), Expr::Number(20.0)],
        }
    }

    #[test]
    fn boolean_vs_value_nodes() {
        assert!(!Expr::Column("close".into()).is_boolean());
        assert!(!Expr::Number(1.0).is_boolean());
        assert!(!sma20().is_boolean());

        let cmp = Expr::Comparison {
            op: CmpOp::Gt,
            left: Box::new(Expr::Column("close".into())),
            right: Box::new(sma20()),
        };
        assert!(cmp.is_boolean());
    }

    #[test]
    fn render_comparison() {
        let cmp = Expr::Comparison {
            op: CmpOp::Ge,
            left: Box::new(Expr::Column("volume".into())),
            right: Box::new(Expr::Number(1000000.0)),
        };
        assert_eq!(cmp.to_string(), "volume >= 1000000");
    }

    #[test]
    fn render_indicator_call() {
        let rsi = Expr::Indicator {
            name: "rsi".into(),
            args: vec![Expr::Column("close".into()), Expr::Number(14.0)],
        };
        assert_eq!(rsi.to_string(), "rsi(close, 14)");
    }

    #[test]
    fn render_cross_event() {
        let cross = Expr::Cross {
            dir: CrossDir::Above,
            left: Box::new(Expr::Column("close".into())),
            right: Box::new(Expr::Column("yesterday_high".into())),
        };
        assert_eq!(cross.to_string(), "close CROSSES ABOVE yesterday_high");
    }

    #[test]
    fn render_nested_logical() {
        let left = Expr::Comparison {
            op: CmpOp::Gt,
            left: Box::new(Expr::Column("close".into())),
            right: Box::new(sma20()),
        };
        let right = Expr::Comparison {
            op: CmpOp::Gt,
            left: Box::new(Expr::Column("volume".into())),
            right: Box::new(Expr::Number(1000000.0)),
        };
        let and = Expr::Logical {
            op: LogicOp::And,
            left: Box::new(left),
            right: Box::new(right),
        };
        assert_eq!(
            and.to_string(),
            "close > sma(close, 20) AND volume > 1000000"
        );
    }

    #[test]
    fn strategy_to_dsl() {
        let entry = Expr::Comparison {
            op: CmpOp::Gt,
            left: Box::new(Expr::Column("close".into())),
            right: Box::new(sma20()),
        };
        let exit = Expr::Comparison {
            op: CmpOp::Lt,
            left: Box::new(Expr::Column("close".into())),
            right: Box::new(sma20()),
        };
        let strategy = Strategy { entry, exit };
        assert_eq!(
            strategy.to_dsl(),
            "ENTRY: close > sma(close, 20)\nEXIT: close < sma(close, 20)"
        );
    }
}
