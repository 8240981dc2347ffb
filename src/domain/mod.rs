//! Core domain types and logic.

pub mod backtest;
pub mod builder;
pub mod error;
pub mod eval;
pub mod expr;
pub mod indicator;
pub mod lexer;
pub mod metrics;
pub mod parser;
pub mod series;
pub mod structured;
