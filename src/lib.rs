//! rulebench — a trading-rule DSL compiler and deterministic backtester.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`].
//!
//! Pipeline: DSL text → token stream → rule AST → (bound to a price table)
//! → entry/exit signal series → simulated trade sequence → performance
//! report. Every stage is a pure function over immutable inputs;
//! independent strategy/price pairs can run in parallel without shared
//! state.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
