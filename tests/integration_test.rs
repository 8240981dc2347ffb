//! End-to-end pipeline tests: DSL text (or structured JSON) through parsing,
//! validation, signal evaluation and the backtest simulator, plus property
//! tests over the simulator's state machine.

mod common;

use approx::assert_relative_eq;
use common::*;
use proptest::prelude::*;
use rulebench::adapters::csv_adapter::CsvAdapter;
use rulebench::adapters::text_report_adapter::TextReportAdapter;
use rulebench::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use rulebench::domain::builder::build_strategy;
use rulebench::domain::error::RulebenchError;
use rulebench::domain::eval::evaluate_strategy;
use rulebench::domain::indicator::IndicatorRegistry;
use rulebench::domain::structured::StructuredRules;
use rulebench::ports::data_port::DataPort;
use rulebench::ports::report_port::ReportPort;

fn backtest(closes: &[f64], dsl: &str) -> BacktestResult {
    let registry = IndicatorRegistry::standard();
    let strategy = build_strategy(dsl, &registry).unwrap();
    let prices = prices_from_closes(closes);
    let (entry, exit) = evaluate_strategy(&strategy, &prices, &registry).unwrap();
    run_backtest(&prices, &entry, &exit, &BacktestConfig::default()).unwrap()
}

mod full_pipeline {
    use super::*;

    const DSL: &str = "ENTRY: close > sma(close, 2)\nEXIT: close < sma(close, 2)";

    #[test]
    fn sma_crossover_produces_two_trades() {
        let result = backtest(&[10.0, 11.0, 9.0, 12.0, 8.0], DSL);

        assert_eq!(result.trades.len(), 2);
        let first = &result.trades[0];
        assert_eq!(first.entry_date, date(2024, 1, 2));
        assert_eq!(first.exit_date, date(2024, 1, 3));
        assert_relative_eq!(first.entry_price, 11.0);
        assert_relative_eq!(first.exit_price, 9.0);
        assert_relative_eq!(first.trade_return, 9.0 / 11.0 - 1.0);
        assert_eq!(first.duration, 1);

        let second = &result.trades[1];
        assert_eq!(second.entry_date, date(2024, 1, 4));
        assert_eq!(second.exit_date, date(2024, 1, 5));
        assert_relative_eq!(second.trade_return, 8.0 / 12.0 - 1.0);
    }

    #[test]
    fn equity_curve_compounds_trade_returns() {
        let result = backtest(&[10.0, 11.0, 9.0, 12.0, 8.0], DSL);
        let final_equity = *result.equity_curve.last().unwrap();
        assert_relative_eq!(
            final_equity,
            (9.0 / 11.0) * (8.0 / 12.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            result.metrics.total_return,
            final_equity - 1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(result.metrics.win_rate, 0.0);
        assert_eq!(result.metrics.num_trades, 2);
    }

    #[test]
    fn all_false_entry_yields_empty_log_and_flat_curve() {
        let result = backtest(
            &[10.0, 11.0, 12.0],
            "ENTRY: close > 100\nEXIT: close < 5",
        );
        assert!(result.trades.is_empty());
        assert!(result.equity_curve.iter().all(|&e| e == 1.0));
        assert_relative_eq!(result.metrics.total_return, 0.0);
        assert_relative_eq!(result.metrics.win_rate, 0.0);
        assert_relative_eq!(result.metrics.avg_trade_return, 0.0);
        assert_eq!(result.metrics.num_trades, 0);
    }

    #[test]
    fn table_shorter_than_window_never_errors() {
        let result = backtest(
            &[10.0, 11.0],
            "ENTRY: close > sma(close, 50)\nEXIT: close < sma(close, 50)",
        );
        assert!(result.trades.is_empty());
        assert_eq!(result.equity_curve.len(), 2);
    }

    #[test]
    fn open_position_is_force_closed_at_final_row() {
        let result = backtest(
            &[10.0, 11.0, 12.0, 13.0],
            "ENTRY: close > sma(close, 2)\nEXIT: close < 1",
        );
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_date, date(2024, 1, 4));
        assert_relative_eq!(trade.exit_price, 13.0);
        assert_relative_eq!(trade.trade_return, 13.0 / 11.0 - 1.0);
    }

    #[test]
    fn cross_rule_fires_only_on_the_crossing_row() {
        let result = backtest(
            &[10.0, 10.0, 14.0, 15.0, 9.0],
            "ENTRY: close CROSSES ABOVE sma(close, 2)\nEXIT: close CROSSES BELOW sma(close, 2)",
        );
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_date, date(2024, 1, 3));
        assert_eq!(result.trades[0].exit_date, date(2024, 1, 5));
    }
}

mod csv_to_report {
    use super::*;

    #[test]
    fn csv_file_through_text_report() {
        let file = csv_from_closes(&[10.0, 11.0, 9.0, 12.0, 8.0]);
        let prices = CsvAdapter::new().load_prices(file.path()).unwrap();
        assert_eq!(prices.len(), 5);

        let registry = IndicatorRegistry::standard();
        let strategy = build(
            "ENTRY: close > sma(close, 2)\nEXIT: close < sma(close, 2)",
        );
        let (entry, exit) = evaluate_strategy(&strategy, &prices, &registry).unwrap();
        let result =
            run_backtest(&prices, &entry, &exit, &BacktestConfig::default()).unwrap();

        let mut buf: Vec<u8> = Vec::new();
        TextReportAdapter::new()
            .write(&result, &strategy, &mut buf)
            .unwrap();
        let report = String::from_utf8(buf).unwrap();
        assert!(report.contains("num_trades:"));
        assert!(report.contains("2024-01-02"));
    }

    #[test]
    fn yesterday_high_column_is_usable_in_rules() {
        let file = csv_from_closes(&[10.0, 12.0, 11.0, 14.0]);
        let prices = CsvAdapter::new()
            .load_prices(file.path())
            .unwrap()
            .with_yesterday_high();

        let registry = IndicatorRegistry::standard();
        let strategy = build("ENTRY: close > yesterday_high\nEXIT: close < yesterday_high");
        let (entry, _) = evaluate_strategy(&strategy, &prices, &registry).unwrap();
        // highs are close + 1, so close must beat yesterday's close + 1
        assert_eq!(entry.values(), &[false, true, false, true]);
    }
}

mod structured_rules {
    use super::*;

    #[test]
    fn json_triples_render_build_and_run() {
        let json = r#"{
            "entry": [
                {"left": "close", "operator": ">", "right": "sma(close, 2)"},
                {"left": "volume", "operator": ">", "right": 500000}
            ],
            "exit": [
                {"left": "close", "operator": "<", "right": "sma(close, 2)"}
            ]
        }"#;
        let dsl = StructuredRules::from_json(json).unwrap().to_dsl().unwrap();
        assert_eq!(
            dsl,
            "ENTRY: close > sma(close, 2) AND volume > 500000\nEXIT: close < sma(close, 2)"
        );

        let result = backtest(&[10.0, 11.0, 9.0, 12.0, 8.0], &dsl);
        assert_eq!(result.trades.len(), 2);
    }

    #[test]
    fn empty_entry_section_is_rejected() {
        let json = r#"{"entry": [], "exit": [{"left": "close", "operator": "<", "right": 5}]}"#;
        let err = StructuredRules::from_json(json)
            .unwrap()
            .to_dsl()
            .unwrap_err();
        assert!(matches!(err, RulebenchError::Render { .. }));
    }
}

mod properties {
    use super::*;

    fn closes_strategy() -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(1.0f64..100.0, 0..40)
    }

    proptest! {
        #[test]
        fn evaluation_is_pure(closes in closes_strategy()) {
            let registry = IndicatorRegistry::standard();
            let strategy = build(
                "ENTRY: close > sma(close, 3)\nEXIT: close < sma(close, 3)",
            );
            let prices = prices_from_closes(&closes);
            let first = evaluate_strategy(&strategy, &prices, &registry).unwrap();
            let second = evaluate_strategy(&strategy, &prices, &registry).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn drawdown_stays_in_unit_interval(closes in closes_strategy()) {
            let result = backtest(
                &closes,
                "ENTRY: close > sma(close, 3)\nEXIT: close < sma(close, 3)",
            );
            prop_assert!(result.metrics.max_drawdown >= 0.0);
            prop_assert!(result.metrics.max_drawdown <= 1.0);
        }

        #[test]
        fn trades_never_overlap(closes in closes_strategy()) {
            let result = backtest(
                &closes,
                "ENTRY: close > ema(close, 4)\nEXIT: close < ema(close, 4)",
            );
            for trade in &result.trades {
                prop_assert!(trade.exit_index >= trade.entry_index);
            }
            for pair in result.trades.windows(2) {
                prop_assert!(pair[1].entry_index >= pair[0].exit_index);
            }
        }

        #[test]
        fn equity_stays_positive(closes in closes_strategy()) {
            let result = backtest(
                &closes,
                "ENTRY: close > sma(close, 2)\nEXIT: close < sma(close, 2)",
            );
            prop_assert_eq!(result.equity_curve.len(), closes.len());
            for &equity in &result.equity_curve {
                prop_assert!(equity > 0.0);
            }
        }
    }
}
