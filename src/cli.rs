//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::builder::build_strategy;
use crate::domain::error::RulebenchError;
use crate::domain::eval::evaluate_strategy;
use crate::domain::expr::Strategy;
use crate::domain::indicator::IndicatorRegistry;
use crate::domain::structured::StructuredRules;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "rulebench", about = "Trading rule DSL compiler and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest a rule file against a CSV price table
    Backtest {
        /// CSV price data (date,open,high,low,close,volume)
        #[arg(short, long)]
        data: PathBuf,
        /// Rule file: DSL text, or structured JSON with a .json extension
        #[arg(short, long)]
        rules: PathBuf,
        /// Optional INI config with a [backtest] section
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse and validate a rule file, printing the canonical form
    Check {
        #[arg(short, long)]
        rules: PathBuf,
    },
    /// Render structured JSON rules to DSL text
    Render {
        #[arg(short, long)]
        json: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            data,
            rules,
            config,
            output,
        } => run_backtest_command(&data, &rules, config.as_ref(), output.as_ref()),
        Command::Check { rules } => run_check(&rules),
        Command::Render { json } => run_render(&json),
    }
}

fn fail(err: &RulebenchError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn read_to_string(path: &PathBuf) -> Result<String, RulebenchError> {
    fs::read_to_string(path).map_err(RulebenchError::from)
}

/// Load rule DSL text. A `.json` file is treated as structured rules and
/// rendered to DSL first, mirroring the language-model front end that emits
/// triples rather than DSL text.
fn load_rule_text(path: &PathBuf) -> Result<String, RulebenchError> {
    let text = read_to_string(path)?;
    if path.extension().is_some_and(|ext| ext == "json") {
        let rules = StructuredRules::from_json(&text)?;
        rules.to_dsl()
    } else {
        Ok(text)
    }
}

fn build_from_file(
    path: &PathBuf,
    registry: &IndicatorRegistry,
) -> Result<Strategy, RulebenchError> {
    let text = load_rule_text(path)?;
    match build_strategy(&text, registry) {
        Err(RulebenchError::Syntax(e)) => {
            eprintln!("{}", e.display_with_context(text.trim_end()));
            Err(e.into())
        }
        other => other,
    }
}

fn run_backtest_command(
    data_path: &PathBuf,
    rules_path: &PathBuf,
    config_path: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let bt_config = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = match FileConfigAdapter::from_file(path) {
                Ok(a) => a,
                Err(e) => return fail(&e),
            };
            match adapter.backtest_config() {
                Ok(c) => c,
                Err(e) => return fail(&e),
            }
        }
        None => BacktestConfig::default(),
    };

    eprintln!("Loading rules from {}", rules_path.display());
    let registry = IndicatorRegistry::standard();
    let strategy = match build_from_file(rules_path, &registry) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    eprintln!("Loading prices from {}", data_path.display());
    let prices = match CsvAdapter::new().load_prices(data_path) {
        Ok(p) => p.with_yesterday_high(),
        Err(e) => return fail(&e),
    };
    eprintln!("Loaded {} rows", prices.len());

    let (entry, exit) = match evaluate_strategy(&strategy, &prices, &registry) {
        Ok(signals) => signals,
        Err(e) => return fail(&e.into()),
    };

    let result = match run_backtest(&prices, &entry, &exit, &bt_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    eprintln!(
        "Backtest complete: {} trades, total return {:.4}%",
        result.metrics.num_trades,
        result.metrics.total_return * 100.0
    );

    let report = TextReportAdapter::new();
    let written = match output_path {
        Some(path) => {
            let file = match fs::File::create(path) {
                Ok(f) => f,
                Err(e) => return fail(&e.into()),
            };
            let mut out = std::io::BufWriter::new(file);
            report.write(&result, &strategy, &mut out)
        }
        None => report.write(&result, &strategy, &mut std::io::stdout()),
    };
    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn run_check(rules_path: &PathBuf) -> ExitCode {
    let registry = IndicatorRegistry::standard();
    match build_from_file(rules_path, &registry) {
        Ok(strategy) => {
            println!("{}", strategy.to_dsl());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_render(json_path: &PathBuf) -> ExitCode {
    let text = match read_to_string(json_path) {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };
    let rules = match StructuredRules::from_json(&text) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    match rules.to_dsl() {
        Ok(dsl) => {
            println!("{dsl}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
