//! INI file configuration adapter.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::RulebenchError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RulebenchError> {
        let mut config = Ini::new();
        config.load(&path).map_err(|e| RulebenchError::ConfigParse {
            file: path.as_ref().display().to_string(),
            reason: e,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, RulebenchError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|e| RulebenchError::ConfigParse {
                file: "<inline>".to_string(),
                reason: e,
            })?;
        Ok(Self { config })
    }

    /// Assemble the `[backtest]` settings, falling back to defaults for any
    /// key that is absent.
    pub fn backtest_config(&self) -> Result<BacktestConfig, RulebenchError> {
        let defaults = BacktestConfig::default();
        let price_field = self
            .get_string("backtest", "price_field")
            .unwrap_or(defaults.price_field);
        let initial_capital =
            self.get_double("backtest", "initial_capital", defaults.initial_capital);
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            return Err(RulebenchError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_capital".to_string(),
                reason: format!("must be positive, got {}", initial_capital),
            });
        }
        Ok(BacktestConfig {
            price_field,
            initial_capital,
        })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}
