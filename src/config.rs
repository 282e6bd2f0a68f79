use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::analyzer::AnalyzerSettings;
use crate::error::{Error, Result};
use crate::measurement::DEFAULT_BASE_FREQUENCY_MHZ;

/// Longest settle time a run file may ask for: one day.
pub const MAX_SETTLE_SECONDS: f64 = 86_400.0;

/// A run file: how to set up the analyzer and what to measure.
///
/// ```toml
/// [instrument]
/// resource = "TCPIP0::192.168.1.20::5025::SOCKET"
/// start_freq_mhz = 5825
/// stop_freq_mhz = 5875
///
/// [run]
/// count = 20
/// delay_seconds = 0.25
/// ```
///
/// Anything left out falls back to the defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub instrument: AnalyzerSettings,
    pub run: RunPlan,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunPlan {
    pub settle_seconds: f64,
    pub count: usize,
    pub delay_seconds: f64,
    pub max_hold: bool,
    pub attenuation_db: Option<f64>,
    pub base_frequency_mhz: u32,
    pub output_dir: PathBuf,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            settle_seconds: 5.0,
            count: 10,
            delay_seconds: 0.1,
            max_hold: true,
            attenuation_db: None,
            base_frequency_mhz: DEFAULT_BASE_FREQUENCY_MHZ,
            output_dir: PathBuf::from("."),
        }
    }
}

impl RunPlan {
    /// Spacing between consecutive peak readings.
    pub fn delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.delay_seconds).map_err(|_| {
            Error::InvalidSetting(format!(
                "delay_seconds must be a non-negative number, got {}",
                self.delay_seconds
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.delay()?;
        if !(0.0..=MAX_SETTLE_SECONDS).contains(&self.settle_seconds) {
            return Err(Error::InvalidSetting(format!(
                "settle_seconds must be between 0 and {MAX_SETTLE_SECONDS}, got {}",
                self.settle_seconds
            )));
        }
        Ok(())
    }
}

impl RunConfig {
    pub fn from_toml(content: &str) -> Result<RunConfig> {
        let config: RunConfig = toml::from_str(content)?;
        config.instrument.validate()?;
        config.run.validate()?;
        Ok(config)
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig> {
    tracing::info!("Loading Config: {}", path.display());
    let content = fs::read_to_string(path)?;
    let mut config = RunConfig::from_toml(&content)?;

    // a relative output_dir is taken relative to the config file
    if config.run.output_dir.is_relative() {
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.run.output_dir = base_dir.join(&config.run.output_dir);
    }

    tracing::debug!("Config: {:#?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = RunConfig::from_toml("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.run.count, 10);
        assert_eq!(config.run.delay().unwrap(), Duration::from_millis(100));
    }

    #[test]
    fn partial_sections() {
        let config = RunConfig::from_toml(
            r#"
            [instrument]
            resource = "SIM"
            rbw_mhz = 0.1

            [run]
            count = 3
            max_hold = false
            attenuation_db = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(config.instrument.resource, "SIM");
        assert_eq!(config.instrument.rbw_mhz, 0.1);
        assert_eq!(config.instrument.start_freq_mhz, 5825.0);
        assert_eq!(config.run.count, 3);
        assert!(!config.run.max_hold);
        assert_eq!(config.run.attenuation_db, Some(10.0));
        assert_eq!(config.run.settle_seconds, 5.0);
    }

    #[test]
    fn integer_frequencies_are_accepted() {
        let config = RunConfig::from_toml(
            r#"
            [instrument]
            start_freq_mhz = 2400
            stop_freq_mhz = 2500
            "#,
        )
        .unwrap();
        assert_eq!(config.instrument.start_freq_mhz, 2400.0);
        assert_eq!(config.instrument.stop_freq_mhz, 2500.0);
    }

    #[test]
    fn inverted_span_is_rejected() {
        let result = RunConfig::from_toml(
            r#"
            [instrument]
            start_freq_mhz = 5900
            "#,
        );
        assert!(matches!(result, Err(Error::InvalidFrequencyRange { .. })));
    }

    #[test]
    fn negative_delay_is_rejected() {
        let result = RunConfig::from_toml("[run]\ndelay_seconds = -0.5\n");
        assert!(matches!(result, Err(Error::InvalidSetting(_))));
    }

    #[test]
    fn settle_time_is_bounded() {
        let result = RunConfig::from_toml("[run]\nsettle_seconds = 1e16\n");
        assert!(matches!(result, Err(Error::InvalidSetting(_))));

        let result = RunConfig::from_toml("[run]\nsettle_seconds = -1.0\n");
        assert!(matches!(result, Err(Error::InvalidSetting(_))));

        let config = RunConfig::from_toml("[run]\nsettle_seconds = 86400.0\n").unwrap();
        assert_eq!(config.run.settle_seconds, MAX_SETTLE_SECONDS);
    }

    #[test]
    fn malformed_toml() {
        let result = RunConfig::from_toml("[run\ncount = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
