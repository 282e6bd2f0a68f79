//! Error type shared by the analyzer wrapper, the transports, and the CLI.
//!
//! Every fallible operation in the crate returns [`Result`]. Lower level
//! errors (`std::io`, `csv`, `toml`, VISA) convert through `#[from]` so the
//! `?` operator works across module boundaries.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("stop frequency {stop_mhz} MHz is below start frequency {start_mhz} MHz")]
    InvalidFrequencyRange { start_mhz: f64, stop_mhz: f64 },

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("invalid resource string: {0}")]
    InvalidResource(String),

    #[error("feature '{0}' is not enabled, rebuild with --features {0}")]
    FeatureNotEnabled(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse response to {query}: {response:?}")]
    Parse { query: String, response: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[cfg(feature = "visa")]
    #[error("VISA error: {0}")]
    Visa(#[from] visa_rs::Error),
}
