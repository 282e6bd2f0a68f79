//! Peak power logging for SCPI spectrum analyzers.
//!
//! ```no_run
//! use std::time::Duration;
//! use peaklog::{AnalyzerSettings, SimulatedAnalyzer, SpectrumAnalyzer};
//!
//! let mut analyzer = SpectrumAnalyzer::new(SimulatedAnalyzer::new(), AnalyzerSettings::default())?;
//! analyzer.set_max_hold()?;
//! analyzer.sleep(5.0);
//! let readings = analyzer.take_peak_measurements_dbm(10, Duration::from_millis(100))?;
//! assert_eq!(readings.len(), 10);
//! # Ok::<(), peaklog::Error>(())
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
mod error;
pub mod measurement;
pub mod resource;
pub mod transport;

pub use analyzer::{sleep_steps, AnalyzerSettings, SpectrumAnalyzer};
pub use config::{load_config, RunConfig, RunPlan};
pub use error::{Error, Result};
pub use measurement::{write_csv, write_spectrum_file, Summary};
pub use resource::Resource;
pub use transport::{SimulatedAnalyzer, SocketTransport, Transport};
#[cfg(feature = "visa")]
pub use transport::VisaTransport;
