//! SCPI wrapper around a spectrum analyzer session.
//!
//! [`SpectrumAnalyzer::new`] puts the instrument into a known state (factory
//! preset, span, RBW, reference level) and waits for it to finish before
//! returning. After that the wrapper only switches trace modes and reads the
//! marker at the trace peak. Every call blocks until the instrument answers.

use std::thread;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::transport::Transport;

pub const DEFAULT_RESOURCE: &str = "USB0::0x2A8D::0x0B0B::MY54200340::INSTR";

pub const MARKER_PEAK_SEARCH: &str = ":CALCulate:MARKer1:MAXimum";
pub const MARKER_AMPLITUDE_QUERY: &str = ":CALC:MARK1:Y?";
pub const TRACE_MAX_HOLD: &str = ":TRACe1:TYPE MAXHold";
pub const TRACE_CLEAR_WRITE: &str = ":TRACe1:TYPE WRIT";

/// Everything the analyzer is configured with at construction.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub resource: String,
    pub ref_level_dbm: f64,
    pub start_freq_mhz: f64,
    pub stop_freq_mhz: f64,
    pub rbw_mhz: f64,
    pub auto_calibration: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            resource: DEFAULT_RESOURCE.to_string(),
            ref_level_dbm: 20.0,
            start_freq_mhz: 5825.0,
            stop_freq_mhz: 5875.0,
            rbw_mhz: 1.0,
            auto_calibration: false,
        }
    }
}

impl AnalyzerSettings {
    pub fn validate(&self) -> Result<()> {
        // written so that NaN on either end is rejected too
        if !(self.stop_freq_mhz >= self.start_freq_mhz) {
            return Err(Error::InvalidFrequencyRange {
                start_mhz: self.start_freq_mhz,
                stop_mhz: self.stop_freq_mhz,
            });
        }
        Ok(())
    }
}

pub struct SpectrumAnalyzer<T: Transport> {
    transport: T,
    settings: AnalyzerSettings,
}

impl<T: Transport> SpectrumAnalyzer<T> {
    /// Preset and configure the analyzer, then block until it reports the
    /// operation complete.
    ///
    /// The response timeout is disabled here, so an analyzer that never
    /// answers `*OPC?` blocks this call forever.
    pub fn new(mut transport: T, settings: AnalyzerSettings) -> Result<SpectrumAnalyzer<T>> {
        settings.validate()?;

        // factory reset
        transport.write(":SYST:PRES:Type Fact")?;

        transport.write(&format!(":FREQuency:STAR {} MHz", settings.start_freq_mhz))?;
        transport.write(&format!(":FREQuency:STOP {} MHz", settings.stop_freq_mhz))?;
        transport.write(&format!(":BANDwidth:RESolution {} MHz", settings.rbw_mhz))?;
        transport.write(&format!(
            ":DISPlay:WINDow:TRACe:Y:RLEVel {}",
            settings.ref_level_dbm
        ))?;

        tracing::info!("Spectrum Analyzer Init Messages:");
        tracing::info!("  Instrument has infinite timeout...");
        transport.set_timeout(None)?;

        let expired = transport.query(":CALibration:EXPired?")?;
        tracing::info!("  calibration expired: {}", expired);

        tracing::info!("  Waiting Until Operation is Complete");
        transport.query("*OPC?")?;

        let auto_calibration = settings.auto_calibration;
        let mut analyzer = SpectrumAnalyzer {
            transport,
            settings,
        };
        analyzer.set_auto_align(auto_calibration)?;
        Ok(analyzer)
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// `*IDN?`
    pub fn identify(&mut self) -> Result<String> {
        Ok(self.transport.query("*IDN?")?.trim().to_string())
    }

    pub fn set_auto_align(&mut self, auto_align: bool) -> Result<()> {
        let state = if auto_align { "ON" } else { "OFF" };
        self.transport.write(&format!(":CAL:AUTO {state}"))
    }

    pub fn set_max_hold(&mut self) -> Result<()> {
        self.transport.write(TRACE_MAX_HOLD)
    }

    pub fn clear_write(&mut self) -> Result<()> {
        self.transport.write(TRACE_CLEAR_WRITE)
    }

    /// Block for `seconds`, logging once per whole second and once for the
    /// fractional remainder.
    pub fn sleep(&self, seconds: f64) {
        for step in sleep_steps(seconds) {
            if step == Duration::from_secs(1) {
                tracing::info!("waiting for 1 sec");
            } else {
                tracing::info!("waiting for {:.2} sec", step.as_secs_f64());
            }
            thread::sleep(step);
        }
    }

    /// Wait `delay`, move marker 1 to the trace peak, and read its amplitude.
    pub fn peak_measurement_dbm(&mut self, delay: Duration) -> Result<f64> {
        thread::sleep(delay);
        self.transport.write(MARKER_PEAK_SEARCH)?;
        let response = self.transport.query(MARKER_AMPLITUDE_QUERY)?;
        response.trim().parse::<f64>().map_err(|_| Error::Parse {
            query: MARKER_AMPLITUDE_QUERY.to_string(),
            response,
        })
    }

    /// `num` peak readings in the order they were taken. Stops at the first
    /// failure.
    pub fn take_peak_measurements_dbm(&mut self, num: usize, delay: Duration) -> Result<Vec<f64>> {
        (0..num)
            .map(|_| self.peak_measurement_dbm(delay))
            .collect()
    }

    /// Set the input attenuator to a fixed value in dB.
    pub fn set_attenuation_man_db(&mut self, attenuation_db: f64) -> Result<()> {
        self.transport
            .write(&format!(":POWer:ATTenuation {attenuation_db}"))
    }
}

/// Split `seconds` into whole one-second steps plus the remainder.
///
/// Negative, zero, and non-finite inputs produce no steps. Steps are yielded
/// lazily, so a long wait costs nothing up front.
pub fn sleep_steps(seconds: f64) -> impl Iterator<Item = Duration> {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };

    // saturating cast, whole seconds past u64::MAX are not representable anyway
    let whole = seconds.trunc() as u64;
    let remainder = seconds.fract();

    let fraction = (remainder > 0.0).then(|| Duration::from_secs_f64(remainder));
    (0..whole)
        .map(|_| Duration::from_secs(1))
        .chain(fraction)
}
