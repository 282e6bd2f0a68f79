use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::Result;

pub const CSV_HEADER: [&str; 2] = ["Frequency", "Power"];

/// Frequency the first reading of a batch is filed under, MHz.
pub const DEFAULT_BASE_FREQUENCY_MHZ: u32 = 5825;

// readings are filed at base, base + 1, base + 2, ... MHz regardless of the
// span the analyzer was configured with
pub fn frequency_for_index(base_frequency_mhz: u32, index: usize) -> u64 {
    u64::from(base_frequency_mhz) + index as u64
}

/// Write the header and one `frequency,power` row per reading.
pub fn write_csv<W: io::Write>(writer: W, base_frequency_mhz: u32, readings: &[f64]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for (i, reading) in readings.iter().enumerate() {
        csv_writer.write_record([
            frequency_for_index(base_frequency_mhz, i).to_string(),
            reading.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// `spectrum_2024-05-01 13:45:10.csv`
pub fn spectrum_file_name(timestamp: &NaiveDateTime) -> String {
    format!("spectrum_{}.csv", timestamp.format("%Y-%m-%d %H:%M:%S"))
}

/// Write a batch to `dir`, named after `timestamp`, and return the path.
pub fn write_spectrum_file(
    dir: &Path,
    timestamp: &NaiveDateTime,
    base_frequency_mhz: u32,
    readings: &[f64],
) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(spectrum_file_name(timestamp));
    let file = File::create(&path)?;
    write_csv(file, base_frequency_mhz, readings)?;
    tracing::info!("wrote {} readings to {}", readings.len(), path.display());
    Ok(path)
}

/// Min / max / mean over a batch of readings.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min_dbm: f64,
    pub max_dbm: f64,
    pub mean_dbm: f64, // averaged as power (mW), not as dB
}

impl Summary {
    pub fn from_readings(readings: &[f64]) -> Option<Summary> {
        if readings.is_empty() {
            return None;
        }

        let min_dbm = readings.iter().copied().fold(f64::INFINITY, f64::min);
        let max_dbm = readings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean_mw = readings
            .iter()
            .map(|dbm| rfconversions::power::db_to_linear(*dbm))
            .sum::<f64>()
            / readings.len() as f64;

        Some(Summary {
            count: readings.len(),
            min_dbm,
            max_dbm,
            mean_dbm: 10.0 * mean_mw.log10(),
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // `{:>8.2}` lines the numbers up on the decimal point
        writeln!(f, "Readings:\t{}", self.count)?;
        writeln!(f, "Min:\t{:>8.2} dBm", self.min_dbm)?;
        writeln!(f, "Max:\t{:>8.2} dBm", self.max_dbm)?;
        write!(f, "Mean:\t{:>8.2} dBm", self.mean_dbm)
    }
}
