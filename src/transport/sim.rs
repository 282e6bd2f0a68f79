use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;

use super::Transport;
use crate::error::Result;

/// An analyzer that lives in memory.
///
/// Every command and query is recorded in order, so tests can assert on the
/// exact SCPI traffic. Marker queries answer with scripted readings first;
/// once those run out, with a fixed tone level plus uniform jitter. Under
/// max-hold the jittered level only ever rises, like a real trace would.
#[derive(Clone, Debug)]
pub struct SimulatedAnalyzer {
    sent: Vec<String>,
    scripted: VecDeque<String>,
    tone_dbm: f64,
    jitter_db: f64,
    max_hold: bool,
    held_dbm: Option<f64>,
    timeout: Option<Duration>,
}

impl Default for SimulatedAnalyzer {
    fn default() -> Self {
        Self {
            sent: Vec::new(),
            scripted: VecDeque::new(),
            tone_dbm: -30.0,
            jitter_db: 0.5,
            max_hold: false,
            held_dbm: None,
            timeout: Some(Duration::from_secs(2)),
        }
    }
}

impl SimulatedAnalyzer {
    pub fn new() -> SimulatedAnalyzer {
        SimulatedAnalyzer::default()
    }

    /// Answer marker queries with these responses, in order.
    pub fn with_readings<I, S>(readings: I) -> SimulatedAnalyzer
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        SimulatedAnalyzer {
            scripted: readings.into_iter().map(|r| r.to_string()).collect(),
            ..SimulatedAnalyzer::default()
        }
    }

    /// Center the generated readings on `tone_dbm` with `jitter_db` of spread.
    ///
    /// A NaN or infinite spread means no jitter; anything wider than
    /// 200 dB is clamped to 200 dB.
    pub fn with_tone(tone_dbm: f64, jitter_db: f64) -> SimulatedAnalyzer {
        let jitter_db = if jitter_db.is_finite() {
            jitter_db.abs().min(200.0)
        } else {
            0.0
        };
        SimulatedAnalyzer {
            tone_dbm,
            jitter_db,
            ..SimulatedAnalyzer::default()
        }
    }

    /// Every command and query received so far.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn marker_level(&mut self) -> String {
        if let Some(scripted) = self.scripted.pop_front() {
            return scripted;
        }

        let jitter = if self.jitter_db > 0.0 {
            rand::thread_rng().gen_range(-self.jitter_db..=self.jitter_db)
        } else {
            0.0
        };
        let level = self.tone_dbm + jitter;

        let level = if self.max_hold {
            let held = self.held_dbm.map_or(level, |held| held.max(level));
            self.held_dbm = Some(held);
            held
        } else {
            level
        };
        format!("{level:.3}")
    }
}

impl Transport for SimulatedAnalyzer {
    fn write(&mut self, command: &str) -> Result<()> {
        tracing::debug!("-> {}", command);
        match command {
            ":TRACe1:TYPE MAXHold" => self.max_hold = true,
            ":TRACe1:TYPE WRIT" => {
                self.max_hold = false;
                self.held_dbm = None;
            }
            _ => {}
        }
        self.sent.push(command.to_string());
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String> {
        self.sent.push(command.to_string());
        let response = match command {
            "*IDN?" => "Simulated,SpectrumAnalyzer,SIM0001,1.0".to_string(),
            "*OPC?" => "1".to_string(),
            ":CALibration:EXPired?" => "0".to_string(),
            ":CALC:MARK1:Y?" => self.marker_level(),
            _ => "0".to_string(),
        };
        tracing::debug!("{} <- {}", command, response);
        Ok(response)
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.timeout = timeout;
        Ok(())
    }
}
