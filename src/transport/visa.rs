use std::ffi::CString;
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

use visa_rs::attribute::AttrTmoValue;
use visa_rs::prelude::*;

use super::{trim_terminator, Transport};
use crate::error::{Error, Result};

// VI_TMO_INFINITE
const TIMEOUT_INFINITE_MS: u32 = 0xFFFF_FFFF;

/// A session opened through the system VISA library.
pub struct VisaTransport {
    // declared before `_rm` so the session closes before the resource manager
    instr: Instrument,
    _rm: DefaultRM,
}

impl VisaTransport {
    pub fn open(resource: &str) -> Result<Self> {
        let rm = DefaultRM::new()?;
        let name = CString::new(resource)
            .map_err(|_| Error::InvalidResource(format!("interior NUL in {resource:?}")))?;
        let instr = rm.open(&name.into(), AccessMode::NO_LOCK, Duration::from_secs(1))?;
        Ok(VisaTransport { instr, _rm: rm })
    }
}

impl Transport for VisaTransport {
    fn write(&mut self, command: &str) -> Result<()> {
        tracing::debug!("-> {}", command);
        self.instr.write_all(format!("{command}\n").as_bytes())?;
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String> {
        self.write(command)?;

        let mut response = String::new();
        {
            // the reader must be dropped before the session is used again
            let mut reader = BufReader::new(&self.instr);
            reader.read_line(&mut response)?;
        }

        let response = trim_terminator(response);
        tracing::debug!("<- {}", response);
        Ok(response)
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        let millis = match timeout {
            None => TIMEOUT_INFINITE_MS,
            Some(timeout) => timeout.as_millis().min(u128::from(TIMEOUT_INFINITE_MS - 1)) as u32,
        };
        let attr = AttrTmoValue::new_checked(millis)
            .ok_or_else(|| Error::InvalidSetting(format!("timeout {millis} ms out of range")))?;
        self.instr.set_attr(attr)?;
        Ok(())
    }
}
