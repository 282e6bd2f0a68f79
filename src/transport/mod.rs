//! Instrument sessions.
//!
//! The analyzer wrapper only needs three things from a session: send a
//! command, send a query and read one line back, and change the response
//! timeout. [`Transport`] captures that, and [`open`] picks the
//! implementation that matches a parsed [`Resource`].

mod sim;
mod socket;
#[cfg(feature = "visa")]
mod visa;

use std::time::Duration;

use crate::error::Result;
#[cfg(not(feature = "visa"))]
use crate::error::Error;
use crate::resource::Resource;

pub use sim::SimulatedAnalyzer;
pub use socket::SocketTransport;
#[cfg(feature = "visa")]
pub use visa::VisaTransport;

pub trait Transport {
    /// Send a command that produces no response.
    fn write(&mut self, command: &str) -> Result<()>;

    /// Send a query and return the response line without its terminator.
    fn query(&mut self, command: &str) -> Result<String>;

    /// `None` waits forever.
    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, command: &str) -> Result<()> {
        (**self).write(command)
    }

    fn query(&mut self, command: &str) -> Result<String> {
        (**self).query(command)
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        (**self).set_timeout(timeout)
    }
}

/// Open a session to `resource`.
pub fn open(resource: &Resource) -> Result<Box<dyn Transport>> {
    tracing::info!("opening {}", resource);
    match resource {
        Resource::Socket { host, port } => {
            Ok(Box::new(SocketTransport::connect((host.as_str(), *port))?))
        }
        Resource::Simulated => Ok(Box::new(SimulatedAnalyzer::new())),
        #[cfg(feature = "visa")]
        Resource::Visa(name) => Ok(Box::new(VisaTransport::open(name)?)),
        #[cfg(not(feature = "visa"))]
        Resource::Visa(_) => Err(Error::FeatureNotEnabled("visa")),
    }
}

// strips the LF (or CR LF) that SCPI instruments end every response with
pub(crate) fn trim_terminator(mut response: String) -> String {
    while response.ends_with('\n') || response.ends_with('\r') {
        response.pop();
    }
    response
}
