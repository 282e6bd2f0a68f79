use std::fmt;

use crate::error::{Error, Result};

/// Where the analyzer lives, parsed from a VISA-style resource string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    /// Raw SCPI over TCP, `TCPIP0::192.168.1.20::5025::SOCKET`
    Socket { host: String, port: u16 },
    /// Anything the VISA library resolves (USB, GPIB, TCPIP INSTR, hislip)
    Visa(String),
    /// In-process simulated analyzer, `SIM` or `SIM::<anything>`
    Simulated,
}

impl Resource {
    pub fn parse(resource: &str) -> Result<Resource> {
        let resource = resource.trim();
        if resource.is_empty() {
            return Err(Error::InvalidResource("empty resource string".to_string()));
        }

        let parts: Vec<&str> = resource.split("::").collect();
        let interface = parts[0].to_ascii_uppercase();

        if interface == "SIM" {
            return Ok(Resource::Simulated);
        }

        // TCPIP[board]::host::port::SOCKET
        let is_socket = interface.starts_with("TCPIP")
            && parts.len() == 4
            && parts[3].eq_ignore_ascii_case("SOCKET");
        if is_socket {
            let host = parts[1].to_string();
            if host.is_empty() {
                return Err(Error::InvalidResource(format!("missing host in {resource}")));
            }
            let port = parts[2].parse::<u16>().map_err(|_| {
                Error::InvalidResource(format!("invalid port {:?} in {resource}", parts[2]))
            })?;
            return Ok(Resource::Socket { host, port });
        }

        Ok(Resource::Visa(resource.to_string()))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Resource::Socket { host, port } => write!(f, "TCPIP0::{host}::{port}::SOCKET"),
            Resource::Visa(name) => write!(f, "{name}"),
            Resource::Simulated => write!(f, "SIM"),
        }
    }
}
