use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::{trim_terminator, Transport};
use crate::error::Result;

/// Raw SCPI over TCP, conventionally port 5025.
pub struct SocketTransport {
    reader: BufReader<TcpStream>,
}

impl SocketTransport {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;

        // keep a dead link from hanging until the analyzer takes over the timeout
        stream.set_read_timeout(Some(Duration::from_secs(5)))?;
        stream.set_write_timeout(Some(Duration::from_secs(5)))?;
        stream.set_nodelay(true)?;

        Ok(SocketTransport {
            reader: BufReader::new(stream),
        })
    }
}

impl Transport for SocketTransport {
    fn write(&mut self, command: &str) -> Result<()> {
        tracing::debug!("-> {}", command);
        let stream = self.reader.get_mut();
        stream.write_all(command.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String> {
        self.write(command)?;

        let mut response = String::new();
        let read = self.reader.read_line(&mut response)?;
        if read == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("connection closed while waiting for {command}"),
            )
            .into());
        }

        let response = trim_terminator(response);
        tracing::debug!("<- {}", response);
        Ok(response)
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        let stream = self.reader.get_ref();
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;
        Ok(())
    }
}
