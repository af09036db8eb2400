use std::{
    io::{ErrorKind, Read, Write},
    time::Duration,
};

use serialport::{ClearBuffer, SerialPort};

use crate::{POLL_INTERVAL, Result, Transport};

pub type Port = Box<dyn SerialPort>;

/// [`Transport`] over a serial port, e.g. the FT232H UART of the SBC.
pub struct SerialTransport {
    port: Port,
}

impl SerialTransport {
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(POLL_INTERVAL)
            .open()?;
        Ok(Self { port })
    }

    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl From<Port> for SerialTransport {
    fn from(port: Port) -> Self {
        Self { port }
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.port.write_all(buf)?;
        self.port.flush().map_err(|e| e.into())
    }

    fn read_chunk(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize> {
        let timeout = timeout.unwrap_or(POLL_INTERVAL);
        if timeout.is_zero() {
            return Ok(0);
        }

        self.port.set_timeout(timeout)?;
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn clear_input(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Input).map_err(|e| e.into())
    }
}
