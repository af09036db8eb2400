//! Byte transport between the host and the SBC that hosts the GDP.
//!
//! The link has no framing of its own: the host writes a command as one
//! buffer and the board answers with bytes that may be split or coalesced
//! arbitrarily by the UART driver.

use std::time::Duration;

use crate::err::Error;

pub mod err;
#[cfg(feature = "serialport")]
pub mod serial;

#[cfg(feature = "serialport")]
pub use serial::SerialTransport;

pub type Result<T> = core::result::Result<T, Error>;

/// How long a read without a deadline blocks before giving control back.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub trait Transport {
    /// Write the whole `buf` to the link.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Read whatever is available into `buf`.
    ///
    /// Blocks for at most `timeout` (or [`POLL_INTERVAL`] when `None`) and
    /// returns `0` if nothing arrived in that time.
    fn read_chunk(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize>;

    /// Drop any bytes already received but not read yet.
    fn clear_input(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write(buf)
    }

    fn read_chunk(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize> {
        (**self).read_chunk(buf, timeout)
    }

    fn clear_input(&mut self) -> Result<()> {
        (**self).clear_input()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write(buf)
    }

    fn read_chunk(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize> {
        (**self).read_chunk(buf, timeout)
    }

    fn clear_input(&mut self) -> Result<()> {
        (**self).clear_input()
    }
}
