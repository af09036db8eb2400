//! Command/response protocol spoken by the SBC firmware that hosts the GDP.
//!
//! A request is the opcode followed by its payload. The response is a
//! fixed number of data bytes followed by a single ACK byte (`0x01`):
//!
//! ```text
//! host -> sbc: opcode payload...
//! sbc -> host: data[0] .. data[N-1] ACK
//! ```
//!
//! There is no NACK, no length prefix and no checksum, so the host has to
//! know `N` for every opcode and treat any deviation as a lost sync.

use core::fmt::Display;
use std::time::Duration;

use strum::{Display as StrumDisplay, FromRepr};

use crate::err::Error;

pub mod access_log;
pub mod accumulator;
pub mod channel;
pub mod err;
#[cfg(test)]
mod mock;

pub use access_log::LogEntry;
pub use accumulator::ByteAccumulator;
pub use channel::CommandChannel;

pub type Result<T> = core::result::Result<T, Error>;

/// Terminates every response frame.
pub const ACK: u8 = 0x01;

/// Response timeout used unless a command overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Number of entries in the access log ring of the SBC.
pub const LOG_DEPTH: u16 = 1 << 10;

/// SBC command opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, FromRepr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Opcode {
    /// Heartbeat.
    Ping = 0x80,
    /// Release the GDP from reset.
    Start = 0x81,
    /// Write the whole SRAM image, starting at address 0.
    BulkWrite = 0x01,
    /// Read a 16-bit word of SRAM.
    Read = 0x03,
    /// Read an access log entry.
    LogRead = 0x11,
}

/// A single request to the SBC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    opcode: Opcode,
    payload: Vec<u8>,
    expected_len: usize,
    timeout: Option<Duration>,
}

impl Command {
    pub fn new(opcode: Opcode, payload: Vec<u8>, expected_len: usize) -> Self {
        Self {
            opcode,
            payload,
            expected_len,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    pub fn ping() -> Self {
        Self::new(Opcode::Ping, Vec::new(), 0)
    }

    pub fn start() -> Self {
        Self::new(Opcode::Start, Vec::new(), 0)
    }

    /// Read the SRAM word at `addr`, the response is 2 bytes.
    pub fn read(addr: u16) -> Self {
        Self::new(Opcode::Read, addr.to_be_bytes().to_vec(), 2)
    }

    /// Read log entry `addr`, the response is `[access_hi, access_lo, spec]`.
    pub fn log_read(addr: u16) -> Self {
        Self::new(Opcode::LogRead, addr.to_be_bytes().to_vec(), 3)
    }

    /// Upload `image` to SRAM. The SBC may take arbitrarily long, so there's no timeout.
    pub fn bulk_write(image: &[u8]) -> Result<Self> {
        Ok(Self::new(Opcode::BulkWrite, bulk_write_payload(image)?, 0).with_timeout(None))
    }

    /// Override the response timeout, zero disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Request frame as written to the wire.
    pub fn frame(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(1 + self.payload.len());
        frame.push(self.opcode as u8);
        frame.extend_from_slice(&self.payload);
        frame
    }
}

/// Bulk write payload: 16-bit word count, then the words from the highest
/// address down, each with its bytes swapped.
///
/// `image` is read as little-endian words, so word `i` goes out as
/// `image[2i + 1], image[2i]`.
pub fn bulk_write_payload(image: &[u8]) -> Result<Vec<u8>> {
    if image.len() % 2 != 0 {
        return Err(Error::OddLength(image.len()));
    }

    let words = image.len() / 2;
    let size = u16::try_from(words).map_err(|_| Error::TooManyWords(words))?;

    let mut payload = Vec::with_capacity(2 + image.len());
    payload.extend_from_slice(&size.to_be_bytes());
    for word in image.chunks_exact(2).rev() {
        payload.push(word[1]);
        payload.push(word[0]);
    }

    Ok(payload)
}

impl Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.opcode {
            Opcode::Ping | Opcode::Start => write!(f, "{}", self.opcode),
            Opcode::BulkWrite => write!(
                f,
                "{} of {} words",
                self.opcode,
                self.payload.len().saturating_sub(2) / 2
            ),
            Opcode::Read | Opcode::LogRead => {
                write!(f, "{} @ 0x", self.opcode)?;
                for byte in &self.payload {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_start_with_opcode() {
        assert_eq!(Command::ping().frame(), [0x80]);
        assert_eq!(Command::start().frame(), [0x81]);
        assert_eq!(Command::read(0x1234).frame(), [0x03, 0x12, 0x34]);
        assert_eq!(Command::log_read(0x03ff).frame(), [0x11, 0x03, 0xff]);
    }

    #[test]
    fn response_lengths() {
        assert_eq!(Command::ping().expected_len(), 0);
        assert_eq!(Command::read(0).expected_len(), 2);
        assert_eq!(Command::log_read(0).expected_len(), 3);
    }

    #[test]
    fn bulk_write_reverses_and_swaps_words() {
        // W0 = 0xBBAA, W1 = 0xDDCC
        let payload = bulk_write_payload(&[0xaa, 0xbb, 0xcc, 0xdd]).unwrap();
        assert_eq!(payload, [0x00, 0x02, 0xdd, 0xcc, 0xbb, 0xaa]);
    }

    #[test]
    fn bulk_write_size_is_big_endian() {
        let image = vec![0; 0x302 * 2];
        let payload = bulk_write_payload(&image).unwrap();
        assert_eq!(&payload[..2], [0x03, 0x02]);
        assert_eq!(payload.len(), 2 + image.len());
    }

    #[test]
    fn bulk_write_rejects_odd_length() {
        assert!(matches!(
            bulk_write_payload(&[1, 2, 3]),
            Err(Error::OddLength(3))
        ));
    }

    #[test]
    fn bulk_write_rejects_oversized_image() {
        let image = vec![0; 0x10000 * 2];
        assert!(matches!(
            bulk_write_payload(&image),
            Err(Error::TooManyWords(0x10000))
        ));
    }

    #[test]
    fn bulk_write_has_no_timeout() {
        let command = Command::bulk_write(&[0, 0]).unwrap();
        assert_eq!(command.timeout(), None);
        assert_eq!(Command::ping().timeout(), Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let command = Command::ping().with_timeout(Some(Duration::ZERO));
        assert_eq!(command.timeout(), None);
    }

    #[test]
    fn display() {
        assert_eq!(Command::ping().to_string(), "PING");
        assert_eq!(Command::log_read(0x12).to_string(), "LOG_READ @ 0x0012");
        assert_eq!(
            Command::bulk_write(&[0; 8]).unwrap().to_string(),
            "BULK_WRITE of 4 words"
        );
    }

    #[test]
    fn opcode_from_repr() {
        assert_eq!(Opcode::from_repr(0x11), Some(Opcode::LogRead));
        assert_eq!(Opcode::from_repr(0x42), None);
    }
}
