use std::time::Duration;

use derive_more::IsVariant;
use thiserror::Error as TError;

/// The inbound byte stream doesn't match the response the command expects.
///
/// The stream is unsynchronized after this, the run should be aborted.
#[derive(Debug, Clone, PartialEq, Eq, TError, IsVariant)]
pub enum FramingError {
    /// A data chunk is longer than the remaining data plus the ACK byte
    #[error("Unexpected data size: {got} bytes while at most {expected} were expected")]
    UnexpectedLength { expected: usize, got: usize },
    /// The byte after the response data is not an ACK
    #[error("Expected ACK byte, got {0:#04x}")]
    MissingAck(u8),
    /// All data was received, only a lone ACK byte may follow
    #[error("Expected only ACK byte, got {0:x?}")]
    ExpectedLoneAck(Vec<u8>),
    /// Data arrived after the response was complete
    #[error("Response already complete, got {0} more bytes")]
    AlreadyComplete(usize),
}

#[derive(Debug, TError, IsVariant)]
pub enum Error {
    /// No complete response within the configured duration
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Response framing violation
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// The board didn't answer any ping
    #[error("SBC not responding after {0} pings")]
    Offline(usize),

    /// Bulk write payload must consist of whole 16-bit words
    #[error("Bulk write data has odd length {0}")]
    OddLength(usize),

    /// Bulk write word count doesn't fit the 16-bit size field
    #[error("Bulk write of {0} words doesn't fit the size field")]
    TooManyWords(usize),

    /// Response length doesn't match the command
    #[error("Expected {expected} response bytes, got {got}")]
    ResponseLength { expected: usize, got: usize },

    /// gdp-port error
    #[error("Transport error: {0}")]
    Port(#[from] gdp_port::err::Error),
}
