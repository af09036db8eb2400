use thiserror::Error as TError;

#[derive(Debug, TError)]
pub enum Error {
    /// gdp-protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] gdp_protocol::err::Error),

    /// gdp-image error
    #[error("Image error: {0}")]
    Image(#[from] gdp_image::err::Error),

    /// gdp-port error
    #[error("Port error: {0}")]
    Port(#[from] gdp_port::err::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
