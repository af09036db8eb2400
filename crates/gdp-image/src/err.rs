use thiserror::Error as TError;

#[derive(Debug, TError)]
pub enum Error {
    /// Write or read past the end of the image
    #[error("Access at {addr:#06x} is out of the {capacity:#x} bytes image")]
    OutOfRange { addr: usize, capacity: usize },

    /// Segment address doesn't fit 24 bits
    #[error("Segment address {0:#x} doesn't fit 24 bits")]
    AddressTooWide(u32),

    /// Segment length must be in 1..=2^32
    #[error("Invalid segment length {0:#x}")]
    InvalidLength(u64),

    /// Descriptor type bits are not a storage descriptor
    #[error("Not a storage descriptor: {0:#010x}")]
    NotStorageDescriptor(u32),

    /// Segment type code is not defined for the base type
    #[error("Unknown {} segment type {code:#07b}", base_type(.access))]
    UnknownSegmentType { access: bool, code: u8 },

    /// Processor class code is not defined
    #[error("Unknown processor class {0:#05b}")]
    UnknownProcessorClass(u8),

    /// bincode crate error
    #[error("Bincode decode error: {0}")]
    BincodeDecode(#[from] bincode::error::DecodeError),
    /// bincode crate error
    #[error("Bincode encode error: {0}")]
    BincodeEncode(#[from] bincode::error::EncodeError),
}

fn base_type(access: &bool) -> &'static str {
    if *access { "access" } else { "data" }
}
