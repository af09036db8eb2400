//! Raw storage descriptor as it lies in SRAM.
use bincode::{Decode, Encode};

use crate::Result;

/// Size of a storage descriptor in bytes
pub(crate) const DESCRIPTOR_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[repr(C)]
pub(crate) struct RawDescriptor {
    pub words: [u32; 4],
}

fn config() -> impl bincode::config::Config {
    bincode::config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

impl RawDescriptor {
    pub fn parse(data: &[u8]) -> Result<Self> {
        bincode::decode_from_slice(data, config())
            .map(|r| r.0)
            .map_err(|e| e.into())
    }

    pub fn to_bytes(&self) -> Result<[u8; DESCRIPTOR_SIZE]> {
        let mut bytes = [0; DESCRIPTOR_SIZE];
        bincode::encode_into_slice(self, &mut bytes, config())?;
        Ok(bytes)
    }
}
