use crate::{Result, err::Error};

/// SRAM size of the SBC
pub const IMAGE_SIZE: usize = 64 * 1024;

/// SRAM contents under construction.
///
/// Only the bytes up to the highest one written are uploaded, so the image
/// keeps track of that offset.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    data: Box<[u8]>,
    max_written: Option<usize>,
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryImage {
    pub fn new() -> Self {
        Self {
            data: vec![0; IMAGE_SIZE].into_boxed_slice(),
            max_written: None,
        }
    }

    fn range(&self, addr: usize) -> Result<core::ops::Range<usize>> {
        self.span(addr, 4)
    }

    fn span(&self, addr: usize, len: usize) -> Result<core::ops::Range<usize>> {
        match addr.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(addr..end),
            _ => Err(Error::OutOfRange {
                addr,
                capacity: self.data.len(),
            }),
        }
    }

    /// Write `value` at `addr`, least significant byte first.
    pub fn write_word(&mut self, addr: usize, value: u32) -> Result<()> {
        let range = self.range(addr)?;
        self.data[range].copy_from_slice(&value.to_le_bytes());

        let last = addr + 3;
        self.max_written = Some(self.max_written.map_or(last, |max| max.max(last)));
        Ok(())
    }

    /// Write consecutive words starting at `addr`.
    ///
    /// Nothing is written unless all of them fit.
    pub fn write_words(&mut self, addr: usize, values: &[u32]) -> Result<()> {
        let len = values.len().checked_mul(4).ok_or(Error::OutOfRange {
            addr,
            capacity: self.data.len(),
        })?;
        self.span(addr, len)?;

        for (i, value) in values.iter().enumerate() {
            self.write_word(addr + i * 4, *value)?;
        }
        Ok(())
    }

    pub fn read_word(&self, addr: usize) -> Result<u32> {
        let range = self.range(addr)?;
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.data[range]);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Offset of the highest byte written so far.
    pub fn max_written(&self) -> Option<usize> {
        self.max_written
    }

    /// The whole SRAM, written or not.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes `0..=max_written`, empty if nothing was written.
    pub fn as_trimmed(&self) -> &[u8] {
        match self.max_written {
            Some(max) => &self.data[..=max],
            None => &[],
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        self.as_trimmed().to_vec()
    }
}
