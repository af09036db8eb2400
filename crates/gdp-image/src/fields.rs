//! Bit fields of the 32-bit words the GDP keeps its system objects in.

/// `width` bits starting at bit `offset`, bit 0 being the LSB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: u32,
    pub width: u32,
}

impl Field {
    pub const fn new(offset: u32, width: u32) -> Self {
        assert!(width > 0 && offset + width <= u32::BITS);
        Self { offset, width }
    }

    pub const fn mask(&self) -> u32 {
        u32::MAX >> (u32::BITS - self.width)
    }

    /// Place `value` into the field, bits above the width are dropped.
    pub const fn pack(&self, value: u32) -> u32 {
        (value & self.mask()) << self.offset
    }

    pub const fn unpack(&self, word: u32) -> u32 {
        (word >> self.offset) & self.mask()
    }

    pub const fn pack_bool(&self, value: bool) -> u32 {
        self.pack(value as u32)
    }

    pub const fn unpack_bool(&self, word: u32) -> bool {
        self.unpack(word) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(Field::new(0, 1).mask(), 0x1);
        assert_eq!(Field::new(5, 3).mask(), 0x7);
        assert_eq!(Field::new(8, 24).mask(), 0xff_ffff);
        assert_eq!(Field::new(0, 32).mask(), u32::MAX);
    }

    #[test]
    fn pack_unpack() {
        let field = Field::new(8, 24);
        assert_eq!(field.pack(0x100), 0x1_0000);
        assert_eq!(field.unpack(0x1_0017), 0x100);
        assert_eq!(field.pack(0x1ff_ffff), 0xffff_ff00);
    }

    #[test]
    fn bools() {
        let field = Field::new(3, 1);
        assert_eq!(field.pack_bool(true), 0b1000);
        assert!(field.unpack_bool(0b1000));
        assert!(!field.unpack_bool(0b0111));
    }
}
