//! Storage descriptors: the 16-byte object table entries describing a segment.
//!
//! ```text
//! word0  31..8 address  7 accessed  6 altered  5 I/O lock  4 storage associated
//!        3 base type  2 valid  1..0 descriptor type (0b11)
//! word1  length - 1
//! word2  31..16 level  15..8 reclamation  7..5 processor class  4..0 type
//! word3  0 if the segment holds only zeroes
//! ```

use crate::{
    MemoryImage, ProcessorClass, Result, SegmentType,
    err::Error,
    fields::Field,
    ll::{DESCRIPTOR_SIZE, RawDescriptor},
};

/// Highest segment address, it has 24 bits
pub const MAX_ADDRESS: u32 = (1 << 24) - 1;
/// Longest segment, the length is stored minus one in 32 bits
pub const MAX_LENGTH: u64 = 1 << 32;

/// Descriptor type of storage descriptors
const STORAGE_DESCRIPTOR_TAG: u32 = 0b11;

/// First word: kind, state flags and segment address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word0 {
    pub tag: u32,
    pub valid: bool,
    /// Base type, set for access segments
    pub access: bool,
    pub storage_associated: bool,
    /// Locked by an I/O processor
    pub io_lock: bool,
    /// Segment was written to
    pub altered: bool,
    /// Segment was touched
    pub accessed: bool,
    pub address: u32,
}

impl Word0 {
    pub const TAG: Field = Field::new(0, 2);
    pub const VALID: Field = Field::new(2, 1);
    pub const BASE_TYPE: Field = Field::new(3, 1);
    pub const STORAGE_ASSOCIATED: Field = Field::new(4, 1);
    pub const IO_LOCK: Field = Field::new(5, 1);
    pub const ALTERED: Field = Field::new(6, 1);
    pub const ACCESSED: Field = Field::new(7, 1);
    pub const ADDRESS: Field = Field::new(8, 24);

    pub fn pack(&self) -> u32 {
        Self::TAG.pack(self.tag)
            | Self::VALID.pack_bool(self.valid)
            | Self::BASE_TYPE.pack_bool(self.access)
            | Self::STORAGE_ASSOCIATED.pack_bool(self.storage_associated)
            | Self::IO_LOCK.pack_bool(self.io_lock)
            | Self::ALTERED.pack_bool(self.altered)
            | Self::ACCESSED.pack_bool(self.accessed)
            | Self::ADDRESS.pack(self.address)
    }

    pub fn unpack(word: u32) -> Self {
        Self {
            tag: Self::TAG.unpack(word),
            valid: Self::VALID.unpack_bool(word),
            access: Self::BASE_TYPE.unpack_bool(word),
            storage_associated: Self::STORAGE_ASSOCIATED.unpack_bool(word),
            io_lock: Self::IO_LOCK.unpack_bool(word),
            altered: Self::ALTERED.unpack_bool(word),
            accessed: Self::ACCESSED.unpack_bool(word),
            address: Self::ADDRESS.unpack(word),
        }
    }
}

/// Third word: type, processor affinity and allocation info
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word2 {
    pub segment_type: u8,
    pub processor_class: u8,
    /// Set if no access descriptor references the segment anymore
    pub reclamation: u8,
    /// 0 for globally allocated segments
    pub level: u16,
}

impl Word2 {
    pub const TYPE: Field = Field::new(0, 5);
    pub const PROCESSOR_CLASS: Field = Field::new(5, 3);
    pub const RECLAMATION: Field = Field::new(8, 8);
    pub const LEVEL: Field = Field::new(16, 16);

    pub fn pack(&self) -> u32 {
        Self::TYPE.pack(self.segment_type.into())
            | Self::PROCESSOR_CLASS.pack(self.processor_class.into())
            | Self::RECLAMATION.pack(self.reclamation.into())
            | Self::LEVEL.pack(self.level.into())
    }

    pub fn unpack(word: u32) -> Self {
        // Each field is at most as wide as its type
        Self {
            segment_type: Self::TYPE.unpack(word) as u8,
            processor_class: Self::PROCESSOR_CLASS.unpack(word) as u8,
            reclamation: Self::RECLAMATION.unpack(word) as u8,
            level: Self::LEVEL.unpack(word) as u16,
        }
    }
}

/// The four words of a storage descriptor, field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorWords {
    pub word0: Word0,
    pub length_minus_one: u32,
    pub word2: Word2,
    /// Segment doesn't consist entirely of zeroes
    pub content_dirty: bool,
}

impl DescriptorWords {
    pub fn to_words(&self) -> [u32; 4] {
        [
            self.word0.pack(),
            self.length_minus_one,
            self.word2.pack(),
            self.content_dirty as u32,
        ]
    }

    pub fn from_words(words: [u32; 4]) -> Self {
        Self {
            word0: Word0::unpack(words[0]),
            length_minus_one: words[1],
            word2: Word2::unpack(words[2]),
            content_dirty: words[3] & 1 != 0,
        }
    }
}

/// A freshly allocated segment to describe in the object table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageDescriptor {
    segment: SegmentType,
    address: u32,
    length: u64,
}

impl StorageDescriptor {
    /// `address` must fit 24 bits and `length` must be in `1..=2^32`.
    pub fn try_new(segment: impl Into<SegmentType>, address: u32, length: u64) -> Result<Self> {
        if address > MAX_ADDRESS {
            return Err(Error::AddressTooWide(address));
        }
        if length == 0 || length > MAX_LENGTH {
            return Err(Error::InvalidLength(length));
        }
        Ok(Self {
            segment: segment.into(),
            address,
            length,
        })
    }

    pub fn segment(&self) -> SegmentType {
        self.segment
    }

    pub fn is_access(&self) -> bool {
        self.segment.is_access()
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn processor_class(&self) -> ProcessorClass {
        self.segment.processor_class()
    }

    /// Descriptor of a segment nobody referenced or touched yet.
    pub fn encode(&self) -> DescriptorWords {
        DescriptorWords {
            word0: Word0 {
                tag: STORAGE_DESCRIPTOR_TAG,
                valid: true,
                access: self.is_access(),
                storage_associated: true,
                io_lock: false,
                altered: false,
                accessed: false,
                address: self.address,
            },
            length_minus_one: (self.length - 1) as u32,
            word2: Word2 {
                segment_type: self.segment.code(),
                processor_class: self.processor_class() as u8,
                reclamation: 0,
                level: 0,
            },
            content_dirty: true,
        }
    }

    /// Recover the descriptor fields from its words.
    pub fn decode(words: &DescriptorWords) -> Result<Self> {
        let word0 = &words.word0;
        if word0.tag != STORAGE_DESCRIPTOR_TAG || !word0.valid || !word0.storage_associated {
            return Err(Error::NotStorageDescriptor(word0.pack()));
        }

        let code = words.word2.segment_type;
        let segment = SegmentType::from_code(word0.access, code).ok_or(
            Error::UnknownSegmentType {
                access: word0.access,
                code,
            },
        )?;
        ProcessorClass::from_repr(words.word2.processor_class)
            .ok_or(Error::UnknownProcessorClass(words.word2.processor_class))?;

        Self::try_new(segment, word0.address, u64::from(words.length_minus_one) + 1)
    }

    /// Write the descriptor to `image` at `descriptor_addr`.
    pub fn write(&self, image: &mut MemoryImage, descriptor_addr: usize) -> Result<()> {
        image.write_words(descriptor_addr, &self.encode().to_words())
    }

    /// Read the descriptor at `descriptor_addr` of a raw image.
    pub fn read(image: &[u8], descriptor_addr: usize) -> Result<Self> {
        let data = image
            .get(descriptor_addr..)
            .filter(|d| d.len() >= DESCRIPTOR_SIZE)
            .ok_or(Error::OutOfRange {
                addr: descriptor_addr,
                capacity: image.len(),
            })?;
        let raw = RawDescriptor::parse(data)?;
        Self::decode(&DescriptorWords::from_words(raw.words))
    }

    /// The 16 bytes of the descriptor as they lie in memory.
    pub fn to_bytes(&self) -> Result<[u8; DESCRIPTOR_SIZE]> {
        RawDescriptor {
            words: self.encode().to_words(),
        }
        .to_bytes()
    }
}
