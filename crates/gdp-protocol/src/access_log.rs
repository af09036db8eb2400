//! Access log entries read back from the SBC.
//!
//! The SBC snoops the GDP bus and records every access as a spec byte plus
//! the 16-bit address. Spec bytes that can't describe a bus access (Other
//! space without the "other" modifier) are injected by the FPGA logic itself
//! to mark events such as GDP initialization.

use core::fmt::Display;

use derive_ctor::ctor;
use derive_more::IsVariant;

/// Bus address space of an access
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Space {
    Memory,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Operation {
    Read,
    Write,
}

/// Access length in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum AccessLength {
    Bytes(u8),
    /// Length codes 6 and 7 are not defined
    Invalid,
}

/// Segment the access targets, from the access modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Segment {
    Instruction,
    Stack,
    ContextControl,
    Other,
    InterconnectRegister,
}

/// Log entries generated by the FPGA rather than the GDP
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum PseudoEvent {
    Initialization,
    Fatal,
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ctor)]
pub struct Access {
    pub operation: Operation,
    pub rmw: bool,
    pub length: AccessLength,
    pub segment: Segment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Interpretation {
    MemoryAccess(Access),
    OtherSpaceAccess(Access),
    FpgaPseudoEvent(PseudoEvent),
}

/// Decoded access log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry {
    pub log_addr: u16,
    pub spec: u8,
    pub access_addr: u16,
    pub interpretation: Interpretation,
}

const SPACE_BIT: u8 = 7;
const OPERATION_BIT: u8 = 6;
const RMW_BIT: u8 = 5;
const LENGTH_SHIFT: u8 = 2;
const LENGTH_MASK: u8 = 0b111;
const MODIFIER_MASK: u8 = 0b11;

/// Modifier value that is valid in the Other space.
const MODIFIER_OTHER: u8 = 3;

const SPEC_INITIALIZATION: u8 = 0xf4;
const SPEC_FATAL: u8 = 0xf0;

impl PseudoEvent {
    fn from_spec(spec: u8) -> Self {
        match spec {
            SPEC_INITIALIZATION => Self::Initialization,
            SPEC_FATAL => Self::Fatal,
            other => Self::Unknown(other),
        }
    }
}

impl AccessLength {
    fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Bytes(1),
            1 => Self::Bytes(2),
            2 => Self::Bytes(4),
            3 => Self::Bytes(6),
            4 => Self::Bytes(8),
            5 => Self::Bytes(10),
            _ => Self::Invalid,
        }
    }
}

impl Segment {
    fn from_modifier(space: Space, modifier: u8) -> Self {
        match (space, modifier) {
            (Space::Other, _) => Self::InterconnectRegister,
            (Space::Memory, 0) => Self::Instruction,
            (Space::Memory, 1) => Self::Stack,
            (Space::Memory, 2) => Self::ContextControl,
            (Space::Memory, _) => Self::Other,
        }
    }
}

impl LogEntry {
    /// Decode the entry at `log_addr`. Never fails, malformed fields decode
    /// to their `Invalid`/`Unknown` variants.
    pub fn decode(log_addr: u16, spec: u8, access_addr: u16) -> Self {
        let bit = |n: u8| (spec >> n) & 1 != 0;

        let space = if bit(SPACE_BIT) { Space::Other } else { Space::Memory };
        let modifier = spec & MODIFIER_MASK;

        let interpretation = if space.is_other() && modifier != MODIFIER_OTHER {
            Interpretation::FpgaPseudoEvent(PseudoEvent::from_spec(spec))
        } else {
            let access = Access::new(
                if bit(OPERATION_BIT) {
                    Operation::Write
                } else {
                    Operation::Read
                },
                bit(RMW_BIT),
                AccessLength::from_code((spec >> LENGTH_SHIFT) & LENGTH_MASK),
                Segment::from_modifier(space, modifier),
            );
            match space {
                Space::Memory => Interpretation::MemoryAccess(access),
                Space::Other => Interpretation::OtherSpaceAccess(access),
            }
        };

        Self {
            log_addr,
            spec,
            access_addr,
            interpretation,
        }
    }

    /// The GDP raised a fatal signal, polling should stop here.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.interpretation,
            Interpretation::FpgaPseudoEvent(PseudoEvent::Fatal)
        )
    }

    pub fn space(&self) -> Option<Space> {
        match self.interpretation {
            Interpretation::MemoryAccess(_) => Some(Space::Memory),
            Interpretation::OtherSpaceAccess(_) => Some(Space::Other),
            Interpretation::FpgaPseudoEvent(_) => None,
        }
    }

    pub fn access(&self) -> Option<&Access> {
        match &self.interpretation {
            Interpretation::MemoryAccess(a) | Interpretation::OtherSpaceAccess(a) => Some(a),
            Interpretation::FpgaPseudoEvent(_) => None,
        }
    }
}

impl Display for Space {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Memory => write!(f, "Memory"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

impl Display for AccessLength {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bytes(n) => write!(f, "{n}"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Instruction => write!(f, "instruction segment"),
            Self::Stack => write!(f, "stack segment"),
            Self::ContextControl => write!(f, "context control segment"),
            Self::Other => write!(f, "other"),
            Self::InterconnectRegister => write!(f, "interconnect register"),
        }
    }
}

impl Display for PseudoEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Initialization => write!(f, "GDP initialization"),
            Self::Fatal => write!(f, "Fatal signal is raised by GDP"),
            Self::Unknown(_) => write!(f, "Unknown FPGA log entry"),
        }
    }
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:04x}: ", self.log_addr)?;
        let (space, access) = match &self.interpretation {
            Interpretation::FpgaPseudoEvent(event) => return write!(f, "{event}"),
            Interpretation::MemoryAccess(access) => (Space::Memory, access),
            Interpretation::OtherSpaceAccess(access) => (Space::Other, access),
        };

        write!(
            f,
            "spec=0x{:02x} ({} {} bytes in '{space}' space with {} access{}) addr=0x{:04x}",
            self.spec,
            access.operation,
            access.length,
            access.segment,
            if access.rmw { ", RMW" } else { "" },
            self.access_addr
        )
    }
}
