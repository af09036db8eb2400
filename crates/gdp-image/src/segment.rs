use derive_more::IsVariant;
use strum::{Display, EnumIter, FromRepr};

/// Types of segments holding access descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum AccessSegment {
    Generic = 0b00000,
    Domain = 0b00010,
    Context = 0b00100,
    Process = 0b00101,
    Processor = 0b00110,
    Port = 0b00111,
    Carrier = 0b01000,
    StorageResource = 0b01001,
    TypeDefinition = 0b01010,
}

/// Types of segments holding plain data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum DataSegment {
    Generic = 0b00000,
    OperandStack = 0b00001,
    ObjectTable = 0b00010,
    Instruction = 0b00011,
    Context = 0b00100,
    Process = 0b00101,
    Processor = 0b00110,
    Port = 0b00111,
    Carrier = 0b01000,
    StorageResource = 0b01001,
    Communication = 0b01010,
    DescriptorControl = 0b01011,
    RefinementControl = 0b01100,
}

/// Processors allowed to use a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr, IsVariant)]
#[repr(u8)]
pub enum ProcessorClass {
    All = 0b000,
    Gdp = 0b001,
}

/// Segment type, the base type (access or data) selects the code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum SegmentType {
    Access(AccessSegment),
    Data(DataSegment),
}

impl SegmentType {
    pub fn from_code(is_access: bool, code: u8) -> Option<Self> {
        if is_access {
            AccessSegment::from_repr(code).map(Self::Access)
        } else {
            DataSegment::from_repr(code).map(Self::Data)
        }
    }

    /// 5-bit type code
    pub fn code(&self) -> u8 {
        match self {
            Self::Access(t) => *t as u8,
            Self::Data(t) => *t as u8,
        }
    }

    /// Segments of the types only the GDP interprets are bound to the GDP class.
    pub fn processor_class(&self) -> ProcessorClass {
        use AccessSegment as A;
        use DataSegment as D;

        match self {
            Self::Access(A::Processor | A::Process | A::Context)
            | Self::Data(D::Processor | D::Process | D::Context | D::OperandStack | D::Instruction) => {
                ProcessorClass::Gdp
            }
            _ => ProcessorClass::All,
        }
    }
}

impl From<AccessSegment> for SegmentType {
    fn from(value: AccessSegment) -> Self {
        Self::Access(value)
    }
}

impl From<DataSegment> for SegmentType {
    fn from(value: DataSegment) -> Self {
        Self::Data(value)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn gdp_access_segments() {
        let gdp: Vec<_> = AccessSegment::iter()
            .filter(|t| SegmentType::Access(*t).processor_class().is_gdp())
            .collect();
        assert_eq!(
            gdp,
            [
                AccessSegment::Context,
                AccessSegment::Process,
                AccessSegment::Processor
            ]
        );
    }

    #[test]
    fn gdp_data_segments() {
        let gdp: Vec<_> = DataSegment::iter()
            .filter(|t| SegmentType::Data(*t).processor_class().is_gdp())
            .collect();
        assert_eq!(
            gdp,
            [
                DataSegment::OperandStack,
                DataSegment::Instruction,
                DataSegment::Context,
                DataSegment::Process,
                DataSegment::Processor
            ]
        );
    }

    #[test]
    fn same_code_differs_by_base_type() {
        // 0b00001 is an operand stack for data but undefined for access segments
        assert_eq!(
            SegmentType::from_code(false, 1),
            Some(SegmentType::Data(DataSegment::OperandStack))
        );
        assert_eq!(SegmentType::from_code(true, 1), None);
    }

    #[test]
    fn codes_round_trip() {
        for t in AccessSegment::iter().map(SegmentType::Access) {
            assert_eq!(SegmentType::from_code(true, t.code()), Some(t));
        }
        for t in DataSegment::iter().map(SegmentType::Data) {
            assert_eq!(SegmentType::from_code(false, t.code()), Some(t));
        }
    }
}
