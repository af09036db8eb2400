//! Building blocks of the SRAM image the GDP boots from.

use crate::err::Error;

pub mod descriptor;
pub mod err;
pub mod fields;
pub mod image;
pub(crate) mod ll;
pub mod segment;

pub type Result<T> = core::result::Result<T, Error>;

pub use descriptor::StorageDescriptor;
pub use image::{IMAGE_SIZE, MemoryImage};
pub use segment::{AccessSegment, DataSegment, ProcessorClass, SegmentType};
