use gdp_image::{DataSegment, MemoryImage, StorageDescriptor};

use crate::Result;

/// Object table descriptor slot
const OBJECT_TABLE_DESCRIPTOR: usize = 0x18;
const OBJECT_TABLE_ADDR: u32 = 0x100;
const OBJECT_TABLE_LEN: u64 = 256;

/// Minimal SRAM image: the object table describing itself.
pub fn bootstrap_image() -> Result<Vec<u8>> {
    let mut image = MemoryImage::new();

    StorageDescriptor::try_new(DataSegment::ObjectTable, OBJECT_TABLE_ADDR, OBJECT_TABLE_LEN)?
        .write(&mut image, OBJECT_TABLE_DESCRIPTOR)?;

    let mut image = image.finalize();
    /* Bulk write transfers 16-bit words */
    if image.len() % 2 != 0 {
        image.push(0);
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use gdp_image::SegmentType;

    use super::*;

    #[test]
    fn object_table_descriptor() {
        let image = bootstrap_image().unwrap();
        assert_eq!(image.len(), 0x28);

        let descriptor = StorageDescriptor::read(&image, OBJECT_TABLE_DESCRIPTOR).unwrap();
        assert_eq!(descriptor.segment(), SegmentType::Data(DataSegment::ObjectTable));
        assert_eq!(descriptor.address(), 0x100);
        assert_eq!(descriptor.length(), 256);
    }

    #[test]
    fn fits_bulk_write() {
        let image = bootstrap_image().unwrap();
        assert!(gdp_protocol::bulk_write_payload(&image).is_ok());
    }
}
