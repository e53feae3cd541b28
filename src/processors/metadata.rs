// image-compressor/src/processors/metadata.rs
use exif::{In, Reader, Tag};
use image::DynamicImage;
use std::io::Cursor;

/// Reads the EXIF orientation of encoded source bytes and bakes it into the
/// decoded raster, so that re-encoding (which drops EXIF) keeps the picture
/// upright.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataProcessor;

impl MetadataProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn read_orientation(&self, data: &[u8]) -> Option<u32> {
        let mut cursor = Cursor::new(data);

        match Reader::new().read_from_container(&mut cursor) {
            Ok(exif) => {
                let orientation = exif
                    .get_field(Tag::Orientation, In::PRIMARY)
                    .and_then(|field| field.value.get_uint(0));
                log::debug!("EXIF orientation: {:?}", orientation);
                orientation
            }
            Err(exif::Error::NotFound(_)) => None,
            Err(e) => {
                log::debug!("Ignoring unreadable EXIF block: {}", e);
                None
            }
        }
    }

    pub fn apply_orientation(&self, image: DynamicImage, orientation: u32) -> DynamicImage {
        match orientation {
            2 => image.fliph(),
            3 => image.rotate180(),
            4 => image.flipv(),
            5 => image.rotate90().fliph(),
            6 => image.rotate90(),
            7 => image.rotate270().fliph(),
            8 => image.rotate270(),
            1 => image,
            other => {
                log::warn!("Unknown EXIF orientation {}, leaving image as is", other);
                image
            }
        }
    }

    /// Convenience for the decode path: read and apply in one step.
    pub fn normalize(&self, image: DynamicImage, data: &[u8]) -> DynamicImage {
        match self.read_orientation(data) {
            Some(orientation) => self.apply_orientation(image, orientation),
            None => image,
        }
    }
}
