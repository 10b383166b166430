// pixeltune/src/processors/metadata.rs
use exif::{Exif, In, Reader, Tag};
use image::DynamicImage;
use std::io::Cursor;

/// EXIF orientation 1: stored upright.
pub const ORIENTATION_NORMAL: u32 = 1;

#[derive(Clone, Default)]
pub struct MetadataProcessor;

impl MetadataProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn read_metadata(&self, data: &[u8]) -> Option<Exif> {
        match Reader::new().read_from_container(&mut Cursor::new(data)) {
            Ok(exif) => Some(exif),
            Err(exif::Error::NotFound(_)) => None,
            Err(e) => {
                log::debug!("Ignoring unreadable EXIF block: {}", e);
                None
            }
        }
    }

    pub fn has_metadata(&self, data: &[u8]) -> bool {
        self.read_metadata(data).is_some()
    }

    /// Orientation tag of the primary image, 1 when absent or out of range.
    pub fn read_orientation(&self, data: &[u8]) -> u32 {
        self.read_metadata(data)
            .and_then(|exif| {
                exif.get_field(Tag::Orientation, In::PRIMARY)
                    .and_then(|field| field.value.get_uint(0))
            })
            .filter(|value| (1..=8).contains(value))
            .unwrap_or(ORIENTATION_NORMAL)
    }

    /// Rotates/flips `image` so it displays upright. Orientations 5-8 swap
    /// width and height.
    pub fn apply_orientation(&self, image: DynamicImage, orientation: u32) -> DynamicImage {
        if orientation != ORIENTATION_NORMAL {
            log::debug!("Applying EXIF orientation {}", orientation);
        }

        match orientation {
            2 => image.fliph(),
            3 => image.rotate180(),
            4 => image.flipv(),
            5 => image.rotate90().fliph(),
            6 => image.rotate90(),
            7 => image.rotate270().fliph(),
            8 => image.rotate270(),
            _ => image,
        }
    }
}
