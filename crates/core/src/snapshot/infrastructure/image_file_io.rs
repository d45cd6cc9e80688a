use std::path::Path;

use crate::shared::frame::Frame;
use crate::snapshot::domain::image_io::{ImageReader, ImageWriter, SnapshotError};

/// Reads and writes frames as image files using the `image` crate.
///
/// The output format follows the file extension.
pub struct ImageFileIo;

impl ImageFileIo {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileIo {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileIo {
    fn read(&self, path: &Path) -> Result<Frame, SnapshotError> {
        let img = image::open(path).map_err(|source| SnapshotError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Frame::from_image(img.to_rgb8()))
    }
}

impl ImageWriter for ImageFileIo {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SnapshotError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let img = frame
            .clone()
            .into_image()
            .ok_or(SnapshotError::InvalidFrame)?;
        img.save(path).map_err(|source| SnapshotError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }
}
