use std::path::{Path, PathBuf};

use crate::compliance::domain::compliance_tracker::PersonAssessment;
use crate::compliance::domain::notification::AlertRequest;
use crate::shared::bounding_box::BoundingBox;
use crate::snapshot::domain::frame_annotator::FrameAnnotator;
use crate::snapshot::domain::image_io::{ImageReader, ImageWriter, SnapshotError};

/// Captures the frame an alert fired on: loads it, draws the overlays and
/// stores it as `<output_dir>/alert_<id>_<secs>.jpg`.
pub struct AlertSnapshot {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    annotator: FrameAnnotator,
    output_dir: PathBuf,
}

impl AlertSnapshot {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            reader,
            writer,
            annotator: FrameAnnotator::default(),
            output_dir: output_dir.into(),
        }
    }

    /// Replaces the default outline-only annotator, e.g. with one that
    /// carries a label font.
    pub fn with_annotator(mut self, annotator: FrameAnnotator) -> Self {
        self.annotator = annotator;
        self
    }

    /// Returns the path of the written snapshot.
    pub fn capture(
        &self,
        image: &Path,
        alert: &AlertRequest,
        persons: &[PersonAssessment],
        helmets: &[BoundingBox],
    ) -> Result<PathBuf, SnapshotError> {
        let mut frame = self.reader.read(image)?;
        self.annotator.annotate(&mut frame, persons, helmets);

        let path = self.output_dir.join(alert.snapshot_name());
        self.writer.write(&path, &frame)?;
        log::debug!("Saved alert snapshot {}", path.display());
        Ok(path)
    }
}
