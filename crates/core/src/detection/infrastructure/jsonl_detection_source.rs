use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::detection::domain::detection_source::{
    DetectionFrame, DetectionSource, DetectionSourceError,
};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::detection::{Detection, DetectionClass};

#[derive(Deserialize)]
struct FrameRecord {
    timestamp: f64,
    #[serde(default)]
    image: Option<PathBuf>,
    #[serde(default)]
    detections: Vec<DetectionRecord>,
}

#[derive(Deserialize)]
struct DetectionRecord {
    class_id: u32,
    #[serde(rename = "box")]
    bbox: BoundingBox,
    #[serde(default)]
    track_id: Option<u32>,
}

/// Reads detector output as JSON lines, one frame per line:
///
/// ```text
/// {"timestamp": 12.5, "image": "f/000123.jpg", "detections": [{"class_id": 0, "box": [10, 20, 110, 220], "track_id": 7}]}
/// ```
///
/// Relative image paths resolve against `base_dir` when one is set.
pub struct JsonlDetectionSource<R: BufRead + Send> {
    reader: R,
    base_dir: Option<PathBuf>,
    line_number: usize,
    next_index: usize,
}

impl JsonlDetectionSource<BufReader<File>> {
    /// Opens a feed file; its directory becomes the image base directory.
    pub fn open(path: &Path) -> Result<Self, DetectionSourceError> {
        let file = File::open(path)?;
        let base_dir = path.parent().map(Path::to_path_buf);
        Ok(Self::new(BufReader::new(file)).with_base_dir(base_dir))
    }
}

impl<R: BufRead + Send> JsonlDetectionSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            base_dir: None,
            line_number: 0,
            next_index: 0,
        }
    }

    pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        self.base_dir = base_dir;
        self
    }

    fn parse(&self, line: &str) -> Result<DetectionFrame, DetectionSourceError> {
        let record: FrameRecord =
            serde_json::from_str(line).map_err(|source| DetectionSourceError::Malformed {
                line: self.line_number,
                source,
            })?;

        let timestamp = Duration::try_from_secs_f64(record.timestamp).map_err(|_| {
            DetectionSourceError::InvalidTimestamp {
                line: self.line_number,
                value: record.timestamp,
            }
        })?;

        let detections = record
            .detections
            .into_iter()
            .filter_map(|d| match DetectionClass::from_class_id(d.class_id) {
                Some(class) => Some(Detection {
                    class,
                    bbox: d.bbox,
                    track_id: d.track_id,
                }),
                None => {
                    log::debug!(
                        "Ignoring unknown class id {} on line {}",
                        d.class_id,
                        self.line_number
                    );
                    None
                }
            })
            .collect();

        let image = record.image.map(|p| match &self.base_dir {
            Some(dir) if p.is_relative() => dir.join(p),
            _ => p,
        });

        Ok(DetectionFrame {
            index: self.next_index,
            timestamp,
            detections,
            image,
        })
    }
}

impl<R: BufRead + Send> DetectionSource for JsonlDetectionSource<R> {
    fn next_frame(&mut self) -> Result<Option<DetectionFrame>, DetectionSourceError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        let frame = self.parse(line.trim())?;
        self.next_index += 1;
        Ok(Some(frame))
    }
}
