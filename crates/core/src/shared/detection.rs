use crate::shared::bounding_box::BoundingBox;

/// Object classes emitted by the PPE detection model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetectionClass {
    Person,
    Glasses,
    Helmet,
    Phone,
}

impl DetectionClass {
    /// Maps the model's numeric class id. Unknown ids yield `None`.
    pub fn from_class_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::Person),
            1 => Some(Self::Glasses),
            2 => Some(Self::Helmet),
            3 => Some(Self::Phone),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Glasses => "glasses",
            Self::Helmet => "helmet",
            Self::Phone => "phone",
        }
    }
}

impl std::fmt::Display for DetectionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One detected object in a frame.
///
/// `track_id` is only assigned by the external tracker to persons it follows
/// across frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub class: DetectionClass,
    pub bbox: BoundingBox,
    pub track_id: Option<u32>,
}

impl Detection {
    pub fn person(bbox: BoundingBox, track_id: Option<u32>) -> Self {
        Self {
            class: DetectionClass::Person,
            bbox,
            track_id,
        }
    }

    pub fn helmet(bbox: BoundingBox) -> Self {
        Self {
            class: DetectionClass::Helmet,
            bbox,
            track_id: None,
        }
    }

    /// Helmet boxes of a frame, in input order.
    pub fn helmet_boxes(detections: &[Detection]) -> Vec<BoundingBox> {
        detections
            .iter()
            .filter(|d| d.class == DetectionClass::Helmet)
            .map(|d| d.bbox)
            .collect()
    }
}
