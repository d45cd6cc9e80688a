use ab_glyph::{FontVec, PxScale};
use image::{ImageBuffer, Rgb as RgbPixel};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::compliance::domain::compliance_tracker::{PersonAssessment, PersonStatus};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

pub type Rgb = [u8; 3];

pub const COMPLIANT_COLOR: Rgb = [0, 255, 0];
pub const NON_COMPLIANT_COLOR: Rgb = [255, 0, 0];
pub const HELMET_COLOR: Rgb = [0, 255, 255];

/// Outline thickness in pixels.
pub const LINE_WIDTH: i32 = 2;

/// Label glyph height in pixels.
pub const LABEL_SCALE: f32 = 18.0;

/// Caption drawn above a person box.
///
/// Compliant persons read `ID 3 - helmet`. Non-compliant ones show how long
/// they have been without a helmet and, while still inside the grace
/// period, how long until the alert fires.
pub fn person_label(person: &PersonAssessment) -> String {
    match person.status {
        PersonStatus::Compliant => format!("ID {} - helmet", person.track_id),
        PersonStatus::NonCompliant { elapsed, alert_in } if alert_in.is_zero() => {
            format!("ID {} - NO HELMET {}s", person.track_id, elapsed.as_secs())
        }
        PersonStatus::NonCompliant { elapsed, alert_in } => format!(
            "ID {} - no helmet {:.1}s (alert in {:.1}s)",
            person.track_id,
            elapsed.as_secs_f64(),
            alert_in.as_secs_f64()
        ),
    }
}

/// Draws compliance overlays onto alert snapshots: persons in green or red
/// by status, helmets in cyan.
///
/// Person labels need a font; without one only the outlines are drawn.
pub struct FrameAnnotator {
    line_width: i32,
    font: Option<FontVec>,
}

impl Default for FrameAnnotator {
    fn default() -> Self {
        Self::new(LINE_WIDTH)
    }
}

impl FrameAnnotator {
    pub fn new(line_width: i32) -> Self {
        Self {
            line_width: line_width.max(1),
            font: None,
        }
    }

    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    pub fn annotate(&self, frame: &mut Frame, persons: &[PersonAssessment], helmets: &[BoundingBox]) {
        for person in persons {
            self.draw_box(frame, &person.bbox, status_color(person.status));
        }
        for helmet in helmets {
            self.draw_box(frame, helmet, HELMET_COLOR);
        }
        if let Some(font) = &self.font {
            for person in persons {
                self.draw_label(frame, font, person);
            }
        }
    }

    /// Draws an outline inset from the box edges, clipped to the frame.
    pub fn draw_box(&self, frame: &mut Frame, bbox: &BoundingBox, color: Rgb) {
        let Some(b) = bbox.clamp_to(frame.width(), frame.height()) else {
            return;
        };
        let mut pixels = frame.as_ndarray_mut();
        for y in b.y1..=b.y2 {
            for x in b.x1..=b.x2 {
                let on_edge = x - b.x1 < self.line_width
                    || b.x2 - x < self.line_width
                    || y - b.y1 < self.line_width
                    || b.y2 - y < self.line_width;
                if on_edge {
                    for (c, value) in color.iter().enumerate() {
                        pixels[[y as usize, x as usize, c]] = *value;
                    }
                }
            }
        }
    }

    /// Places the label just above the box, or inside its top edge when the
    /// box touches the top of the frame.
    fn draw_label(&self, frame: &mut Frame, font: &FontVec, person: &PersonAssessment) {
        let Some(b) = person.bbox.clamp_to(frame.width(), frame.height()) else {
            return;
        };
        let text = person_label(person);
        let scale = PxScale::from(LABEL_SCALE);
        let (_, text_height) = text_size(scale, font, &text);
        let above = b.y1 - text_height as i32 - 2;
        let y = if above >= 0 { above } else { b.y1 + self.line_width };

        let (width, height) = (frame.width(), frame.height());
        let buffer = frame.data_mut();
        let Some(mut canvas) = ImageBuffer::<RgbPixel<u8>, &mut [u8]>::from_raw(width, height, buffer)
        else {
            return;
        };
        let color = RgbPixel(status_color(person.status));
        draw_text_mut(&mut canvas, color, b.x1, y, scale, font, &text);
    }
}

fn status_color(status: PersonStatus) -> Rgb {
    match status {
        PersonStatus::Compliant => COMPLIANT_COLOR,
        PersonStatus::NonCompliant { .. } => NON_COMPLIANT_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn blank(width: u32, height: u32) -> Frame {
        Frame::new(vec![0u8; (width * height * 3) as usize], width, height)
    }

    fn pixel(frame: &Frame, x: usize, y: usize) -> Rgb {
        let arr = frame.as_ndarray();
        [arr[[y, x, 0]], arr[[y, x, 1]], arr[[y, x, 2]]]
    }

    #[test]
    fn test_outline_leaves_interior_untouched() {
        let mut frame = blank(20, 20);
        FrameAnnotator::default().draw_box(&mut frame, &BoundingBox::new(2, 2, 12, 12), HELMET_COLOR);

        assert_eq!(pixel(&frame, 2, 2), HELMET_COLOR);
        assert_eq!(pixel(&frame, 3, 7), HELMET_COLOR);
        assert_eq!(pixel(&frame, 12, 12), HELMET_COLOR);
        assert_eq!(pixel(&frame, 7, 7), [0, 0, 0]);
        assert_eq!(pixel(&frame, 4, 7), [0, 0, 0]);
        assert_eq!(pixel(&frame, 15, 15), [0, 0, 0]);
    }

    #[test]
    fn test_box_outside_frame_is_skipped() {
        let mut frame = blank(10, 10);
        FrameAnnotator::default().draw_box(&mut frame, &BoundingBox::new(50, 50, 60, 60), HELMET_COLOR);
        assert!(frame.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_box_crossing_edge_is_clipped() {
        let mut frame = blank(10, 10);
        FrameAnnotator::default().draw_box(&mut frame, &BoundingBox::new(-5, -5, 4, 4), HELMET_COLOR);
        assert_eq!(pixel(&frame, 0, 0), HELMET_COLOR);
        assert_eq!(pixel(&frame, 4, 2), HELMET_COLOR);
    }

    fn assessment(track_id: u32, status: PersonStatus) -> PersonAssessment {
        PersonAssessment {
            track_id,
            bbox: BoundingBox::new(0, 0, 9, 9),
            status,
        }
    }

    #[test]
    fn test_label_for_compliant_person() {
        assert_eq!(person_label(&assessment(3, PersonStatus::Compliant)), "ID 3 - helmet");
    }

    #[test]
    fn test_label_counts_down_during_grace_period() {
        let person = assessment(
            5,
            PersonStatus::NonCompliant {
                elapsed: Duration::from_millis(300),
                alert_in: Duration::from_millis(700),
            },
        );
        assert_eq!(person_label(&person), "ID 5 - no helmet 0.3s (alert in 0.7s)");
    }

    #[test]
    fn test_label_after_grace_period_shows_whole_seconds() {
        let person = assessment(
            7,
            PersonStatus::NonCompliant {
                elapsed: Duration::from_millis(61_900),
                alert_in: Duration::ZERO,
            },
        );
        assert_eq!(person_label(&person), "ID 7 - NO HELMET 61s");
    }

    #[test]
    fn test_without_font_only_outlines_are_drawn() {
        let annotator = FrameAnnotator::default();
        let mut frame = blank(40, 40);
        let person = PersonAssessment {
            track_id: 1,
            bbox: BoundingBox::new(10, 20, 30, 39),
            status: PersonStatus::Compliant,
        };
        annotator.annotate(&mut frame, &[person], &[]);

        // Nothing above the box: no label without a font.
        for y in 0..20 {
            for x in 0..40 {
                assert_eq!(pixel(&frame, x, y), [0, 0, 0]);
            }
        }
        assert_eq!(pixel(&frame, 10, 20), COMPLIANT_COLOR);
    }

    #[test]
    fn test_colors_follow_status() {
        let mut frame = blank(40, 20);
        let persons = [
            PersonAssessment {
                track_id: 1,
                bbox: BoundingBox::new(0, 0, 9, 9),
                status: PersonStatus::Compliant,
            },
            PersonAssessment {
                track_id: 2,
                bbox: BoundingBox::new(20, 0, 29, 9),
                status: PersonStatus::NonCompliant {
                    elapsed: Duration::from_secs(3),
                    alert_in: Duration::ZERO,
                },
            },
        ];
        let helmets = [BoundingBox::new(30, 10, 39, 19)];

        FrameAnnotator::default().annotate(&mut frame, &persons, &helmets);

        assert_eq!(pixel(&frame, 0, 0), COMPLIANT_COLOR);
        assert_eq!(pixel(&frame, 20, 0), NON_COMPLIANT_COLOR);
        assert_eq!(pixel(&frame, 39, 19), HELMET_COLOR);
    }
}
