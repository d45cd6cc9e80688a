use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::compliance::domain::compliance_record::ComplianceRecord;
use crate::compliance::domain::helmet_association::associate_helmet;
use crate::compliance::domain::notification::{AlertRequest, Notification};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::config::{ComplianceConfig, ConfigError};
use crate::shared::constants::DEFAULT_AREA;
use crate::shared::detection::{Detection, DetectionClass};

/// Outcome for one tracked person in the most recent frame, for overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonAssessment {
    pub track_id: u32,
    pub bbox: BoundingBox,
    pub status: PersonStatus,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PersonStatus {
    Compliant,
    NonCompliant {
        elapsed: Duration,
        /// Time left before the grace period runs out; zero once it has.
        alert_in: Duration,
    },
}

/// Per-identity helmet compliance state machine.
///
/// Feed it one frame of detections at a time with non-decreasing
/// timestamps. It performs no I/O: alerts and recovery notices come back as
/// [`Notification`]s, and the caller reports successful alert delivery via
/// [`ComplianceTracker::record_alert_delivered`].
pub struct ComplianceTracker {
    config: ComplianceConfig,
    area: String,
    records: HashMap<u32, ComplianceRecord>,
    assessments: Vec<PersonAssessment>,
}

impl ComplianceTracker {
    pub fn new(config: ComplianceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            area: DEFAULT_AREA.to_string(),
            records: HashMap::new(),
            assessments: Vec::new(),
        })
    }

    /// Sets the area label carried by every alert.
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    /// Advances every tracked person seen in `detections` to time `now` and
    /// prunes identities that have gone stale.
    ///
    /// Persons without a track id are skipped. An id that appears more than
    /// once is evaluated once, using its last detection in the frame.
    pub fn process_frame(&mut self, detections: &[Detection], now: Duration) -> Vec<Notification> {
        let helmets = Detection::helmet_boxes(detections);
        let persons = last_detection_per_identity(detections);
        let observed: HashSet<u32> = persons.iter().map(|(id, _)| *id).collect();
        let mut notifications = Vec::new();
        self.assessments.clear();

        for (track_id, det) in persons {
            let has_helmet =
                associate_helmet(&det.bbox, &helmets, self.config.max_association_distance);
            let record = self.records.entry(track_id).or_default();

            let status = if has_helmet {
                if record.mark_compliant() {
                    log::info!("Person {track_id} recovered their helmet");
                    notifications.push(Notification::Recovered { track_id });
                }
                PersonStatus::Compliant
            } else {
                record.mark_non_compliant(now);
                let elapsed = record.non_compliant_for(now);
                let grace = self.config.grace_period_before_alert;

                if elapsed >= grace && record.cooldown_elapsed(now, self.config.alert_cooldown) {
                    notifications.push(Notification::Alert(AlertRequest {
                        track_id,
                        elapsed,
                        timestamp: now,
                        area: self.area.clone(),
                    }));
                }
                PersonStatus::NonCompliant {
                    elapsed,
                    alert_in: grace.saturating_sub(elapsed),
                }
            };

            self.assessments.push(PersonAssessment {
                track_id,
                bbox: det.bbox,
                status,
            });
        }

        self.prune(&observed, now);
        notifications
    }

    /// Marks an alert as delivered at `at`, starting its cooldown.
    ///
    /// Returns `false` if the identity is no longer tracked.
    pub fn record_alert_delivered(&mut self, track_id: u32, at: Duration) -> bool {
        match self.records.get_mut(&track_id) {
            Some(record) => {
                record.record_alert(at);
                true
            }
            None => false,
        }
    }

    pub fn record(&self, track_id: u32) -> Option<&ComplianceRecord> {
        self.records.get(&track_id)
    }

    pub fn tracked_count(&self) -> usize {
        self.records.len()
    }

    /// Assessments of the tracked persons in the last processed frame.
    pub fn assessments(&self) -> &[PersonAssessment] {
        &self.assessments
    }

    /// Two passes: collect absent, stale ids first, then remove them.
    fn prune(&mut self, observed: &HashSet<u32>, now: Duration) {
        let grace = self.config.stale_removal_grace;
        let stale: Vec<u32> = self
            .records
            .iter()
            .filter(|(id, record)| !observed.contains(*id) && record.is_stale(now, grace))
            .map(|(id, _)| *id)
            .collect();

        for id in stale {
            self.records.remove(&id);
            log::debug!("Dropped stale identity {id}");
        }
    }
}

/// Tracked persons in first-appearance order, each with the last detection
/// carrying its id.
fn last_detection_per_identity(detections: &[Detection]) -> Vec<(u32, &Detection)> {
    let mut persons: Vec<(u32, &Detection)> = Vec::new();
    let mut slots: HashMap<u32, usize> = HashMap::new();

    for det in detections.iter().filter(|d| d.class == DetectionClass::Person) {
        let Some(track_id) = det.track_id else {
            log::debug!("Skipping untracked person at {:?}", det.bbox);
            continue;
        };
        match slots.get(&track_id) {
            Some(&slot) => persons[slot].1 = det,
            None => {
                slots.insert(track_id, persons.len());
                persons.push((track_id, det));
            }
        }
    }
    persons
}
