use std::time::Duration;

use crate::shared::constants::SECONDS_PER_DAY;

/// Notification intent produced by the tracker. Delivery is the caller's job.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// A non-compliant person has an associated helmet again.
    Recovered { track_id: u32 },
    /// A person has been without a helmet past the grace period.
    Alert(AlertRequest),
}

impl Notification {
    /// Plain-text rendering, used when no snapshot accompanies the message.
    pub fn text(&self) -> String {
        match self {
            Notification::Recovered { track_id } => {
                format!("Person {track_id} put the helmet back on.")
            }
            Notification::Alert(alert) => alert.caption(),
        }
    }
}

/// Alert for one identity. The caller captures the current frame as the
/// snapshot when it dispatches the alert.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertRequest {
    pub track_id: u32,
    /// Length of the non-compliant streak when the alert fired.
    pub elapsed: Duration,
    pub timestamp: Duration,
    pub area: String,
}

impl AlertRequest {
    pub fn caption(&self) -> String {
        format!(
            "PPE ALERT: person without helmet\n\
             ID: {}\n\
             Time without helmet: {}s\n\
             Time: {}\n\
             Area: {}",
            self.track_id,
            self.elapsed.as_secs(),
            clock(self.timestamp),
            self.area
        )
    }

    /// File name for the alert snapshot, e.g. `alert_7_61.jpg`.
    pub fn snapshot_name(&self) -> String {
        format!("alert_{}_{}.jpg", self.track_id, self.timestamp.as_secs())
    }
}

/// `HH:MM:SS` of a timestamp within its day.
fn clock(timestamp: Duration) -> String {
    let secs = timestamp.as_secs() % SECONDS_PER_DAY;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
