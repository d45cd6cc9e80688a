use std::path::PathBuf;
use std::time::Instant;

use crate::compliance::domain::compliance_tracker::ComplianceTracker;
use crate::compliance::domain::notification::{AlertRequest, Notification};
use crate::detection::domain::detection_source::{DetectionFrame, DetectionSource};
use crate::notification::domain::notifier::Notifier;
use crate::pipeline::monitor_logger::MonitorLogger;
use crate::shared::detection::Detection;
use crate::snapshot::domain::alert_snapshot::AlertSnapshot;

/// Delivery counts for one monitoring run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonitorSummary {
    pub frames: usize,
    pub alerts_sent: usize,
    pub alerts_failed: usize,
    pub recoveries_sent: usize,
    pub recoveries_failed: usize,
}

/// Runs the compliance tracker over a detection feed and dispatches its
/// notifications.
///
/// Frames are handled strictly one after another. Delivery failures are
/// logged and counted but never stop the loop; a failed alert simply stays
/// eligible and is attempted again on the next qualifying frame.
pub struct MonitorComplianceUseCase {
    source: Box<dyn DetectionSource>,
    tracker: ComplianceTracker,
    notifier: Box<dyn Notifier>,
    snapshot: Option<AlertSnapshot>,
    logger: Box<dyn MonitorLogger>,
    on_frame: Option<Box<dyn Fn(usize) -> bool + Send>>,
}

impl MonitorComplianceUseCase {
    pub fn new(
        source: Box<dyn DetectionSource>,
        tracker: ComplianceTracker,
        notifier: Box<dyn Notifier>,
        snapshot: Option<AlertSnapshot>,
        logger: Box<dyn MonitorLogger>,
        on_frame: Option<Box<dyn Fn(usize) -> bool + Send>>,
    ) -> Self {
        Self {
            source,
            tracker,
            notifier,
            snapshot,
            logger,
            on_frame,
        }
    }

    pub fn tracker(&self) -> &ComplianceTracker {
        &self.tracker
    }

    /// Consumes the feed until it is exhausted or `on_frame` returns false.
    pub fn execute(&mut self) -> Result<MonitorSummary, Box<dyn std::error::Error>> {
        let mut summary = MonitorSummary::default();
        self.logger.info(&format!(
            "Monitoring area '{}' (association {}px, grace {:?}, cooldown {:?})",
            self.tracker.area(),
            self.tracker.config().max_association_distance,
            self.tracker.config().grace_period_before_alert,
            self.tracker.config().alert_cooldown,
        ));

        loop {
            let t0 = Instant::now();
            let Some(frame) = self.source.next_frame()? else {
                break;
            };
            self.logger.timing("read", elapsed_ms(t0));

            let t1 = Instant::now();
            let notifications = self
                .tracker
                .process_frame(&frame.detections, frame.timestamp);
            self.logger.timing("track", elapsed_ms(t1));

            if !notifications.is_empty() {
                let t2 = Instant::now();
                for notification in &notifications {
                    self.dispatch(notification, &frame, &mut summary);
                }
                self.logger.timing("notify", elapsed_ms(t2));
            }

            let tracked = self.tracker.tracked_count();
            self.logger.metric("tracked_identities", tracked as f64);
            self.logger
                .metric("persons", self.tracker.assessments().len() as f64);
            self.logger.frame(frame.index, tracked);
            summary.frames += 1;

            if let Some(ref callback) = self.on_frame {
                if !callback(frame.index) {
                    self.logger.info("Monitoring cancelled");
                    break;
                }
            }
        }

        self.logger.summary(&summary);
        Ok(summary)
    }

    fn dispatch(
        &mut self,
        notification: &Notification,
        frame: &DetectionFrame,
        summary: &mut MonitorSummary,
    ) {
        match notification {
            Notification::Recovered { track_id } => {
                match self.notifier.send_text(&notification.text()) {
                    Ok(()) => summary.recoveries_sent += 1,
                    Err(e) => {
                        log::error!("Failed to send recovery notice for person {track_id}: {e}");
                        summary.recoveries_failed += 1;
                    }
                }
            }
            Notification::Alert(alert) => {
                let caption = alert.caption();
                let result = match self.snapshot_for(alert, frame) {
                    Some(photo) => self.notifier.send_photo(&photo, &caption),
                    None => self.notifier.send_text(&caption),
                };
                match result {
                    Ok(()) => {
                        self.tracker
                            .record_alert_delivered(alert.track_id, alert.timestamp);
                        log::warn!(
                            "Alert sent for person {} ({}s without helmet)",
                            alert.track_id,
                            alert.elapsed.as_secs()
                        );
                        summary.alerts_sent += 1;
                    }
                    Err(e) => {
                        log::error!("Failed to send alert for person {}: {e}", alert.track_id);
                        summary.alerts_failed += 1;
                    }
                }
            }
        }
    }

    /// Falls back to a text-only alert when the frame has no image or the
    /// capture fails.
    fn snapshot_for(&self, alert: &AlertRequest, frame: &DetectionFrame) -> Option<PathBuf> {
        let snapshot = self.snapshot.as_ref()?;
        let image = frame.image.as_ref()?;
        let helmets = Detection::helmet_boxes(&frame.detections);
        match snapshot.capture(image, alert, self.tracker.assessments(), &helmets) {
            Ok(path) => Some(path),
            Err(e) => {
                log::error!("Snapshot for person {} failed: {e}", alert.track_id);
                None
            }
        }
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::detection::domain::detection_source::DetectionSourceError;
    use crate::notification::domain::notifier::NotifyError;
    use crate::pipeline::monitor_logger::NullMonitorLogger;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::config::ComplianceConfig;
    use crate::shared::frame::Frame;
    use crate::snapshot::domain::image_io::{ImageReader, ImageWriter, SnapshotError};

    // --- Stubs ---

    struct VecSource {
        frames: VecDeque<DetectionFrame>,
    }

    impl DetectionSource for VecSource {
        fn next_frame(&mut self) -> Result<Option<DetectionFrame>, DetectionSourceError> {
            Ok(self.frames.pop_front())
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Sent {
        Text(String),
        Photo(PathBuf, String),
    }

    /// Records deliveries; fails the first `failures` attempts.
    #[derive(Clone)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<Sent>>>,
        failures: Arc<Mutex<usize>>,
    }

    impl RecordingNotifier {
        fn new(failures: usize) -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                failures: Arc::new(Mutex::new(failures)),
            }
        }

        fn attempt(&self, message: Sent) -> Result<(), NotifyError> {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(NotifyError::Rejected { status: 502 });
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn send_text(&self, text: &str) -> Result<(), NotifyError> {
            self.attempt(Sent::Text(text.to_string()))
        }

        fn send_photo(&self, photo: &Path, caption: &str) -> Result<(), NotifyError> {
            self.attempt(Sent::Photo(photo.to_path_buf(), caption.to_string()))
        }
    }

    struct BlankReader;

    impl ImageReader for BlankReader {
        fn read(&self, _path: &Path) -> Result<Frame, SnapshotError> {
            Ok(Frame::new(vec![0u8; 400 * 400 * 3], 400, 400))
        }
    }

    struct NullWriter;

    impl ImageWriter for NullWriter {
        fn write(&self, _path: &Path, _frame: &Frame) -> Result<(), SnapshotError> {
            Ok(())
        }
    }

    const PERSON: BoundingBox = BoundingBox {
        x1: 100,
        y1: 100,
        x2: 200,
        y2: 300,
    };
    const HELMET: BoundingBox = BoundingBox {
        x1: 140,
        y1: 110,
        x2: 180,
        y2: 140,
    };

    fn frame(index: usize, t: f64, helmet: bool, image: Option<&str>) -> DetectionFrame {
        let mut detections = vec![Detection::person(PERSON, Some(7))];
        if helmet {
            detections.push(Detection::helmet(HELMET));
        }
        DetectionFrame {
            index,
            timestamp: Duration::from_secs_f64(t),
            detections,
            image: image.map(PathBuf::from),
        }
    }

    fn use_case(
        frames: Vec<DetectionFrame>,
        notifier: RecordingNotifier,
        snapshot: Option<AlertSnapshot>,
        on_frame: Option<Box<dyn Fn(usize) -> bool + Send>>,
    ) -> MonitorComplianceUseCase {
        MonitorComplianceUseCase::new(
            Box::new(VecSource {
                frames: frames.into(),
            }),
            ComplianceTracker::new(ComplianceConfig::default())
                .unwrap()
                .with_area("Dock"),
            Box::new(notifier),
            snapshot,
            Box::new(NullMonitorLogger),
            on_frame,
        )
    }

    #[test]
    fn test_alert_then_recovery_without_snapshots() {
        let notifier = RecordingNotifier::new(0);
        let frames = vec![
            frame(0, 0.0, false, None),
            frame(1, 1.0, false, None),
            frame(2, 2.0, false, None),
            frame(3, 3.0, true, None),
        ];
        let mut uc = use_case(frames, notifier.clone(), None, None);

        let summary = uc.execute().unwrap();

        assert_eq!(
            summary,
            MonitorSummary {
                frames: 4,
                alerts_sent: 1,
                alerts_failed: 0,
                recoveries_sent: 1,
                recoveries_failed: 0,
            }
        );
        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        match &sent[0] {
            Sent::Text(text) => {
                assert!(text.starts_with("PPE ALERT"));
                assert!(text.contains("ID: 7"));
                assert!(text.contains("Area: Dock"));
            }
            other => panic!("expected text alert, got {other:?}"),
        }
        assert_eq!(sent[1], Sent::Text("Person 7 put the helmet back on.".into()));
    }

    #[test]
    fn test_successful_delivery_starts_cooldown() {
        let notifier = RecordingNotifier::new(0);
        let frames = vec![frame(0, 0.0, false, None), frame(1, 1.0, false, None)];
        let mut uc = use_case(frames, notifier, None, None);
        uc.execute().unwrap();
        assert_eq!(
            uc.tracker().record(7).unwrap().last_alert_at(),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_failed_alert_is_retried_on_next_frame() {
        let notifier = RecordingNotifier::new(1);
        let frames = vec![
            frame(0, 0.0, false, None),
            frame(1, 1.0, false, None),
            frame(2, 1.5, false, None),
            frame(3, 2.0, false, None),
        ];
        let mut uc = use_case(frames, notifier.clone(), None, None);

        let summary = uc.execute().unwrap();

        assert_eq!(summary.alerts_failed, 1);
        assert_eq!(summary.alerts_sent, 1);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(
            uc.tracker().record(7).unwrap().last_alert_at(),
            Some(Duration::from_secs_f64(1.5))
        );
    }

    #[test]
    fn test_alert_with_image_sends_photo() {
        let notifier = RecordingNotifier::new(0);
        let snapshot = AlertSnapshot::new(Box::new(BlankReader), Box::new(NullWriter), "alerts");
        let frames = vec![
            frame(0, 0.0, false, Some("f0.jpg")),
            frame(1, 1.0, false, Some("f1.jpg")),
        ];
        let mut uc = use_case(frames, notifier.clone(), Some(snapshot), None);

        uc.execute().unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            Sent::Photo(path, caption) => {
                assert_eq!(path, &PathBuf::from("alerts/alert_7_1.jpg"));
                assert!(caption.contains("ID: 7"));
            }
            other => panic!("expected photo alert, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_failure_falls_back_to_text() {
        struct FailingReader;
        impl ImageReader for FailingReader {
            fn read(&self, _path: &Path) -> Result<Frame, SnapshotError> {
                Err(SnapshotError::InvalidFrame)
            }
        }

        let notifier = RecordingNotifier::new(0);
        let snapshot = AlertSnapshot::new(Box::new(FailingReader), Box::new(NullWriter), "alerts");
        let frames = vec![
            frame(0, 0.0, false, Some("f0.jpg")),
            frame(1, 1.0, false, Some("f1.jpg")),
        ];
        let mut uc = use_case(frames, notifier.clone(), Some(snapshot), None);

        let summary = uc.execute().unwrap();

        assert_eq!(summary.alerts_sent, 1);
        assert!(matches!(notifier.sent()[0], Sent::Text(_)));
    }

    #[test]
    fn test_failed_recovery_notice_is_counted() {
        let notifier = RecordingNotifier::new(0);
        let frames = vec![frame(0, 0.0, false, None), frame(1, 0.5, true, None)];
        let mut uc = use_case(frames, notifier.clone(), None, None);
        *notifier.failures.lock().unwrap() = 1;

        let summary = uc.execute().unwrap();

        assert_eq!(summary.recoveries_failed, 1);
        assert_eq!(summary.recoveries_sent, 0);
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn test_cancellation_stops_after_frame() {
        let notifier = RecordingNotifier::new(0);
        let frames = (0..10).map(|i| frame(i, i as f64, true, None)).collect();
        let on_frame: Box<dyn Fn(usize) -> bool + Send> = Box::new(|index| index < 2);
        let mut uc = use_case(frames, notifier, None, Some(on_frame));

        let summary = uc.execute().unwrap();

        assert_eq!(summary.frames, 3);
    }

    #[test]
    fn test_source_error_is_propagated() {
        struct BrokenSource;
        impl DetectionSource for BrokenSource {
            fn next_frame(&mut self) -> Result<Option<DetectionFrame>, DetectionSourceError> {
                Err(DetectionSourceError::InvalidTimestamp {
                    line: 1,
                    value: -1.0,
                })
            }
        }

        let mut uc = MonitorComplianceUseCase::new(
            Box::new(BrokenSource),
            ComplianceTracker::new(ComplianceConfig::default()).unwrap(),
            Box::new(RecordingNotifier::new(0)),
            None,
            Box::new(NullMonitorLogger),
            None,
        );
        assert!(uc.execute().is_err());
    }
}
