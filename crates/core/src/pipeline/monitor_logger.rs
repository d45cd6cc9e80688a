use std::collections::HashMap;
use std::time::Instant;

use crate::pipeline::monitor_compliance_use_case::MonitorSummary;

/// Observer for the monitoring loop.
///
/// Keeps the loop independent of where its progress goes (stdout, log,
/// nowhere in tests).
pub trait MonitorLogger: Send {
    /// Called once per processed frame.
    fn frame(&mut self, index: usize, tracked: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. persons in frame).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-run report. Default: no-op.
    fn summary(&self, _summary: &MonitorSummary) {}
}

/// Discards everything.
pub struct NullMonitorLogger;

impl MonitorLogger for NullMonitorLogger {
    fn frame(&mut self, _index: usize, _tracked: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Count and sum of one timing or metric series.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct RunningStat {
    count: u64,
    sum: f64,
}

impl RunningStat {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// Zero when nothing was recorded.
    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Logs throttled progress and per-stage averages through the `log` crate.
pub struct StdoutMonitorLogger {
    throttle_frames: usize,
    timings: HashMap<String, RunningStat>,
    metrics: HashMap<String, RunningStat>,
    start_time: Instant,
    frames: usize,
}

impl StdoutMonitorLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
        }
    }

    pub fn summary_string(&self, summary: &MonitorSummary) -> String {
        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Monitor summary ({} frames, {elapsed_s:.1}s):",
            summary.frames
        )];
        lines.push(format!(
            "  alerts: {} sent, {} failed",
            summary.alerts_sent, summary.alerts_failed
        ));
        lines.push(format!(
            "  recoveries: {} sent, {} failed",
            summary.recoveries_sent, summary.recoveries_failed
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            lines.push(format!("  {stage:8}: avg {:6.2}ms", self.timings[stage].average()));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            lines.push(format!("  {name}: avg {:.1}", self.metrics[name].average()));
        }

        lines.join("\n")
    }
}

impl Default for StdoutMonitorLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl MonitorLogger for StdoutMonitorLogger {
    fn frame(&mut self, index: usize, tracked: usize) {
        self.frames += 1;
        if self.frames % self.throttle_frames == 0 {
            let fps = self.frames as f64 / self.start_time.elapsed().as_secs_f64().max(1e-9);
            log::info!("Frame {index}: {tracked} tracked identities ({fps:.1} fps)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self, summary: &MonitorSummary) {
        log::info!("\n\n{}", self.summary_string(summary));
    }
}
