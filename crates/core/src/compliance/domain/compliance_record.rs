use std::time::Duration;

/// Helmet compliance of one tracked person.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComplianceState {
    Compliant,
    /// Without a helmet continuously since `since`.
    NonCompliant { since: Duration },
}

/// Per-identity state kept while a track is live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplianceRecord {
    state: ComplianceState,
    /// `None` until an alert has been delivered.
    last_alert_at: Option<Duration>,
}

impl Default for ComplianceRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceRecord {
    pub fn new() -> Self {
        Self {
            state: ComplianceState::Compliant,
            last_alert_at: None,
        }
    }

    pub fn state(&self) -> ComplianceState {
        self.state
    }

    pub fn is_compliant(&self) -> bool {
        self.state == ComplianceState::Compliant
    }

    pub fn non_compliant_since(&self) -> Option<Duration> {
        match self.state {
            ComplianceState::NonCompliant { since } => Some(since),
            ComplianceState::Compliant => None,
        }
    }

    pub fn last_alert_at(&self) -> Option<Duration> {
        self.last_alert_at
    }

    /// Returns `true` when this is a recovery from non-compliance.
    pub fn mark_compliant(&mut self) -> bool {
        let recovered = !self.is_compliant();
        self.state = ComplianceState::Compliant;
        recovered
    }

    /// Enters non-compliance at `now`; an ongoing streak keeps its start.
    /// Returns `true` on the transition.
    pub fn mark_non_compliant(&mut self, now: Duration) -> bool {
        if self.is_compliant() {
            self.state = ComplianceState::NonCompliant { since: now };
            true
        } else {
            false
        }
    }

    /// Length of the current non-compliant streak, zero when compliant.
    pub fn non_compliant_for(&self, now: Duration) -> Duration {
        self.non_compliant_since()
            .map_or(Duration::ZERO, |since| now.saturating_sub(since))
    }

    /// A record that never alerted always satisfies the cooldown.
    pub fn cooldown_elapsed(&self, now: Duration, cooldown: Duration) -> bool {
        self.last_alert_at
            .map_or(true, |at| now.saturating_sub(at) >= cooldown)
    }

    /// Whether an absent identity may be dropped: its last alert, if any,
    /// lies more than `grace` in the past.
    pub fn is_stale(&self, now: Duration, grace: Duration) -> bool {
        self.last_alert_at
            .map_or(true, |at| now.saturating_sub(at) > grace)
    }

    pub fn record_alert(&mut self, at: Duration) {
        self.last_alert_at = Some(at);
    }
}
