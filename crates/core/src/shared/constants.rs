/// Max pixel distance between a person's head point and a helmet center.
pub const DEFAULT_MAX_ASSOCIATION_DISTANCE: f64 = 220.0;

/// Seconds a person must stay without a helmet before the first alert.
pub const DEFAULT_GRACE_PERIOD_SECS: f64 = 1.0;

/// Minimum seconds between two alerts for the same identity.
pub const DEFAULT_ALERT_COOLDOWN_SECS: f64 = 60.0;

/// Seconds after its last alert before an absent identity may be dropped.
pub const DEFAULT_STALE_REMOVAL_SECS: f64 = 5.0;

pub const DEFAULT_AREA: &str = "Main plant";

pub const DEFAULT_SNAPSHOT_DIR: &str = "alerts";

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

pub const SECONDS_PER_DAY: u64 = 86_400;
