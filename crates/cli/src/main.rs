use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use hardhat_core::compliance::domain::compliance_tracker::ComplianceTracker;
use hardhat_core::detection::domain::detection_source::DetectionSource;
use hardhat_core::detection::infrastructure::jsonl_detection_source::JsonlDetectionSource;
use hardhat_core::notification::domain::notifier::Notifier;
use hardhat_core::notification::infrastructure::log_notifier::LogNotifier;
use hardhat_core::notification::infrastructure::telegram_notifier::TelegramNotifier;
use hardhat_core::pipeline::monitor_compliance_use_case::MonitorComplianceUseCase;
use hardhat_core::pipeline::monitor_logger::StdoutMonitorLogger;
use hardhat_core::shared::config::MonitorSettings;
use hardhat_core::snapshot::domain::alert_snapshot::AlertSnapshot;
use hardhat_core::snapshot::domain::frame_annotator::FrameAnnotator;
use hardhat_core::snapshot::infrastructure::image_file_io::ImageFileIo;
use hardhat_core::snapshot::infrastructure::label_font::load_label_font;

/// Helmet compliance monitoring over a tracked detection feed.
#[derive(Parser)]
#[command(name = "hardhat")]
struct Cli {
    /// Detection feed as JSON lines, or `-` to read stdin.
    input: String,

    /// Settings file (JSON). Defaults to the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Max pixel distance between head point and helmet center.
    #[arg(long)]
    max_head_distance: Option<f64>,

    /// Seconds without a helmet before the first alert.
    #[arg(long)]
    grace_period: Option<f64>,

    /// Minimum seconds between alerts for the same person.
    #[arg(long)]
    alert_cooldown: Option<f64>,

    /// Seconds after its last alert before an absent person is forgotten.
    #[arg(long)]
    stale_grace: Option<f64>,

    /// Area label included in alerts.
    #[arg(long)]
    area: Option<String>,

    /// Directory for annotated alert snapshots.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Send text-only alerts even when frames carry images.
    #[arg(long)]
    no_snapshots: bool,

    /// Font file (TTF/OTF) for person labels on snapshots.
    #[arg(long)]
    label_font: Option<PathBuf>,

    /// Telegram bot token. Without it notifications only go to the log.
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    telegram_token: Option<String>,

    /// Telegram chat id that receives notifications.
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    chat_id: Option<String>,

    /// Log progress every N frames.
    #[arg(long, default_value = "100")]
    progress_every: usize,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;

    let tracker =
        ComplianceTracker::new(settings.compliance_config()?)?.with_area(settings.area.clone());
    let source = open_source(&cli.input)?;
    let notifier = build_notifier(&settings)?;
    let snapshot = if cli.no_snapshots {
        None
    } else {
        Some(build_snapshot(&settings)?)
    };

    let mut use_case = MonitorComplianceUseCase::new(
        source,
        tracker,
        notifier,
        snapshot,
        Box::new(StdoutMonitorLogger::new(cli.progress_every)),
        None,
    );
    let summary = use_case.execute()?;
    log::info!(
        "Processed {} frames: {} alerts sent, {} failed",
        summary.frames,
        summary.alerts_sent,
        summary.alerts_failed
    );
    Ok(())
}

/// File settings first, then command-line overrides.
fn resolve_settings(cli: &Cli) -> Result<MonitorSettings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => MonitorSettings::load(path)?,
        None => MonitorSettings::load_default()?,
    };

    if let Some(d) = cli.max_head_distance {
        settings.max_association_distance = d;
    }
    if let Some(s) = cli.grace_period {
        settings.grace_period_secs = s;
    }
    if let Some(s) = cli.alert_cooldown {
        settings.alert_cooldown_secs = s;
    }
    if let Some(s) = cli.stale_grace {
        settings.stale_removal_secs = s;
    }
    if let Some(area) = &cli.area {
        settings.area = area.clone();
    }
    if let Some(dir) = &cli.snapshot_dir {
        settings.snapshot_dir = dir.clone();
    }
    if cli.label_font.is_some() {
        settings.label_font = cli.label_font.clone();
    }
    if cli.telegram_token.is_some() {
        settings.telegram_token = cli.telegram_token.clone();
    }
    if cli.chat_id.is_some() {
        settings.telegram_chat_id = cli.chat_id.clone();
    }
    Ok(settings)
}

fn open_source(input: &str) -> Result<Box<dyn DetectionSource>, Box<dyn std::error::Error>> {
    if input == "-" {
        return Ok(Box::new(JsonlDetectionSource::new(BufReader::new(io::stdin()))));
    }
    let path = PathBuf::from(input);
    if !path.exists() {
        return Err(format!("Input file not found: {}", path.display()).into());
    }
    Ok(Box::new(JsonlDetectionSource::open(&path)?))
}

fn build_snapshot(settings: &MonitorSettings) -> Result<AlertSnapshot, Box<dyn std::error::Error>> {
    let mut annotator = FrameAnnotator::default();
    match &settings.label_font {
        Some(path) => annotator = annotator.with_font(load_label_font(path)?),
        None => log::info!("No label font configured; snapshots carry outlines only"),
    }
    Ok(AlertSnapshot::new(
        Box::new(ImageFileIo::new()),
        Box::new(ImageFileIo::new()),
        settings.snapshot_dir.clone(),
    )
    .with_annotator(annotator))
}

fn build_notifier(
    settings: &MonitorSettings,
) -> Result<Box<dyn Notifier>, Box<dyn std::error::Error>> {
    match (&settings.telegram_token, &settings.telegram_chat_id) {
        (Some(token), Some(chat_id)) => {
            log::info!("Sending notifications to Telegram chat {chat_id}");
            let notifier = TelegramNotifier::new(token.clone(), chat_id.clone())?
                .with_base_url(settings.telegram_api_url.clone());
            Ok(Box::new(notifier))
        }
        (Some(_), None) => Err("A Telegram token was given without a chat id".into()),
        (None, Some(_)) => Err("A Telegram chat id was given without a token".into()),
        (None, None) => {
            log::info!("No Telegram credentials configured; notifications go to the log only");
            Ok(Box::new(LogNotifier))
        }
    }
}
