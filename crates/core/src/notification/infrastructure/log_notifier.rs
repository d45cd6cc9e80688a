use std::path::Path;

use crate::notification::domain::notifier::{Notifier, NotifyError};

/// Dry-run notifier: writes notifications to the log and reports success.
///
/// Used when no remote channel is configured.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        log::info!("[notify] {}", text.replace('\n', " | "));
        Ok(())
    }

    fn send_photo(&self, photo: &Path, caption: &str) -> Result<(), NotifyError> {
        log::info!(
            "[notify] {} (photo: {})",
            caption.replace('\n', " | "),
            photo.display()
        );
        Ok(())
    }
}
