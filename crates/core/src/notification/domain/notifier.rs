use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to set up the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("notification transport failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("notification rejected with HTTP status {status}")]
    Rejected { status: u16 },
    #[error("failed to read photo {path}: {source}")]
    Photo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Domain interface for the remote notification channel.
///
/// `Ok(())` means the channel confirmed delivery; anything else leaves the
/// alert eligible for another attempt.
pub trait Notifier: Send {
    fn send_text(&self, text: &str) -> Result<(), NotifyError>;

    fn send_photo(&self, photo: &Path, caption: &str) -> Result<(), NotifyError>;
}
