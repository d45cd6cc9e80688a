use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, Response};

use crate::notification::domain::notifier::{Notifier, NotifyError};
use crate::shared::constants::TELEGRAM_API_URL;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Sends notifications through the Telegram Bot API (`sendMessage` and
/// `sendPhoto`) using a blocking HTTP client.
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Fails if the HTTP client (TLS backend included) cannot be built.
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(NotifyError::Client)?;
        Ok(Self {
            client,
            base_url: TELEGRAM_API_URL.to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// Points the notifier at another Bot API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }
}

/// Strips the request URL from transport errors; it embeds the bot token.
fn transport(err: reqwest::Error) -> NotifyError {
    NotifyError::Transport(err.without_url())
}

fn check_status(response: Response) -> Result<(), NotifyError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(NotifyError::Rejected {
            status: status.as_u16(),
        })
    }
}

impl Notifier for TelegramNotifier {
    fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .map_err(transport)?;
        check_status(response)
    }

    fn send_photo(&self, photo: &Path, caption: &str) -> Result<(), NotifyError> {
        let form = multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .file("photo", photo)
            .map_err(|source| NotifyError::Photo {
                path: photo.to_path_buf(),
                source,
            })?;

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .map_err(transport)?;
        check_status(response)
    }
}
