// Minimal client for the Mobizon SMS API: send a text, get a message id back.
// https://help.mobizon.kz/help/api-docs/sms-api

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

const SEND_SMS_URL: &str = "https://api.mobizon.kz/service/message/sendsmsmessage";

#[derive(Debug, thiserror::Error)]
pub enum MobizonError {
    #[error("request to Mobizon failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mobizon returned error code {code}")]
    Api { code: i64 },
}

#[derive(Debug, Clone)]
pub struct MobizonOptions {
    pub api_key: String,
    /// Optional alphanumeric sender id, shown as the SMS "from".
    pub sender: Option<String>,
    /// When set, nothing is transmitted; sends are logged and succeed.
    pub dry_run: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendSmsResponse {
    pub code: i64,
    #[serde(default)]
    pub data: SendSmsData,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendSmsData {
    #[serde(rename = "messageId", default)]
    pub message_id: String,
}

#[derive(Debug, Clone)]
pub struct MobizonService {
    options: MobizonOptions,
    client: Client,
}

impl MobizonService {
    pub fn new(options: MobizonOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run || self.options.api_key.is_empty()
    }

    /// Send one SMS. A single bounded request, no retries: the caller decides
    /// what a failed delivery means.
    pub async fn send_sms(&self, to: &str, text: &str) -> Result<SendSmsResponse, MobizonError> {
        if self.is_dry_run() {
            info!(to, text, "mobizon dry-run: skipping transmission");
            return Ok(SendSmsResponse {
                code: 0,
                data: SendSmsData {
                    message_id: "dry-run".to_string(),
                },
            });
        }

        let mut form: Vec<(&str, &str)> = vec![
            ("apiKey", self.options.api_key.as_str()),
            ("recipient", to),
            ("text", text),
        ];
        if let Some(sender) = self.options.sender.as_deref() {
            form.push(("from", sender));
        }

        let response = self
            .client
            .post(SEND_SMS_URL)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json::<SendSmsResponse>()
            .await?;

        if response.code != 0 {
            warn!(to, code = response.code, "mobizon rejected the message");
            return Err(MobizonError::Api {
                code: response.code,
            });
        }

        info!(to, message_id = %response.data.message_id, "sms dispatched");
        Ok(response)
    }
}
