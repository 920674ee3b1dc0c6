use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use crate::error::ReminderError;
use crate::models::reminder::{ReminderDraft, ReminderRecord};

pub const REMINDERS_PATH: &str = "/api/zone_reminders";

/// The reminder endpoint: read the full list, or replace it.
pub trait ReminderApi {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<ReminderRecord>, ReminderError>> + Send;

    fn replace_all(&self, drafts: &[ReminderDraft]) -> impl Future<Output = Result<(), ReminderError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpReminderApi {
    client: reqwest::Client,
    url: String,
}

impl HttpReminderApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ReminderError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), REMINDERS_PATH);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ReminderError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport(&self, source: reqwest::Error) -> ReminderError {
        ReminderError::Transport {
            url: self.url.to_string(),
            source,
        }
    }
}

/// Parses a GET body. The server answers with a JSON array of records.
pub fn parse_records(body: &str) -> Result<Vec<ReminderRecord>, ReminderError> {
    Ok(serde_json::from_str(body)?)
}

impl ReminderApi for HttpReminderApi {
    async fn fetch_all(&self) -> Result<Vec<ReminderRecord>, ReminderError> {
        tracing::debug!("GET {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReminderError::Status {
                method: "GET",
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(|e| self.transport(e))?;
        parse_records(&body)
    }

    async fn replace_all(&self, drafts: &[ReminderDraft]) -> Result<(), ReminderError> {
        let body = serde_json::to_string(drafts)?;
        tracing::debug!("PUT {} with {} reminders", self.url, drafts.len());
        let response = self
            .client
            .put(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReminderError::Status {
                method: "PUT",
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_ignores_trailing_slash() {
        let api = HttpReminderApi::new("http://127.0.0.1:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.url(), "http://127.0.0.1:8080/api/zone_reminders");
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert!(matches!(parse_records("{\"map_id\": 1}"), Err(ReminderError::Parse(_))));
        assert_eq!(parse_records("[]").unwrap(), vec![]);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Port 9 (discard) is not expected to run an HTTP server.
        let api = HttpReminderApi::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = api.fetch_all().await.unwrap_err();
        assert!(matches!(err, ReminderError::Transport { .. }));
    }
}
