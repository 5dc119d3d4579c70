use crate::domain::model::{DayRecord, RecordHandle};
use crate::domain::ports::MessageChannel;
use crate::utils::error::{DigestError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EMBED_COLOR: u32 = 0x2f3136;

/// Channel reached through an incoming-webhook style REST API.
///
/// - `POST {url}?wait=true` creates a message and returns it
/// - `GET {url}/messages/{id}` fetches it
/// - `PATCH {url}/messages/{id}` edits it
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    client: Client,
    url: String,
    embed_color: u32,
}

#[derive(Serialize)]
struct EmbedPayload<'a> {
    title: &'a str,
    description: &'a str,
    color: u32,
}

#[derive(Serialize)]
struct MessagePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<EmbedPayload<'a>>,
}

#[derive(Deserialize)]
struct MessageResponse {
    id: String,
    #[serde(default)]
    embeds: Vec<EmbedResponse>,
}

#[derive(Deserialize, Default)]
struct EmbedResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>, embed_color: u32) -> Self {
        Self::with_client(Client::new(), url, embed_color)
    }

    pub fn with_client(client: Client, url: impl Into<String>, embed_color: u32) -> Self {
        Self {
            client,
            url: url.into(),
            embed_color,
        }
    }

    fn message_url(&self, handle: &RecordHandle) -> String {
        format!("{}/messages/{}", self.url.trim_end_matches('/'), handle)
    }

    fn record_payload<'a>(&self, record: &'a DayRecord) -> MessagePayload<'a> {
        MessagePayload {
            content: None,
            embeds: vec![EmbedPayload {
                title: &record.title,
                description: &record.description,
                color: self.embed_color,
            }],
        }
    }

    async fn create(&self, payload: &MessagePayload<'_>) -> Result<RecordHandle> {
        tracing::debug!("POST webhook message");
        let response = self
            .client
            .post(&self.url)
            .query(&[("wait", "true")])
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        let message: MessageResponse = response.json().await?;
        Ok(RecordHandle::new(message.id))
    }
}

fn check_found(response: Response, handle: &RecordHandle) -> Result<Response> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(DigestError::RecordNotFound {
            handle: handle.to_string(),
        });
    }
    Ok(response.error_for_status()?)
}

#[async_trait]
impl MessageChannel for WebhookChannel {
    async fn send_text(&self, content: &str) -> Result<RecordHandle> {
        self.create(&MessagePayload {
            content: Some(content),
            embeds: Vec::new(),
        })
        .await
    }

    async fn send_record(&self, record: &DayRecord) -> Result<RecordHandle> {
        self.create(&self.record_payload(record)).await
    }

    async fn fetch_record(&self, handle: &RecordHandle) -> Result<DayRecord> {
        tracing::debug!(%handle, "GET webhook message");
        let response = self.client.get(self.message_url(handle)).send().await?;
        let message: MessageResponse = check_found(response, handle)?.json().await?;
        let embed = message.embeds.into_iter().next().unwrap_or_default();
        Ok(DayRecord {
            title: embed.title.unwrap_or_default(),
            description: embed.description.unwrap_or_default(),
        })
    }

    async fn edit_record(&self, handle: &RecordHandle, record: &DayRecord) -> Result<()> {
        tracing::debug!(%handle, "PATCH webhook message");
        let response = self
            .client
            .patch(self.message_url(handle))
            .json(&self.record_payload(record))
            .send()
            .await?;
        check_found(response, handle)?;
        Ok(())
    }
}
