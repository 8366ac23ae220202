//! Discord REST client
//!
//! Covers the small slice of the v10 API the bot needs: command
//! registration, interaction callbacks, and webhook followups.

use crate::error::{BotError, Result};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::interaction::CommandSpec;

const API_BASE: &str = "https://discord.com/api/v10";

/// Embed payload on outgoing messages
#[derive(Debug, Clone, Default, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<EmbedFieldPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFieldPayload {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Followup message body; attachments ride alongside as multipart files
#[derive(Debug, Clone, Default, Serialize)]
pub struct FollowupMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attachments: Vec<AttachmentRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentRef {
    pub id: u64,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

/// Discord v10 REST client
#[derive(Debug, Clone)]
pub struct DiscordRestClient {
    client: Client,
    token: String,
    application_id: String,
}

impl DiscordRestClient {
    pub fn new(token: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            application_id: application_id.into(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Send a followup on a deferred interaction; returns the message id
    pub async fn create_followup(
        &self,
        token: &str,
        message: &FollowupMessage,
        attachment: Option<(String, Vec<u8>)>,
    ) -> Result<String> {
        let url = format!("{API_BASE}/webhooks/{}/{token}", self.application_id);

        let response = if let Some((filename, bytes)) = attachment {
            let payload = serde_json::to_string(message)?;
            let form = Form::new()
                .part(
                    "payload_json",
                    Part::text(payload)
                        .mime_str("application/json")
                        .map_err(BotError::Network)?,
                )
                .part(
                    "files[0]",
                    Part::bytes(bytes)
                        .file_name(filename)
                        .mime_str("image/png")
                        .map_err(BotError::Network)?,
                );
            self.client.post(&url).multipart(form).send().await?
        } else {
            self.client.post(&url).json(message).send().await?
        };

        let body = check_status(response).await?;
        let message: MessageRef = serde_json::from_str(&body)?;
        Ok(message.id)
    }

    /// Delete a previously sent followup
    pub async fn delete_followup(&self, token: &str, message_id: &str) -> Result<()> {
        let url = format!(
            "{API_BASE}/webhooks/{}/{token}/messages/{message_id}",
            self.application_id
        );
        let response = self.client.delete(&url).send().await?;
        check_status(response).await.map(|_| ())
    }

    /// Register the command catalog, guild-scoped when test guilds are set
    pub async fn register_commands(
        &self,
        specs: &[CommandSpec],
        test_guilds: &[String],
    ) -> Result<()> {
        if test_guilds.is_empty() {
            let url = format!("{API_BASE}/applications/{}/commands", self.application_id);
            self.put_commands(&url, specs).await?;
            debug!("registered {} global commands", specs.len());
            return Ok(());
        }

        for guild in test_guilds {
            let url = format!(
                "{API_BASE}/applications/{}/guilds/{guild}/commands",
                self.application_id
            );
            self.put_commands(&url, specs).await?;
            debug!(guild = %guild, "registered {} guild commands", specs.len());
        }
        Ok(())
    }

    async fn put_commands(&self, url: &str, specs: &[CommandSpec]) -> Result<()> {
        let response = self
            .client
            .put(url)
            .header("Authorization", self.auth_header())
            .json(specs)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }
}

/// Map non-2xx responses onto delivery errors; 5xx is the retryable kind
/// surfaced to users as a Discord outage
async fn check_status(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.text().await.unwrap_or_default());
    }
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let detail = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request rejected");
    Err(BotError::Delivery(format!("{status}: {detail}")))
}
