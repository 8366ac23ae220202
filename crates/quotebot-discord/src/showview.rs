//! Response assembler
//!
//! Turns a [`MainModel`] envelope into the followup message Discord
//! receives: one rich embed with the bot's branding, sentinel fields mapped
//! onto embed slots, and any rendered plot attached as a PNG.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::config::Settings;
use crate::discord::DiscordRestClient;
use crate::discord::rest::{
    AttachmentRef, Embed, EmbedAuthor, EmbedFieldPayload, EmbedFooter, EmbedMedia, FollowupMessage,
};
use crate::error::{BotError, Result};
use crate::models::MainModel;

/// How long error embeds stay up before the bot deletes them
const ERROR_DELETE_AFTER: Duration = Duration::from_secs(10);

const SERVER_ERROR_TEXT: &str = "Discord server error while sending image, try again later";

/// Assembles and delivers command responses
#[derive(Debug, Clone)]
pub struct ShowView {
    rest: Arc<DiscordRestClient>,
    embed_color: u32,
    author_name: String,
    author_icon_url: Option<String>,
}

impl ShowView {
    pub fn new(rest: Arc<DiscordRestClient>, settings: &Settings) -> Self {
        let author_icon_url = if settings.author_icon_url.is_empty() {
            None
        } else {
            Some(settings.author_icon_url.clone())
        };
        Self {
            rest,
            embed_color: settings.embed_color,
            author_name: settings.author_name.clone(),
            author_icon_url,
        }
    }

    /// Deliver a successful command response on the interaction followup
    pub async fn deliver(&self, token: &str, model: &MainModel) -> Result<()> {
        let attachment = match &model.plots {
            Some(plots) => Some((plots.filename.clone(), plots.decode().map_err(BotError::Render)?)),
            None => None,
        };

        let message = if model.no_embed {
            FollowupMessage {
                content: model.description.clone().or_else(|| model.title.clone()),
                attachments: attachment_refs(&attachment),
                ..FollowupMessage::default()
            }
        } else {
            FollowupMessage {
                embeds: vec![self.build_embed(model)],
                attachments: attachment_refs(&attachment),
                ..FollowupMessage::default()
            }
        };

        let had_attachment = attachment.is_some();
        match self.rest.create_followup(token, &message, attachment).await {
            Ok(_) => Ok(()),
            Err(BotError::Delivery(reason)) if had_attachment => {
                warn!(reason = %reason, "image followup rejected, sending plain notice");
                let notice = FollowupMessage {
                    content: Some(SERVER_ERROR_TEXT.to_string()),
                    ..FollowupMessage::default()
                };
                self.rest.create_followup(token, &notice, None).await.map(|_| ())
            },
            Err(other) => Err(other),
        }
    }

    /// Deliver an error embed titled after the failing command, then delete
    /// it once the user has had a chance to read it
    pub async fn deliver_error(&self, token: &str, command: &str, err: &BotError) -> Result<()> {
        let message = FollowupMessage {
            embeds: vec![self.error_embed(command, err)],
            ..FollowupMessage::default()
        };
        let message_id = self.rest.create_followup(token, &message, None).await?;

        let rest = Arc::clone(&self.rest);
        let token = token.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(ERROR_DELETE_AFTER).await;
            if let Err(err) = rest.delete_followup(&token, &message_id).await {
                warn!(%err, "failed to delete error embed");
            }
        });
        Ok(())
    }

    fn error_embed(&self, command: &str, err: &BotError) -> Embed {
        Embed {
            title: Some(command.to_string()),
            description: Some(err.user_reason()),
            color: Some(self.embed_color),
            ..Embed::default()
        }
    }

    /// Map the envelope onto a single embed, honoring the sentinel fields
    fn build_embed(&self, model: &MainModel) -> Embed {
        let mut embed = Embed {
            title: model.title.clone(),
            description: model.description.clone(),
            color: Some(self.embed_color),
            author: Some(EmbedAuthor {
                name: self.author_name.clone(),
                icon_url: self.author_icon_url.clone(),
            }),
            ..Embed::default()
        };

        for field in &model.embeds {
            if let Some(url) = &field.homepage {
                embed.url = Some(url.clone());
            }
            if let Some(url) = &field.thumbnail {
                embed.thumbnail = Some(EmbedMedia { url: url.clone() });
            }
            if let Some(text) = &field.footer {
                embed.footer = Some(EmbedFooter { text: text.clone() });
            }
            if let (Some(title), Some(description)) = (&field.title, &field.description) {
                embed.fields.push(EmbedFieldPayload {
                    name: title.clone(),
                    value: description.clone(),
                    inline: field.inline,
                });
            }
        }

        if let Some(plots) = &model.plots {
            embed.image = Some(EmbedMedia {
                url: format!("attachment://{}", plots.filename),
            });
        }

        embed
    }
}

fn attachment_refs(attachment: &Option<(String, Vec<u8>)>) -> Vec<AttachmentRef> {
    attachment
        .iter()
        .map(|(filename, _)| AttachmentRef {
            id: 0,
            filename: filename.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmbedField;
    use quotebot_render::PlotsResponse;

    fn view() -> ShowView {
        let settings = Settings::builder()
            .token("bot-token")
            .application_id("123")
            .public_key("a".repeat(64))
            .fmp_api_key("fmp-key")
            .build()
            .unwrap();
        ShowView::new(Arc::new(DiscordRestClient::new("token", "app")), &settings)
    }

    #[test]
    fn test_embed_carries_branding() {
        let model = MainModel::titled("AAPL Income").with_description("FY2023");
        let embed = view().build_embed(&model);
        assert_eq!(embed.title.as_deref(), Some("AAPL Income"));
        assert_eq!(embed.color, Some(0x0082_2661));
        assert_eq!(embed.author.unwrap().name, "Quotebot");
    }

    #[test]
    fn test_sentinel_fields_map_to_embed_slots() {
        let model = MainModel::titled("AAPL 10-K").with_embeds(vec![
            EmbedField::homepage("https://www.sec.gov"),
            EmbedField::footer("data by SEC EDGAR"),
            EmbedField::new("2023-11-03", "[10-K](https://example.com)", false),
        ]);
        let embed = view().build_embed(&model);
        assert_eq!(embed.url.as_deref(), Some("https://www.sec.gov"));
        assert_eq!(embed.footer.unwrap().text, "data by SEC EDGAR");
        assert_eq!(embed.fields.len(), 1);
        assert_eq!(embed.fields[0].name, "2023-11-03");
        assert!(!embed.fields[0].inline);
    }

    #[test]
    fn test_plots_become_attachment_image() {
        let plots = PlotsResponse::from_png(b"fake-png").unwrap();
        let filename = plots.filename.clone();
        let model = MainModel::titled("AAPL Daily").with_plots(plots);
        let embed = view().build_embed(&model);
        assert_eq!(
            embed.image.unwrap().url,
            format!("attachment://{filename}")
        );
    }

    #[test]
    fn test_error_embed_names_command_and_reason() {
        let err = BotError::UpstreamData {
            symbol: "ZZZZ".to_string(),
            reason: "no candles returned".to_string(),
        };
        let embed = view().error_embed("candle", &err);
        assert_eq!(embed.title.as_deref(), Some("candle"));
        assert_eq!(embed.description.as_deref(), Some("no candles returned"));
        assert!(embed.image.is_none());
    }

    #[test]
    fn test_error_embed_reason_never_empty() {
        let err = BotError::Delivery(String::new());
        let embed = view().error_embed("income", &err);
        assert!(!embed.description.unwrap_or_default().is_empty());
    }

    #[test]
    fn test_attachment_refs_shape() {
        let refs = attachment_refs(&Some(("chart.png".to_string(), vec![1, 2, 3])));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].id, 0);
        assert_eq!(refs[0].filename, "chart.png");
        assert!(attachment_refs(&None).is_empty());
    }
}
