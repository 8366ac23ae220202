//! Response envelope models
//!
//! The transport-independent JSON shapes exchanged between command handlers
//! and the response assembler.

use quotebot_render::PlotsResponse;
use serde::{Deserialize, Serialize};

/// One embed field plus the sentinel directives the assembler recognizes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub inline: bool,
    /// Sets the embed footer text instead of adding a field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    /// Sets the embed thumbnail URL instead of adding a field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Sets the embed hyperlink URL instead of adding a field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

impl EmbedField {
    pub fn new(title: impl Into<String>, description: impl Into<String>, inline: bool) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            inline,
            ..Self::default()
        }
    }

    pub fn footer(text: impl Into<String>) -> Self {
        Self {
            footer: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn homepage(url: impl Into<String>) -> Self {
        Self {
            homepage: Some(url.into()),
            ..Self::default()
        }
    }
}

/// The response envelope a command hands to the assembler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plots: Option<PlotsResponse>,
    /// Deliver the image with a bare caption instead of a rich embed
    #[serde(default)]
    pub no_embed: bool,
}

impl MainModel {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_plots(mut self, plots: PlotsResponse) -> Self {
        self.plots = Some(plots);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_embeds(mut self, embeds: Vec<EmbedField>) -> Self {
        self.embeds = embeds;
        self
    }
}

/// Structured error payload accepted by the assembler's error path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub exception: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            exception: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serializes_sparsely() {
        let model = MainModel::titled("AAPL Income");
        let json = serde_json::to_value(&model).expect("serialize");
        assert_eq!(json["title"], "AAPL Income");
        assert!(json.get("description").is_none());
        assert!(json.get("embeds").is_none());
        assert!(json.get("plots").is_none());
    }

    #[test]
    fn test_envelope_roundtrip_with_plots() {
        let plots = PlotsResponse::from_png(b"png-bytes").expect("encode");
        let model = MainModel::titled("AAPL Daily").with_plots(plots.clone());
        let json = serde_json::to_string(&model).expect("serialize");
        let parsed: MainModel = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed.plots, Some(plots));
    }

    #[test]
    fn test_error_envelope_shape() {
        let envelope = ErrorEnvelope::new("upstream exploded");
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json["exception"], "upstream exploded");
    }

    #[test]
    fn test_sentinel_fields() {
        let field = EmbedField::footer("data by FMP");
        assert!(field.title.is_none());
        assert_eq!(field.footer.as_deref(), Some("data by FMP"));
    }
}
