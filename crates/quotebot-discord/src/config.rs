//! Configuration for the bot process
//!
//! Loaded once at startup from the environment and treated as immutable for
//! the process lifetime.

use crate::error::{BotError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default embed accent color, rgb(130,38,97)
pub const DEFAULT_EMBED_COLOR: u32 = 0x0082_2661;

/// Process-wide bot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Discord bot token used for REST calls
    pub token: String,

    /// Discord application id owning the slash commands
    pub application_id: String,

    /// Hex-encoded ed25519 public key for interaction signatures
    pub public_key: String,

    /// Accent color for embeds
    pub embed_color: u32,

    /// Display name stamped on embed authors
    pub author_name: String,

    /// Icon URL stamped on embed authors
    pub author_icon_url: String,

    /// Guild ids that receive guild-scoped command registration; empty means
    /// global registration
    pub test_guilds: Vec<String>,

    /// Financial Modeling Prep API key for statement lookups
    pub fmp_api_key: String,

    /// User-Agent header required by the SEC submissions API
    pub sec_user_agent: String,

    /// Address the interactions server binds to
    pub listen_addr: String,

    /// Renderer side-process command
    pub renderer_cmd: String,

    /// Renderer side-process arguments
    pub renderer_args: Vec<String>,

    /// Background template for chart composition
    pub chart_background: PathBuf,

    /// Foreground overlay template for chart composition
    pub chart_overlay: PathBuf,
}

impl Settings {
    /// Create a new settings builder
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Load all settings from the environment
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder()
            .token(require_env("DISCORD_BOT_TOKEN")?)
            .application_id(require_env("DISCORD_APPLICATION_ID")?)
            .public_key(require_env("DISCORD_PUBLIC_KEY")?)
            .fmp_api_key(require_env("FMP_API_KEY")?);

        if let Ok(color) = std::env::var("BOT_EMBED_COLOR") {
            let parsed = u32::from_str_radix(color.trim_start_matches("0x"), 16)
                .map_err(|_| BotError::Config(format!("BOT_EMBED_COLOR not hex: {color}")))?;
            builder = builder.embed_color(parsed);
        }
        if let Ok(name) = std::env::var("BOT_AUTHOR_NAME") {
            builder = builder.author_name(name);
        }
        if let Ok(icon) = std::env::var("BOT_AUTHOR_ICON_URL") {
            builder = builder.author_icon_url(icon);
        }
        if let Ok(guilds) = std::env::var("SLASH_TESTING_SERVERS") {
            builder = builder.test_guilds(
                guilds
                    .split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }
        if let Ok(agent) = std::env::var("SEC_USER_AGENT") {
            builder = builder.sec_user_agent(agent);
        }
        if let Ok(addr) = std::env::var("BOT_LISTEN_ADDR") {
            builder = builder.listen_addr(addr);
        }
        if let Ok(cmd) = std::env::var("RENDERER_CMD") {
            builder = builder.renderer_cmd(cmd);
        }
        if let Ok(args) = std::env::var("RENDERER_ARGS") {
            builder = builder.renderer_args(
                args.split_whitespace().map(str::to_string).collect(),
            );
        }
        if let Ok(path) = std::env::var("CHART_BACKGROUND") {
            builder = builder.chart_background(path);
        }
        if let Ok(path) = std::env::var("CHART_OVERLAY") {
            builder = builder.chart_overlay(path);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(BotError::Config("bot token must not be empty".to_string()));
        }
        if self.application_id.is_empty() {
            return Err(BotError::Config(
                "application id must not be empty".to_string(),
            ));
        }
        if self.public_key.len() != 64 || hex::decode(&self.public_key).is_err() {
            return Err(BotError::Config(
                "public key must be 64 hex characters".to_string(),
            ));
        }
        if self.fmp_api_key.is_empty() {
            return Err(BotError::Config("FMP API key must not be empty".to_string()));
        }
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(BotError::Config(format!(
                "listen address not parseable: {}",
                self.listen_addr
            )));
        }
        Ok(())
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| BotError::Config(format!("{name} environment variable not set")))
}

/// Builder for Settings
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    token: Option<String>,
    application_id: Option<String>,
    public_key: Option<String>,
    embed_color: Option<u32>,
    author_name: Option<String>,
    author_icon_url: Option<String>,
    test_guilds: Option<Vec<String>>,
    fmp_api_key: Option<String>,
    sec_user_agent: Option<String>,
    listen_addr: Option<String>,
    renderer_cmd: Option<String>,
    renderer_args: Option<Vec<String>>,
    chart_background: Option<PathBuf>,
    chart_overlay: Option<PathBuf>,
}

impl SettingsBuilder {
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn application_id(mut self, id: impl Into<String>) -> Self {
        self.application_id = Some(id.into());
        self
    }

    pub fn public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    pub fn embed_color(mut self, color: u32) -> Self {
        self.embed_color = Some(color);
        self
    }

    pub fn author_name(mut self, name: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self
    }

    pub fn author_icon_url(mut self, url: impl Into<String>) -> Self {
        self.author_icon_url = Some(url.into());
        self
    }

    pub fn test_guilds(mut self, guilds: Vec<String>) -> Self {
        self.test_guilds = Some(guilds);
        self
    }

    pub fn fmp_api_key(mut self, key: impl Into<String>) -> Self {
        self.fmp_api_key = Some(key.into());
        self
    }

    pub fn sec_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.sec_user_agent = Some(agent.into());
        self
    }

    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    pub fn renderer_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.renderer_cmd = Some(cmd.into());
        self
    }

    pub fn renderer_args(mut self, args: Vec<String>) -> Self {
        self.renderer_args = Some(args);
        self
    }

    pub fn chart_background(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_background = Some(path.into());
        self
    }

    pub fn chart_overlay(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_overlay = Some(path.into());
        self
    }

    /// Build and validate the settings
    pub fn build(self) -> Result<Settings> {
        let settings = Settings {
            token: self.token.unwrap_or_default(),
            application_id: self.application_id.unwrap_or_default(),
            public_key: self.public_key.unwrap_or_default(),
            embed_color: self.embed_color.unwrap_or(DEFAULT_EMBED_COLOR),
            author_name: self.author_name.unwrap_or_else(|| "Quotebot".to_string()),
            author_icon_url: self.author_icon_url.unwrap_or_default(),
            test_guilds: self.test_guilds.unwrap_or_default(),
            fmp_api_key: self.fmp_api_key.unwrap_or_default(),
            sec_user_agent: self
                .sec_user_agent
                .unwrap_or_else(|| "quotebot/0.1 (ops@quotebot.dev)".to_string()),
            listen_addr: self
                .listen_addr
                .unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            renderer_cmd: self.renderer_cmd.unwrap_or_else(|| "quotebot-renderer".to_string()),
            renderer_args: self.renderer_args.unwrap_or_default(),
            chart_background: self
                .chart_background
                .unwrap_or_else(|| PathBuf::from("assets/bg.png")),
            chart_overlay: self
                .chart_overlay
                .unwrap_or_else(|| PathBuf::from("assets/fg.png")),
        };

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_builder() -> SettingsBuilder {
        Settings::builder()
            .token("bot-token")
            .application_id("123456789")
            .public_key("a".repeat(64))
            .fmp_api_key("fmp-key")
    }

    #[test]
    fn test_builder_defaults() {
        let settings = valid_builder().build().unwrap();
        assert_eq!(settings.embed_color, DEFAULT_EMBED_COLOR);
        assert_eq!(settings.author_name, "Quotebot");
        assert!(settings.test_guilds.is_empty());
        assert_eq!(settings.listen_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_validate_rejects_short_public_key() {
        let err = valid_builder().public_key("abcd").build();
        assert!(err.is_err());
    }

    #[test]
    fn test_validate_rejects_non_hex_public_key() {
        let err = valid_builder().public_key("z".repeat(64)).build();
        assert!(err.is_err());
    }

    #[test]
    fn test_validate_rejects_missing_token() {
        let err = valid_builder().token("").build();
        assert!(err.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_listen_addr() {
        let err = valid_builder().listen_addr("not-an-addr").build();
        assert!(err.is_err());
    }

    #[test]
    fn test_test_guilds_passthrough() {
        let settings = valid_builder()
            .test_guilds(vec!["1".to_string(), "2".to_string()])
            .build()
            .unwrap();
        assert_eq!(settings.test_guilds.len(), 2);
    }
}
