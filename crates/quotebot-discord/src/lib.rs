//! Discord slash-command surface for quotebot
//!
//! Exposes market-data queries (candlestick charts, financial statements,
//! SEC filing lookups) as Discord slash commands served over the HTTP
//! interactions endpoint. Command handlers fetch upstream data, shape it
//! through the rendering pipeline in `quotebot-render`, and deliver embeds
//! and image attachments via the Discord REST API.

pub mod api;
pub mod commands;
pub mod config;
pub mod discord;
pub mod error;
pub mod models;
pub mod server;
pub mod showview;

pub use config::Settings;
pub use error::{BotError, Result};
pub use models::{EmbedField, ErrorEnvelope, MainModel};
