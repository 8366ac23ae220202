//! Slash-command handlers
//!
//! Each handler takes the parsed interaction data and returns a [`MainModel`]
//! envelope; delivery and error presentation happen in the assembler.

pub mod candle;
pub mod fundamentals;
pub mod sec;

use std::sync::Arc;

use quotebot_render::{Backend, ChartTemplates};

use crate::api::{CandleClient, FmpClient, SecClient, StatementKind};
use crate::config::Settings;
use crate::discord::interaction::InteractionData;
use crate::error::{BotError, Result};
use crate::models::MainModel;

pub use candle::Cooldowns;

/// Shared clients and state the command handlers need
pub struct CommandContext {
    pub candles: CandleClient,
    pub fmp: FmpClient,
    pub sec: SecClient,
    pub backend: Arc<Backend>,
    pub templates: Arc<ChartTemplates>,
    pub cooldowns: Cooldowns,
}

impl CommandContext {
    pub fn new(settings: &Settings, backend: Arc<Backend>, templates: ChartTemplates) -> Self {
        Self {
            candles: CandleClient::new(),
            fmp: FmpClient::new(settings.fmp_api_key.clone()),
            sec: SecClient::new(settings.sec_user_agent.clone()),
            backend,
            templates: Arc::new(templates),
            cooldowns: Cooldowns::new(),
        }
    }

    /// Route a command interaction to its handler
    pub async fn dispatch(
        &self,
        data: &InteractionData,
        user_id: Option<&str>,
    ) -> Result<MainModel> {
        match data.name.as_str() {
            "candle" => candle::run(self, data).await,
            "cd" => candle::run_quick(self, data, user_id).await,
            "income" => fundamentals::run(self, StatementKind::Income, data).await,
            "cashflow" => fundamentals::run(self, StatementKind::CashFlow, data).await,
            "balance" => fundamentals::run(self, StatementKind::Balance, data).await,
            "sec" => sec::run(self, data).await,
            other => Err(BotError::Other(format!("Unknown command: {other}"))),
        }
    }
}

/// Pull the required ticker option, normalized to uppercase
fn required_ticker(data: &InteractionData) -> Result<String> {
    data.option_str("ticker")
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BotError::Other("Missing ticker option".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::interaction::InteractionOption;
    use serde_json::json;

    fn data_with_ticker(value: Option<&str>) -> InteractionData {
        InteractionData {
            name: "candle".to_string(),
            options: value
                .map(|v| {
                    vec![InteractionOption {
                        name: "ticker".to_string(),
                        value: Some(json!(v)),
                        focused: false,
                    }]
                })
                .unwrap_or_default(),
        }
    }

    #[test]
    fn test_required_ticker_uppercases() {
        let ticker = required_ticker(&data_with_ticker(Some(" aapl "))).unwrap();
        assert_eq!(ticker, "AAPL");
    }

    #[test]
    fn test_required_ticker_missing() {
        assert!(required_ticker(&data_with_ticker(None)).is_err());
        assert!(required_ticker(&data_with_ticker(Some("  "))).is_err());
    }
}
