//! Yahoo Finance candle client

use crate::error::{BotError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// Chart interval exposed on the command surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleInterval {
    Daily,
    Min15,
    Min5,
}

impl CandleInterval {
    /// Parse the command-surface value
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "1day" => Ok(Self::Daily),
            "15min" => Ok(Self::Min15),
            "5min" => Ok(Self::Min5),
            other => Err(BotError::Other(format!("Invalid interval: {other}"))),
        }
    }

    /// The command-surface value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "1day",
            Self::Min15 => "15min",
            Self::Min5 => "5min",
        }
    }

    /// Interval label used in chart titles
    pub fn title_label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Min15 => "15min",
            Self::Min5 => "5min",
        }
    }

    fn yahoo_code(&self) -> &'static str {
        match self {
            Self::Daily => "1d",
            Self::Min15 => "15m",
            Self::Min5 => "5m",
        }
    }

    /// Axis label format for candles at this interval
    fn label_format(&self) -> &'static str {
        match self {
            Self::Daily => "%Y-%m-%d",
            Self::Min15 | Self::Min5 => "%Y-%m-%d %H:%M",
        }
    }
}

/// One OHLC bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    /// X-axis label for this bar
    pub fn label(&self, interval: CandleInterval) -> String {
        self.timestamp.format(interval.label_format()).to_string()
    }
}

/// Yahoo Finance candle client
pub struct CandleClient {}

impl CandleClient {
    /// Create a new candle client
    pub fn new() -> Self {
        Self {}
    }

    /// Fetch OHLC bars for `symbol` over the last `days` days
    pub async fn get_candles(
        &self,
        symbol: &str,
        interval: CandleInterval,
        days: i64,
    ) -> Result<Vec<Candle>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| upstream(symbol, e.to_string()))?;

        let end = Utc::now();
        let start = end - chrono::Duration::days(days);
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| upstream(symbol, format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| upstream(symbol, format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history_interval(symbol, start_odt, end_odt, interval.yahoo_code())
            .await
            .map_err(|e| upstream(symbol, e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| upstream(symbol, e.to_string()))?;

        if quotes.is_empty() {
            return Err(upstream(symbol, "no candles returned".to_string()));
        }

        Ok(quotes
            .iter()
            .map(|q| Candle {
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }
}

impl Default for CandleClient {
    fn default() -> Self {
        Self::new()
    }
}

fn upstream(symbol: &str, reason: String) -> BotError {
    BotError::UpstreamData {
        symbol: symbol.to_string(),
        reason,
    }
}
