//! Financial Modeling Prep statements client
//!
//! Fetches income, cash-flow, and balance-sheet statements and reshapes the
//! newest period into the labeled table the formatter consumes: bookkeeping
//! fields dropped, keys humanized, ratio/average rows filtered, common
//! labels abbreviated.

use crate::error::{BotError, Result};
use quotebot_render::TableSpec;
use reqwest::Client;
use serde_json::Value;

const BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Upstream fields that are bookkeeping, not line items
const SKIP_KEYS: [&str; 10] = [
    "date",
    "symbol",
    "reportedCurrency",
    "cik",
    "fillingDate",
    "acceptedDate",
    "calendarYear",
    "period",
    "link",
    "finalLink",
];

/// Label rewrites applied after humanizing
const ABBREVIATIONS: [(&str, &str); 7] = [
    ("Research And Development Expenses", "R&D Expenses"),
    ("General And Administrative Expenses", "G&A Expenses"),
    ("Selling And Marketing Expenses", "S&M Expenses"),
    (
        "Selling General And Administrative Expenses",
        "SG&A Expenses",
    ),
    ("Eps", "EPS"),
    ("Epsdiluted", "EPS Diluted"),
    ("Ebitda", "EBITDA"),
];

/// Which statement to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Income,
    CashFlow,
    Balance,
}

impl StatementKind {
    fn path(&self) -> &'static str {
        match self {
            Self::Income => "income-statement",
            Self::CashFlow => "cash-flow-statement",
            Self::Balance => "balance-sheet-statement",
        }
    }

    /// Word used in embed titles
    pub fn title_word(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::CashFlow => "Cash Flow",
            Self::Balance => "Balance Sheet",
        }
    }
}

/// Reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Annual,
    Quarter,
}

impl Period {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "annual" => Ok(Self::Annual),
            "quarter" => Ok(Self::Quarter),
            other => Err(BotError::Other(format!("Invalid period: {other}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

/// The newest statement reshaped into a labeled single-column table
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Period end date, `YYYY-MM-DD`
    pub period_label: String,
    pub table: TableSpec,
}

/// Financial Modeling Prep API client
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
}

impl FmpClient {
    /// Create a new FMP client with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Fetch the newest statement of `kind` for `symbol`
    pub async fn statement(
        &self,
        symbol: &str,
        kind: StatementKind,
        period: Period,
    ) -> Result<Statement> {
        let url = format!("{BASE_URL}/{}/{symbol}", kind.path());
        let response = self
            .client
            .get(&url)
            .query(&[("period", period.as_str()), ("apikey", &self.api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BotError::UpstreamData {
                symbol: symbol.to_string(),
                reason: format!("HTTP error: {}", response.status()),
            });
        }

        let data: Value = response.json().await?;

        if let Some(error) = data.get("Error Message") {
            return Err(BotError::UpstreamData {
                symbol: symbol.to_string(),
                reason: error.to_string(),
            });
        }

        let newest = data
            .as_array()
            .and_then(|rows| rows.first())
            .and_then(Value::as_object)
            .ok_or_else(|| BotError::UpstreamData {
                symbol: symbol.to_string(),
                reason: format!("no {} statements", period.as_str()),
            })?;

        let period_label = newest
            .get("date")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Statement {
            table: reshape(newest, &period_label),
            period_label,
        })
    }
}

/// Turn a raw statement object into the formatter's table shape
fn reshape(raw: &serde_json::Map<String, Value>, period_label: &str) -> TableSpec {
    let mut row_labels = Vec::new();
    let mut rows = Vec::new();

    for (key, value) in raw {
        if SKIP_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Some(number) = as_number(value) else {
            continue;
        };
        let label = abbreviate(humanize(key));
        let lowered = label.to_lowercase();
        if lowered.contains("ratio") || lowered.contains("average") {
            continue;
        }
        row_labels.push(label);
        rows.push(vec![Some(number)]);
    }

    TableSpec {
        row_labels,
        column_labels: vec![period_label.to_string()],
        rows,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// `"researchAndDevelopmentExpenses" -> "Research And Development Expenses"`
fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}

fn abbreviate(label: String) -> String {
    for (long, short) in ABBREVIATIONS {
        if label == long {
            return short.to_string();
        }
    }
    if label.contains("Net Cash Flow") {
        return label.replace("Net Cash Flow", "NCF");
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_humanize_camel_case() {
        assert_eq!(
            humanize("researchAndDevelopmentExpenses"),
            "Research And Development Expenses"
        );
        assert_eq!(humanize("revenue"), "Revenue");
        assert_eq!(humanize("eps"), "Eps");
    }

    #[test]
    fn test_abbreviations() {
        assert_eq!(abbreviate(humanize("eps")), "EPS");
        assert_eq!(abbreviate(humanize("epsdiluted")), "EPS Diluted");
        assert_eq!(abbreviate(humanize("ebitda")), "EBITDA");
        assert_eq!(
            abbreviate(humanize("researchAndDevelopmentExpenses")),
            "R&D Expenses"
        );
        assert_eq!(abbreviate("Revenue".to_string()), "Revenue");
        assert_eq!(
            abbreviate("Net Cash Flow From Operations".to_string()),
            "NCF From Operations"
        );
    }

    #[test]
    fn test_reshape_filters_and_orders() {
        let raw = json!({
            "date": "2023-09-30",
            "symbol": "AAPL",
            "reportedCurrency": "USD",
            "revenue": 383_285_000_000_i64,
            "grossProfitRatio": 0.44,
            "weightedAverageShsOut": 15_744_231_000_i64,
            "netIncome": 96_995_000_000_i64,
            "link": "https://example.com",
        });
        let table = reshape(raw.as_object().unwrap(), "2023-09-30");

        assert_eq!(table.row_labels, vec!["Revenue", "Net Income"]);
        assert_eq!(table.column_labels, vec!["2023-09-30"]);
        assert_eq!(table.rows[0][0], Some(383_285_000_000.0));
    }

    #[test]
    fn test_reshape_skips_non_numeric() {
        let raw = json!({
            "date": "2023-09-30",
            "revenue": "383285000000",
            "auditorOpinion": "unqualified",
        });
        let table = reshape(raw.as_object().unwrap(), "2023-09-30");
        assert_eq!(table.row_labels, vec!["Revenue"]);
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(Period::parse("annual").unwrap(), Period::Annual);
        assert_eq!(Period::parse("quarter").unwrap(), Period::Quarter);
        assert!(Period::parse("monthly").is_err());
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_statement_fetch() {
        let key = std::env::var("FMP_API_KEY").unwrap();
        let client = FmpClient::new(key);
        let statement = client
            .statement("AAPL", StatementKind::Income, Period::Annual)
            .await
            .unwrap();
        assert!(!statement.table.row_labels.is_empty());
    }
}
