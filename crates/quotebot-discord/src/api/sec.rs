//! SEC EDGAR filings client

use crate::error::{BotError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;

const SEC_BASE_URL: &str = "https://data.sec.gov";
const SEC_COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Discord caps autocomplete responses at 25 choices
const MAX_CHOICES: usize = 25;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Filing form codes offered by the `/sec` autocomplete
pub const FILING_TYPES: &[&str] = &[
    "1", "1-A", "1-E", "1-K", "1-N", "1-SA", "1-U", "1-Z", "10", "10-D", "10-K", "10-M", "10-Q",
    "11-K", "12b-25", "13F", "13H", "144", "15", "15F", "17-H", "18", "18-K", "19b-4", "19b-4(e)",
    "19b-7", "2-E", "20-F", "24F-2", "25", "3", "4", "40-F", "5", "6-K", "7-M", "8-A", "8-K",
    "8-M", "9-M", "ABS-15G", "ABS-EE", "ABS DD-15E", "ADV", "ADV-E", "ADV-H", "ADV-NR", "ADV-W",
    "ATS", "ATS-N", "ATS-R", "BD", "BD-N", "BDW", "C", "CA-1", "CB", "CFPORTAL", "CRS", "CUSTODY",
    "D", "F-1", "F-10", "F-3", "F-4", "F-6", "F-7", "F-8", "F-80", "F-N", "F-X", "ID", "MA",
    "MA-I", "MA-NR", "MA-W", "MSD", "MSDW", "N-14", "N-17D-1", "N-17f-1", "N-17f-2", "N-18f-1",
    "N-1A", "N-2", "N-23c-3", "N-27D-1", "N-3", "N-4", "N-5", "N-54A", "N-54C", "N-6", "N-6EI-1",
    "N-6F", "N-8A", "N-8B-2", "N-8B-4", "N-8F", "N-CEN",
];

/// Case-insensitive prefix filter over [`FILING_TYPES`], capped at the
/// Discord choice limit
pub fn matching_filing_types(prefix: &str) -> Vec<&'static str> {
    let needle = prefix.to_uppercase();
    FILING_TYPES
        .iter()
        .filter(|form| form.to_uppercase().starts_with(&needle))
        .take(MAX_CHOICES)
        .copied()
        .collect()
}

/// One filing with its viewer link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    pub form_type: String,
    pub filing_date: String,
    pub url: String,
}

/// Company submissions response
#[derive(Debug, Clone, Deserialize)]
pub struct CompanySubmissions {
    pub cik: String,
    pub filings: FilingsData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilingsData {
    pub recent: RecentFilings,
}

/// Parallel column arrays, one entry per filing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    pub accession_number: Vec<String>,
    pub form: Vec<String>,
    pub filing_date: Vec<String>,
    pub primary_document: Vec<String>,
}

/// SEC EDGAR API client
#[derive(Debug, Clone)]
pub struct SecClient {
    client: Client,
    user_agent: String,
    rate_limiter: SharedRateLimiter,
}

impl SecClient {
    /// Create a new client; SEC requires an identifying User-Agent and
    /// tolerates at most 10 requests per second
    pub fn new(user_agent: impl Into<String>) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN));
        Self {
            client: Client::new(),
            user_agent: user_agent.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Resolve a ticker to its Central Index Key
    pub async fn get_cik(&self, ticker: &str) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(SEC_COMPANY_TICKERS_URL)
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BotError::UpstreamData {
                symbol: ticker.to_string(),
                reason: format!("SEC API error: {}", response.status()),
            });
        }

        let data: Value = response.json().await?;

        let ticker_upper = ticker.to_uppercase();
        if let Some(companies) = data.as_object() {
            for company in companies.values() {
                let matches = company
                    .get("ticker")
                    .and_then(Value::as_str)
                    .is_some_and(|t| t.to_uppercase() == ticker_upper);
                if !matches {
                    continue;
                }
                // cik_str is numeric in the SEC payload
                if let Some(cik) = company.get("cik_str") {
                    let raw = match cik {
                        Value::Number(n) => n.to_string(),
                        Value::String(s) => s.clone(),
                        _ => continue,
                    };
                    return Ok(raw);
                }
            }
        }

        Err(BotError::InvalidSymbol(ticker.to_string()))
    }

    /// Fetch the submissions index for a CIK
    pub async fn get_company_submissions(&self, cik: &str) -> Result<CompanySubmissions> {
        self.rate_limiter.until_ready().await;

        let cik_padded = format!("{:0>10}", cik.trim_start_matches('0'));
        let url = format!("{SEC_BASE_URL}/submissions/CIK{cik_padded}.json");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BotError::UpstreamData {
                symbol: cik.to_string(),
                reason: format!("SEC API error: {}", response.status()),
            });
        }

        Ok(response.json().await?)
    }

    /// Latest filings of `form_type` for `ticker`, newest first
    pub async fn get_filings(
        &self,
        ticker: &str,
        form_type: &str,
        limit: usize,
    ) -> Result<Vec<Filing>> {
        let cik = self.get_cik(ticker).await?;
        let submissions = self.get_company_submissions(&cik).await?;
        let recent = &submissions.filings.recent;

        let mut filings = Vec::new();
        for i in 0..recent.accession_number.len() {
            if recent.form.get(i).map(String::as_str) != Some(form_type) {
                continue;
            }
            filings.push(Filing {
                form_type: form_type.to_string(),
                filing_date: recent.filing_date[i].clone(),
                url: filing_url(&cik, &recent.accession_number[i], &recent.primary_document[i]),
            });
            if filings.len() >= limit {
                break;
            }
        }

        if filings.is_empty() {
            return Err(BotError::UpstreamData {
                symbol: ticker.to_string(),
                reason: format!("no {form_type} filings on record"),
            });
        }
        Ok(filings)
    }
}

/// Build the archive URL for one filing document
fn filing_url(cik: &str, accession_number: &str, document: &str) -> String {
    let cik_trimmed = cik.trim_start_matches('0');
    let accession_clean = accession_number.replace('-', "");
    format!("https://www.sec.gov/Archives/edgar/data/{cik_trimmed}/{accession_clean}/{document}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filing_types_include_defaults() {
        assert!(FILING_TYPES.contains(&"10-K"));
        assert!(FILING_TYPES.contains(&"8-K"));
        assert!(FILING_TYPES.contains(&"13F"));
    }

    #[test]
    fn test_matching_filing_types_prefix() {
        let matches = matching_filing_types("10");
        assert!(matches.contains(&"10-K"));
        assert!(matches.contains(&"10-Q"));
        assert!(!matches.contains(&"8-K"));
    }

    #[test]
    fn test_matching_filing_types_capped() {
        assert!(matching_filing_types("").len() <= MAX_CHOICES);
    }

    #[test]
    fn test_matching_filing_types_case_insensitive() {
        let matches = matching_filing_types("abs");
        assert!(matches.contains(&"ABS-15G"));
    }

    #[test]
    fn test_filing_url() {
        let url = filing_url("0000320193", "0000320193-23-000106", "aapl-20230930.htm");
        assert_eq!(
            url,
            "https://www.sec.gov/Archives/edgar/data/320193/000032019323000106/aapl-20230930.htm"
        );
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_cik() {
        let client = SecClient::new("quotebot-test test@example.com");
        let cik = client.get_cik("AAPL").await.unwrap();
        assert_eq!(cik.trim_start_matches('0'), "320193");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_filings() {
        let client = SecClient::new("quotebot-test test@example.com");
        let filings = client.get_filings("AAPL", "10-K", 3).await.unwrap();
        assert!(!filings.is_empty());
        assert!(filings[0].url.starts_with("https://www.sec.gov/Archives"));
    }
}
