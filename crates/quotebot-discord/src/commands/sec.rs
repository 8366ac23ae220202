//! `/sec` filing lookup command

use crate::discord::interaction::InteractionData;
use crate::error::Result;
use crate::models::{EmbedField, MainModel};

use super::{CommandContext, required_ticker};

/// Form type used when the user leaves the option blank
const DEFAULT_FORM_TYPE: &str = "10-K";

/// How many filings one response lists
const FILING_LIMIT: usize = 5;

pub async fn run(ctx: &CommandContext, data: &InteractionData) -> Result<MainModel> {
    let ticker = required_ticker(data)?;
    let form_type = data
        .option_str("type")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_FORM_TYPE)
        .to_uppercase();

    let filings = ctx.sec.get_filings(&ticker, &form_type, FILING_LIMIT).await?;

    let mut embeds = Vec::with_capacity(filings.len() + 2);
    if let Some(latest) = filings.first() {
        embeds.push(EmbedField::homepage(latest.url.clone()));
    }
    for filing in &filings {
        embeds.push(EmbedField::new(
            filing.filing_date.clone(),
            format!("[{}]({})", filing.form_type, filing.url),
            false,
        ));
    }
    embeds.push(EmbedField::footer("Data from SEC EDGAR"));

    let title = format!("{ticker} {form_type} Filings");
    Ok(MainModel::titled(title).with_embeds(embeds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Filing;

    #[test]
    fn test_filing_field_markdown() {
        let filing = Filing {
            form_type: "10-K".to_string(),
            filing_date: "2023-11-03".to_string(),
            url: "https://www.sec.gov/Archives/edgar/data/320193/doc.htm".to_string(),
        };
        let field = EmbedField::new(
            filing.filing_date.clone(),
            format!("[{}]({})", filing.form_type, filing.url),
            false,
        );
        assert_eq!(field.title.as_deref(), Some("2023-11-03"));
        assert_eq!(
            field.description.as_deref(),
            Some("[10-K](https://www.sec.gov/Archives/edgar/data/320193/doc.htm)")
        );
    }
}
