//! `/income`, `/cashflow`, and `/balance` statement commands
//!
//! One shared pipeline: fetch the newest statement, format it as a
//! magnitude-colored two-column table, render it, and crop the result to
//! the table bounds.

use quotebot_render::{ColumnFormat, PlotsResponse, TableRenderSpec, compose_table};

use crate::api::{Period, StatementKind};
use crate::discord::interaction::InteractionData;
use crate::error::Result;
use crate::models::MainModel;

use super::{CommandContext, required_ticker};

/// Line-item column widths, labels wider than values
const COLUMN_WIDTHS: [f64; 2] = [8.0, 5.0];

pub async fn run(
    ctx: &CommandContext,
    kind: StatementKind,
    data: &InteractionData,
) -> Result<MainModel> {
    let ticker = required_ticker(data)?;
    let period = Period::parse(data.option_str("period").unwrap_or("annual"))?;

    let statement = ctx.fmp.statement(&ticker, kind, period).await?;

    let figure = TableRenderSpec::from_table(
        &statement.table,
        &[ColumnFormat::Magnitude { precision: 2 }],
    )
    .color_by_magnitude(&statement.table)
    .col_width(COLUMN_WIDTHS.to_vec())
    .cell_align(vec!["left", "right"])
    .into_figure();

    let rendered = figure.prepare_table(&ctx.backend).await?;
    let cropped = compose_table(&rendered.decode()?)?;

    let title = format!("{ticker} {}", kind.title_word());
    Ok(MainModel::titled(title).with_plots(PlotsResponse::from_png(&cropped)?))
}
