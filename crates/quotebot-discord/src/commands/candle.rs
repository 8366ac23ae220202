//! `/candle` and `/cd` candlestick chart commands

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use quotebot_render::{AxisUpdate, Figure, LayoutUpdate, Margin, PlotsResponse};

use crate::api::{Candle, CandleInterval};
use crate::discord::interaction::InteractionData;
use crate::error::{BotError, Result};
use crate::models::MainModel;

use super::{CommandContext, required_ticker};

/// Days of history charted when the user gives none
const DEFAULT_DAYS: i64 = 200;

/// Per-user `/cd` cooldown window
const QUICK_COOLDOWN: Duration = Duration::from_secs(10);

/// Per-user invocation timestamps for the `/cd` cooldown
#[derive(Debug, Default)]
pub struct Cooldowns {
    last_used: Mutex<HashMap<String, Instant>>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an invocation, rejecting it while the window is still open
    pub fn check(&self, user_id: &str) -> Result<()> {
        let mut last_used = self
            .last_used
            .lock()
            .map_err(|_| BotError::Other("cooldown state poisoned".to_string()))?;
        let now = Instant::now();
        if let Some(last) = last_used.get(user_id) {
            let elapsed = now.duration_since(*last);
            if elapsed < QUICK_COOLDOWN {
                let retry_after = (QUICK_COOLDOWN - elapsed).as_secs().max(1);
                return Err(BotError::Cooldown { retry_after });
            }
        }
        last_used.insert(user_id.to_string(), now);
        Ok(())
    }
}

/// `/candle`: configurable interval and lookback
pub async fn run(ctx: &CommandContext, data: &InteractionData) -> Result<MainModel> {
    let ticker = required_ticker(data)?;
    let interval = CandleInterval::parse(data.option_str("interval").unwrap_or("1day"))?;
    let days = data.option_i64("days").unwrap_or(DEFAULT_DAYS).max(1);

    let candles = ctx.candles.get_candles(&ticker, interval, days).await?;
    let title = format!("{ticker} {}", interval.title_label());

    let layout = LayoutUpdate::new()
        .title(&title)
        .title_x(0.5)
        .size(1430, 762)
        .margin(Margin::new(80, 10, 40, 20))
        .paper_bgcolor("#111111")
        .plot_bgcolor("rgba(0,0,0,0)")
        .showlegend(false)
        .xaxis(AxisUpdate::default().tick0(0.5).tickangle(0.0));

    let plots = render_chart(ctx, &candles, interval, &layout).await?;

    let mut model = MainModel::titled(title).with_plots(plots);
    model.no_embed = true;
    Ok(model)
}

/// `/cd`: fixed daily chart with a per-user cooldown
pub async fn run_quick(
    ctx: &CommandContext,
    data: &InteractionData,
    user_id: Option<&str>,
) -> Result<MainModel> {
    if let Some(user) = user_id {
        ctx.cooldowns.check(user)?;
    }

    let ticker = required_ticker(data)?;
    let interval = CandleInterval::Daily;
    let candles = ctx.candles.get_candles(&ticker, interval, DEFAULT_DAYS).await?;
    let title = format!("{ticker} Daily");

    let layout = LayoutUpdate::new()
        .title(&title)
        .title_x(0.5)
        .size(900, 600)
        .margin(Margin::new(20, 20, 40, 20))
        .paper_bgcolor("#111111")
        .plot_bgcolor("rgba(0,0,0,0)")
        .showlegend(false)
        .xaxis(AxisUpdate::default().tick0(0.5));

    let plots = render_chart(ctx, &candles, interval, &layout).await?;

    let mut model = MainModel::titled(title).with_plots(plots);
    model.no_embed = true;
    Ok(model)
}

/// Render the candles through the backend and composite onto the chart
/// templates
async fn render_chart(
    ctx: &CommandContext,
    candles: &[Candle],
    interval: CandleInterval,
    layout: &LayoutUpdate,
) -> Result<PlotsResponse> {
    let figure = candle_figure(candles, interval).update_layout(layout);
    let rendered = figure.prepare_image(&ctx.backend).await?;
    let composed = ctx.templates.compose_chart(&rendered.decode()?)?;
    Ok(PlotsResponse::from_png(&composed)?)
}

/// Candlestick figure with y-axis headroom pinned to the price range
fn candle_figure(candles: &[Candle], interval: CandleInterval) -> Figure {
    let dates: Vec<String> = candles.iter().map(|c| c.label(interval)).collect();
    let open: Vec<f64> = candles.iter().map(|c| c.open).collect();
    let high: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let low: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let close: Vec<f64> = candles.iter().map(|c| c.close).collect();

    Figure::candlestick(dates, open, high.clone(), low.clone(), close).with_price_headroom(&low, &high)
}
