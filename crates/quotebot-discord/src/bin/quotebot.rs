//! Bot process entrypoint

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use quotebot_discord::commands::CommandContext;
use quotebot_discord::config::Settings;
use quotebot_discord::discord::interaction::command_catalog;
use quotebot_discord::discord::DiscordRestClient;
use quotebot_discord::server::{self, AppState};
use quotebot_discord::showview::ShowView;
use quotebot_render::{Backend, ChartTemplates, DEFAULT_TIMEOUT, ProcessTransport};
use quotebot_utils::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let settings = Settings::from_env().context("loading configuration")?;
    let addr = settings
        .listen_addr
        .parse()
        .context("parsing listen address")?;

    let transport = ProcessTransport::new(
        settings.renderer_cmd.clone(),
        settings.renderer_args.clone(),
    );
    let backend = Backend::initialize(Arc::new(transport), DEFAULT_TIMEOUT);

    let templates = ChartTemplates::load(&settings.chart_background, &settings.chart_overlay)
        .context("loading chart templates")?;

    let rest = Arc::new(DiscordRestClient::new(
        settings.token.clone(),
        settings.application_id.clone(),
    ));
    rest.register_commands(&command_catalog(), &settings.test_guilds)
        .await
        .context("registering slash commands")?;
    info!("slash commands registered");

    let state = Arc::new(AppState {
        public_key: settings.public_key.clone(),
        showview: ShowView::new(Arc::clone(&rest), &settings),
        commands: CommandContext::new(&settings, Arc::clone(&backend), templates),
    });

    server::run(state, addr).await?;

    backend.shutdown().await;
    Ok(())
}
