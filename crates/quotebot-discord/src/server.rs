//! Interactions HTTP server
//!
//! Discord delivers every interaction as a signed POST; the response body is
//! the interaction callback. Commands are acknowledged with a deferred
//! callback and fulfilled out-of-band on the followup webhook.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::json;
use tracing::{error, info, warn};

use crate::api::matching_filing_types;
use crate::commands::CommandContext;
use crate::discord::interaction::{
    CALLBACK_AUTOCOMPLETE_RESULT, CALLBACK_DEFERRED_CHANNEL_MESSAGE, CALLBACK_PONG, Choice,
    INTERACTION_APPLICATION_COMMAND, INTERACTION_AUTOCOMPLETE, INTERACTION_PING, Interaction,
};
use crate::discord::verify_signature;
use crate::error::{BotError, Result};
use crate::models::ErrorEnvelope;
use crate::showview::ShowView;

/// Everything the request handlers share
pub struct AppState {
    pub public_key: String,
    pub showview: ShowView,
    pub commands: CommandContext,
}

/// Build the interactions router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/interactions", post(interactions))
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn run(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BotError::Config(format!("cannot bind {addr}: {e}")))?;
    info!(%addr, "interactions server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BotError::Other(format!("server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "cannot install ctrl-c handler");
    }
}

async fn interactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = header_str(&headers, "X-Signature-Ed25519");
    let timestamp = header_str(&headers, "X-Signature-Timestamp");
    let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
        return reject(StatusCode::UNAUTHORIZED, "missing signature headers");
    };
    if !verify_signature(&state.public_key, signature, timestamp, &body) {
        return reject(StatusCode::UNAUTHORIZED, "invalid request signature");
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(err) => return reject(StatusCode::BAD_REQUEST, &format!("malformed body: {err}")),
    };

    match interaction.kind {
        INTERACTION_PING => Json(json!({ "type": CALLBACK_PONG })).into_response(),
        INTERACTION_AUTOCOMPLETE => autocomplete(&interaction),
        INTERACTION_APPLICATION_COMMAND => command(state, interaction),
        other => reject(
            StatusCode::BAD_REQUEST,
            &format!("unsupported interaction type {other}"),
        ),
    }
}

/// Answer the filing-type autocomplete inline
fn autocomplete(interaction: &Interaction) -> Response {
    let prefix = interaction
        .data
        .as_ref()
        .and_then(|d| d.focused_option())
        .and_then(|o| o.as_str())
        .unwrap_or("");
    let choices = filing_choices(prefix);
    Json(json!({
        "type": CALLBACK_AUTOCOMPLETE_RESULT,
        "data": { "choices": choices },
    }))
    .into_response()
}

/// Defer immediately and fulfill the command on the followup webhook
fn command(state: Arc<AppState>, interaction: Interaction) -> Response {
    let Some(data) = interaction.data.clone() else {
        return reject(StatusCode::BAD_REQUEST, "command interaction without data");
    };
    let user_id = interaction.user_id().map(str::to_string);
    let token = interaction.token.clone();

    tokio::spawn(async move {
        let outcome = state.commands.dispatch(&data, user_id.as_deref()).await;
        match outcome {
            Ok(model) => {
                if let Err(err) = state.showview.deliver(&token, &model).await {
                    error!(command = %data.name, %err, "followup delivery failed");
                }
            },
            Err(err) => {
                warn!(command = %data.name, %err, "command failed");
                if let Err(err) = state.showview.deliver_error(&token, &data.name, &err).await {
                    error!(command = %data.name, %err, "error followup delivery failed");
                }
            },
        }
    });

    Json(json!({ "type": CALLBACK_DEFERRED_CHANNEL_MESSAGE })).into_response()
}

fn filing_choices(prefix: &str) -> Vec<Choice> {
    matching_filing_types(prefix)
        .into_iter()
        .map(|form| Choice::new(form, form))
        .collect()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn reject(status: StatusCode, reason: &str) -> Response {
    (status, Json(ErrorEnvelope::new(reason))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filing_choices_prefix() {
        let choices = filing_choices("10");
        assert!(choices.iter().any(|c| c.value == "10-K"));
        assert!(choices.iter().all(|c| c.name == c.value));
        assert!(choices.len() <= 25);
    }

    #[test]
    fn test_filing_choices_empty_prefix_capped() {
        assert_eq!(filing_choices("").len(), 25);
    }

    #[test]
    fn test_header_str_missing() {
        let headers = HeaderMap::new();
        assert!(header_str(&headers, "X-Signature-Ed25519").is_none());
    }
}
