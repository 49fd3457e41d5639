use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::app_state::AppState;
use crate::models::message::Update;

/// POST /{token}/: Telegram webhook. Always acknowledges with "Ok" once the path
/// secret matches, whatever happened downstream.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    Path(secret): Path<String>,
    Json(update): Json<Update>,
) -> Result<&'static str, StatusCode> {
    if !constant_time_eq(&secret, &state.webhook_secret) {
        return Err(StatusCode::NOT_FOUND);
    }
    dispatch(&state, update).await;
    Ok("Ok")
}

/// POST /loadTest/: synthetic load, handled exactly like a webhook call.
pub async fn load_test(State(state): State<AppState>, Json(update): Json<Update>) -> &'static str {
    dispatch(&state, update).await;
    "Ok"
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

async fn dispatch(state: &AppState, update: Update) {
    let Some(message) = update.message else {
        tracing::debug!(update_id = update.update_id, "Update without a message ignored");
        return;
    };

    match state.router.handle_message(&message).await {
        Ok(outcome) => {
            tracing::info!(
                update_id = update.update_id,
                chat_id = message.chat_id(),
                outcome = %outcome,
                "Message handled"
            );
        }
        Err(e) => {
            tracing::error!(
                update_id = update.update_id,
                chat_id = message.chat_id(),
                error = %e,
                "Message handling aborted by messaging platform error"
            );
        }
    }
}
