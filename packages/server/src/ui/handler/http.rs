//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::infrastructure::mailer::ContactForm;
use crate::ui::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Contact form endpoint. Hands the form to the configured mailer; never
/// touches queue or session state.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ContactForm>,
) -> Result<&'static str, (StatusCode, &'static str)> {
    match state.mailer.send_contact(form).await {
        Ok(()) => Ok("Email sent successfully"),
        Err(e) => {
            tracing::error!("Failed to deliver contact form: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Error sending email"))
        }
    }
}
