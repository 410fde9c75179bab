//! Webhook server for the expense agent
//!
//! Receives the messaging provider's form-encoded webhook, runs the
//! interpreter synchronously, and answers with a TwiML envelope so the
//! provider relays the reply back over WhatsApp.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::interpreter::Interpreter;

/// =============================
/// Request Models
/// =============================

/// The provider posts the message text as `Body` and the sender as `From`
/// (formatted `<protocol>:<address>`, e.g. `whatsapp:+5511999999999`).
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "From", default)]
    pub from: String,
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub interpreter: Arc<Interpreter>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Webhook Endpoint
/// =============================

async fn webhook(
    State(state): State<ApiState>,
    Form(payload): Form<WebhookPayload>,
) -> impl IntoResponse {
    info!("Inbound webhook from {}", payload.from);

    let reply = state
        .interpreter
        .process_message(&payload.body, &payload.from)
        .await;

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        twiml_message(&reply),
    )
}

/// Wrap a reply in the provider's TwiML envelope.
fn twiml_message(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// =============================
/// Router
/// =============================

pub fn create_router(interpreter: Arc<Interpreter>) -> Router {
    let state = ApiState { interpreter };

    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    interpreter: Arc<Interpreter>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(interpreter);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Webhook server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
