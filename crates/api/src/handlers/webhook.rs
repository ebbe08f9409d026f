//! Media server webhook ingress.
//!
//! The media server disables webhooks that keep failing, so every delivery is
//! answered with `200 OK`: malformed payloads are dropped and processing
//! errors are logged, never returned.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use watchgate_core::playback::PlaybackEvent;
use watchgate_core::types::Timestamp;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, WEBHOOK_ACK};
use crate::state::AppState;

/// Form field carrying the JSON payload in form-encoded deliveries.
pub const PAYLOAD_FIELD: &str = "payload";

/// POST /webhook
///
/// Only decoding happens inside the request; the event is processed on a
/// task tracked by [`AppState::webhook_tasks`] after the acknowledgement.
pub async fn receive(State(state): State<AppState>, request: Request) -> (StatusCode, &'static str) {
    state.monitor.record();

    let event = match decode(request).await {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping malformed webhook");
            return (StatusCode::OK, WEBHOOK_ACK);
        }
    };

    let processor = Arc::clone(&state.processor);
    state.webhook_tasks.spawn(async move {
        match processor.process(&event).await {
            Ok(outcome) => {
                tracing::debug!(subject = %event.subject, ?outcome, "Webhook processed");
            }
            Err(e) => {
                tracing::error!(
                    subject = %event.subject,
                    event = event.kind.as_str(),
                    error = %e,
                    "Failed to process webhook",
                );
            }
        }
    });

    (StatusCode::OK, WEBHOOK_ACK)
}

#[derive(Debug, Deserialize)]
struct PayloadForm {
    payload: String,
}

/// Decode either encoding the media server uses into a canonical event.
///
/// - `multipart/form-data` with a `payload` field holding JSON
/// - `application/x-www-form-urlencoded` with the same field
/// - anything else is read as a raw JSON body
async fn decode(request: Request) -> AppResult<PlaybackEvent> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            if field.name() == Some(PAYLOAD_FIELD) {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                return Ok(PlaybackEvent::from_json_str(&text)?);
            }
        }
        return Err(AppError::BadRequest(format!(
            "multipart body has no '{PAYLOAD_FIELD}' field"
        )));
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<PayloadForm>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        return Ok(PlaybackEvent::from_json_str(&form.payload)?);
    }

    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(PlaybackEvent::from_json_slice(&body)?)
}

/// Acknowledgement of a synthetic webhook.
#[derive(Debug, Serialize)]
pub struct TestWebhook {
    pub received_at: Timestamp,
}

/// POST /api/v1/webhook/test
///
/// Record a synthetic delivery so operators can check the health readout.
pub async fn test(State(state): State<AppState>) -> Json<DataResponse<TestWebhook>> {
    let received_at = state.monitor.record();
    tracing::info!(%received_at, "Test webhook recorded");
    Json(DataResponse {
        data: TestWebhook { received_at },
    })
}
