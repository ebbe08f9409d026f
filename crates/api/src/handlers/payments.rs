//! Handlers for the `/payments` ledger.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use watchgate_db::models::payment::{CreatePayment, LeaderboardEntry, Payment};
use watchgate_db::repositories::PaymentRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PaymentTotal {
    pub total: f64,
}

/// POST /api/v1/payments
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePayment>,
) -> AppResult<(StatusCode, Json<DataResponse<Payment>>)> {
    input.validate()?;
    let input = CreatePayment {
        subject: input.subject.trim().to_string(),
        amount: input.amount,
    };

    let payment = PaymentRepo::create(&state.pool, &input).await?;
    tracing::info!(payment_id = payment.id, subject = %payment.subject, amount = payment.amount, "Payment recorded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: payment })))
}

/// GET /api/v1/payments/total
pub async fn total(State(state): State<AppState>) -> AppResult<Json<DataResponse<PaymentTotal>>> {
    let total = PaymentRepo::total(&state.pool).await?;
    Ok(Json(DataResponse {
        data: PaymentTotal { total },
    }))
}

/// GET /api/v1/payments/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<LeaderboardEntry>>>> {
    let entries = PaymentRepo::leaderboard(&state.pool).await?;
    Ok(Json(DataResponse { data: entries }))
}
