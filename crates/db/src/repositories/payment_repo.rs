//! Repository for the `payments` ledger.

use sqlx::PgPool;

use crate::models::payment::{CreatePayment, LeaderboardEntry, Payment};

/// Provides data access for the payment ledger.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Append a payment.
    pub async fn create(pool: &PgPool, dto: &CreatePayment) -> Result<Payment, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (subject, amount) VALUES ($1, $2) \
             RETURNING id, subject, amount, paid_at",
        )
        .bind(dto.subject.trim())
        .bind(dto.amount)
        .fetch_one(pool)
        .await
    }

    /// Sum of every payment ever recorded.
    pub async fn total(pool: &PgPool) -> Result<f64, sqlx::Error> {
        let (total,): (f64,) =
            sqlx::query_as("SELECT COALESCE(SUM(amount), 0)::DOUBLE PRECISION FROM payments")
                .fetch_one(pool)
                .await?;
        Ok(total)
    }

    /// Total paid per subject, highest first.
    pub async fn leaderboard(pool: &PgPool) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardEntry>(
            "SELECT subject, SUM(amount) AS total_paid \
             FROM payments \
             GROUP BY subject \
             ORDER BY total_paid DESC, subject",
        )
        .fetch_all(pool)
        .await
    }
}
