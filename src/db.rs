//! Database module
//!
//! Connectivity check and bootstrap of the `transactions` table.

use sqlx::PgPool;

/// Verify the database is reachable
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Create the ledger table if it does not exist yet.
///
/// Not a migration tool: an existing table is left untouched.
pub async fn create_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id          BIGINT PRIMARY KEY,
            date        TEXT NOT NULL,
            description VARCHAR(255) NOT NULL,
            debit       NUMERIC(28, 8) NULL,
            credit      NUMERIC(28, 8) NULL,
            balance     NUMERIC(28, 8) NOT NULL,
            CONSTRAINT transactions_one_movement CHECK ((debit IS NULL) <> (credit IS NULL)),
            CONSTRAINT transactions_non_negative CHECK (COALESCE(debit, credit) >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Ledger schema ensured");
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let required_tables = ["transactions"];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}
