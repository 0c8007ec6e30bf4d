//! Schema bootstrap.

use crate::dialect;
use sqlx::PgPool;
use tracing::info;

/// Run the idempotent schema bootstrap. Safe to call on every process
/// start: `CREATE ... IF NOT EXISTS` tolerates an already-initialized
/// database rather than erroring.
pub async fn initialize(pool: &PgPool) -> Result<(), sqlx::Error> {
    // `dialect::SCHEMA` is several statements; the extended query
    // protocol `sqlx::query` uses doesn't allow that, so this goes
    // through the simple query protocol instead.
    sqlx::raw_sql(dialect::SCHEMA).execute(pool).await?;
    info!("event store schema ready");
    Ok(())
}
