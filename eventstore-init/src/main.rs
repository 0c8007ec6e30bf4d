//! Event store schema bootstrap.
//!
//! # Usage
//!
//! ```bash
//! DATABASE_URL=postgres://... eventstore-init
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `EVENTSTORE_ENV`: Environment (test, development, production)

mod config;
mod error;

use config::Config;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("eventstore_init=info".parse()?))
        .init();

    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "event store schema bootstrap"
    );

    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    eventstore_postgres::initialize(&pool).await?;

    info!("schema bootstrap complete");
    Ok(())
}
