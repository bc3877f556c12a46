// crates/rehash-core/src/db.rs

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::config::DbParams;
use crate::error::Result;

pub type DbPool = sqlx::PgPool;

/// Establishes a connection pool to the PostgreSQL database behind the
/// tunnel. `port` is the tunnel's local forwarded port, so it varies per
/// run and is passed in rather than read from the params.
pub async fn connect(params: &DbParams, port: u16) -> Result<DbPool> {
    let options = PgConnectOptions::new()
        .host(&params.host)
        .port(port)
        .database(&params.dbname)
        .username(&params.user)
        .password(&params.password);

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await?;

    Ok(pool)
}
