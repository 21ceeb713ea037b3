use crate::config::CONFIG;
use crate::error::DBError;

macro_rules! sql_stmnt {
    ($ret:ident, $stmt:expr) => {
        sqlx::query_as::<_ ,$ret>($stmt)
    };
    ($stmt:expr) => {
        sqlx::query($stmt)
    };
    ($ret:ident, $stmt:expr, $($bind:expr),*) => {
        sqlx::query_as::<_ ,$ret>($stmt)$(.bind($bind))*
    };
    ($stmt:expr, $($bind:expr),*) => {
        sqlx::query($stmt)$(.bind($bind))*
    };
}

pub async fn establish_db_connection() -> Option<sqlx::PgPool> {
    let database_url = CONFIG.database_url();
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(CONFIG.db_max_connections())
        .connect(&database_url)
        .await
        .ok()
}

pub async fn run_migrations(conn: &sqlx::PgPool) -> Result<(), DBError> {
    sqlx::migrate!("./migrations").run(conn).await?;
    Ok(())
}

pub async fn check_schema(conn: &sqlx::PgPool) -> Result<(), DBError> {
    sql_stmnt!("SELECT count(*) as count FROM irrigation_data")
        .fetch_one(conn)
        .await?;
    Ok(())
}

pub mod irrigation_data;
