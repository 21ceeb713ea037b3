use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub struct Config {
    inner: RwLock<InnerConfig>,
}

struct InnerConfig {
    database_url: String,
    db_max_connections: u32,
    server_port: u16,
    query_timeout_ms: u64,
    log_level: String,
    trace_stdout: bool,
}

impl Config {
    pub fn database_url(&self) -> String {
        let inner = self.inner.read();
        inner.database_url.clone()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner.read().db_max_connections
    }

    pub fn server_port(&self) -> u16 {
        self.inner.read().server_port
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.inner.read().query_timeout_ms)
    }

    pub fn log_level(&self) -> String {
        let inner = self.inner.read();
        inner.log_level.clone()
    }

    pub fn trace_stdout(&self) -> bool {
        self.inner.read().trace_stdout
    }
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{} is not valid: {}", key, value)),
        Err(_) => default,
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv::dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db_max_connections = var_or("DB_MAX_CONNECTIONS", 5);
    let server_port = var_or("SERVER_PORT", 8080);
    let query_timeout_ms = var_or("QUERY_TIMEOUT_MS", 30_000);
    let log_level = var_or("LOG_LEVEL", "info".to_owned());
    let trace_stdout = var_or("TRACE_STDOUT", false);

    if db_max_connections == 0 {
        panic!("DB_MAX_CONNECTIONS must be positive");
    }

    Config {
        inner: RwLock::new(InnerConfig {
            database_url,
            db_max_connections,
            server_port,
            query_timeout_ms,
            log_level,
            trace_stdout,
        }),
    }
});
