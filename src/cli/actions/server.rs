use crate::api::{self, AppConfig, Backend};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<SecretString>,
    pub expose_store_errors: bool,
    pub session_ttl_seconds: i64,
    pub session_cookie_secure: bool,
    pub min_instructions_length: usize,
    pub cors_origin: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the DSN is invalid, the database is unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let backend = match args.dsn {
        Some(dsn) => {
            info!("Using PostgreSQL at {}", redacted_dsn(&dsn)?);
            Backend::Postgres(dsn)
        }
        None => Backend::Memory,
    };

    let config = AppConfig::default()
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_cookie_secure(args.session_cookie_secure)
        .with_min_instructions_length(args.min_instructions_length)
        .with_expose_store_errors(args.expose_store_errors)
        .with_cors_origin(args.cors_origin);

    let result = api::new(args.port, backend, config).await;

    crate::cli::telemetry::shutdown_tracer();

    result
}

/// The DSN with its password masked, safe to log.
fn redacted_dsn(dsn: &SecretString) -> Result<String> {
    let mut url = Url::parse(dsn.expose_secret()).context("Invalid database DSN")?;
    if url.password().is_some() {
        // Only fails for URLs that cannot carry credentials, which already have none.
        let _ = url.set_password(Some("****"));
    }
    Ok(url.to_string())
}
