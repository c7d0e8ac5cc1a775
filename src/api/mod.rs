use crate::{
    accounts::PasswordHashing,
    store::{CredentialStore, MemoryStore, PgStore, SessionStore},
};
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span, warn};
use ulid::Ulid;
use url::Url;
use utoipa_axum::router::OpenApiRouter;

pub mod handlers;
mod openapi;
pub mod state;

pub use openapi::openapi;
pub use state::{AppConfig, AppState};

/// Where users, recipes and sessions live.
pub enum Backend {
    Postgres(SecretString),
    Memory,
}

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// The routes plus request id, tracing and state layers, ready to serve.
///
/// # Errors
/// Returns an error if the configured CORS origin is not a valid URL.
pub fn app(state: Arc<AppState>) -> Result<Router> {
    let cors = state
        .config()
        .cors_origin()
        .map(|origin| {
            cors_origin(origin).map(|origin| {
                CorsLayer::new()
                    .allow_headers([CONTENT_TYPE, AUTHORIZATION])
                    .allow_methods([Method::GET, Method::POST, Method::DELETE])
                    .allow_origin(AllowOrigin::exact(origin))
                    .allow_credentials(true)
            })
        })
        .transpose()?;

    let (router, _openapi) = router().split_for_parts();
    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    Ok(router.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(Extension(state)),
    ))
}

/// Start the server
/// # Errors
/// Return error if failed to connect to the store or to start the server
pub async fn new(port: u16, backend: Backend, config: AppConfig) -> Result<()> {
    let (credentials, sessions): (Arc<dyn CredentialStore>, Arc<dyn SessionStore>) =
        match backend {
            Backend::Postgres(dsn) => {
                let pool = PgPoolOptions::new()
                    .min_connections(1)
                    .max_connections(5)
                    .max_lifetime(Duration::from_secs(60 * 2))
                    .test_before_acquire(true)
                    .connect(dsn.expose_secret())
                    .await
                    .context("Failed to connect to database")?;

                let store = Arc::new(PgStore::new(pool));
                store
                    .ensure_schema()
                    .await
                    .context("Failed to apply database schema")?;
                (
                    store.clone() as Arc<dyn CredentialStore>,
                    store as Arc<dyn SessionStore>,
                )
            }
            Backend::Memory => {
                warn!("Using the in-memory store; data is lost on exit");
                let store = Arc::new(MemoryStore::new());
                (
                    store.clone() as Arc<dyn CredentialStore>,
                    store as Arc<dyn SessionStore>,
                )
            }
        };

    let state = Arc::new(AppState::new(
        config,
        credentials,
        sessions,
        PasswordHashing::default(),
    ));
    let app = app(state)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn cors_origin(origin: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(origin).with_context(|| format!("Invalid CORS origin: {origin}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("CORS origin must include a valid host: {origin}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build CORS origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origin_strips_path_and_keeps_port() -> Result<()> {
        assert_eq!(
            cors_origin("https://recipes.example.com:8443/app/")?,
            "https://recipes.example.com:8443"
        );
        assert_eq!(cors_origin("http://localhost")?, "http://localhost");
        Ok(())
    }

    #[test]
    fn cors_origin_rejects_garbage() {
        assert!(cors_origin("not a url").is_err());
        assert!(cors_origin("data:text/plain,hi").is_err());
    }

    #[test]
    fn app_rejects_invalid_cors_origin() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            AppConfig::default().with_cors_origin(Some("nope".to_string())),
            store.clone(),
            store,
            PasswordHashing::fast(),
        );
        assert!(app(Arc::new(state)).is_err());
    }
}
