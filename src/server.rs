use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tokio::sync::Mutex;

use crate::{api, config::Config, types::AuthFlowState};

/// Finds the first free loopback port at or above `base` by linear probe.
///
/// The bind test releases the port immediately; the race window until the
/// server binds it again is harmless for a single local flow.
pub fn find_available_port(base: u16) -> u16 {
    let mut port = base;
    loop {
        if std::net::TcpListener::bind(("127.0.0.1", port)).is_ok() {
            return port;
        }
        port += 1;
    }
}

/// Runs the short-lived local server that captures one OAuth redirect.
///
/// The shared slot is handed in at construction; the callback handler fills
/// it with the exchanged token and the waiting flow shuts the process of
/// polling down once it appears. The task is dropped with the runtime when
/// the CLI command finishes.
pub async fn start_callback_server(cfg: Config, port: u16, state: Arc<Mutex<Option<AuthFlowState>>>) {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state))
        .layer(Extension(cfg));

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Runs the hosted variant: `/login`, `/callback` and `/refresh_token` for a
/// browser-based frontend, replacing the local loopback capture.
pub async fn start_hosted_server(cfg: Config) -> crate::Res<()> {
    let addr = cfg.hosted_addr.clone();
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::hosted::login))
        .route("/callback", get(api::hosted::callback))
        .route("/refresh_token", get(api::hosted::refresh_token))
        .layer(Extension(cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
