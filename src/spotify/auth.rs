use std::{fmt, sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config::Config,
    info,
    management::TokenManager,
    server,
    types::{AuthFlowState, Token},
    utils, warning,
};

/// Failure to obtain a usable access credential. Always fatal for the run.
#[derive(Debug)]
pub enum AuthError {
    /// No cached token and the process runs unattended; the interactive flow
    /// is never attempted so batch runs cannot hang on a browser.
    NoCachedToken,
    Refresh(String),
    /// The callback captured a code but the code→token exchange failed.
    Exchange(String),
    /// The interactive flow did not observe a callback within the bound.
    Timeout(u64),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NoCachedToken => {
                write!(f, "no cached token and interactive authorization is disabled")
            }
            AuthError::Refresh(e) => write!(f, "token refresh failed: {}", e),
            AuthError::Exchange(e) => write!(f, "token exchange failed: {}", e),
            AuthError::Timeout(secs) => {
                write!(f, "authorization timed out after {} seconds", secs)
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Obtains a valid token: cached, refreshed, or interactively authorized.
///
/// The cached token is returned without any network round-trip when it is
/// still valid. An expired cache is refreshed in place. Only when neither
/// works does the interactive flow start, and never in unattended mode.
pub async fn acquire_token(cfg: &Config) -> Result<Token, AuthError> {
    match TokenManager::load().await {
        Ok(mut manager) => {
            if !manager.is_expired() {
                return Ok(manager.current_token().clone());
            }
            match manager.get_valid_token(cfg).await {
                Ok(_) => return Ok(manager.current_token().clone()),
                Err(e) if cfg.unattended => return Err(AuthError::Refresh(e)),
                Err(e) => {
                    warning!("Token refresh failed ({}); re-authorizing interactively.", e);
                }
            }
        }
        Err(_) if cfg.unattended => return Err(AuthError::NoCachedToken),
        Err(_) => {}
    }

    interactive(cfg).await
}

/// Drives the interactive authorization-code flow.
///
/// Starts a single-use callback server on the first free port at or above the
/// configured base, opens the authorize URL (PKCE challenge plus anti-forgery
/// state) in the default browser, and polls the shared slot until the
/// callback has exchanged the code or the configured timeout elapses. The
/// obtained token is persisted to the cache before returning.
pub async fn interactive(cfg: &Config) -> Result<Token, AuthError> {
    if cfg.unattended {
        return Err(AuthError::NoCachedToken);
    }

    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let port = server::find_available_port(cfg.callback_base_port);
    let redirect_uri = cfg.redirect_uri(port);

    let shared_state: Arc<Mutex<Option<AuthFlowState>>> =
        Arc::new(Mutex::new(Some(AuthFlowState {
            code_verifier: Some(code_verifier),
            state: state.clone(),
            redirect_uri: redirect_uri.clone(),
            token: None,
        })));

    let server_state = Arc::clone(&shared_state);
    let server_cfg = cfg.clone();
    tokio::spawn(async move {
        server::start_callback_server(server_cfg, port, server_state).await;
    });

    let auth_url = format!(
        "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}&state={state}",
        auth_url = cfg.auth_url,
        client_id = cfg.client_id,
        redirect_uri = redirect_uri,
        code_challenge = code_challenge,
        scope = cfg.scope.replace(' ', "%20"),
        state = state,
    );

    info!("Waiting for authorization on port {}...", port);
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    }

    let token = match wait_for_token(shared_state, cfg.auth_timeout_secs).await {
        Some(Ok(token)) => token,
        Some(Err(e)) => return Err(AuthError::Exchange(e)),
        None => return Err(AuthError::Timeout(cfg.auth_timeout_secs)),
    };

    let manager = TokenManager::new(token.clone());
    if let Err(e) = manager.persist().await {
        warning!("Failed to save token to cache: {}", e);
    }

    Ok(token)
}

/// Polls the shared slot for the exchange outcome, success or failure.
///
/// 1 second interval, bounded by `timeout_secs`. Runs concurrently with the
/// callback handler that populates the slot; human-scale latency makes the
/// poll harmless. `None` means no callback arrived inside the bound.
async fn wait_for_token(
    shared_state: Arc<Mutex<Option<AuthFlowState>>>,
    timeout_secs: u64,
) -> Option<Result<Token, String>> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(timeout_secs);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(flow) = lock.as_ref() {
            if let Some(outcome) = &flow.token {
                return Some(outcome.clone());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code for tokens, completing the PKCE flow.
///
/// The code is single-use and short-lived; the exchange happens immediately
/// inside the callback handler.
pub async fn exchange_code_pkce(
    cfg: &Config,
    code: &str,
    verifier: &str,
    redirect_uri: &str,
) -> Result<Token, reqwest::Error> {
    let client = Client::new();
    let res = client
        .post(&cfg.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", &cfg.client_id),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json: Value = res.json().await?;

    Ok(Token {
        access_token: json["access_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
        obtained_at: Utc::now().timestamp() as u64,
    })
}
