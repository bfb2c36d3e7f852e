use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{config::Config, spotify, types::AuthFlowState, warning};

/// Handles the single OAuth redirect of the local loopback flow.
///
/// Validates the returned anti-forgery state against the value issued when
/// the flow started, then exchanges the authorization code using the PKCE
/// verifier stored in the shared slot. The verifier is consumed on first use,
/// so a replayed redirect finds nothing to exchange.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthFlowState>>>>,
    Extension(cfg): Extension<Config>,
) -> Html<&'static str> {
    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut slot = shared_state.lock().await;
    let Some(flow) = slot.as_mut() else {
        return Html("<h4>No authorization flow in progress.</h4>");
    };

    if params.get("state").map(String::as_str) != Some(flow.state.as_str()) {
        warning!("Callback state mismatch; discarding authorization code.");
        return Html("<h4>State mismatch.</h4>");
    }

    let Some(verifier) = flow.code_verifier.take() else {
        return Html("<h4>Authorization code already processed.</h4>");
    };

    let redirect_uri = flow.redirect_uri.clone();
    match spotify::auth::exchange_code_pkce(&cfg, code, &verifier, &redirect_uri).await {
        Ok(token) => {
            flow.token = Some(Ok(token));
            Html("<h2>Authentication successful.</h2><p>You can close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            // The waiting flow reads this and aborts; no point running out
            // the timeout on a dead exchange.
            flow.token = Some(Err(e.to_string()));
            Html("<h4>Login failed.</h4>")
        }
    }
}
