//! Hosted OAuth endpoints for a browser-based frontend.
//!
//! The frontend never sees the client secret: `/login` issues the authorize
//! redirect with an anti-forgery state cookie, `/callback` validates the
//! state and exchanges the code server-side, and `/refresh_token` trades a
//! refresh token for a fresh access token. Token exchange authenticates with
//! the Basic scheme (`client_id:client_secret`, base64).

use std::collections::HashMap;

use axum::{
    Extension,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Json, Redirect},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde_json::{Value, json};

use crate::{config::Config, utils};

pub const STATE_COOKIE: &str = "spotify_auth_state";

/// `GET /login` — redirects to the provider's authorize URL with a fresh
/// anti-forgery state value stored in a cookie.
pub async fn login(Extension(cfg): Extension<Config>) -> impl IntoResponse {
    let state = utils::generate_state();
    let url = format!(
        "{auth_url}?response_type=code&client_id={client_id}&scope={scope}&redirect_uri={redirect_uri}&state={state}",
        auth_url = cfg.auth_url,
        client_id = cfg.client_id,
        scope = cfg.scope.replace(' ', "%20"),
        redirect_uri = cfg.hosted_redirect_uri(),
        state = state,
    );

    (
        AppendHeaders([(
            header::SET_COOKIE,
            format!("{}={}; Path=/; HttpOnly", STATE_COOKIE, state),
        )]),
        Redirect::temporary(&url),
    )
}

/// `GET /callback` — validates the returned state against the cookie and
/// exchanges the code for tokens. A state mismatch is rejected with 400
/// before any exchange is attempted; on success the tokens are set as
/// cookies and the browser is redirected to the application root.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Extension(cfg): Extension<Config>,
) -> axum::response::Response {
    let returned = params.get("state").map(String::as_str);
    let stored = cookie_value(&headers, STATE_COOKIE);

    if !states_match(stored.as_deref(), returned) {
        return (StatusCode::BAD_REQUEST, "State mismatch").into_response();
    }

    let Some(code) = params.get("code") else {
        return (StatusCode::BAD_REQUEST, "Missing authorization code").into_response();
    };

    let client = Client::new();
    let response = client
        .post(&cfg.token_url)
        .header(header::AUTHORIZATION, basic_auth(&cfg))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &cfg.hosted_redirect_uri()),
        ])
        .send()
        .await;

    let json: Value = match response {
        Ok(resp) if resp.status().is_success() => match resp.json().await {
            Ok(json) => json,
            Err(_) => {
                return (StatusCode::BAD_REQUEST, "Malformed token response").into_response();
            }
        },
        _ => return (StatusCode::BAD_REQUEST, "Token exchange failed").into_response(),
    };

    let access_token = json["access_token"].as_str().unwrap_or_default();
    let refresh_token = json["refresh_token"].as_str().unwrap_or_default();

    (
        AppendHeaders([
            // clear the single-use state cookie
            (
                header::SET_COOKIE,
                format!("{}=; Path=/; Max-Age=0", STATE_COOKIE),
            ),
            (
                header::SET_COOKIE,
                format!("accessToken={}; Path=/", access_token),
            ),
            (
                header::SET_COOKIE,
                format!("refreshToken={}; Path=/", refresh_token),
            ),
        ]),
        Redirect::temporary(&cfg.app_base_uri),
    )
        .into_response()
}

/// `GET /refresh_token?refresh_token=…` — exchanges a refresh token for a new
/// access token and returns it as JSON. Upstream failure maps to 400.
pub async fn refresh_token(
    Query(params): Query<HashMap<String, String>>,
    Extension(cfg): Extension<Config>,
) -> Result<Json<Value>, StatusCode> {
    let refresh = params
        .get("refresh_token")
        .ok_or(StatusCode::BAD_REQUEST)?;

    let client = Client::new();
    let response = client
        .post(&cfg.token_url)
        .header(header::AUTHORIZATION, basic_auth(&cfg))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh.as_str()),
        ])
        .send()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    if !response.status().is_success() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let json: Value = response
        .json()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    Ok(Json(json!({
        "access_token": json["access_token"].as_str().unwrap_or_default()
    })))
}

/// A callback is only accepted when both the cookie and the returned value
/// are present and equal.
pub fn states_match(stored: Option<&str>, returned: Option<&str>) -> bool {
    match (stored, returned) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Extracts a value from the `Cookie` request header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

fn basic_auth(cfg: &Config) -> String {
    let raw = format!("{}:{}", cfg.client_id, cfg.client_secret);
    format!("Basic {}", STANDARD.encode(raw))
}
