use crate::{config::Config, error, spotify, success};

/// Forces a fresh interactive authorization, replacing any cached token.
pub async fn auth(cfg: &Config) {
    match spotify::auth::interactive(cfg).await {
        Ok(_) => success!("Authentication successful!"),
        Err(e) => error!("Authentication failed: {}", e),
    }
}
