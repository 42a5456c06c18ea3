//! GitHub OAuth client.
//!
//! Two provider operations back the GitHub sign-in flow: exchanging an
//! authorization code for an access token, and fetching the user's primary
//! email. Both cross a network boundary we do not control, so the HTTP
//! client carries a request timeout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";
const EMAILS_ENDPOINT: &str = "https://api.github.com/user/emails";
const USER_AGENT: &str = concat!("gatepass/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String>;

    /// Fetch the email to key the account on, or None if the provider
    /// exposes no address.
    async fn fetch_primary_email(&self, access_token: &str) -> Result<Option<String>>;
}

pub struct GithubOAuth {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmailEntry {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
}

/// Prefer the primary verified address, then any verified one, then whatever
/// GitHub listed first.
pub(crate) fn pick_email(mut emails: Vec<EmailEntry>) -> Option<String> {
    if let Some(pos) = emails.iter().position(|e| e.primary && e.verified) {
        return Some(emails.swap_remove(pos).email);
    }
    if let Some(pos) = emails.iter().position(|e| e.verified) {
        return Some(emails.swap_remove(pos).email);
    }
    emails.into_iter().next().map(|e| e.email)
}

impl GithubOAuth {
    pub fn new(client_id: String, client_secret: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            client_id,
            client_secret,
        })
    }
}

#[async_trait]
impl OAuthProvider for GithubOAuth {
    async fn exchange_code(&self, code: &str) -> Result<String> {
        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .context("Failed to exchange authorization code")?;

        let token: TokenResponse = response
            .error_for_status()
            .context("GitHub rejected the authorization code")?
            .json()
            .await
            .context("Failed to parse token response")?;

        Ok(token.access_token)
    }

    async fn fetch_primary_email(&self, access_token: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(EMAILS_ENDPOINT)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .context("Failed to fetch user emails")?;

        let emails: Vec<EmailEntry> = response
            .error_for_status()
            .context("GitHub rejected the access token")?
            .json()
            .await
            .context("Failed to parse email response")?;

        Ok(pick_email(emails))
    }
}
