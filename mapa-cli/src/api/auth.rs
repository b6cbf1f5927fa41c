//! Azure AD token acquisition

use reqwest::{Client, Url};
use serde::Deserialize;

use super::client::FetchError;
use crate::config::SourceConfig;

const AUTHORITY: &str = "https://login.microsoftonline.com";

/// Bearer token for SharePoint REST calls
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Token endpoint for a tenant
pub fn token_url(tenant: &str) -> String {
    format!("{}/{}/oauth2/v2.0/token", AUTHORITY, urlencoding::encode(tenant))
}

/// Scope covering every SharePoint API of the site's host
pub fn sharepoint_scope(site_url: &str) -> Result<String, FetchError> {
    let url = Url::parse(site_url)
        .map_err(|e| FetchError::Config(format!("invalid site URL '{}': {}", site_url, e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| FetchError::Config(format!("site URL '{}' has no host", site_url)))?;
    Ok(format!("{}://{}/.default", url.scheme(), host))
}

/// Form body of the password grant
pub fn password_grant_body(config: &SourceConfig, password: &str, scope: &str) -> String {
    [
        ("grant_type", "password"),
        ("client_id", config.client_id.as_str()),
        ("username", config.username.as_str()),
        ("password", password),
        ("scope", scope),
    ]
    .iter()
    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
    .collect::<Vec<_>>()
    .join("&")
}

/// Request an access token with the configured user credentials
pub async fn acquire_token(
    http: &Client,
    config: &SourceConfig,
    password: &str,
) -> Result<AccessToken, FetchError> {
    let scope = sharepoint_scope(&config.site_url)?;
    let url = token_url(&config.tenant);

    log::debug!("Requesting SharePoint token for {} from {}", config.username, url);

    let response = http
        .post(&url)
        .header(
            reqwest::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(password_grant_body(config, password, &scope))
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    if !status.is_success() {
        let detail = serde_json::from_str::<TokenErrorResponse>(&text)
            .map(|e| match e.error_description {
                Some(desc) => format!("{}: {}", e.error, desc),
                None => e.error,
            })
            .unwrap_or(text);
        return Err(FetchError::Authentication(format!("{} ({})", detail, status)));
    }

    let parsed: TokenResponse = serde_json::from_str(&text)
        .map_err(|e| FetchError::Authentication(format!("unexpected token response: {}", e)))?;

    if let Some(seconds) = parsed.expires_in {
        log::debug!("Access token valid for {}s", seconds);
    }

    Ok(AccessToken {
        token: parsed.access_token,
    })
}
