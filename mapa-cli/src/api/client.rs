//! SharePoint file download

use std::time::Duration;

use reqwest::Client;

use super::auth::{AccessToken, acquire_token};
use crate::config::SourceConfig;

/// The source workbook could not be downloaded
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Missing or malformed source settings
    Config(String),
    /// Credentials were refused or the token response was unusable
    Authentication(String),
    /// Network failure talking to SharePoint or the token endpoint
    Transport(String),
    /// SharePoint answered with a non-success status
    Status { status: u16, body: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Config(msg) => write!(f, "invalid source configuration: {}", msg),
            FetchError::Authentication(msg) => write!(f, "authentication failed: {}", msg),
            FetchError::Transport(msg) => write!(f, "request failed: {}", msg),
            FetchError::Status { status, body } => {
                write!(f, "SharePoint returned {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Downloads the launch-map workbook from a SharePoint document library
pub struct SharePointClient {
    http: Client,
    config: SourceConfig,
}

impl SharePointClient {
    pub fn new(config: SourceConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .map_err(|e| FetchError::Config(format!("failed to construct HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    /// REST endpoint returning the raw bytes of the configured file
    pub fn download_url(&self) -> String {
        file_value_url(&self.config.site_url, &self.config.file_path)
    }

    /// Authenticate and download the file
    pub async fn download(&self, password: &str) -> Result<Vec<u8>, FetchError> {
        if self.config.username.is_empty() {
            return Err(FetchError::Config("SharePoint username is not set".into()));
        }

        let token = acquire_token(&self.http, &self.config, password).await?;
        self.download_with_token(&token).await
    }

    pub async fn download_with_token(&self, token: &AccessToken) -> Result<Vec<u8>, FetchError> {
        let url = self.download_url();
        log::info!("Downloading {}", self.config.file_path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token.token)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        log::info!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// `GetFileByServerRelativeUrl('<path>')/$value` under the site's REST API
pub fn file_value_url(site_url: &str, server_relative_path: &str) -> String {
    let escaped = server_relative_path.replace('\'', "''");
    format!(
        "{}/_api/web/GetFileByServerRelativeUrl('{}')/$value",
        site_url.trim_end_matches('/'),
        urlencoding::encode(&escaped)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_value_url() {
        let url = file_value_url(
            "https://contoso.sharepoint.com/sites/Catalogo/",
            "/sites/Catalogo/Documentos Compartilhados/Mapa d'Ouro.xlsb",
        );
        assert_eq!(
            url,
            "https://contoso.sharepoint.com/sites/Catalogo/_api/web/GetFileByServerRelativeUrl('%2Fsites%2FCatalogo%2FDocumentos%20Compartilhados%2FMapa%20d%27%27Ouro.xlsb')/$value"
        );
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(err.to_string(), "SharePoint returned 404: not found");
    }

    #[tokio::test]
    async fn test_download_requires_username() {
        let config = SourceConfig {
            username: String::new(),
            ..SourceConfig::default()
        };
        let client = SharePointClient::new(config).unwrap();
        let err = client.download("secret").await.unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
    }
}
