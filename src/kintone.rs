//! Minimal Kintone REST client for plugin deployment
//!
//! Only the three endpoints needed to ship a plugin are covered:
//! - `POST /k/v1/file.json` uploads the archive and returns a file key
//! - `POST /k/v1/plugin.json` installs a new plugin from a file key
//! - `PUT /k/v1/plugin.json` replaces an installed plugin from a file key
//!
//! The deployment workflow only talks to [`PluginApi`], so it can be driven by
//! a substitute implementation in tests.

use crate::config::Settings;
use crate::constants::AUTH_HEADER;
use crate::proxy::ProxySpec;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, InvalidHeaderValue},
    multipart::{Form, Part},
    Client, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors reported by [`KintoneClient`]
#[derive(Debug, Error)]
pub enum KintoneError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to read plugin file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid credentials: {0}")]
    InvalidCredentials(#[from] InvalidHeaderValue),
    #[error("Kintone returned {status}: [{code}] {message} (id: {id})")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
        id: String,
    },
    #[error("Kintone returned {status}: {body}")]
    UnexpectedResponse { status: StatusCode, body: String },
}

/// The remote operations a deployment needs
#[async_trait]
pub trait PluginApi: Send + Sync {
    /// Upload the archive at `path` and return its file key
    async fn upload_file(&self, path: &Path) -> Result<String>;

    /// Install a new plugin from an uploaded file and return the issued plugin ID
    async fn install_plugin(&self, file_key: &str) -> Result<String>;

    /// Replace the installed plugin `id` with an uploaded file
    async fn update_plugin(&self, file_key: &str, id: &str) -> Result<()>;
}

pub struct KintoneClient {
    pub base_url: String,
    pub client: Client,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InstallRequest<'a> {
    file_key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id: &'a str,
    file_key: &'a str,
}

#[derive(Deserialize)]
struct PluginResponse {
    id: String,
    #[serde(default)]
    version: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    id: String,
    message: String,
}

/// Value of the password authentication header: base64 of `username:password`
pub fn credentials_header(username: &str, password: &str) -> String {
    base64::encode_config(format!("{}:{}", username, password), base64::STANDARD)
}

impl KintoneClient {
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        proxy: Option<&ProxySpec>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let hv = HeaderValue::from_str(&credentials_header(username, password))
            .map_err(KintoneError::from)?;
        headers.insert(AUTH_HEADER, hv);

        // Only the configured proxy is used; HTTP(S)_PROXY from the environment is ignored.
        let mut builder = Client::builder().default_headers(headers).no_proxy();
        if let Some(proxy) = proxy {
            debug!(proxy = %proxy.url(), "routing requests through proxy");
            builder = builder.proxy(proxy.to_reqwest()?);
        }
        let client = builder.build().map_err(KintoneError::from)?;

        Ok(KintoneClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_settings(settings: &Settings, proxy: Option<&ProxySpec>) -> Result<Self> {
        Self::new(
            &settings.base_url(),
            &settings.username,
            &settings.password,
            proxy,
        )
    }

    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/k/v1/{}.json", self.base_url, name)
    }
}

/// Decode a successful JSON body, or turn a Kintone error body into [`KintoneError::Api`]
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, KintoneError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let body = resp.text().await?;
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(err) => Err(KintoneError::Api {
            status,
            code: err.code,
            message: err.message,
            id: err.id,
        }),
        Err(_) => Err(KintoneError::UnexpectedResponse { status, body }),
    }
}

#[async_trait]
impl PluginApi for KintoneClient {
    async fn upload_file(&self, path: &Path) -> Result<String> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| KintoneError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "plugin.zip".to_string());
        debug!(file = %file_name, bytes = data.len(), "uploading plugin archive");

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(KintoneError::from)?;
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(self.endpoint("file"))
            .multipart(form)
            .send()
            .await
            .map_err(KintoneError::from)?;
        let uploaded: UploadResponse = decode(resp).await?;
        Ok(uploaded.file_key)
    }

    async fn install_plugin(&self, file_key: &str) -> Result<String> {
        let resp = self
            .client
            .post(self.endpoint("plugin"))
            .json(&InstallRequest { file_key })
            .send()
            .await
            .map_err(KintoneError::from)?;
        let installed: PluginResponse = decode(resp).await?;
        debug!(id = %installed.id, version = ?installed.version, "plugin installed");
        Ok(installed.id)
    }

    async fn update_plugin(&self, file_key: &str, id: &str) -> Result<()> {
        let resp = self
            .client
            .put(self.endpoint("plugin"))
            .json(&UpdateRequest { id, file_key })
            .send()
            .await
            .map_err(KintoneError::from)?;
        let updated: PluginResponse = decode(resp).await?;
        debug!(id = %updated.id, version = ?updated.version, "plugin updated");
        Ok(())
    }
}
