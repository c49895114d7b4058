//! Run settings for the uploader
//!
//! Every setting is resolved once at startup from up to three sources, in order
//! of precedence:
//! 1. An explicit command-line flag
//! 2. An environment variable (`KINTONE_SUBDOMAIN`, `KINTONE_USERNAME`,
//!    `KINTONE_PASSWORD`, `KINTONE_PROXY`)
//! 3. A built-in default
//!
//! Empty values count as unset at every level, so `KINTONE_PASSWORD=` does not
//! satisfy the password requirement.

use std::path::PathBuf;
use thiserror::Error;

use crate::constants::{ENV_PASSWORD, ENV_PROXY, ENV_SUBDOMAIN, ENV_USERNAME, KINTONE_DOMAIN};
use crate::Cli;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Domain, username and password must all be specified.")]
    MissingCredentials,
    #[error("The path of the plugin file must be specified with --file.")]
    MissingPluginFile,
}

/// Settings for a single upload run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Kintone subdomain, host or full base URL
    pub subdomain: String,
    pub username: String,
    pub password: String,
    /// Plugin archive to upload
    pub plugin_file_path: PathBuf,
    /// Text file holding the plugin ID issued on first install
    pub plugin_id_path: PathBuf,
    /// Optional proxy URL
    pub proxy: Option<String>,
}

/// Pick the first non-empty value among an explicit argument, an environment
/// variable and a built-in default
///
/// `env` is the lookup used for `env_key`; pass `|k| std::env::var(k).ok()` for
/// the process environment.
pub fn resolve<F>(
    explicit: Option<&str>,
    env_key: &str,
    default: Option<&str>,
    env: F,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| env(env_key).filter(|v| !v.is_empty()))
        .or_else(|| default.filter(|v| !v.is_empty()).map(str::to_string))
}

impl Settings {
    /// Resolve settings from parsed flags and the process environment
    pub fn from_env(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Resolve settings from parsed flags and an arbitrary environment lookup
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingCredentials`] if subdomain, username or
    /// password is still unset after merging.
    pub fn resolve<F>(cli: &Cli, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let subdomain = resolve(cli.subdomain.as_deref(), ENV_SUBDOMAIN, None, &env);
        let username = resolve(cli.username.as_deref(), ENV_USERNAME, None, &env);
        let password = resolve(cli.password.as_deref(), ENV_PASSWORD, None, &env);
        let proxy = resolve(cli.proxy.as_deref(), ENV_PROXY, None, &env);

        let (Some(subdomain), Some(username), Some(password)) = (subdomain, username, password)
        else {
            return Err(ConfigError::MissingCredentials);
        };

        let plugin_file_path = cli
            .file
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingPluginFile)?;

        Ok(Settings {
            subdomain,
            username,
            password,
            plugin_file_path,
            plugin_id_path: cli.idfile.clone(),
            proxy,
        })
    }

    /// Base URL of the Kintone instance
    ///
    /// - `https://example.cybozu.com/` → `https://example.cybozu.com`
    /// - `example.kintone.com` → `https://example.kintone.com`
    /// - `localhost:8080` → `https://localhost:8080`
    /// - `example` → `https://example.cybozu.com`
    pub fn base_url(&self) -> String {
        let raw = self.subdomain.trim();
        if raw.contains("://") {
            raw.trim_end_matches('/').to_string()
        } else if raw.contains('.') || raw.contains(':') {
            format!("https://{}", raw.trim_end_matches('/'))
        } else {
            format!("https://{}.{}", raw, KINTONE_DOMAIN)
        }
    }
}
