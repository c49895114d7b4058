//! Tracing setup
//!
//! Log lines go to stderr. The filter comes from `RUST_LOG` when set, e.g.
//! `RUST_LOG=kintone_plugin_uploader=debug`, otherwise from the default passed
//! to [`init`].

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init(default_filter: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| anyhow!("failed to initialize tracing: {}", e))
}
