use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::kintone::PluginApi;
use crate::plugin_id::PluginIdFile;

/// Which branch a deployment took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// No ID was stored, so the plugin was installed and issued `id`
    Installed { id: String },
    /// The stored `id` was updated in place
    Updated { id: String },
}

/// Upload `plugin_file`, then update the plugin recorded in `id_file` or
/// install it if no ID is recorded yet
///
/// A newly issued ID is written back to `id_file`. The ID file is only read
/// after the upload succeeds, and is not rewritten on update.
///
/// # Errors
/// Fails if the upload, install or update call fails. Problems reading or
/// writing the ID file are logged and never fail the deployment.
pub async fn deploy<A>(
    api: &A,
    plugin_file: &Path,
    id_file: &PluginIdFile,
) -> Result<DeployOutcome>
where
    A: PluginApi + ?Sized,
{
    info!("Uploading file...");
    let file_key = api
        .upload_file(plugin_file)
        .await
        .with_context(|| format!("uploading {}", plugin_file.display()))?;
    info!("File uploaded successfully. fileKey: {}", file_key);

    let plugin_id = id_file.load();

    if !plugin_id.is_empty() {
        api.update_plugin(&file_key, &plugin_id)
            .await
            .with_context(|| format!("updating plugin {}", plugin_id))?;
        info!("Plugin updated successfully.");
        Ok(DeployOutcome::Updated { id: plugin_id })
    } else {
        let issued = api
            .install_plugin(&file_key)
            .await
            .context("installing plugin")?;
        info!("Plugin added successfully. ID:{}", issued);
        id_file.save(&issued);
        Ok(DeployOutcome::Installed { id: issued })
    }
}
