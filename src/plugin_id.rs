use std::{fs, path::PathBuf};
use tracing::{debug, warn};

/// Text file remembering the plugin ID issued on first install
///
/// Both operations are best effort: I/O problems are logged as warnings and
/// never surface as errors, so a missing or read-only ID file cannot abort a
/// deployment.
#[derive(Debug, Clone)]
pub struct PluginIdFile {
    path: PathBuf,
}

impl PluginIdFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PluginIdFile { path: path.into() }
    }

    /// Read the stored plugin ID, or an empty string if there is none
    pub fn load(&self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let id = raw.trim().to_string();
                debug!(path = %self.path.display(), id = %id, "loaded plugin ID");
                id
            }
            Err(e) => {
                warn!("Could not load pluginId file {}: {}", self.path.display(), e);
                String::new()
            }
        }
    }

    /// Overwrite the ID file with `id`
    pub fn save(&self, id: &str) {
        match fs::write(&self.path, id) {
            Ok(()) => debug!(path = %self.path.display(), "saved plugin ID"),
            Err(e) => warn!("Could not write pluginId file {}: {}", self.path.display(), e),
        }
    }
}
