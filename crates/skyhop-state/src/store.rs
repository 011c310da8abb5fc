//! State store implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use skyhop_core::{Result, TravelerState};
use tokio::fs;
use tracing::{debug, info};

/// Trait for traveler state stores.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the traveler, falling back to defaults when nothing is stored yet.
    async fn load(&self) -> Result<TravelerState>;

    /// Persist the traveler, replacing whatever was stored.
    async fn save(&self, state: &TravelerState) -> Result<()>;
}

/// Pretty-printed JSON file holding a single [`TravelerState`].
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    /// Create a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn load(&self) -> Result<TravelerState> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state at {}; starting fresh", self.path.display());
                return Ok(TravelerState::default());
            }
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            return Ok(TravelerState::default());
        }

        let state: TravelerState = serde_json::from_str(&text)?;
        debug!("Loaded state from {}", self.path.display());
        Ok(state)
    }

    async fn save(&self, state: &TravelerState) -> Result<()> {
        let mut json = serde_json::to_string_pretty(state)?;
        json.push('\n');

        // Write next to the target and rename, so a crash never leaves half a file.
        let tmp = self.temp_path();
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}
