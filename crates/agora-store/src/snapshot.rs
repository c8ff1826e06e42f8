use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::{Store, models::Workspace};

impl Store {
    /// Opens the store from a JSON snapshot, or starts empty when the file
    /// does not exist yet.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No snapshot at {}, starting with an empty workspace", path.display());
            return Ok(Self::new());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let workspace: Workspace = serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;

        info!(
            "Snapshot loaded from {} ({} users, {} channels, {} dms)",
            path.display(),
            workspace.users.len(),
            workspace.channels.len(),
            workspace.dms.len()
        );
        Ok(Self::from_workspace(workspace))
    }

    /// Writes the whole workspace to `path`, going through a temp file so a
    /// crash mid-write leaves the previous snapshot intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.read(|ws| serde_json::to_string_pretty(ws).map_err(anyhow::Error::from))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("replacing snapshot {}", path.display()))?;
        Ok(())
    }
}
