//! Category dumps: the JSON files exchanged with the acquisition and storage sides.

use std::path::Path;

use compendium_shared::{Category, CompendiumError, Result};
use tracing::{debug, instrument};

/// Read a JSON array of categories.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_categories(path: &Path) -> Result<Vec<Category>> {
    let raw = std::fs::read_to_string(path).map_err(|e| CompendiumError::io(path, e))?;
    let categories: Vec<Category> = serde_json::from_str(&raw)?;
    debug!(categories = categories.len(), "loaded category dump");
    Ok(categories)
}

/// Write categories as pretty-printed JSON, creating parent directories.
#[instrument(skip_all, fields(path = %path.display(), categories = categories.len()))]
pub fn save_categories(path: &Path, categories: &[Category]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CompendiumError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(categories)?;
    std::fs::write(path, json).map_err(|e| CompendiumError::io(path, e))?;
    debug!("saved category dump");
    Ok(())
}
