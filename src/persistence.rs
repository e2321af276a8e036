use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::SwitcherSettings;
use crate::error::SwitchResult;
use crate::item::ItemTree;
use crate::setup::SetupStore;

/// Errors that can occur during state persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize state: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write state: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to read state file: {0}")]
    ReadError(String),

    #[error("Invalid state data: {0}")]
    InvalidState(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub fn serialize_tree(tree: &ItemTree) -> PersistenceResult<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}

/// Parse a tree and check its invariants
pub fn deserialize_tree(data: &str) -> SwitchResult<ItemTree> {
    let tree: ItemTree = serde_json::from_str(data).map_err(PersistenceError::from)?;
    tree.validate()?;
    Ok(tree)
}

pub fn serialize_setup_store(store: &SetupStore) -> PersistenceResult<String> {
    Ok(serde_json::to_string_pretty(store)?)
}

/// Parse a setup store and check every snapshot
pub fn deserialize_setup_store(data: &str) -> SwitchResult<SetupStore> {
    let store: SetupStore = serde_json::from_str(data).map_err(PersistenceError::from)?;
    for setup in store.setups() {
        setup.tree().validate()?;
    }
    Ok(store)
}

/// Everything the switcher persists between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    /// Version of the crate that wrote the document
    pub version: String,
    #[serde(default)]
    pub settings: SwitcherSettings,
    pub tree: ItemTree,
    #[serde(default)]
    pub setups: SetupStore,
}

impl SettingsDocument {
    pub fn new(settings: SwitcherSettings, tree: ItemTree, setups: SetupStore) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings,
            tree,
            setups,
        }
    }

    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document and check the live tree and every setup
    pub fn from_json(data: &str) -> SwitchResult<Self> {
        let document: Self = serde_json::from_str(data).map_err(PersistenceError::from)?;
        if document.version != env!("CARGO_PKG_VERSION") {
            warn!(
                "settings written by version {} differ from current version {}",
                document.version,
                env!("CARGO_PKG_VERSION")
            );
        }
        document.tree.validate()?;
        for setup in document.setups.setups() {
            setup.tree().validate()?;
        }
        Ok(document)
    }
}

/// Stores the settings document as a JSON file at a caller-chosen path
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, document: &SettingsDocument) -> PersistenceResult<()> {
        if let Some(dir) = self.path.parent() {
            // Create state directory if it doesn't exist
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, document.to_json()?)?;
        info!("settings saved to {}", self.path.display());
        Ok(())
    }

    /// Load the document; `None` when the file does not exist yet
    pub fn load(&self) -> SwitchResult<Option<SettingsDocument>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .map_err(|e| PersistenceError::ReadError(e.to_string()))?;
        let document = SettingsDocument::from_json(&json)?;
        info!("settings loaded from {}", self.path.display());
        Ok(Some(document))
    }
}
