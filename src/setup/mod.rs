//! Named snapshots of the whole item tree.

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{SwitchError, SwitchResult};
use crate::item::ItemTree;
use crate::persistence::PersistenceError;

pub use crate::id_generator::SetupId;

/// Identifier written in exported setup files
pub const EXPORT_FORMAT: &str = "brush-switch-setups";
pub const EXPORT_VERSION: u32 = 1;

/// Seconds since the UNIX epoch
fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// A saved copy of the item tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setup {
    pub id: SetupId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Icon reference understood by the UI collaborator
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub modified: u64,
    tree: ItemTree,
}

impl Setup {
    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }
}

/// How an import combines with the setups already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Drop every stored setup and keep the imported ones
    ReplaceAll,
    /// Keep stored setups, add the imported ones not already present.
    /// Rejected as a whole when an imported name is already used.
    AppendNewOnly,
}

#[derive(Debug, Serialize, Deserialize)]
struct SetupExport {
    format: String,
    version: u32,
    setups: Vec<Setup>,
}

/// Ordered collection of setups, plus the one last applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupStore {
    #[serde(default)]
    setups: Vec<Setup>,
    #[serde(default)]
    loaded: Option<SetupId>,
}

impl SetupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn setups(&self) -> &[Setup] {
        &self.setups
    }

    pub fn len(&self) -> usize {
        self.setups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setups.is_empty()
    }

    /// Setup whose snapshot was last applied to the live tree
    pub fn loaded(&self) -> Option<SetupId> {
        self.loaded
    }

    pub fn get(&self, id: SetupId) -> SwitchResult<&Setup> {
        self.setups
            .iter()
            .find(|setup| setup.id == id)
            .ok_or(SwitchError::SetupNotFound(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Setup> {
        self.setups.iter().find(|setup| setup.name == name)
    }

    fn get_mut(&mut self, id: SetupId) -> SwitchResult<&mut Setup> {
        self.setups
            .iter_mut()
            .find(|setup| setup.id == id)
            .ok_or(SwitchError::SetupNotFound(id))
    }

    /// Save a deep copy of `tree` as a new setup
    pub fn save(
        &mut self,
        tree: &ItemTree,
        name: impl Into<String>,
        icon: impl Into<String>,
        description: impl Into<String>,
    ) -> SetupId {
        let now = now_secs();
        let setup = Setup {
            id: SetupId::new(),
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
            created: now,
            modified: now,
            tree: tree.clone(),
        };
        let id = setup.id;
        info!("setup '{}' saved ({id})", setup.name);
        self.setups.push(setup);
        id
    }

    /// Overwrite a setup's snapshot with `tree`
    pub fn update(&mut self, id: SetupId, tree: &ItemTree) -> SwitchResult<()> {
        let setup = self.get_mut(id)?;
        setup.tree = tree.clone();
        setup.modified = now_secs();
        Ok(())
    }

    pub fn rename(&mut self, id: SetupId, name: impl Into<String>) -> SwitchResult<()> {
        let setup = self.get_mut(id)?;
        setup.name = name.into();
        setup.modified = now_secs();
        Ok(())
    }

    pub fn remove(&mut self, id: SetupId) -> SwitchResult<Setup> {
        let index = self
            .setups
            .iter()
            .position(|setup| setup.id == id)
            .ok_or(SwitchError::SetupNotFound(id))?;
        if self.loaded == Some(id) {
            self.loaded = None;
        }
        Ok(self.setups.remove(index))
    }

    /// Record that the live tree now comes from `id`
    pub(crate) fn mark_loaded(&mut self, id: Option<SetupId>) {
        self.loaded = id;
    }

    /// True when the live tree differs from the setup's snapshot.
    /// Group navigation positions are not part of the comparison.
    pub fn detect_drift(&self, id: SetupId, live: &ItemTree) -> SwitchResult<bool> {
        Ok(self.get(id)?.tree != *live)
    }

    /// Serialize every setup to the exchange format
    pub fn export(&self) -> SwitchResult<String> {
        let export = SetupExport {
            format: EXPORT_FORMAT.to_string(),
            version: EXPORT_VERSION,
            setups: self.setups.clone(),
        };
        serde_json::to_string_pretty(&export).map_err(|e| PersistenceError::from(e).into())
    }

    /// Read setups from the exchange format. Returns how many were added.
    ///
    /// The store is left untouched when anything is rejected.
    pub fn import(&mut self, data: &str, mode: ImportMode) -> SwitchResult<usize> {
        let export: SetupExport = serde_json::from_str(data).map_err(PersistenceError::from)?;
        if export.format != EXPORT_FORMAT {
            return Err(PersistenceError::InvalidState(format!(
                "unknown setup format '{}'",
                export.format
            ))
            .into());
        }
        if export.version > EXPORT_VERSION {
            return Err(PersistenceError::InvalidState(format!(
                "setup format version {} is newer than {EXPORT_VERSION}",
                export.version
            ))
            .into());
        }
        for setup in &export.setups {
            setup.tree.validate()?;
        }

        match mode {
            ImportMode::ReplaceAll => {
                let count = export.setups.len();
                if let Some(loaded) = self.loaded {
                    if !export.setups.iter().any(|setup| setup.id == loaded) {
                        self.loaded = None;
                    }
                }
                self.setups = export.setups;
                info!("{count} setup(s) imported, replacing the store");
                Ok(count)
            }
            ImportMode::AppendNewOnly => {
                let incoming: Vec<Setup> = export
                    .setups
                    .into_iter()
                    .filter(|setup| self.get(setup.id).is_err())
                    .collect();
                for (index, setup) in incoming.iter().enumerate() {
                    let repeated = incoming[..index].iter().any(|other| other.name == setup.name);
                    if repeated || self.find_by_name(&setup.name).is_some() {
                        return Err(SwitchError::SetupNameCollision(setup.name.clone()));
                    }
                }
                let count = incoming.len();
                self.setups.extend(incoming);
                info!("{count} new setup(s) imported");
                Ok(count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Brush;

    fn tree() -> ItemTree {
        ItemTree::new(vec![Brush::new("b1").into(), Brush::new("b2").into()]).unwrap()
    }

    #[test]
    fn test_drift_detection() {
        let mut live = tree();
        let mut store = SetupStore::new();
        let id = store.save(&live, "A", "", "");
        assert!(!store.detect_drift(id, &live).unwrap());

        live.insert(None, 0, Brush::new("b3").into()).unwrap();
        assert!(store.detect_drift(id, &live).unwrap());
        assert!(matches!(
            store.detect_drift(SetupId::new(), &live),
            Err(SwitchError::SetupNotFound(_))
        ));
    }

    #[test]
    fn test_remove_clears_loaded() {
        let mut store = SetupStore::new();
        let id = store.save(&tree(), "A", "", "");
        store.mark_loaded(Some(id));
        store.remove(id).unwrap();
        assert_eq!(store.loaded(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_import_rejects_unknown_format() {
        let mut store = SetupStore::new();
        let result = store.import(r#"{"format":"other","version":1,"setups":[]}"#, ImportMode::ReplaceAll);
        assert!(matches!(result, Err(SwitchError::Persistence(_))));
    }
}
