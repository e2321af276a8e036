use thiserror::Error;

use crate::host::HostError;
use crate::item::ItemId;
use crate::persistence::PersistenceError;
use crate::setup::SetupId;

/// Errors reported by the switcher core.
///
/// Every variant is recoverable: the engine never panics on them and the slot
/// is always left either untouched or `Idle`.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// The referenced preset (or item) cannot be resolved by the host
    #[error("item {0} cannot be resolved by the host")]
    ItemUnresolved(ItemId),

    /// The host rejected a read or a write
    #[error("host adapter failure: {0}")]
    HostAdapter(#[from] HostError),

    /// The shortcut is already bound to another item
    #[error("shortcut already bound to item {owner}")]
    ShortcutAlreadyBound { owner: ItemId },

    /// Navigation on a group without any brush descendant
    #[error("group {0} has no brush to navigate")]
    GroupEmpty(ItemId),

    #[error("setup {0} not found")]
    SetupNotFound(SetupId),

    /// Import rejected because a setup with the same name already exists
    #[error("a setup named '{0}' already exists")]
    SetupNameCollision(String),

    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// The edit would break a tree invariant
    #[error("invalid tree mutation: {0}")]
    InvalidTreeMutation(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result type for switcher operations
pub type SwitchResult<T> = Result<T, SwitchError>;
