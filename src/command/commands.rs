use egui::{Color32, KeyboardShortcut};

use crate::error::{SwitchError, SwitchResult};
use crate::item::{Binding, Brush, Item, ItemId, ItemTree};

/// An edit of the item tree
#[derive(Debug, Clone, PartialEq)]
pub enum TreeCommand {
    InsertItem {
        parent: Option<ItemId>,
        index: usize,
        item: Item,
    },
    RemoveItem {
        id: ItemId,
    },
    MoveItem {
        id: ItemId,
        parent: Option<ItemId>,
        index: usize,
    },
    /// Replace a brush definition (matched by id)
    UpdateBrush {
        brush: Brush,
    },
    /// Change a group's own properties; children and shortcuts are left alone
    UpdateGroup {
        id: ItemId,
        name: String,
        color: Color32,
        description: String,
        reset_position_on_external_activation: bool,
    },
    /// Bind or clear the shortcut of a brush or of a group's navigation
    SetShortcut {
        binding: Binding,
        shortcut: Option<KeyboardShortcut>,
    },
}

impl TreeCommand {
    /// Apply the command to the tree and return the command undoing it.
    /// The tree is unchanged when an error is returned.
    pub fn execute(self, tree: &mut ItemTree) -> SwitchResult<TreeCommand> {
        match self {
            Self::InsertItem { parent, index, item } => {
                let id = item.id();
                tree.insert(parent, index, item)?;
                Ok(Self::RemoveItem { id })
            }
            Self::RemoveItem { id } => {
                let (parent, index, item) = tree.remove(id)?;
                Ok(Self::InsertItem { parent, index, item })
            }
            Self::MoveItem { id, parent, index } => {
                let (old_parent, old_index) = tree.move_item(id, parent, index)?;
                Ok(Self::MoveItem {
                    id,
                    parent: old_parent,
                    index: old_index,
                })
            }
            Self::UpdateBrush { brush } => {
                let previous = tree.replace_brush(brush)?;
                Ok(Self::UpdateBrush { brush: previous })
            }
            Self::UpdateGroup {
                id,
                name,
                color,
                description,
                reset_position_on_external_activation,
            } => {
                let group = tree.group_mut(id).ok_or(SwitchError::ItemNotFound(id))?;
                let inverse = Self::UpdateGroup {
                    id,
                    name: std::mem::replace(&mut group.name, name),
                    color: std::mem::replace(&mut group.color, color),
                    description: std::mem::replace(&mut group.description, description),
                    reset_position_on_external_activation: std::mem::replace(
                        &mut group.reset_position_on_external_activation,
                        reset_position_on_external_activation,
                    ),
                };
                Ok(inverse)
            }
            Self::SetShortcut { binding, shortcut } => {
                let owner = binding.owner();
                let slot = match binding {
                    Binding::Brush(id) => tree.brush_mut(id).map(|brush| &mut brush.shortcut),
                    Binding::GroupNext(id) => tree.group_mut(id).map(|group| &mut group.next_shortcut),
                    Binding::GroupPrevious(id) => {
                        tree.group_mut(id).map(|group| &mut group.previous_shortcut)
                    }
                }
                .ok_or(SwitchError::ItemNotFound(owner))?;
                let previous = std::mem::replace(slot, shortcut);
                Ok(Self::SetShortcut {
                    binding,
                    shortcut: previous,
                })
            }
        }
    }

    /// Shortcuts the command brings into the tree
    pub fn incoming_bindings(&self) -> Vec<(KeyboardShortcut, Binding)> {
        match self {
            Self::InsertItem { item, .. } => item.subtree_bindings(),
            Self::UpdateBrush { brush } => brush
                .shortcut
                .map(|s| vec![(s, Binding::Brush(brush.id))])
                .unwrap_or_default(),
            Self::SetShortcut { binding, shortcut } => {
                shortcut.map(|s| vec![(s, *binding)]).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    /// Ids that leave the tree when the command runs
    pub fn removed_ids(&self, tree: &ItemTree) -> Vec<ItemId> {
        match self {
            Self::RemoveItem { id } => tree.find(*id).map(Item::subtree_ids).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InsertItem { .. } => "insert item",
            Self::RemoveItem { .. } => "remove item",
            Self::MoveItem { .. } => "move item",
            Self::UpdateBrush { .. } => "update brush",
            Self::UpdateGroup { .. } => "update group",
            Self::SetShortcut { .. } => "set shortcut",
        }
    }
}
