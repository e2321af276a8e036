//! The managed tree of brushes and groups.

mod brush;
mod group;
mod tree;

use egui::KeyboardShortcut;
use serde::{Deserialize, Serialize};

pub use crate::id_generator::ItemId;
pub use brush::{Brush, ERASE_BLENDING_MODE, Overrides, SpecificColor};
pub use group::{BrushDescendants, Group};
pub use tree::ItemTree;

/// A node of the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Brush(Brush),
    Group(Group),
}

impl Item {
    pub fn id(&self) -> ItemId {
        match self {
            Self::Brush(brush) => brush.id,
            Self::Group(group) => group.id,
        }
    }

    pub fn as_brush(&self) -> Option<&Brush> {
        match self {
            Self::Brush(brush) => Some(brush),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(group) => Some(group),
            Self::Brush(_) => None,
        }
    }

    /// Number of brushes in this node, itself included
    pub fn brush_count(&self) -> usize {
        match self {
            Self::Brush(_) => 1,
            Self::Group(group) => group.brushes().count(),
        }
    }

    /// Shortcuts owned by this node and all its descendants
    pub fn subtree_bindings(&self) -> Vec<(KeyboardShortcut, Binding)> {
        let mut bindings = self.bindings();
        if let Self::Group(group) = self {
            for child in &group.children {
                bindings.extend(child.subtree_bindings());
            }
        }
        bindings
    }

    /// Ids of this node and all its descendants
    pub fn subtree_ids(&self) -> Vec<ItemId> {
        let mut ids = vec![self.id()];
        if let Self::Group(group) = self {
            for child in &group.children {
                ids.extend(child.subtree_ids());
            }
        }
        ids
    }

    /// Shortcuts owned by this node (not its children)
    pub fn bindings(&self) -> Vec<(KeyboardShortcut, Binding)> {
        match self {
            Self::Brush(brush) => brush
                .shortcut
                .map(|s| vec![(s, Binding::Brush(brush.id))])
                .unwrap_or_default(),
            Self::Group(group) => group
                .next_shortcut
                .map(|s| (s, Binding::GroupNext(group.id)))
                .into_iter()
                .chain(group.previous_shortcut.map(|s| (s, Binding::GroupPrevious(group.id))))
                .collect(),
        }
    }
}

impl From<Brush> for Item {
    fn from(brush: Brush) -> Self {
        Self::Brush(brush)
    }
}

impl From<Group> for Item {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

/// What a shortcut triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Brush(ItemId),
    GroupNext(ItemId),
    GroupPrevious(ItemId),
}

impl Binding {
    /// Item owning the shortcut
    pub fn owner(&self) -> ItemId {
        match self {
            Self::Brush(id) | Self::GroupNext(id) | Self::GroupPrevious(id) => *id,
        }
    }
}
