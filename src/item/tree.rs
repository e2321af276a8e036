use std::collections::{HashMap, HashSet};

use egui::KeyboardShortcut;
use serde::{Deserialize, Serialize};

use super::{Binding, Brush, BrushDescendants, Group, Item, ItemId};
use crate::error::{SwitchError, SwitchResult};

/// The live tree of brushes and groups.
///
/// Always holds at least one brush; item ids and shortcuts are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemTree {
    items: Vec<Item>,
}

impl ItemTree {
    pub fn new(items: Vec<Item>) -> SwitchResult<Self> {
        let tree = Self { items };
        tree.validate()?;
        Ok(tree)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// All brushes, depth-first
    pub fn brushes(&self) -> BrushDescendants<'_> {
        BrushDescendants::new(&self.items)
    }

    pub fn brush_count(&self) -> usize {
        self.brushes().count()
    }

    pub fn first_brush(&self) -> Option<&Brush> {
        self.brushes().next()
    }

    pub fn find(&self, id: ItemId) -> Option<&Item> {
        find_in(&self.items, id)
    }

    pub fn find_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        find_in_mut(&mut self.items, id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.find(id).is_some()
    }

    pub fn brush(&self, id: ItemId) -> Option<&Brush> {
        self.find(id).and_then(Item::as_brush)
    }

    pub fn brush_mut(&mut self, id: ItemId) -> Option<&mut Brush> {
        match self.find_mut(id) {
            Some(Item::Brush(brush)) => Some(brush),
            _ => None,
        }
    }

    pub fn group(&self, id: ItemId) -> Option<&Group> {
        self.find(id).and_then(Item::as_group)
    }

    pub fn group_mut(&mut self, id: ItemId) -> Option<&mut Group> {
        match self.find_mut(id) {
            Some(Item::Group(group)) => Some(group),
            _ => None,
        }
    }

    /// Parent (`None` for the root level) and index of an item
    pub fn locate(&self, id: ItemId) -> Option<(Option<ItemId>, usize)> {
        locate_in(&self.items, None, id)
    }

    /// True when `id` is `ancestor` itself or one of its descendants
    pub fn is_within(&self, id: ItemId, ancestor: ItemId) -> bool {
        match self.find(ancestor) {
            Some(item @ Item::Brush(_)) => item.id() == id,
            Some(Item::Group(group)) => group.id == id || find_in(&group.children, id).is_some(),
            None => false,
        }
    }

    /// Every shortcut of the tree with what it triggers
    pub fn bindings(&self) -> Vec<(KeyboardShortcut, Binding)> {
        let mut nodes = Vec::new();
        walk(&self.items, &mut nodes);
        nodes.into_iter().flat_map(Item::bindings).collect()
    }

    pub fn validate(&self) -> SwitchResult<()> {
        if self.brush_count() == 0 {
            return Err(SwitchError::InvalidTreeMutation(
                "the tree must contain at least one brush".to_string(),
            ));
        }

        let mut nodes = Vec::new();
        walk(&self.items, &mut nodes);

        let mut ids = HashSet::new();
        for node in &nodes {
            if !ids.insert(node.id()) {
                return Err(SwitchError::InvalidTreeMutation(format!("duplicate item id {}", node.id())));
            }
            if let Item::Brush(brush) = node {
                brush.validate()?;
            }
        }

        let mut owners: HashMap<KeyboardShortcut, Binding> = HashMap::new();
        for (shortcut, binding) in nodes.into_iter().flat_map(Item::bindings) {
            if let Some(existing) = owners.insert(shortcut, binding) {
                return Err(SwitchError::ShortcutAlreadyBound {
                    owner: existing.owner(),
                });
            }
        }
        Ok(())
    }

    /// Insert an item (and its subtree) under `parent` at `index`.
    /// The index is clamped to the number of children.
    pub fn insert(&mut self, parent: Option<ItemId>, index: usize, item: Item) -> SwitchResult<()> {
        let mut incoming = Vec::new();
        walk(std::slice::from_ref(&item), &mut incoming);
        for node in incoming {
            if self.contains(node.id()) {
                return Err(SwitchError::InvalidTreeMutation(format!(
                    "item {} is already in the tree",
                    node.id()
                )));
            }
            if let Item::Brush(brush) = node {
                brush.validate()?;
            }
        }

        let children = self.children_mut(parent)?;
        let index = index.min(children.len());
        children.insert(index, item);
        self.normalize_cursors();
        Ok(())
    }

    /// Remove an item with its subtree; returns where it was and what it was
    pub fn remove(&mut self, id: ItemId) -> SwitchResult<(Option<ItemId>, usize, Item)> {
        let (parent, index) = self.locate(id).ok_or(SwitchError::ItemNotFound(id))?;
        let removed_brushes = self.find(id).map(Item::brush_count).unwrap_or(0);
        if self.brush_count() <= removed_brushes {
            return Err(SwitchError::InvalidTreeMutation(
                "cannot delete the last brush".to_string(),
            ));
        }

        let item = self.children_mut(parent)?.remove(index);
        self.normalize_cursors();
        Ok((parent, index, item))
    }

    /// Move an item under `new_parent` at `index`; returns its previous location
    pub fn move_item(
        &mut self,
        id: ItemId,
        new_parent: Option<ItemId>,
        index: usize,
    ) -> SwitchResult<(Option<ItemId>, usize)> {
        let (old_parent, old_index) = self.locate(id).ok_or(SwitchError::ItemNotFound(id))?;
        if let Some(target) = new_parent {
            if self.is_within(target, id) {
                return Err(SwitchError::InvalidTreeMutation(
                    "cannot move a group into itself".to_string(),
                ));
            }
            if self.group(target).is_none() {
                return Err(SwitchError::ItemNotFound(target));
            }
        }

        let item = self.children_mut(old_parent)?.remove(old_index);
        let children = self.children_mut(new_parent)?;
        let index = index.min(children.len());
        children.insert(index, item);
        self.normalize_cursors();
        Ok((old_parent, old_index))
    }

    /// Replace a brush definition, keeping its place; returns the previous one
    pub fn replace_brush(&mut self, brush: Brush) -> SwitchResult<Brush> {
        brush.validate()?;
        let slot = self.brush_mut(brush.id).ok_or(SwitchError::ItemNotFound(brush.id))?;
        Ok(std::mem::replace(slot, brush))
    }

    /// Forget every group navigation position
    pub fn reset_cursors(&mut self) {
        for_each_group(&mut self.items, &mut |group| group.reset_cursor());
    }

    /// Unset cursors that no longer point at a brush
    pub(crate) fn normalize_cursors(&mut self) {
        for_each_group(&mut self.items, &mut |group| {
            if let Some(cursor) = group.cursor() {
                if cursor >= group.brushes().count() {
                    group.reset_cursor();
                }
            }
        });
    }

    fn children_mut(&mut self, parent: Option<ItemId>) -> SwitchResult<&mut Vec<Item>> {
        match parent {
            None => Ok(&mut self.items),
            Some(id) => match self.find_mut(id) {
                Some(Item::Group(group)) => Ok(&mut group.children),
                Some(Item::Brush(_)) => Err(SwitchError::InvalidTreeMutation(format!(
                    "brush {id} cannot have children"
                ))),
                None => Err(SwitchError::ItemNotFound(id)),
            },
        }
    }
}

fn find_in(items: &[Item], id: ItemId) -> Option<&Item> {
    for item in items {
        if item.id() == id {
            return Some(item);
        }
        if let Item::Group(group) = item {
            if let Some(found) = find_in(&group.children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_in_mut(items: &mut [Item], id: ItemId) -> Option<&mut Item> {
    for item in items {
        if item.id() == id {
            return Some(item);
        }
        if let Item::Group(group) = item {
            if let Some(found) = find_in_mut(&mut group.children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn locate_in(items: &[Item], parent: Option<ItemId>, id: ItemId) -> Option<(Option<ItemId>, usize)> {
    for (index, item) in items.iter().enumerate() {
        if item.id() == id {
            return Some((parent, index));
        }
        if let Item::Group(group) = item {
            if let Some(found) = locate_in(&group.children, Some(group.id), id) {
                return Some(found);
            }
        }
    }
    None
}

fn walk<'a>(items: &'a [Item], out: &mut Vec<&'a Item>) {
    for item in items {
        out.push(item);
        if let Item::Group(group) = item {
            walk(&group.children, out);
        }
    }
}

fn for_each_group(items: &mut [Item], f: &mut dyn FnMut(&mut Group)) {
    for item in items {
        if let Item::Group(group) = item {
            f(group);
            for_each_group(&mut group.children, f);
        }
    }
}
