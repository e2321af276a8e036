use std::collections::HashMap;

use egui::KeyboardShortcut;

use crate::error::{SwitchError, SwitchResult};
use crate::item::{Binding, ItemTree};

/// Global lookup from a key combination to what it triggers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortcutIndex {
    bindings: HashMap<KeyboardShortcut, Binding>,
}

impl ShortcutIndex {
    /// Index every shortcut of a validated tree
    pub fn build(tree: &ItemTree) -> Self {
        Self {
            bindings: tree.bindings().into_iter().collect(),
        }
    }

    pub fn lookup(&self, shortcut: &KeyboardShortcut) -> Option<Binding> {
        self.bindings.get(shortcut).copied()
    }

    /// Shortcut currently assigned to `binding`
    pub fn shortcut_of(&self, binding: Binding) -> Option<KeyboardShortcut> {
        self.bindings
            .iter()
            .find(|(_, bound)| **bound == binding)
            .map(|(shortcut, _)| *shortcut)
    }

    /// Check that `bindings` can be added without stealing a shortcut from
    /// another binding, or from each other.
    pub fn check(&self, bindings: &[(KeyboardShortcut, Binding)]) -> SwitchResult<()> {
        let mut incoming: HashMap<KeyboardShortcut, Binding> = HashMap::new();
        for (shortcut, binding) in bindings {
            let taken = self
                .lookup(shortcut)
                .or_else(|| incoming.get(shortcut).copied());
            if let Some(existing) = taken.filter(|existing| existing != binding) {
                return Err(SwitchError::ShortcutAlreadyBound {
                    owner: existing.owner(),
                });
            }
            incoming.insert(*shortcut, *binding);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Brush, Group};
    use egui::{Key, Modifiers};

    #[test]
    fn test_index_covers_groups() {
        let next = KeyboardShortcut::new(Modifiers::NONE, Key::N);
        let brush_key = KeyboardShortcut::new(Modifiers::CTRL, Key::Num1);
        let brush = Brush::new("b1").with_shortcut(brush_key);
        let mut group = Group::new("g").with_child(brush.clone());
        group.next_shortcut = Some(next);
        let group_id = group.id;
        let tree = ItemTree::new(vec![group.into()]).unwrap();

        let index = ShortcutIndex::build(&tree);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup(&next), Some(Binding::GroupNext(group_id)));
        assert_eq!(index.shortcut_of(Binding::Brush(brush.id)), Some(brush_key));
    }

    #[test]
    fn test_check_allows_rebinding_same_owner() {
        let key = KeyboardShortcut::new(Modifiers::NONE, Key::E);
        let brush = Brush::new("b1").with_shortcut(key);
        let tree = ItemTree::new(vec![brush.clone().into()]).unwrap();
        let index = ShortcutIndex::build(&tree);

        assert!(index.check(&[(key, Binding::Brush(brush.id))]).is_ok());
        let other = Brush::new("b2");
        assert!(matches!(
            index.check(&[(key, Binding::Brush(other.id))]),
            Err(SwitchError::ShortcutAlreadyBound { owner }) if owner == brush.id
        ));
    }
}
