//! Next/previous navigation through the brushes of a group.

use log::debug;

use crate::error::{SwitchError, SwitchResult};
use crate::item::{ItemId, ItemTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Tracks which group is being cycled through, to apply the groups'
/// "reset position" policy when the user leaves it.
#[derive(Debug, Default)]
pub struct Navigator {
    looping_group: Option<ItemId>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group the last navigation happened in
    pub fn looping_group(&self) -> Option<ItemId> {
        self.looping_group
    }

    /// Move the group cursor one brush forward or backward, wrapping around.
    ///
    /// An unset cursor starts on the first brush (next) or the last one
    /// (previous). Returns the brush the cursor now points at and its index.
    pub fn step(
        &mut self,
        tree: &mut ItemTree,
        group_id: ItemId,
        direction: Direction,
    ) -> SwitchResult<(ItemId, usize)> {
        let group = tree.group_mut(group_id).ok_or(SwitchError::ItemNotFound(group_id))?;
        let brushes: Vec<ItemId> = group.brushes().map(|brush| brush.id).collect();
        if brushes.is_empty() {
            return Err(SwitchError::GroupEmpty(group_id));
        }

        let len = brushes.len();
        let index = match (group.cursor().filter(|cursor| *cursor < len), direction) {
            (None, Direction::Next) => 0,
            (None, Direction::Previous) => len - 1,
            (Some(cursor), Direction::Next) => (cursor + 1) % len,
            (Some(cursor), Direction::Previous) => (cursor + len - 1) % len,
        };
        group.set_cursor(index);
        debug!("group '{}' cursor -> {index} ({direction:?})", group.name);
        Ok((brushes[index], index))
    }

    /// Remember `group_id` as the group being cycled through
    pub fn enter(&mut self, group_id: ItemId) {
        self.looping_group = Some(group_id);
    }

    /// Something became active: a brush (`Some`) or a host preset the
    /// switcher does not manage (`None`). Leaving the looping group resets
    /// its cursor when the group asks for it.
    ///
    /// Returns the group whose cursor was reset.
    pub fn note_activation(&mut self, tree: &mut ItemTree, activated: Option<ItemId>) -> Option<ItemId> {
        let looping = self.looping_group?;
        if activated.is_some_and(|id| tree.is_within(id, looping)) {
            return None;
        }
        self.looping_group = None;

        let group = tree.group_mut(looping)?;
        if group.reset_position_on_external_activation {
            debug!("left group '{}', position reset", group.name);
            group.reset_cursor();
            Some(looping)
        } else {
            None
        }
    }

    /// Forget the looping group, e.g. after the tree was replaced
    pub fn forget(&mut self) {
        self.looping_group = None;
    }
}
