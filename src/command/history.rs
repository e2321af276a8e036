use log::debug;

use super::TreeCommand;
use crate::error::SwitchResult;
use crate::item::ItemTree;

/// Manages the history of executed tree edits for undo/redo functionality
#[derive(Debug, Default)]
pub struct CommandHistory {
    /// Inverses of the executed commands
    undo_stack: Vec<TreeCommand>,
    /// Commands that re-apply undone edits
    redo_stack: Vec<TreeCommand>,
}

impl CommandHistory {
    /// Creates a new empty command history
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command and add it to the history if successful
    pub fn execute(&mut self, command: TreeCommand, tree: &mut ItemTree) -> SwitchResult<()> {
        let name = command.name();
        let inverse = command.execute(tree)?;
        debug!("executed {name}");
        self.undo_stack.push(inverse);
        self.redo_stack.clear(); // Clear redo stack when new command is executed
        Ok(())
    }

    /// Undo the last executed command. Returns false when there is nothing to undo.
    pub fn undo(&mut self, tree: &mut ItemTree) -> SwitchResult<bool> {
        let Some(inverse) = self.undo_stack.pop() else {
            return Ok(false);
        };
        match inverse.clone().execute(tree) {
            Ok(forward) => {
                self.redo_stack.push(forward);
                Ok(true)
            }
            Err(err) => {
                self.undo_stack.push(inverse);
                Err(err)
            }
        }
    }

    /// Redo the last undone command. Returns false when there is nothing to redo.
    pub fn redo(&mut self, tree: &mut ItemTree) -> SwitchResult<bool> {
        let Some(forward) = self.redo_stack.pop() else {
            return Ok(false);
        };
        match forward.clone().execute(tree) {
            Ok(inverse) => {
                self.undo_stack.push(inverse);
                Ok(true)
            }
            Err(err) => {
                self.redo_stack.push(forward);
                Err(err)
            }
        }
    }

    /// Command the next undo would run
    pub fn peek_undo(&self) -> Option<&TreeCommand> {
        self.undo_stack.last()
    }

    /// Command the next redo would run
    pub fn peek_redo(&self) -> Option<&TreeCommand> {
        self.redo_stack.last()
    }

    /// Returns true if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear the command history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Brush;

    #[test]
    fn test_undo_redo_insert() {
        let mut tree = ItemTree::new(vec![Brush::new("b1").into()]).unwrap();
        let added = Brush::new("b2");
        let mut history = CommandHistory::new();

        history
            .execute(
                TreeCommand::InsertItem {
                    parent: None,
                    index: 1,
                    item: added.clone().into(),
                },
                &mut tree,
            )
            .unwrap();
        assert!(tree.contains(added.id));

        assert!(history.undo(&mut tree).unwrap());
        assert!(!tree.contains(added.id));
        assert!(!history.undo(&mut tree).unwrap());

        assert!(history.redo(&mut tree).unwrap());
        assert_eq!(tree.locate(added.id), Some((None, 1)));
    }

    #[test]
    fn test_failed_command_is_not_recorded() {
        let only = Brush::new("b1");
        let mut tree = ItemTree::new(vec![only.clone().into()]).unwrap();
        let mut history = CommandHistory::new();

        assert!(history.execute(TreeCommand::RemoveItem { id: only.id }, &mut tree).is_err());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_brush_update() {
        let brush = Brush::new("b1").with_size(5.0);
        let mut tree = ItemTree::new(vec![brush.clone().into()]).unwrap();
        let mut history = CommandHistory::new();

        history
            .execute(TreeCommand::UpdateBrush { brush: brush.clone().with_size(9.0) }, &mut tree)
            .unwrap();
        assert_eq!(tree.brush(brush.id).unwrap().overrides.size, Some(9.0));

        history.undo(&mut tree).unwrap();
        assert_eq!(tree.brush(brush.id), Some(&brush));
    }
}
