use egui::{Color32, KeyboardShortcut};
use serde::{Deserialize, Serialize};

use super::{Brush, Item};
use crate::id_generator::ItemId;

/// An ordered folder of brushes and sub-groups with next/previous navigation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: ItemId,
    pub name: String,
    #[serde(default = "default_group_color")]
    pub color: Color32,
    #[serde(default)]
    pub children: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_shortcut: Option<KeyboardShortcut>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_shortcut: Option<KeyboardShortcut>,
    /// Forget the navigation position once a brush outside the group gets activated
    #[serde(default)]
    pub reset_position_on_external_activation: bool,
    #[serde(default)]
    pub description: String,
    /// Index, among the brush descendants, of the last brush navigated to
    #[serde(skip)]
    cursor: Option<usize>,
}

fn default_group_color() -> Color32 {
    Color32::TRANSPARENT
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            color: default_group_color(),
            children: Vec::new(),
            next_shortcut: None,
            previous_shortcut: None,
            reset_position_on_external_activation: false,
            description: String::new(),
            cursor: None,
        }
    }

    pub fn with_child(mut self, item: impl Into<Item>) -> Self {
        self.children.push(item.into());
        self
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub(crate) fn set_cursor(&mut self, index: usize) {
        self.cursor = Some(index);
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Depth-first sequence of the brushes below this group.
    ///
    /// Sub-groups are walked through but never yielded. Each call starts over.
    pub fn brushes(&self) -> BrushDescendants<'_> {
        BrushDescendants::new(&self.children)
    }

    /// Brush a direct activation of the group resolves to: the cursor
    /// brush, or the first one when the cursor is unset.
    pub fn current_brush(&self) -> Option<&Brush> {
        self.brushes().nth(self.cursor.unwrap_or(0))
    }
}

// The cursor is navigation state, not part of the group's definition.
impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.color == other.color
            && self.children == other.children
            && self.next_shortcut == other.next_shortcut
            && self.previous_shortcut == other.previous_shortcut
            && self.reset_position_on_external_activation == other.reset_position_on_external_activation
            && self.description == other.description
    }
}

/// Lazy depth-first iterator over the brushes of an item list
#[derive(Debug, Clone)]
pub struct BrushDescendants<'a> {
    stack: Vec<std::slice::Iter<'a, Item>>,
}

impl<'a> BrushDescendants<'a> {
    pub(crate) fn new(items: &'a [Item]) -> Self {
        Self {
            stack: vec![items.iter()],
        }
    }
}

impl<'a> Iterator for BrushDescendants<'a> {
    type Item = &'a Brush;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(level) = self.stack.last_mut() {
            match level.next() {
                Some(Item::Brush(brush)) => return Some(brush),
                Some(Item::Group(group)) => self.stack.push(group.children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}
