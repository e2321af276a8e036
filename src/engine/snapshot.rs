use crate::host::{PropertyValue, ToolProperty};

/// Ordered property values, either read from the host before activation or
/// written to it during activation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    values: Vec<(ToolProperty, PropertyValue)>,
}

impl Snapshot {
    pub fn push(&mut self, property: ToolProperty, value: PropertyValue) {
        self.values.push((property, value));
    }

    pub fn get(&self, property: ToolProperty) -> Option<&PropertyValue> {
        self.values
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ToolProperty, &PropertyValue)> {
        self.values.iter().map(|(p, value)| (*p, value))
    }

    pub fn properties(&self) -> impl Iterator<Item = ToolProperty> + '_ {
        self.values.iter().map(|(p, _)| *p)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
