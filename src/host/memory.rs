use std::collections::{BTreeMap, HashMap, HashSet};

use egui::Color32;

use super::{HostAdapter, HostError, PresetHandle, PresetId, PropertyValue, ToolProperty};

/// A write observed by [`MemoryHost`]
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Select(PresetId),
    Set(ToolProperty, PropertyValue),
}

/// In-memory host used to drive the engine without a painting application.
///
/// Selecting a preset loads its preset-scoped properties. Like a real host
/// with dirty presets, edits made while a preset is selected are remembered
/// and come back when the preset is selected again.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    values: BTreeMap<ToolProperty, PropertyValue>,
    presets: HashMap<PresetId, BTreeMap<ToolProperty, PropertyValue>>,
    /// Preset-scoped values of presets left after being edited
    dirty: HashMap<PresetId, BTreeMap<ToolProperty, PropertyValue>>,
    active_preset: Option<PresetId>,
    calls: Vec<HostCall>,
    failing_reads: HashSet<ToolProperty>,
    failing_writes: HashSet<ToolProperty>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        let values = BTreeMap::from([
            (ToolProperty::BlendingMode, PropertyValue::Text("normal".to_string())),
            (ToolProperty::Size, PropertyValue::Number(10.0)),
            (ToolProperty::Opacity, PropertyValue::Number(1.0)),
            (ToolProperty::Flow, PropertyValue::Number(1.0)),
            (ToolProperty::Rotation, PropertyValue::Number(0.0)),
            (ToolProperty::ActivePaintTool, PropertyValue::Text("KritaShape/KisToolBrush".to_string())),
            (ToolProperty::ForegroundColor, PropertyValue::Color(Color32::BLACK)),
            (ToolProperty::BackgroundColor, PropertyValue::Color(Color32::WHITE)),
            (ToolProperty::Gradient, PropertyValue::Unset),
            (ToolProperty::PreserveAlpha, PropertyValue::Flag(false)),
            (ToolProperty::ToolOpacityLocking, PropertyValue::Flag(true)),
            (ToolProperty::EraserModeActive, PropertyValue::Flag(false)),
        ]);
        Self {
            values,
            presets: HashMap::new(),
            dirty: HashMap::new(),
            active_preset: None,
            calls: Vec::new(),
            failing_reads: HashSet::new(),
            failing_writes: HashSet::new(),
        }
    }

    /// Register a preset with the property values it carries
    pub fn with_preset(mut self, name: &str, size: f64, opacity: f64) -> Self {
        self.add_preset(name, size, opacity);
        self
    }

    pub fn add_preset(&mut self, name: &str, size: f64, opacity: f64) {
        let defaults = BTreeMap::from([
            (ToolProperty::BlendingMode, PropertyValue::Text("normal".to_string())),
            (ToolProperty::Size, PropertyValue::Number(size)),
            (ToolProperty::Opacity, PropertyValue::Number(opacity)),
            (ToolProperty::Flow, PropertyValue::Number(1.0)),
            (ToolProperty::Rotation, PropertyValue::Number(0.0)),
        ]);
        self.presets.insert(PresetId::new(name), defaults);
    }

    /// Remove a preset, as when its resource bundle gets disabled
    pub fn remove_preset(&mut self, name: &str) {
        let id = PresetId::new(name);
        self.presets.remove(&id);
        self.dirty.remove(&id);
    }

    /// Select a preset the way the user would from the host's own picker
    pub fn user_selects_preset(&mut self, name: &str) {
        self.switch_to(&PresetId::new(name));
    }

    /// Leave the active preset, keeping its edits, and load `preset`.
    /// Returns false when the preset is unknown.
    fn switch_to(&mut self, preset: &PresetId) -> bool {
        if !self.presets.contains_key(preset) {
            return false;
        }
        if let Some(previous) = self.active_preset.take() {
            let edited = self
                .values
                .iter()
                .filter(|(property, _)| property.is_preset_scoped())
                .map(|(property, value)| (*property, value.clone()))
                .collect();
            self.dirty.insert(previous, edited);
        }
        let incoming = self.dirty.get(preset).or_else(|| self.presets.get(preset));
        self.values.extend(incoming.cloned().unwrap_or_default());
        self.active_preset = Some(preset.clone());
        true
    }

    /// Edit a property the way the user would, without recording a call
    pub fn user_sets(&mut self, property: ToolProperty, value: PropertyValue) {
        self.values.insert(property, value);
    }

    pub fn value(&self, property: ToolProperty) -> Option<&PropertyValue> {
        self.values.get(&property)
    }

    pub fn number(&self, property: ToolProperty) -> Option<f64> {
        self.value(property).and_then(PropertyValue::as_number)
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn fail_reads_of(&mut self, property: ToolProperty) {
        self.failing_reads.insert(property);
    }

    pub fn fail_writes_of(&mut self, property: ToolProperty) {
        self.failing_writes.insert(property);
    }

    pub fn heal(&mut self) {
        self.failing_reads.clear();
        self.failing_writes.clear();
    }
}

impl HostAdapter for MemoryHost {
    fn property(&self, property: ToolProperty) -> Result<PropertyValue, HostError> {
        if self.failing_reads.contains(&property) {
            return Err(HostError::ReadFailed(property));
        }
        self.values
            .get(&property)
            .cloned()
            .ok_or(HostError::ReadFailed(property))
    }

    fn set_property(&mut self, property: ToolProperty, value: &PropertyValue) -> Result<(), HostError> {
        if self.failing_writes.contains(&property) {
            return Err(HostError::WriteFailed(property));
        }
        self.calls.push(HostCall::Set(property, value.clone()));
        self.values.insert(property, value.clone());
        Ok(())
    }

    fn resolve_preset(&self, preset: &PresetId) -> Option<PresetHandle> {
        self.presets
            .contains_key(preset)
            .then(|| PresetHandle { id: preset.clone() })
    }

    fn select_preset(&mut self, preset: &PresetHandle) -> Result<(), HostError> {
        if !self.switch_to(&preset.id) {
            return Err(HostError::SelectFailed(preset.id.clone()));
        }
        self.calls.push(HostCall::Select(preset.id.clone()));
        Ok(())
    }

    fn active_preset(&self) -> Option<PresetId> {
        self.active_preset.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selecting_preset_resets_scoped_properties() {
        let mut host = MemoryHost::new().with_preset("Basic-1", 25.0, 0.8);
        host.user_sets(ToolProperty::Size, PropertyValue::Number(3.0));

        let handle = host.resolve_preset(&PresetId::new("Basic-1")).unwrap();
        host.select_preset(&handle).unwrap();

        assert_eq!(host.number(ToolProperty::Size), Some(25.0));
        assert_eq!(host.active_preset(), Some(PresetId::new("Basic-1")));
        assert_eq!(host.calls(), &[HostCall::Select(PresetId::new("Basic-1"))]);
    }

    #[test]
    fn test_unknown_preset_does_not_resolve() {
        let host = MemoryHost::new();
        assert!(host.resolve_preset(&PresetId::new("missing")).is_none());
    }

    #[test]
    fn test_fault_injection() {
        let mut host = MemoryHost::new();
        host.fail_writes_of(ToolProperty::Flow);
        assert_eq!(
            host.set_property(ToolProperty::Flow, &PropertyValue::Number(0.5)),
            Err(HostError::WriteFailed(ToolProperty::Flow))
        );
        host.heal();
        assert!(host.set_property(ToolProperty::Flow, &PropertyValue::Number(0.5)).is_ok());
    }

    #[test]
    fn test_edited_preset_comes_back_dirty() {
        let mut host = MemoryHost::new()
            .with_preset("Basic-1", 25.0, 0.8)
            .with_preset("Other", 7.0, 0.5);
        host.user_selects_preset("Basic-1");
        host.user_sets(ToolProperty::Size, PropertyValue::Number(60.0));

        host.user_selects_preset("Other");
        assert_eq!(host.number(ToolProperty::Size), Some(7.0));

        let handle = host.resolve_preset(&PresetId::new("Basic-1")).unwrap();
        host.select_preset(&handle).unwrap();
        assert_eq!(host.number(ToolProperty::Size), Some(60.0));
        assert_eq!(host.number(ToolProperty::Opacity), Some(0.8));
    }
}
