//! Boundary with the host painting application.
//!
//! The core never talks to the host directly: everything it reads or writes
//! goes through [`HostAdapter`], so the engine can run against
//! [`MemoryHost`] in tests.

mod memory;

use std::fmt;

use egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::{HostCall, MemoryHost};

/// A paint-tool property of the host that a brush can override.
///
/// The declaration order is the order overrides are applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolProperty {
    BlendingMode,
    Size,
    Opacity,
    Flow,
    Rotation,
    ActivePaintTool,
    ForegroundColor,
    BackgroundColor,
    Gradient,
    PreserveAlpha,
    ToolOpacityLocking,
    EraserModeActive,
}

impl ToolProperty {
    pub const ALL: [ToolProperty; 12] = [
        ToolProperty::BlendingMode,
        ToolProperty::Size,
        ToolProperty::Opacity,
        ToolProperty::Flow,
        ToolProperty::Rotation,
        ToolProperty::ActivePaintTool,
        ToolProperty::ForegroundColor,
        ToolProperty::BackgroundColor,
        ToolProperty::Gradient,
        ToolProperty::PreserveAlpha,
        ToolProperty::ToolOpacityLocking,
        ToolProperty::EraserModeActive,
    ];

    /// Properties that belong to the selected preset: selecting another
    /// preset in the host replaces them.
    pub fn is_preset_scoped(self) -> bool {
        matches!(
            self,
            Self::BlendingMode | Self::Size | Self::Opacity | Self::Flow | Self::Rotation
        )
    }

    /// Properties whose user edits can be written back into a brush.
    pub fn is_mergeable(self) -> bool {
        !matches!(self, Self::ToolOpacityLocking | Self::EraserModeActive)
    }
}

impl fmt::Display for ToolProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BlendingMode => "blending mode",
            Self::Size => "size",
            Self::Opacity => "opacity",
            Self::Flow => "flow",
            Self::Rotation => "rotation",
            Self::ActivePaintTool => "paint tool",
            Self::ForegroundColor => "foreground color",
            Self::BackgroundColor => "background color",
            Self::Gradient => "gradient",
            Self::PreserveAlpha => "preserve alpha",
            Self::ToolOpacityLocking => "tool opacity locking",
            Self::EraserModeActive => "eraser mode",
        };
        f.write_str(name)
    }
}

/// Value of a [`ToolProperty`].
///
/// Compared by plain value equality: the host cannot tell "set back to the
/// same value" apart from "never touched".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
    Color(Color32),
    Flag(bool),
    /// Optional host resources (a gradient, a paint tool) may be unset
    Unset,
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color32> {
        match self {
            Self::Color(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }
}

/// Identifier of a host brush preset (the preset name in the host)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetId(pub String);

impl PresetId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A preset the host has resolved and can select
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetHandle {
    pub id: PresetId,
}

/// Failure reported by a host adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("no active view in host")]
    NoActiveView,

    #[error("host cannot read {0}")]
    ReadFailed(ToolProperty),

    #[error("host cannot write {0}")]
    WriteFailed(ToolProperty),

    #[error("host cannot select preset '{0}'")]
    SelectFailed(PresetId),
}

/// Narrow capability set the core needs from the host application.
pub trait HostAdapter {
    /// Read the current value of a paint-tool property
    fn property(&self, property: ToolProperty) -> Result<PropertyValue, HostError>;

    /// Write a paint-tool property
    fn set_property(&mut self, property: ToolProperty, value: &PropertyValue) -> Result<(), HostError>;

    /// Look up a preset; `None` when the host does not know it (e.g. its bundle is disabled)
    fn resolve_preset(&self, preset: &PresetId) -> Option<PresetHandle>;

    /// Select a preset; the host may reset preset-scoped properties as a side effect
    fn select_preset(&mut self, preset: &PresetHandle) -> Result<(), HostError>;

    /// Identifier of the preset currently selected in the host
    fn active_preset(&self) -> Option<PresetId>;
}
