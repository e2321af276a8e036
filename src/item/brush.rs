use egui::{Color32, KeyboardShortcut};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{SwitchError, SwitchResult};
use crate::host::{PresetId, PropertyValue, ToolProperty};
use crate::id_generator::ItemId;

/// Blending mode the host uses for erasing
pub const ERASE_BLENDING_MODE: &str = "erase";

/// Preset-scoped values a brush forces on activation.
///
/// `None` means "not overridden": the property is neither touched on
/// activation nor restored afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blending_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

/// Colors forced while the brush is active. Foreground is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificColor {
    pub foreground: Color32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color32>,
    /// Host gradient resource identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<String>,
}

impl SpecificColor {
    pub fn new(foreground: Color32) -> Self {
        Self {
            foreground,
            background: None,
            gradient: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A brush setup: a host preset plus the overrides forced while it is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub id: ItemId,
    /// Host preset selected on activation
    pub preset: PresetId,
    #[serde(default)]
    pub overrides: Overrides,
    /// Paint tool forced on activation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paint_tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SpecificColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_alpha: Option<bool>,
    #[serde(default)]
    pub ignore_tool_opacity: bool,
    #[serde(default = "default_true")]
    pub ignore_eraser_mode: bool,
    #[serde(default = "default_true")]
    pub keep_user_modifications: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<KeyboardShortcut>,
    /// Rich text; its first line is the brush label
    #[serde(default)]
    pub comment: String,
}

impl Brush {
    pub fn new(preset: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            preset: PresetId::new(preset),
            overrides: Overrides::default(),
            paint_tool: None,
            color: None,
            preserve_alpha: None,
            ignore_tool_opacity: false,
            ignore_eraser_mode: true,
            keep_user_modifications: true,
            shortcut: None,
            comment: String::new(),
        }
    }

    pub fn with_shortcut(mut self, shortcut: KeyboardShortcut) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.overrides.size = Some(size);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.overrides.opacity = Some(opacity);
        self
    }

    pub fn is_eraser(&self) -> bool {
        self.overrides.blending_mode.as_deref() == Some(ERASE_BLENDING_MODE)
    }

    /// Eraser brushes cannot force a paint tool, a color or preserve-alpha
    pub fn validate(&self) -> SwitchResult<()> {
        if self.is_eraser()
            && (self.paint_tool.is_some() || self.color.is_some() || self.preserve_alpha.is_some())
        {
            return Err(SwitchError::InvalidTreeMutation(format!(
                "eraser brush {} cannot carry paint tool, color or preserve-alpha overrides",
                self.id
            )));
        }
        Ok(())
    }

    /// Human readable label: first line of the comment, or the preset name
    pub fn label(&self) -> String {
        plain_text(&self.comment)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.preset.to_string())
    }

    /// Values written to the host on activation, in application order
    pub fn planned_overrides(&self) -> Vec<(ToolProperty, PropertyValue)> {
        let mut plan = Vec::new();
        let o = &self.overrides;
        if let Some(mode) = &o.blending_mode {
            plan.push((ToolProperty::BlendingMode, PropertyValue::Text(mode.clone())));
        }
        if let Some(size) = o.size {
            plan.push((ToolProperty::Size, PropertyValue::Number(size)));
        }
        if let Some(opacity) = o.opacity {
            plan.push((ToolProperty::Opacity, PropertyValue::Number(opacity)));
        }
        if let Some(flow) = o.flow {
            plan.push((ToolProperty::Flow, PropertyValue::Number(flow)));
        }
        if let Some(rotation) = o.rotation {
            plan.push((ToolProperty::Rotation, PropertyValue::Number(rotation)));
        }
        if let Some(tool) = &self.paint_tool {
            plan.push((ToolProperty::ActivePaintTool, PropertyValue::Text(tool.clone())));
        }
        if let Some(color) = &self.color {
            plan.push((ToolProperty::ForegroundColor, PropertyValue::Color(color.foreground)));
            if let Some(background) = color.background {
                plan.push((ToolProperty::BackgroundColor, PropertyValue::Color(background)));
            }
            if let Some(gradient) = &color.gradient {
                plan.push((ToolProperty::Gradient, PropertyValue::Text(gradient.clone())));
            }
        }
        if let Some(preserve_alpha) = self.preserve_alpha {
            plan.push((ToolProperty::PreserveAlpha, PropertyValue::Flag(preserve_alpha)));
        }
        if self.ignore_tool_opacity {
            plan.push((ToolProperty::ToolOpacityLocking, PropertyValue::Flag(false)));
        }
        if self.ignore_eraser_mode {
            plan.push((ToolProperty::EraserModeActive, PropertyValue::Flag(self.is_eraser())));
        }
        plan
    }

    /// Store a value the user set while the brush was active as the new
    /// override. Returns false when the value does not fit the property.
    pub fn absorb(&mut self, property: ToolProperty, value: &PropertyValue) -> bool {
        match (property, value) {
            (ToolProperty::BlendingMode, PropertyValue::Text(mode)) => {
                let becomes_eraser = mode == ERASE_BLENDING_MODE;
                if becomes_eraser
                    && (self.paint_tool.is_some() || self.color.is_some() || self.preserve_alpha.is_some())
                {
                    warn!("brush {}: not keeping '{mode}' blending mode, brush has color/tool overrides", self.id);
                    return false;
                }
                self.overrides.blending_mode = Some(mode.clone());
            }
            (ToolProperty::Size, PropertyValue::Number(v)) => self.overrides.size = Some(*v),
            (ToolProperty::Opacity, PropertyValue::Number(v)) => self.overrides.opacity = Some(*v),
            (ToolProperty::Flow, PropertyValue::Number(v)) => self.overrides.flow = Some(*v),
            (ToolProperty::Rotation, PropertyValue::Number(v)) => self.overrides.rotation = Some(*v),
            (ToolProperty::ActivePaintTool, PropertyValue::Text(tool)) => {
                self.paint_tool = Some(tool.clone());
            }
            (ToolProperty::ForegroundColor, PropertyValue::Color(c)) => match &mut self.color {
                Some(color) => color.foreground = *c,
                None => return false,
            },
            (ToolProperty::BackgroundColor, PropertyValue::Color(c)) => match &mut self.color {
                Some(color) => color.background = Some(*c),
                None => return false,
            },
            (ToolProperty::Gradient, PropertyValue::Text(gradient)) => match &mut self.color {
                Some(color) => color.gradient = Some(gradient.clone()),
                None => return false,
            },
            (ToolProperty::Gradient, PropertyValue::Unset) => match &mut self.color {
                Some(color) => color.gradient = None,
                None => return false,
            },
            (ToolProperty::PreserveAlpha, PropertyValue::Flag(flag)) => {
                self.preserve_alpha = Some(*flag);
            }
            _ => return false,
        }
        true
    }
}

/// Elements whose content is never displayed
const HIDDEN_ELEMENTS: [&str; 4] = ["head", "style", "title", "script"];
/// Elements that start a new line
const LINE_BREAKS: [&str; 10] = ["br", "p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5"];

/// Drop markup and hidden elements, decode the few entities rich text comments use
fn plain_text(rich: &str) -> String {
    let mut text = String::with_capacity(rich.len());
    let mut in_tag = false;
    let mut tag = String::new();
    let mut hidden_depth = 0usize;
    for c in rich.chars() {
        match c {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let closing = tag.starts_with('/');
                let name = tag
                    .trim_start_matches('/')
                    .split(|ch: char| ch.is_whitespace() || ch == '/')
                    .next()
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                if HIDDEN_ELEMENTS.contains(&name.as_str()) {
                    hidden_depth = if closing {
                        hidden_depth.saturating_sub(1)
                    } else {
                        hidden_depth + 1
                    };
                } else if hidden_depth == 0 && LINE_BREAKS.contains(&name.as_str()) {
                    text.push('\n');
                }
            }
            _ if in_tag => tag.push(c),
            _ if hidden_depth > 0 => {}
            _ => text.push(c),
        }
    }
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
