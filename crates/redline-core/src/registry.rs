//! Per-tool style defaults: built-in fallbacks merged with whatever the
//! host has customized.

use crate::color::Rgba;
use crate::style::{Composite, RedactMode, Style, StylePatch};
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stored defaults for one tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolDefaults {
    #[serde(default)]
    pub style: StylePatch,
    /// Whether a polyline-family tool should close its path by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

/// Registry of per-tool defaults. Resolution layers, lowest first:
/// built-in fallback for the tool, then the stored patch. New shapes
/// freeze the resolved style at gesture start, so later edits to the
/// registry never retroactively restyle an in-progress shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleRegistry {
    overrides: HashMap<ToolKind, ToolDefaults>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the full style a new shape created by `tool` starts with.
    pub fn resolve(&self, tool: ToolKind) -> Style {
        let mut style = Style::default();
        builtin_patch(tool).apply(&mut style);
        if let Some(defaults) = self.overrides.get(&tool) {
            defaults.style.apply(&mut style);
        }
        style
    }

    /// Whether `tool` closes its path by default.
    pub fn resolve_closed(&self, tool: ToolKind) -> bool {
        self.overrides
            .get(&tool)
            .and_then(|d| d.closed)
            .unwrap_or(false)
    }

    /// Deep-merge `patch` over the stored defaults for `tool`. Fields
    /// absent from `patch` keep their previous value.
    pub fn set_defaults(&mut self, tool: ToolKind, patch: StylePatch) {
        self.overrides.entry(tool).or_default().style.merge(&patch);
    }

    pub fn set_closed(&mut self, tool: ToolKind, closed: bool) {
        self.overrides.entry(tool).or_default().closed = Some(closed);
    }

    /// Drop customizations for `tool`, reverting to the built-ins.
    pub fn reset(&mut self, tool: ToolKind) {
        self.overrides.remove(&tool);
    }
}

/// Built-in fallback defaults per tool.
fn builtin_patch(tool: ToolKind) -> StylePatch {
    let markup_stroke = Rgba::from_hex("#e11d48");
    let ink = Rgba::from_hex("#1f2937");
    let text = Rgba::from_hex("#111827");
    match tool {
        ToolKind::Select | ToolKind::Snapshot => StylePatch::default(),
        ToolKind::Pencil => StylePatch {
            stroke: Some(ink),
            stroke_width: Some(2.0),
            ..Default::default()
        },
        ToolKind::Highlighter => StylePatch {
            stroke: Some(Rgba::from_hex("#ffeb3b")),
            stroke_width: Some(12.0),
            opacity: Some(0.25),
            composite: Some(Composite::Multiply),
            ..Default::default()
        },
        ToolKind::Line | ToolKind::Arrow => StylePatch {
            stroke: Some(markup_stroke),
            stroke_width: Some(2.0),
            head_size: Some(10.0),
            ..Default::default()
        },
        ToolKind::Rect | ToolKind::Ellipse | ToolKind::Polyline => StylePatch {
            stroke: Some(markup_stroke),
            stroke_width: Some(2.0),
            ..Default::default()
        },
        ToolKind::SpeechCallout => StylePatch {
            stroke: Some(ink),
            stroke_width: Some(2.0),
            fill: Some(Rgba::white()),
            fill_enabled: Some(true),
            corner_radius: Some(15.0),
            text_color: Some(text),
            font_size: Some(14.0),
            padding: Some(10.0),
            ..Default::default()
        },
        ToolKind::LeaderCallout => StylePatch {
            stroke: Some(ink),
            stroke_width: Some(1.5),
            fill: Some(Rgba::white()),
            fill_enabled: Some(true),
            corner_radius: Some(4.0),
            padding: Some(8.0),
            text_color: Some(text),
            font_size: Some(13.0),
            head_size: Some(10.0),
            ..Default::default()
        },
        ToolKind::Text => StylePatch {
            text_color: Some(text),
            font_size: Some(16.0),
            ..Default::default()
        },
        ToolKind::StickyNote => StylePatch {
            fill: Some(Rgba::from_hex("#FFF9B1")),
            fill_enabled: Some(true),
            corner_radius: Some(10.0),
            padding: Some(10.0),
            text_color: Some(text),
            font_size: Some(14.0),
            ..Default::default()
        },
        ToolKind::Watermark => StylePatch {
            text_color: Some(text),
            font_size: Some(32.0),
            opacity: Some(0.18),
            ..Default::default()
        },
        ToolKind::Redact => StylePatch {
            redact_mode: Some(RedactMode::Pixelate),
            pixel_size: Some(16),
            blur_radius: Some(10),
            corner_radius: Some(6.0),
            ..Default::default()
        },
    }
}
