//! Shape style model and the typed patch used for default merging.

use crate::color::Rgba;
use serde::{Deserialize, Serialize};

/// Outline rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
    /// Revision-cloud scalloped outline (rectangles and closed polylines).
    Cloud,
}

/// Compositing mode for a shape's ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Composite {
    #[default]
    SourceOver,
    /// Translucent marker ink that darkens what it covers.
    Multiply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    SansSerif,
    Serif,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    Regular,
    #[default]
    Medium,
    SemiBold,
    Bold,
}

/// How a redact region obscures the pixels beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RedactMode {
    #[default]
    Pixelate,
    Blur,
    /// Opaque fill, nothing recoverable.
    Solid,
}

/// Visual attributes of a shape. Flat on purpose: every kind reads the
/// fields relevant to it and ignores the rest, which keeps the defaults
/// registry and the inspector-style property edits uniform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke: Rgba,
    pub stroke_width: f64,
    pub opacity: f64,
    pub line_type: LineType,

    pub fill: Rgba,
    pub fill_enabled: bool,
    pub fill_opacity: f64,

    pub text_color: Rgba,
    pub font_family: FontFamily,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub italic: bool,
    pub underline: bool,

    /// Arrowhead length for arrow and leader-callout kinds.
    pub head_size: f64,
    pub corner_radius: f64,
    pub padding: f64,
    pub composite: Composite,

    /// Revision-cloud arc radius.
    pub cloud_radius: f64,
    /// Fraction of arc diameter by which consecutive arcs overlap (0..1).
    pub cloud_overlap: f64,
    /// Sweep angle of each cloud arc, in degrees.
    pub cloud_sweep_deg: f64,

    pub redact_mode: RedactMode,
    pub pixel_size: u32,
    pub blur_radius: u32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: Rgba::black(),
            stroke_width: 2.0,
            opacity: 1.0,
            line_type: LineType::Solid,
            fill: Rgba::transparent(),
            fill_enabled: false,
            fill_opacity: 1.0,
            text_color: Rgba::black(),
            font_family: FontFamily::SansSerif,
            font_size: 16.0,
            font_weight: FontWeight::default(),
            italic: false,
            underline: false,
            head_size: 10.0,
            corner_radius: 0.0,
            padding: 10.0,
            composite: Composite::SourceOver,
            cloud_radius: 8.0,
            cloud_overlap: 0.1,
            cloud_sweep_deg: 150.0,
            redact_mode: RedactMode::default(),
            pixel_size: 16,
            blur_radius: 10,
        }
    }
}

macro_rules! style_patch {
    ($($field:ident: $ty:ty),* $(,)?) => {
        /// Partial style: set fields win, unset fields fall through.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct StylePatch {
            $(pub $field: Option<$ty>,)*
        }

        impl StylePatch {
            /// Overwrite `base` with every set field of the patch.
            pub fn apply(&self, base: &mut Style) {
                $(if let Some(v) = self.$field.clone() {
                    base.$field = v;
                })*
            }

            /// Deep-merge `other` on top of this patch: fields set in
            /// `other` replace fields here, unset fields are kept.
            pub fn merge(&mut self, other: &StylePatch) {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            }

            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }
        }
    };
}

style_patch! {
    stroke: Rgba,
    stroke_width: f64,
    opacity: f64,
    line_type: LineType,
    fill: Rgba,
    fill_enabled: bool,
    fill_opacity: f64,
    text_color: Rgba,
    font_family: FontFamily,
    font_size: f64,
    font_weight: FontWeight,
    italic: bool,
    underline: bool,
    head_size: f64,
    corner_radius: f64,
    padding: f64,
    composite: Composite,
    cloud_radius: f64,
    cloud_overlap: f64,
    cloud_sweep_deg: f64,
    redact_mode: RedactMode,
    pixel_size: u32,
    blur_radius: u32,
}

impl Style {
    /// Stroke color with the shape opacity folded into alpha.
    pub fn stroke_with_opacity(&self) -> Rgba {
        self.stroke.with_opacity(self.opacity)
    }

    /// Fill color with shape opacity and fill opacity folded into alpha,
    /// or `None` when filling is disabled.
    pub fn fill_with_opacity(&self) -> Option<Rgba> {
        self.fill_enabled
            .then(|| self.fill.with_opacity(self.opacity * self.fill_opacity))
    }

    /// Spacing between consecutive cloud arc anchors.
    pub fn cloud_spacing(&self) -> f64 {
        (2.0 * self.cloud_radius * (1.0 - self.cloud_overlap)).max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_apply_only_set_fields() {
        let mut style = Style::default();
        let patch = StylePatch {
            stroke: Some(Rgba::opaque(255, 0, 0)),
            stroke_width: Some(4.0),
            ..Default::default()
        };
        patch.apply(&mut style);
        assert_eq!(style.stroke, Rgba::opaque(255, 0, 0));
        assert_eq!(style.stroke_width, 4.0);
        // Untouched fields keep their defaults.
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.line_type, LineType::Solid);
    }

    #[test]
    fn test_patch_merge_precedence() {
        let mut base = StylePatch {
            stroke_width: Some(2.0),
            opacity: Some(0.5),
            ..Default::default()
        };
        let over = StylePatch {
            stroke_width: Some(6.0),
            ..Default::default()
        };
        base.merge(&over);
        assert_eq!(base.stroke_width, Some(6.0));
        assert_eq!(base.opacity, Some(0.5));
    }

    #[test]
    fn test_cloud_spacing() {
        let style = Style {
            cloud_radius: 10.0,
            cloud_overlap: 0.25,
            ..Default::default()
        };
        assert_eq!(style.cloud_spacing(), 15.0);
    }
}
