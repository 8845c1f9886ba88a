//! Style configuration consumed by the compositor

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::color_space::DEFAULT_BACKGROUND;

/// Default gradient end colour
pub const DEFAULT_GRADIENT_END: &str = "#e2e8f0";

/// Default gradient angle in degrees (left to right)
pub const DEFAULT_GRADIENT_ANGLE: f32 = 90.0;

/// Default corner radius in pixels
pub const DEFAULT_CORNER_RADIUS: f32 = 24.0;

/// One anchor point of a linear gradient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: String,
    /// Percentage along the gradient axis, 0 to 100
    pub position: f32,
}

impl GradientStop {
    pub fn new(color: impl Into<String>, position: f32) -> Self {
        Self {
            color: color.into(),
            position,
        }
    }
}

/// The two stops the style controls start out with
pub fn default_gradient_stops() -> Vec<GradientStop> {
    vec![
        GradientStop::new(DEFAULT_BACKGROUND, 0.0),
        GradientStop::new(DEFAULT_GRADIENT_END, 100.0),
    ]
}

/// Stops ordered by position. Equal positions keep their caller order.
pub fn sorted_stops(stops: &[GradientStop]) -> Vec<GradientStop> {
    let mut sorted = stops.to_vec();
    sorted.sort_by(|a, b| a.position.total_cmp(&b.position));
    sorted
}

/// CSS `linear-gradient(...)` text for a stop list, used for display
pub fn css_gradient(stops: &[GradientStop], angle_degrees: f32) -> String {
    let mut out = format!("linear-gradient({}deg", angle_degrees);
    for stop in sorted_stops(stops) {
        let _ = write!(out, ", {} {}%", stop.color, stop.position);
    }
    out.push(')');
    out
}

/// Background discriminant, used by the style controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    Solid,
    Gradient,
}

impl BackgroundKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackgroundKind::Solid => "Solid",
            BackgroundKind::Gradient => "Gradient",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            BackgroundKind::Solid => BackgroundKind::Gradient,
            BackgroundKind::Gradient => BackgroundKind::Solid,
        }
    }
}

/// Canvas background. Only the active variant's data travels with a style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Background {
    Solid {
        color: String,
    },
    Gradient {
        stops: Vec<GradientStop>,
        angle_degrees: f32,
    },
}

impl Background {
    pub fn kind(&self) -> BackgroundKind {
        match self {
            Background::Solid { .. } => BackgroundKind::Solid,
            Background::Gradient { .. } => BackgroundKind::Gradient,
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid {
            color: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

/// Label fonts offered by the style controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelFont {
    #[default]
    Inter,
    SystemUi,
    SfProDisplay,
    HelveticaNeue,
    Arial,
    Georgia,
    TimesNewRoman,
    CourierNew,
    Monaco,
}

impl LabelFont {
    /// Font family name as handed to the compositor
    pub fn name(&self) -> &'static str {
        match self {
            LabelFont::Inter => "Inter",
            LabelFont::SystemUi => "System UI",
            LabelFont::SfProDisplay => "SF Pro Display",
            LabelFont::HelveticaNeue => "Helvetica Neue",
            LabelFont::Arial => "Arial",
            LabelFont::Georgia => "Georgia",
            LabelFont::TimesNewRoman => "Times New Roman",
            LabelFont::CourierNew => "Courier New",
            LabelFont::Monaco => "Monaco",
        }
    }

    pub fn all() -> &'static [LabelFont] {
        &[
            LabelFont::Inter,
            LabelFont::SystemUi,
            LabelFont::SfProDisplay,
            LabelFont::HelveticaNeue,
            LabelFont::Arial,
            LabelFont::Georgia,
            LabelFont::TimesNewRoman,
            LabelFont::CourierNew,
            LabelFont::Monaco,
        ]
    }

    /// Case-insensitive lookup by family name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|font| font.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

/// Everything the compositor needs besides the two images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub background: Background,
    /// Font family for the "A"/"B" labels. A generic sans-serif face is used
    /// when the family is not installed.
    pub label_font: String,
    pub corner_radius_px: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: Background::default(),
            label_font: LabelFont::default().name().to_string(),
            corner_radius_px: DEFAULT_CORNER_RADIUS,
        }
    }
}

impl StyleConfig {
    pub fn solid(color: impl Into<String>) -> Self {
        Self {
            background: Background::Solid {
                color: color.into(),
            },
            ..Self::default()
        }
    }

    pub fn gradient(stops: Vec<GradientStop>, angle_degrees: f32) -> Self {
        Self {
            background: Background::Gradient {
                stops,
                angle_degrees,
            },
            ..Self::default()
        }
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius_px = radius;
        self
    }

    pub fn with_label_font(mut self, family: impl Into<String>) -> Self {
        self.label_font = family.into();
        self
    }
}
