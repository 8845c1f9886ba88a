//! Editable style state behind the settings panel
//!
//! Keeps the values for both background kinds so switching between solid
//! and gradient does not lose edits, and hands the compositor a
//! [`StyleConfig`] snapshot holding only the active one.

use log::warn;

use crate::color_space::DEFAULT_BACKGROUND;
use crate::compose::style::{
    css_gradient, default_gradient_stops, sorted_stops, Background, BackgroundKind,
    GradientStop, LabelFont, StyleConfig, DEFAULT_CORNER_RADIUS, DEFAULT_GRADIENT_ANGLE,
};

/// Colour given to stops added from the controls
pub const NEW_STOP_COLOR: &str = "#808080";

/// Fewest stops a gradient can be edited down to
pub const MIN_STOPS: usize = 2;

/// Range of the corner radius slider
pub const MAX_CORNER_RADIUS: f32 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StyleController {
    pub kind: BackgroundKind,
    pub solid_color: String,
    stops: Vec<GradientStop>,
    angle: f32,
    font: String,
    radius: f32,
}

impl Default for StyleController {
    fn default() -> Self {
        Self {
            kind: BackgroundKind::Solid,
            solid_color: DEFAULT_BACKGROUND.to_string(),
            stops: default_gradient_stops(),
            angle: DEFAULT_GRADIENT_ANGLE,
            font: LabelFont::default().name().to_string(),
            radius: DEFAULT_CORNER_RADIUS,
        }
    }
}

impl StyleController {
    /// Start from a stored style. The inactive background kind keeps its
    /// defaults.
    pub fn from_style(style: &StyleConfig) -> Self {
        let mut controller = Self::default();
        match &style.background {
            Background::Solid { color } => {
                controller.kind = BackgroundKind::Solid;
                controller.solid_color = color.clone();
            }
            Background::Gradient {
                stops,
                angle_degrees,
            } => {
                controller.kind = BackgroundKind::Gradient;
                if stops.len() >= MIN_STOPS {
                    controller.stops = stops.clone();
                }
                controller.set_angle(*angle_degrees);
            }
        }
        controller.set_font(&style.label_font);
        controller.set_radius(style.corner_radius_px);
        controller
    }

    /// The style the compositor should render with
    pub fn snapshot(&self) -> StyleConfig {
        let background = match self.kind {
            BackgroundKind::Solid => Background::Solid {
                color: self.solid_color.clone(),
            },
            BackgroundKind::Gradient => Background::Gradient {
                stops: self.stops.clone(),
                angle_degrees: self.angle,
            },
        };
        StyleConfig {
            background,
            label_font: self.font.clone(),
            corner_radius_px: self.radius,
        }
    }

    pub fn toggle_kind(&mut self) {
        self.kind = self.kind.toggle();
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Add a grey stop in the middle of the widest gap between stops,
    /// counting the ends of the axis. Returns its index.
    pub fn add_stop(&mut self) -> usize {
        let mut edges = vec![0.0];
        edges.extend(sorted_stops(&self.stops).iter().map(|s| s.position));
        edges.push(100.0);

        let (from, to) = edges
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .fold((0.0_f32, 0.0_f32), |widest, gap| {
                if gap.1 - gap.0 > widest.1 - widest.0 {
                    gap
                } else {
                    widest
                }
            });
        self.add_stop_at((from + to) / 2.0)
    }

    /// Add a grey stop at `position` percent. Returns its index.
    pub fn add_stop_at(&mut self, position: f32) -> usize {
        self.stops
            .push(GradientStop::new(NEW_STOP_COLOR, clamp_position(position)));
        self.stops.len() - 1
    }

    /// Remove stop `index`. Refused while only [`MIN_STOPS`] remain.
    pub fn remove_stop(&mut self, index: usize) -> bool {
        if self.stops.len() <= MIN_STOPS || index >= self.stops.len() {
            return false;
        }
        self.stops.remove(index);
        true
    }

    pub fn update_stop_color(&mut self, index: usize, color: impl Into<String>) -> bool {
        match self.stops.get_mut(index) {
            Some(stop) => {
                stop.color = color.into();
                true
            }
            None => false,
        }
    }

    /// Move stop `index`, clamped to 0..=100 percent
    pub fn update_stop_position(&mut self, index: usize, position: f32) -> bool {
        match self.stops.get_mut(index) {
            Some(stop) => {
                stop.position = clamp_position(position);
                true
            }
            None => false,
        }
    }

    /// Set the gradient angle, wrapped into `[0, 360)`
    pub fn set_angle(&mut self, degrees: f32) {
        self.angle = if degrees.is_finite() {
            degrees.rem_euclid(360.0)
        } else {
            DEFAULT_GRADIENT_ANGLE
        };
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if self.angle >= 360.0 {
            self.angle = 0.0;
        }
    }

    pub fn adjust_angle(&mut self, delta: f32) {
        self.set_angle(self.angle + delta);
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = if radius.is_finite() {
            radius.clamp(0.0, MAX_CORNER_RADIUS)
        } else {
            DEFAULT_CORNER_RADIUS
        };
    }

    pub fn adjust_radius(&mut self, delta: f32) {
        self.set_radius(self.radius + delta);
    }

    /// Label font family. Names outside [`LabelFont::all`] are kept as given.
    pub fn font(&self) -> &str {
        &self.font
    }

    /// The preset matching the current family, if any
    pub fn preset_font(&self) -> Option<LabelFont> {
        LabelFont::from_name(&self.font)
    }

    pub fn set_font(&mut self, family: &str) {
        let family = family.trim();
        if family.is_empty() {
            warn!(
                "empty label font name, using {}",
                LabelFont::default().name()
            );
            self.font = LabelFont::default().name().to_string();
            return;
        }
        self.font = match LabelFont::from_name(family) {
            Some(preset) => preset.name().to_string(),
            None => family.to_string(),
        };
    }

    /// Step to the next preset. A custom family steps to the first one.
    pub fn next_font(&mut self) {
        let next = match self.preset_font() {
            Some(preset) => preset.next(),
            None => LabelFont::all()[0],
        };
        self.font = next.name().to_string();
    }

    /// Step to the previous preset. A custom family steps to the last one.
    pub fn prev_font(&mut self) {
        let all = LabelFont::all();
        let prev = match self.preset_font() {
            Some(preset) => preset.prev(),
            None => all[all.len() - 1],
        };
        self.font = prev.name().to_string();
    }

    /// CSS-style description of the active background
    pub fn css(&self) -> String {
        match self.kind {
            BackgroundKind::Solid => self.solid_color.clone(),
            BackgroundKind::Gradient => css_gradient(&self.stops, self.angle),
        }
    }
}

fn clamp_position(position: f32) -> f32 {
    if position.is_finite() {
        position.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let style = StyleController::default().snapshot();
        assert_eq!(style, StyleConfig::default());
    }

    #[test]
    fn test_snapshot_carries_active_kind_only() {
        let mut controller = StyleController::default();
        controller.solid_color = "#000000".to_string();
        controller.toggle_kind();
        match controller.snapshot().background {
            Background::Gradient {
                stops,
                angle_degrees,
            } => {
                assert_eq!(stops, default_gradient_stops());
                assert_eq!(angle_degrees, 90.0);
            }
            other => panic!("expected gradient, got {:?}", other),
        }

        controller.toggle_kind();
        assert_eq!(controller.snapshot(), StyleConfig::solid("#000000"));
    }

    #[test]
    fn test_add_stop_splits_widest_gap() {
        let mut controller = StyleController::default();
        let index = controller.add_stop();
        assert_eq!(index, 2);
        assert_eq!(controller.stops()[2], GradientStop::new(NEW_STOP_COLOR, 50.0));

        controller.add_stop();
        assert_eq!(controller.stops()[3].position, 25.0);
    }

    #[test]
    fn test_add_stop_uses_edge_gap() {
        let mut controller = StyleController::default();
        controller.update_stop_position(0, 60.0);
        controller.add_stop();
        assert_eq!(controller.stops()[2].position, 30.0);
    }

    #[test]
    fn test_remove_stop_keeps_two() {
        let mut controller = StyleController::default();
        assert!(!controller.remove_stop(0));
        controller.add_stop();
        assert!(controller.remove_stop(0));
        assert_eq!(controller.stops().len(), 2);
        assert!(!controller.remove_stop(5));
    }

    #[test]
    fn test_update_stop_clamps_position() {
        let mut controller = StyleController::default();
        assert!(controller.update_stop_position(1, 140.0));
        assert_eq!(controller.stops()[1].position, 100.0);
        assert!(controller.update_stop_position(1, -3.0));
        assert_eq!(controller.stops()[1].position, 0.0);
        assert!(controller.update_stop_color(0, "red"));
        assert_eq!(controller.stops()[0].color, "red");
        assert!(!controller.update_stop_color(9, "red"));
    }

    #[test]
    fn test_angle_wraps() {
        let mut controller = StyleController::default();
        controller.adjust_angle(300.0);
        assert_eq!(controller.angle(), 30.0);
        controller.adjust_angle(-45.0);
        assert_eq!(controller.angle(), 345.0);
        controller.set_angle(720.0);
        assert_eq!(controller.angle(), 0.0);
    }

    #[test]
    fn test_radius_clamped() {
        let mut controller = StyleController::default();
        controller.adjust_radius(100.0);
        assert_eq!(controller.radius(), 50.0);
        controller.set_radius(-1.0);
        assert_eq!(controller.radius(), 0.0);
    }

    #[test]
    fn test_from_style_round_trip() {
        let style = StyleConfig::gradient(
            vec![
                GradientStop::new("#111111", 0.0),
                GradientStop::new("#222222", 40.0),
                GradientStop::new("#333333", 100.0),
            ],
            135.0,
        )
        .with_label_font("Georgia")
        .with_corner_radius(12.0);
        let controller = StyleController::from_style(&style);
        assert_eq!(controller.preset_font(), Some(LabelFont::Georgia));
        assert_eq!(controller.snapshot(), style);
    }

    #[test]
    fn test_custom_font_is_kept() {
        let style = StyleConfig::default().with_label_font("Comic Sans");
        let mut controller = StyleController::from_style(&style);
        assert_eq!(controller.font(), "Comic Sans");
        assert_eq!(controller.preset_font(), None);
        assert_eq!(controller.snapshot().label_font, "Comic Sans");

        controller.next_font();
        assert_eq!(controller.preset_font(), Some(LabelFont::Inter));

        controller.set_font("Comic Sans");
        controller.prev_font();
        assert_eq!(controller.preset_font(), Some(LabelFont::Monaco));
    }

    #[test]
    fn test_font_names_normalised() {
        let mut controller = StyleController::default();
        controller.set_font("  georgia ");
        assert_eq!(controller.font(), "Georgia");
        controller.set_font("   ");
        assert_eq!(controller.font(), "Inter");
    }

    #[test]
    fn test_css_description() {
        let mut controller = StyleController::default();
        assert_eq!(controller.css(), "#f8fafc");
        controller.toggle_kind();
        controller.add_stop();
        insta::assert_snapshot!(
            controller.css(),
            @"linear-gradient(90deg, #f8fafc 0%, #808080 50%, #e2e8f0 100%)"
        );
    }
}
