//! Background fills: flat colours and CSS-style linear gradients

use log::warn;

use super::style::{sorted_stops, Background, GradientStop};
use crate::color_space::{default_background, interpolate_color, parse_color_or_default, Rgb};

/// Line the gradient runs along, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientAxis {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

impl GradientAxis {
    /// Axis for a CSS angle: 0° runs bottom to top, 90° left to right.
    ///
    /// The axis passes through the canvas centre and is as long as the
    /// canvas diagonal.
    pub fn from_angle(angle_degrees: f32, width: f32, height: f32) -> Self {
        let theta = (angle_degrees - 90.0).to_radians();
        let half = (width * width + height * height).sqrt() / 2.0;
        let (cx, cy) = (width / 2.0, height / 2.0);
        let (dx, dy) = (theta.cos() * half, theta.sin() * half);

        Self {
            start: (cx - dx, cy - dy),
            end: (cx + dx, cy + dy),
        }
    }

    /// Fractional position of a point along the axis, unclamped
    pub fn offset_at(&self, x: f32, y: f32) -> f32 {
        let (ax, ay) = (self.end.0 - self.start.0, self.end.1 - self.start.1);
        let length_sq = ax * ax + ay * ay;
        if length_sq <= f32::EPSILON {
            return 0.0;
        }
        ((x - self.start.0) * ax + (y - self.start.1) * ay) / length_sq
    }
}

/// Resolved stops: parsed colours at fractional offsets in ascending order
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<(f32, Rgb)>,
}

impl ColorRamp {
    /// Sorts the stops by position and parses their colours
    pub fn from_stops(stops: &[GradientStop]) -> Self {
        let stops = sorted_stops(stops)
            .iter()
            .map(|stop| {
                let position = if stop.position.is_finite() {
                    stop.position.clamp(0.0, 100.0)
                } else {
                    0.0
                };
                (position / 100.0, parse_color_or_default(&stop.color))
            })
            .collect();
        Self { stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Colour at offset `t`. Offsets outside the first and last stop take the
    /// end colours.
    pub fn sample(&self, t: f32) -> Rgb {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return default_background(),
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        for pair in self.stops.windows(2) {
            let ((from, from_color), (to, to_color)) = (pair[0], pair[1]);
            if t >= from && t <= to {
                let span = to - from;
                if span <= f32::EPSILON {
                    return to_color;
                }
                return interpolate_color(from_color, to_color, (t - from) / span);
            }
        }
        last.1
    }
}

/// What the background resolves to for one canvas
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Flat(Rgb),
    Linear { axis: GradientAxis, ramp: ColorRamp },
}

impl Fill {
    /// Resolve a background for a canvas of the given size.
    ///
    /// Gradients with fewer than two stops degrade to a flat fill.
    pub fn resolve(background: &Background, width: f32, height: f32) -> Self {
        match background {
            Background::Solid { color } => Fill::Flat(parse_color_or_default(color)),
            Background::Gradient {
                stops,
                angle_degrees,
            } => {
                let ramp = ColorRamp::from_stops(stops);
                match ramp.len() {
                    0 => {
                        warn!("gradient has no stops, using the default background");
                        Fill::Flat(default_background())
                    }
                    1 => Fill::Flat(ramp.sample(0.0)),
                    _ => {
                        let angle = if angle_degrees.is_finite() {
                            *angle_degrees
                        } else {
                            0.0
                        };
                        Fill::Linear {
                            axis: GradientAxis::from_angle(angle, width, height),
                            ramp,
                        }
                    }
                }
            }
        }
    }

    /// Colour of the pixel whose top-left corner is `(x, y)`
    pub fn color_at(&self, x: u32, y: u32) -> Rgb {
        match self {
            Fill::Flat(color) => *color,
            Fill::Linear { axis, ramp } => {
                ramp.sample(axis.offset_at(x as f32 + 0.5, y as f32 + 0.5))
            }
        }
    }
}
