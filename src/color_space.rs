//! Colour parsing, interpolation and terminal quantization
//!
//! Colour strings arrive as free text from the style controls, so parsing is
//! lenient and the rendering path always ends up with a usable colour.

use image::Rgba;
use log::warn;
use palette::Srgb;

use crate::terminal_capabilities::ColorSupport;

/// Background used when nothing valid was supplied
pub const DEFAULT_BACKGROUND: &str = "#f8fafc";

/// RGB color type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_tuple(tuple: (u8, u8, u8)) -> Self {
        Self::new(tuple.0, tuple.1, tuple.2)
    }

    pub fn to_tuple(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Lowercase `#rrggbb` form
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(&self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

impl From<Srgb<u8>> for Rgb {
    fn from(color: Srgb<u8>) -> Self {
        Self::new(color.red, color.green, color.blue)
    }
}

/// The built-in background colour
pub fn default_background() -> Rgb {
    Rgb::new(0xf8, 0xfa, 0xfc)
}

/// Parse a colour string.
///
/// Accepts `#rgb`, `#rrggbb` (with or without the leading `#`) and CSS
/// colour keywords such as `white`.
pub fn parse_color(input: &str) -> Option<Rgb> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(color) = trimmed.parse::<Srgb<u8>>() {
        return Some(color.into());
    }

    palette::named::from_str(&trimmed.to_ascii_lowercase()).map(Rgb::from)
}

/// Parse a colour string, falling back to [`DEFAULT_BACKGROUND`] when invalid
pub fn parse_color_or_default(input: &str) -> Rgb {
    parse_color(input).unwrap_or_else(|| {
        warn!(
            "invalid colour {:?}, using {} instead",
            input, DEFAULT_BACKGROUND
        );
        default_background()
    })
}

/// Interpolate between two colors
pub fn interpolate_color(start: Rgb, end: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    Rgb {
        r: ((1.0 - t) * start.r as f32 + t * end.r as f32).round() as u8,
        g: ((1.0 - t) * start.g as f32 + t * end.g as f32).round() as u8,
        b: ((1.0 - t) * start.b as f32 + t * end.b as f32).round() as u8,
    }
}

/// Convert RGB to perceptual luminance (0.0 to 1.0), BT.709 weights
pub fn rgb_to_luminance(r: u8, g: u8, b: u8) -> f32 {
    0.2126 * (r as f32 / 255.0) + 0.7152 * (g as f32 / 255.0) + 0.0722 * (b as f32 / 255.0)
}

/// Quantize RGB to ANSI 256-color palette
pub fn quantize_to_ansi256(rgb: Rgb) -> u8 {
    let avg = ((rgb.r as u16 + rgb.g as u16 + rgb.b as u16) / 3) as u8;
    let gray_diff = [rgb.r, rgb.g, rgb.b]
        .iter()
        .map(|&c| (c as i16 - avg as i16).abs())
        .max()
        .unwrap_or(0);

    if gray_diff < 10 {
        // Grayscale ramp (232-255)
        let gray_index = (avg as f32 / 255.0 * 23.0).round() as u8;
        return 232 + gray_index;
    }

    // 6x6x6 color cube (16-231)
    let level = |c: u8| (c as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * level(rgb.r) + 6 * level(rgb.g) + level(rgb.b)
}

/// Quantize RGB to ANSI 16-color palette
pub fn quantize_to_ansi16(rgb: Rgb) -> u8 {
    let luminance = rgb_to_luminance(rgb.r, rgb.g, rgb.b);
    let bright = luminance > 0.5;

    let r = rgb.r as f32 / 255.0;
    let g = rgb.g as f32 / 255.0;
    let b = rgb.b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };

    if saturation < 0.2 {
        return if luminance > 0.7 {
            15
        } else if luminance > 0.3 {
            7
        } else {
            0
        };
    }

    let color_base = if r >= g && r >= b {
        if g > b {
            3 // Yellow
        } else {
            1 // Red
        }
    } else if g >= r && g >= b {
        if b > r {
            6 // Cyan
        } else {
            2 // Green
        }
    } else if r > g {
        5 // Magenta
    } else {
        4 // Blue
    };

    if bright {
        color_base + 8
    } else {
        color_base
    }
}

/// Map a colour to what the terminal can display
pub fn to_terminal_color(rgb: Rgb, support: ColorSupport) -> ratatui::style::Color {
    use ratatui::style::Color;

    match support {
        ColorSupport::NoColor => Color::Reset,
        ColorSupport::Color16 => Color::Indexed(quantize_to_ansi16(rgb)),
        ColorSupport::Color256 => Color::Indexed(quantize_to_ansi256(rgb)),
        ColorSupport::TrueColor => Color::Rgb(rgb.r, rgb.g, rgb.b),
    }
}
