//! Terminal capability detection
//!
//! Detects color support, terminal size and whether the terminal runs on a
//! dark background.

use crossterm::terminal;
use std::env;

/// Level of color support in the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSupport {
    /// No color support
    NoColor,
    /// 16 basic colors
    Color16,
    /// 256 color palette
    Color256,
    /// Full 24-bit RGB (TrueColor)
    #[default]
    TrueColor,
}

impl ColorSupport {
    pub fn name(&self) -> &'static str {
        match self {
            ColorSupport::NoColor => "None",
            ColorSupport::Color16 => "16 Colors",
            ColorSupport::Color256 => "256 Colors",
            ColorSupport::TrueColor => "True Color",
        }
    }
}

/// Terminal capabilities
#[derive(Debug, Clone)]
pub struct TerminalCapabilities {
    pub color_support: ColorSupport,
    /// `None` when the terminal does not report its background
    pub prefers_dark: Option<bool>,
    pub size: (u16, u16),
}

impl Default for TerminalCapabilities {
    fn default() -> Self {
        Self {
            color_support: ColorSupport::TrueColor,
            prefers_dark: None,
            size: (80, 24),
        }
    }
}

/// Detect terminal capabilities
pub fn detect_capabilities() -> TerminalCapabilities {
    TerminalCapabilities {
        color_support: detect_color_support(),
        prefers_dark: system_prefers_dark(),
        size: terminal::size().unwrap_or((80, 24)),
    }
}

/// Whether the terminal background is dark, from `COLORFGBG`
pub fn system_prefers_dark() -> Option<bool> {
    env::var("COLORFGBG")
        .ok()
        .and_then(|value| parse_colorfgbg(&value))
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`). Background indices
/// 0-6 and 8 are the dark ANSI colours.
fn parse_colorfgbg(value: &str) -> Option<bool> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(background, 0..=6 | 8))
}

/// Detect the level of color support
fn detect_color_support() -> ColorSupport {
    // Check NO_COLOR environment variable (standard for disabling colors)
    if env::var("NO_COLOR").is_ok() {
        return ColorSupport::NoColor;
    }

    let colorterm = env::var("COLORTERM").ok();
    let term = env::var("TERM").ok();
    let windows_terminal = env::var("WT_SESSION").is_ok();
    classify_color_support(colorterm.as_deref(), term.as_deref(), windows_terminal)
}

fn classify_color_support(
    colorterm: Option<&str>,
    term: Option<&str>,
    windows_terminal: bool,
) -> ColorSupport {
    if let Some(colorterm) = colorterm {
        let colorterm = colorterm.to_lowercase();
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return ColorSupport::TrueColor;
        }
    }

    if let Some(term) = term {
        let term = term.to_lowercase();

        if term.contains("kitty")
            || term.contains("alacritty")
            || term.contains("iterm")
            || term.contains("vte")
            || term.contains("256color")
        {
            // Many 256color terminals also support TrueColor
            if colorterm.is_some() {
                return ColorSupport::TrueColor;
            }
            return ColorSupport::Color256;
        }

        if term.contains("xterm") {
            if term.contains("256") {
                return ColorSupport::Color256;
            }
            return ColorSupport::Color16;
        }

        if term.contains("screen") || term.contains("tmux") {
            return ColorSupport::Color256;
        }

        if term.contains("linux") || term.contains("console") {
            return ColorSupport::Color16;
        }
    }

    if windows_terminal {
        return ColorSupport::TrueColor;
    }

    // Most modern terminals manage at least this
    ColorSupport::Color256
}
