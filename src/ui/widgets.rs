//! Slot and style panel widgets

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::Palette;
use crate::compose::layout::Slot;
use crate::state::{AppState, ColorTarget, Setting};

/// Render the A/B slot panel
pub fn render_slots(frame: &mut Frame, area: Rect, state: &AppState, colors: &Palette) {
    let lines: Vec<Line> = [Slot::A, Slot::B]
        .into_iter()
        .map(|slot| {
            let is_selected = slot == state.selected_slot;
            let (value, value_style) = match (state.slot_name(slot), state.slots.get(slot)) {
                (Some(name), Some(image)) => (
                    format!("{} ({}x{})", name, image.width(), image.height()),
                    Style::default().fg(colors.text),
                ),
                _ => ("empty [L]/[P]".to_string(), Style::default().fg(colors.muted)),
            };

            Line::from(vec![
                Span::styled(
                    if is_selected { "▸ " } else { "  " },
                    Style::default().fg(colors.accent),
                ),
                Span::styled(
                    format!("{}: ", slot),
                    Style::default()
                        .fg(colors.highlight)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(value, value_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the style settings panel
pub fn render_settings(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    is_focused: bool,
    colors: &Palette,
) {
    let current = state.current_setting();
    let mut lines = Vec::new();

    for setting in state.settings() {
        let is_selected = is_focused && setting == current;
        let editing = state
            .color_edit
            .as_ref()
            .filter(|edit| edits(edit.target, setting));

        let value = match editing {
            Some(edit) => format!("{}▌", edit.input),
            None => state.setting_value(setting),
        };

        lines.push(create_setting_line(
            &state.setting_name(setting),
            &value,
            is_selected,
            editing.is_some(),
            hint(setting),
            colors,
        ));
    }

    // Action buttons
    lines.push(Line::from(""));
    lines.push(create_action_line("[G]", "Generate", colors));
    lines.push(create_action_line("[S]", "Save PNG", colors));
    lines.push(create_action_line("[C]", "Copy to clipboard", colors));

    if is_focused {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            state.style.css(),
            Style::default().fg(colors.muted),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn edits(target: ColorTarget, setting: Setting) -> bool {
    match (target, setting) {
        (ColorTarget::Solid, Setting::SolidColor) => true,
        (ColorTarget::Stop(a), Setting::Stop(b)) => a == b,
        _ => false,
    }
}

fn hint(setting: Setting) -> Option<&'static str> {
    match setting {
        Setting::Background | Setting::Font | Setting::Theme => Some("[←/→]"),
        Setting::SolidColor => Some("[Enter]"),
        Setting::Stop(_) => Some("[+/-/Enter]"),
        Setting::Angle | Setting::Radius => Some("[←/→ +/-]"),
    }
}

/// Create a setting line with label, value, and optional hint
fn create_setting_line(
    label: &str,
    value: &str,
    is_selected: bool,
    is_editing: bool,
    hint: Option<&str>,
    colors: &Palette,
) -> Line<'static> {
    let indicator = if is_selected { "▸" } else { " " };

    let label_style = if is_selected {
        Style::default()
            .fg(colors.highlight)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.text)
    };

    let value_style = if is_editing {
        Style::default().fg(colors.action)
    } else if is_selected {
        Style::default().fg(colors.accent)
    } else {
        Style::default().fg(colors.muted)
    };

    let mut spans = vec![
        Span::styled(format!("{} ", indicator), Style::default().fg(colors.accent)),
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(value.to_string(), value_style),
    ];

    if let Some(hint_text) = hint.filter(|_| is_selected) {
        spans.push(Span::styled(
            format!(" {}", hint_text),
            Style::default().fg(colors.muted),
        ));
    }

    Line::from(spans)
}

/// Create an action line (button-like)
fn create_action_line(key: &str, label: &str, colors: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key.to_string(), Style::default().fg(colors.action)),
        Span::styled(format!(" {}", label), Style::default().fg(colors.text)),
    ])
}
