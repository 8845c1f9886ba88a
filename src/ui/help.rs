//! Help overlay rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::Palette;

/// Render the help overlay
pub fn render_help_overlay(frame: &mut Frame, area: Rect, colors: &Palette) {
    // At most 70 columns by 30 rows, centered
    let overlay_width = (area.width as f32 * 0.7).min(70.0) as u16;
    let overlay_height = (area.height as f32 * 0.8).min(30.0) as u16;

    let overlay_area = centered_rect(overlay_width, overlay_height, area);

    // Clear background
    frame.render_widget(Clear, overlay_area);

    // Render help content
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent))
        .title(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let help_text = create_help_text(colors);
    let widget = Paragraph::new(help_text).style(Style::default().fg(colors.text));

    frame.render_widget(widget, inner);
}

/// Create help text content
fn create_help_text(colors: &Palette) -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(colors.highlight)
        .add_modifier(Modifier::BOLD);
    let key_style = Style::default().fg(colors.action);
    let desc_style = Style::default().fg(colors.text);

    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", key), key_style),
            Span::styled(desc, desc_style),
        ])
    };

    vec![
        Line::from(Span::styled("Global", section_style)),
        entry("Q", "Quit application"),
        entry("?", "Toggle help overlay"),
        entry("Tab", "Next panel"),
        entry("Shift+Tab", "Previous panel"),
        entry("L", "Load image into selected slot"),
        entry("P", "Paste clipboard image into first empty slot"),
        entry("G", "Generate comparison"),
        entry("S", "Save ab-comparison.png"),
        entry("C", "Copy comparison to clipboard"),
        Line::from(""),
        Line::from(Span::styled("Images", section_style)),
        entry("↑ ↓", "Select slot A or B"),
        entry("Enter", "Load image into selected slot"),
        entry("X / Del", "Clear selected slot"),
        Line::from(""),
        Line::from(Span::styled("Style", section_style)),
        entry("↑ ↓", "Navigate settings"),
        entry("← →", "Change value"),
        entry("+ -", "Larger steps / add or remove stop"),
        entry("Enter", "Edit colour"),
        Line::from(""),
        Line::from(Span::styled(
            "       [Press ? or Esc to close]",
            Style::default().fg(colors.muted),
        )),
    ]
}

/// Create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal_padding = area.width.saturating_sub(width) / 2;
    let vertical_padding = area.height.saturating_sub(height) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(vertical_padding),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(horizontal_padding),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}
