//! UI module
//!
//! Contains all UI rendering components using Ratatui.

mod help;
pub mod preview;
mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::state::{AppState, FocusedWidget};
use crate::theme::ResolvedTheme;

/// Interface colours for one theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub highlight: Color,
    pub action: Color,
    pub error: Color,
    pub bar_bg: Color,
    pub bar_fg: Color,
    /// What transparent composition pixels are shown over
    pub canvas: Color,
}

pub fn palette(theme: ResolvedTheme) -> Palette {
    match theme {
        ResolvedTheme::Dark => Palette {
            text: Color::White,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            highlight: Color::Yellow,
            action: Color::Green,
            error: Color::Red,
            bar_bg: Color::DarkGray,
            bar_fg: Color::White,
            canvas: Color::Rgb(24, 24, 27),
        },
        ResolvedTheme::Light => Palette {
            text: Color::Black,
            muted: Color::Gray,
            accent: Color::Blue,
            highlight: Color::Magenta,
            action: Color::Green,
            error: Color::Red,
            bar_bg: Color::Gray,
            bar_fg: Color::Black,
            canvas: Color::Rgb(244, 244, 245),
        },
    }
}

/// Main render function - draws the entire UI
pub fn render(frame: &mut Frame, state: &AppState) {
    let size = frame.area();
    let colors = palette(state.resolved_theme);

    // Check minimum size
    if size.width < 40 || size.height < 15 {
        render_size_warning(frame, size, &colors);
        return;
    }

    // Main layout: title bar, content, status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_title_bar(frame, main_chunks[0], &colors);
    render_main_content(frame, main_chunks[1], state, &colors);
    render_status_bar(frame, main_chunks[2], state, &colors);

    if state.show_help {
        help::render_help_overlay(frame, size, &colors);
    }
}

/// Render warning when terminal is too small
fn render_size_warning(frame: &mut Frame, area: Rect, colors: &Palette) {
    let warning = Paragraph::new("Terminal too small!\nMinimum: 40x15")
        .style(Style::default().fg(colors.error))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(warning, area);
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, area: Rect, colors: &Palette) {
    let title = Line::from(vec![
        Span::styled(
            " abcompose ",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION")),
            Style::default().fg(colors.muted),
        ),
        Span::raw(" │ "),
        Span::styled("A/B comparison", Style::default().fg(colors.highlight)),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(55))),
        Span::styled("[?]", Style::default().fg(colors.action)),
        Span::raw(" Help  "),
        Span::styled("[Q]", Style::default().fg(colors.error)),
        Span::raw(" Quit "),
    ]);

    let title_widget =
        Paragraph::new(title).style(Style::default().bg(colors.bar_bg).fg(colors.bar_fg));

    frame.render_widget(title_widget, area);
}

/// Render the main content area
fn render_main_content(frame: &mut Frame, area: Rect, state: &AppState, colors: &Palette) {
    // Side-by-side if wide enough, stacked if narrow
    let (slots_area, settings_area, preview_area) = if area.width >= 80 {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(40)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(5)])
            .split(chunks[0]);
        (left[0], left[1], chunks[1])
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(10),
                Constraint::Min(5),
            ])
            .split(area);
        (chunks[0], chunks[1], chunks[2])
    };

    let inner = panel(frame, slots_area, " Images ", state.focus == FocusedWidget::Slots, colors);
    widgets::render_slots(frame, inner, state, colors);

    let focused = state.focus == FocusedWidget::Settings;
    let inner = panel(frame, settings_area, " Style ", focused, colors);
    widgets::render_settings(frame, inner, state, focused, colors);

    let inner = panel(frame, preview_area, " Preview ", state.focus == FocusedWidget::Preview, colors);
    preview::render_preview(frame, inner, state, colors);
}

/// Draw a bordered panel and return its inner area
fn panel(frame: &mut Frame, area: Rect, title: &str, is_focused: bool, colors: &Palette) -> Rect {
    let border_style = if is_focused {
        Style::default().fg(colors.accent)
    } else {
        Style::default().fg(colors.muted)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, colors: &Palette) {
    if state.load_prompt_active {
        let prompt = Line::from(vec![
            Span::styled(
                format!(" Load image {}: ", state.selected_slot),
                Style::default().fg(colors.highlight),
            ),
            Span::raw(format!("{}▌", state.load_prompt_input)),
        ]);
        frame.render_widget(
            Paragraph::new(prompt).style(Style::default().bg(colors.bar_bg).fg(colors.bar_fg)),
            area,
        );
        return;
    }

    let status_color = if state.status_is_error {
        colors.error
    } else {
        colors.bar_fg
    };

    let info = format!(
        "Render: {:>4}ms │ {}",
        state.last_render_time_ms,
        state.capabilities.color_support.name()
    );

    let spacing = (area.width as usize)
        .saturating_sub(state.status_message.chars().count())
        .saturating_sub(info.chars().count())
        .saturating_sub(2);

    let status = Line::from(vec![
        Span::raw(" "),
        Span::styled(&state.status_message, Style::default().fg(status_color)),
        Span::raw(" ".repeat(spacing)),
        Span::styled(&info, Style::default().fg(colors.muted)),
        Span::raw(" "),
    ]);

    let widget = Paragraph::new(status).style(Style::default().bg(colors.bar_bg).fg(colors.bar_fg));

    frame.render_widget(widget, area);
}
