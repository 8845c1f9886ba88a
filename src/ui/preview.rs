//! Preview area rendering
//!
//! The composition is drawn with upper half blocks: each terminal cell shows
//! two vertically stacked pixels, the top one as foreground and the bottom
//! one as background.

use image::RgbaImage;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::Palette;
use crate::color_space::{to_terminal_color, Rgb};
use crate::state::AppState;
use crate::terminal_capabilities::ColorSupport;

const UPPER_HALF: &str = "▀";

/// Render the preview area
pub fn render_preview(frame: &mut Frame, area: Rect, state: &AppState, colors: &Palette) {
    match state.composition.as_ref() {
        Some(composition) => {
            let lines = half_block_lines(
                &composition.image,
                area.width,
                area.height,
                state.capabilities.color_support,
                colors.canvas,
            );
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
        }
        None => render_placeholder(frame, area, state, colors),
    }
}

/// Cell grid size that fits `image` into `cols` x `rows` cells, keeping its
/// aspect ratio. Every cell row holds two pixel rows.
pub fn fit_cells(image_size: (u32, u32), cols: u16, rows: u16) -> (u16, u16) {
    let (width, height) = image_size;
    if width == 0 || height == 0 || cols == 0 || rows == 0 {
        return (0, 0);
    }
    let scale = (cols as f64 / width as f64).min(rows as f64 * 2.0 / height as f64);
    let fitted_cols = ((width as f64 * scale).floor() as u16).clamp(1, cols);
    let fitted_rows = ((height as f64 * scale / 2.0).ceil() as u16).clamp(1, rows);
    (fitted_cols, fitted_rows)
}

/// Downsample `image` into half-block lines
pub fn half_block_lines(
    image: &RgbaImage,
    cols: u16,
    rows: u16,
    support: ColorSupport,
    canvas: Color,
) -> Vec<Line<'static>> {
    let (fitted_cols, fitted_rows) = fit_cells(image.dimensions(), cols, rows);
    if fitted_cols == 0 {
        return Vec::new();
    }

    let (width, height) = image.dimensions();
    let pixel_rows = fitted_rows as u32 * 2;
    let sample = |col: u16, pixel_row: u32| -> Color {
        let x = (col as u32 * width / fitted_cols as u32).min(width - 1);
        let y = pixel_row * height / pixel_rows;
        if y >= height {
            return canvas;
        }
        let pixel = image.get_pixel(x, y);
        if pixel[3] < 128 {
            canvas
        } else {
            to_terminal_color(Rgb::new(pixel[0], pixel[1], pixel[2]), support)
        }
    };

    (0..fitted_rows)
        .map(|row| {
            let spans: Vec<Span<'static>> = (0..fitted_cols)
                .map(|col| {
                    let top = sample(col, row as u32 * 2);
                    let bottom = sample(col, row as u32 * 2 + 1);
                    Span::styled(UPPER_HALF, Style::default().fg(top).bg(bottom))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Render placeholder when no composition exists yet
fn render_placeholder(frame: &mut Frame, area: Rect, state: &AppState, colors: &Palette) {
    let message = if state.is_rendering {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Generating...",
                Style::default().fg(colors.highlight),
            )),
        ]
    } else if state.slots.is_full() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Press [G] to generate the comparison",
                Style::default().fg(colors.highlight),
            )),
        ]
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Load both images (A and B), then press [G]",
                Style::default().fg(colors.muted),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "[L] load from path   [P] paste from clipboard",
                Style::default().fg(colors.action),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Supported formats: PNG, JPEG, GIF, WebP",
                Style::default().fg(colors.muted),
            )),
        ]
    };

    let widget = Paragraph::new(message)
        .style(Style::default().fg(colors.muted))
        .alignment(Alignment::Center);

    frame.render_widget(widget, area);
}
