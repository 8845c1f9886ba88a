//! Application state management
//!
//! Single source of truth for the interface: the two image slots, the style
//! being edited, the last composition and the theme.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use log::{debug, warn};

use crate::color_space::parse_color;
use crate::compose::layout::Slot;
use crate::compose::style::BackgroundKind;
use crate::compose::Composition;
use crate::config::Config;
use crate::export::{copy_to_clipboard, export_png};
use crate::image_loader::{load_image, load_image_from_clipboard, DecodedImage, ImageSlots};
use crate::style_controller::StyleController;
use crate::terminal_capabilities::{system_prefers_dark, TerminalCapabilities};
use crate::theme::{ResolvedTheme, ThemeController, ThemeSubscription};
use crate::worker::{WorkerMessage, WorkerResponse};

/// How often the system light/dark preference is re-read
pub const SYSTEM_THEME_INTERVAL: Duration = Duration::from_secs(2);

/// Which widget is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedWidget {
    #[default]
    Slots,
    Settings,
    Preview,
}

impl FocusedWidget {
    pub fn next(&self) -> Self {
        match self {
            FocusedWidget::Slots => FocusedWidget::Settings,
            FocusedWidget::Settings => FocusedWidget::Preview,
            FocusedWidget::Preview => FocusedWidget::Slots,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FocusedWidget::Slots => FocusedWidget::Preview,
            FocusedWidget::Settings => FocusedWidget::Slots,
            FocusedWidget::Preview => FocusedWidget::Settings,
        }
    }
}

/// One row of the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Background,
    SolidColor,
    Stop(usize),
    Angle,
    Font,
    Radius,
    Theme,
}

/// Colour field being typed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Solid,
    Stop(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorEdit {
    pub target: ColorTarget,
    pub input: String,
}

/// Main application state
pub struct AppState {
    pub focus: FocusedWidget,
    pub show_help: bool,
    pub should_quit: bool,

    // Inputs
    pub slots: ImageSlots,
    pub slot_names: [Option<String>; 2],
    pub selected_slot: Slot,

    // Style editing
    pub style: StyleController,
    pub selected_setting: usize,
    pub color_edit: Option<ColorEdit>,

    // Output
    pub composition: Option<Composition>,
    pub is_rendering: bool,
    pub last_render_time_ms: u64,
    next_request_id: u64,
    pending_request: Option<u64>,

    pub status_message: String,
    pub status_is_error: bool,

    // Theme
    pub theme: ThemeController,
    theme_subscription: ThemeSubscription,
    pub resolved_theme: ResolvedTheme,
    system_probe: fn() -> Option<bool>,
    system_check_interval: Duration,
    last_system_check: Instant,

    // Terminal info
    pub terminal_size: (u16, u16),
    pub capabilities: TerminalCapabilities,

    pub config: Config,

    // Interactive load prompt (when pressing [L])
    pub load_prompt_active: bool,
    pub load_prompt_input: String,
    pub load_prompt_error: Option<String>,

    // Worker communication
    worker_tx: Sender<WorkerMessage>,
}

impl AppState {
    pub fn new(
        config: Config,
        capabilities: TerminalCapabilities,
        worker_tx: Sender<WorkerMessage>,
    ) -> Self {
        let theme = ThemeController::new(
            config.ui.theme,
            capabilities.prefers_dark.unwrap_or(true),
        );
        let theme_subscription = theme.subscribe();
        let resolved_theme = theme.resolve();

        Self {
            focus: FocusedWidget::default(),
            show_help: false,
            should_quit: false,

            slots: ImageSlots::new(),
            slot_names: [None, None],
            selected_slot: Slot::A,

            style: StyleController::from_style(&config.style),
            selected_setting: 0,
            color_edit: None,

            composition: None,
            is_rendering: false,
            last_render_time_ms: 0,
            next_request_id: 0,
            pending_request: None,

            status_message: "Ready - Press [?] for help".to_string(),
            status_is_error: false,

            theme,
            theme_subscription,
            resolved_theme,
            system_probe: system_prefers_dark,
            system_check_interval: SYSTEM_THEME_INTERVAL,
            last_system_check: Instant::now(),

            terminal_size: capabilities.size,
            capabilities,

            config,

            load_prompt_active: false,
            load_prompt_input: String::new(),
            load_prompt_error: None,

            worker_tx,
        }
    }

    /// Update terminal size on resize
    pub fn set_terminal_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
    }

    /// Set status message
    pub fn set_status(&mut self, message: &str, is_error: bool) {
        self.status_message = message.to_string();
        self.status_is_error = is_error;
    }

    pub fn slot_name(&self, slot: Slot) -> Option<&str> {
        self.slot_names[slot_index(slot)].as_deref()
    }

    /// Put an image in a slot, replacing what was there
    pub fn set_slot_image(&mut self, slot: Slot, name: String, image: DecodedImage) {
        let (width, height) = image.dimensions();
        self.slots.set(slot, image);
        self.set_status(&format!("Image {}: {} ({}x{})", slot, name, width, height), false);
        self.slot_names[slot_index(slot)] = Some(name);
    }

    pub fn clear_slot(&mut self, slot: Slot) {
        if self.slots.clear(slot).is_some() {
            self.slot_names[slot_index(slot)] = None;
            self.set_status(&format!("Cleared image {}", slot), false);
        }
    }

    /// Paste a clipboard image into the first empty slot
    pub fn paste_from_clipboard(&mut self) {
        if self.slots.is_full() {
            self.set_status("Both slots are filled - clear one with [X] first", true);
            return;
        }
        match load_image_from_clipboard() {
            Ok(image) => self.paste_image(image),
            Err(e) => self.set_status(&format!("Paste failed: {}", e), true),
        }
    }

    /// Place `image` into the first empty slot, A before B
    pub fn paste_image(&mut self, image: DecodedImage) {
        let (width, height) = image.dimensions();
        match self.slots.paste(image) {
            Some(slot) => {
                self.slot_names[slot_index(slot)] = Some("clipboard".to_string());
                self.selected_slot = slot;
                self.set_status(
                    &format!("Pasted image {} ({}x{})", slot, width, height),
                    false,
                );
            }
            None => self.set_status("Both slots are filled - clear one with [X] first", true),
        }
    }

    /// Ask a worker to compose the current slots and style
    pub fn trigger_generate(&mut self) {
        if self.is_rendering {
            return;
        }

        let pair = self.slots.pair().map(|(a, b)| (a.clone(), b.clone()));
        let Some((image_a, image_b)) = pair else {
            self.set_status("Load both images (A and B) before generating", false);
            return;
        };

        let id = self.next_request_id;
        self.next_request_id += 1;
        let msg = WorkerMessage::ComposeRequest {
            id,
            image_a,
            image_b,
            style: self.style.snapshot(),
        };

        if self.worker_tx.send(msg).is_err() {
            self.set_status("Render workers are not running", true);
            return;
        }
        debug!("sent compose request {}", id);
        self.pending_request = Some(id);
        self.is_rendering = true;
        self.set_status("Generating...", false);
    }

    /// Handle response from worker thread
    pub fn handle_worker_response(&mut self, response: WorkerResponse) {
        let id = match &response {
            WorkerResponse::ComposeComplete { id, .. } | WorkerResponse::Error { id, .. } => *id,
        };
        if self.pending_request != Some(id) {
            debug!("ignoring stale response {}", id);
            return;
        }
        self.pending_request = None;
        self.is_rendering = false;

        match response {
            WorkerResponse::ComposeComplete {
                composition,
                render_time,
                ..
            } => {
                self.last_render_time_ms = render_time;
                self.set_status(
                    &format!(
                        "Generated {}x{} in {}ms",
                        composition.width, composition.height, render_time
                    ),
                    false,
                );
                self.composition = Some(*composition);
            }
            WorkerResponse::Error { message, .. } => {
                self.set_status(&format!("Error: {}", message), true);
            }
        }
    }

    /// Replace the source of the system dark-mode hint
    pub fn set_system_probe(&mut self, probe: fn() -> Option<bool>, interval: Duration) {
        self.system_probe = probe;
        self.system_check_interval = interval;
    }

    /// Re-read the system preference when due, then pick up theme changes
    /// pushed by the controller
    pub fn poll_theme(&mut self) {
        if self.last_system_check.elapsed() >= self.system_check_interval {
            self.last_system_check = Instant::now();
            if let Some(dark) = (self.system_probe)() {
                self.theme.set_system_prefers_dark(dark);
            }
        }
        if let Some(theme) = self.theme_subscription.latest() {
            self.resolved_theme = theme;
        }
    }

    /// Write the composition to the configured export directory
    pub fn save_composition(&mut self) {
        let Some(composition) = self.composition.as_ref() else {
            self.set_status("Nothing to save - press [G] to generate", false);
            return;
        };
        match export_png(composition, &self.config.export.output_dir) {
            Ok(path) => self.set_status(&format!("Saved to {}", path.display()), false),
            Err(e) => self.set_status(&format!("Save failed: {}", e), true),
        }
    }

    pub fn copy_composition(&mut self) {
        let Some(composition) = self.composition.as_ref() else {
            self.set_status("Nothing to copy - press [G] to generate", false);
            return;
        };
        match copy_to_clipboard(composition) {
            Ok(()) => self.set_status("Copied comparison to clipboard", false),
            Err(e) => self.set_status(&format!("Copy failed: {}", e), true),
        }
    }

    /// Rows the settings panel shows for the current background kind
    pub fn settings(&self) -> Vec<Setting> {
        let mut rows = vec![Setting::Background];
        match self.style.kind {
            BackgroundKind::Solid => rows.push(Setting::SolidColor),
            BackgroundKind::Gradient => {
                rows.extend((0..self.style.stops().len()).map(Setting::Stop));
                rows.push(Setting::Angle);
            }
        }
        rows.extend([Setting::Font, Setting::Radius, Setting::Theme]);
        rows
    }

    pub fn current_setting(&self) -> Setting {
        let rows = self.settings();
        rows[self.selected_setting.min(rows.len() - 1)]
    }

    /// Navigate to next setting in the settings panel
    pub fn next_setting(&mut self) {
        let count = self.settings().len();
        self.selected_setting = (self.selected_setting + 1) % count;
    }

    /// Navigate to previous setting in the settings panel
    pub fn prev_setting(&mut self) {
        let count = self.settings().len();
        self.selected_setting = if self.selected_setting == 0 {
            count - 1
        } else {
            (self.selected_setting - 1).min(count - 1)
        };
    }

    /// Keep the selection inside the rows after the row set changed
    fn clamp_selection(&mut self) {
        let count = self.settings().len();
        self.selected_setting = self.selected_setting.min(count - 1);
    }

    pub fn setting_name(&self, setting: Setting) -> String {
        match setting {
            Setting::Background => "Background".to_string(),
            Setting::SolidColor => "Color".to_string(),
            Setting::Stop(i) => format!("Stop {}", i + 1),
            Setting::Angle => "Angle".to_string(),
            Setting::Font => "Font".to_string(),
            Setting::Radius => "Radius".to_string(),
            Setting::Theme => "Theme".to_string(),
        }
    }

    pub fn setting_value(&self, setting: Setting) -> String {
        match setting {
            Setting::Background => self.style.kind.name().to_string(),
            Setting::SolidColor => self.style.solid_color.clone(),
            Setting::Stop(i) => self
                .style
                .stops()
                .get(i)
                .map(|stop| format!("{} @ {}%", stop.color, stop.position))
                .unwrap_or_default(),
            Setting::Angle => format!("{}°", self.style.angle()),
            Setting::Font => self.style.font().to_string(),
            Setting::Radius => format!("{}px", self.style.radius()),
            Setting::Theme => self.theme.preference().name().to_string(),
        }
    }

    /// ←/→ on the selected row. `step` is -1 or 1.
    pub fn cycle_setting(&mut self, step: i32) {
        let delta = step as f32;
        match self.current_setting() {
            Setting::Background => {
                self.style.toggle_kind();
                self.clamp_selection();
            }
            Setting::Stop(i) => {
                if let Some(position) = self.style.stops().get(i).map(|s| s.position) {
                    self.style.update_stop_position(i, position + delta);
                }
            }
            Setting::Angle => self.style.adjust_angle(delta),
            Setting::Font => {
                if step > 0 {
                    self.style.next_font();
                } else {
                    self.style.prev_font();
                }
            }
            Setting::Radius => self.style.adjust_radius(delta),
            Setting::Theme => {
                let preference = self.theme.preference();
                let preference = if step > 0 {
                    preference.next()
                } else {
                    preference.prev()
                };
                self.theme.set_preference(preference);
                self.config.ui.theme = preference;
            }
            Setting::SolidColor => {}
        }
    }

    /// +/- on the selected row: coarse steps for numbers, add/remove for stops
    pub fn step_setting(&mut self, increase: bool) {
        match self.current_setting() {
            Setting::Stop(i) => {
                if increase {
                    let index = self.style.add_stop();
                    self.set_status(&format!("Added stop {}", index + 1), false);
                } else if self.style.remove_stop(i) {
                    self.clamp_selection();
                    self.set_status(&format!("Removed stop {}", i + 1), false);
                } else {
                    self.set_status("A gradient needs at least two stops", true);
                }
            }
            Setting::Angle => self.style.adjust_angle(if increase { 15.0 } else { -15.0 }),
            Setting::Radius => self.style.adjust_radius(if increase { 5.0 } else { -5.0 }),
            _ => self.cycle_setting(if increase { 1 } else { -1 }),
        }
    }

    /// Start typing a colour for the selected row, if it has one
    pub fn start_color_edit(&mut self) -> bool {
        let (target, current) = match self.current_setting() {
            Setting::SolidColor => (ColorTarget::Solid, self.style.solid_color.clone()),
            Setting::Stop(i) => match self.style.stops().get(i) {
                Some(stop) => (ColorTarget::Stop(i), stop.color.clone()),
                None => return false,
            },
            _ => return false,
        };
        self.color_edit = Some(ColorEdit {
            target,
            input: current,
        });
        self.set_status("Type a colour (#rrggbb or name), Enter to apply, Esc to cancel", false);
        true
    }

    pub fn cancel_color_edit(&mut self) {
        self.color_edit = None;
        self.set_status("Colour edit cancelled", false);
    }

    /// Apply the typed colour. Invalid input keeps the editor open.
    pub fn submit_color_edit(&mut self) {
        let Some(edit) = self.color_edit.as_ref() else {
            return;
        };
        let input = edit.input.trim().to_string();
        if parse_color(&input).is_none() {
            self.set_status(&format!("Not a colour: {:?}", input), true);
            return;
        }

        match edit.target {
            ColorTarget::Solid => self.style.solid_color = input,
            ColorTarget::Stop(i) => {
                self.style.update_stop_color(i, input);
            }
        }
        self.color_edit = None;
        self.set_status("Colour updated", false);
    }

    /// Start the interactive load prompt for the selected slot
    pub fn start_load_prompt(&mut self) {
        self.load_prompt_active = true;
        self.load_prompt_input.clear();
        self.load_prompt_error = None;
        self.set_status(
            &format!("Enter path for image {} and press Enter", self.selected_slot),
            false,
        );
    }

    /// Cancel the interactive load prompt
    pub fn cancel_load_prompt(&mut self) {
        self.load_prompt_active = false;
        self.load_prompt_input.clear();
        self.load_prompt_error = None;
        self.set_status("Load cancelled", false);
    }

    /// Attempt to load the image from the prompt input
    pub fn submit_load_prompt(&mut self) {
        let input = self.load_prompt_input.trim();
        if input.is_empty() {
            self.load_prompt_error = Some("Path is empty".to_string());
            self.set_status("Path is empty", true);
            return;
        }

        let path = PathBuf::from(input);
        if !path.exists() {
            self.load_prompt_error = Some("File not found".to_string());
            self.set_status("File not found", true);
            return;
        }

        match load_image(&path) {
            Ok(image) => {
                let name = path
                    .file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                self.load_prompt_active = false;
                self.load_prompt_input.clear();
                self.load_prompt_error = None;
                let slot = self.selected_slot;
                self.set_slot_image(slot, name, image);
            }
            Err(e) => {
                warn!("load failed: {:#}", e);
                self.load_prompt_error = Some(format!("Failed to load: {}", e));
                self.set_status(&format!("Failed to load: {}", e), true);
            }
        }
    }

    /// Copy the edited style and theme into the config for saving
    pub fn sync_config(&mut self) {
        self.config.style = self.style.snapshot();
        self.config.ui.theme = self.theme.preference();
    }
}

fn slot_index(slot: Slot) -> usize {
    match slot {
        Slot::A => 0,
        Slot::B => 1,
    }
}
