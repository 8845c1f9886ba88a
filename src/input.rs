//! Input handling
//!
//! Maps keyboard events to state transitions with context-sensitive bindings.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::state::{AppState, FocusedWidget};

/// Handle an input event
pub fn handle_event(event: Event, state: &mut AppState) -> Result<()> {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key_event(key_event, state)
        }
        _ => Ok(()),
    }
}

/// Handle a key event
fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Result<()> {
    if state.show_help {
        return handle_help_input(key, state);
    }

    if state.load_prompt_active {
        return handle_load_prompt_input(key, state);
    }

    if state.color_edit.is_some() {
        return handle_color_input(key, state);
    }

    // Global shortcuts
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.should_quit = true;
            return Ok(());
        }
        KeyCode::Char('?') => {
            state.show_help = true;
            return Ok(());
        }
        KeyCode::Tab => {
            state.focus = state.focus.next();
            return Ok(());
        }
        KeyCode::BackTab => {
            state.focus = state.focus.prev();
            return Ok(());
        }
        KeyCode::Char('g') | KeyCode::Char('G') => {
            state.trigger_generate();
            return Ok(());
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            state.save_composition();
            return Ok(());
        }
        KeyCode::Char('c') | KeyCode::Char('C') if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.copy_composition();
            return Ok(());
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.should_quit = true;
            return Ok(());
        }
        KeyCode::Char('p') | KeyCode::Char('P') => {
            state.paste_from_clipboard();
            return Ok(());
        }
        KeyCode::Char('l') | KeyCode::Char('L') => {
            state.start_load_prompt();
            return Ok(());
        }
        _ => {}
    }

    // Context-sensitive handling
    match state.focus {
        FocusedWidget::Slots => handle_slots_input(key, state),
        FocusedWidget::Settings => handle_settings_input(key, state),
        FocusedWidget::Preview => Ok(()),
    }
}

/// Handle input when help overlay is shown
fn handle_help_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter => {
            state.show_help = false;
        }
        _ => {}
    }
    Ok(())
}

/// Handle input for the interactive load prompt
fn handle_load_prompt_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Esc => state.cancel_load_prompt(),
        KeyCode::Enter => state.submit_load_prompt(),
        KeyCode::Backspace => {
            state.load_prompt_input.pop();
        }
        KeyCode::Char(c) => state.load_prompt_input.push(c),
        _ => {}
    }
    Ok(())
}

/// Handle typing into a colour field
fn handle_color_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Esc => state.cancel_color_edit(),
        KeyCode::Enter => state.submit_color_edit(),
        KeyCode::Backspace => {
            if let Some(edit) = state.color_edit.as_mut() {
                edit.input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(edit) = state.color_edit.as_mut() {
                edit.input.push(c);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Handle input for the slot panel
fn handle_slots_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Up | KeyCode::Down | KeyCode::Char('k') | KeyCode::Char('j') => {
            state.selected_slot = state.selected_slot.other();
        }
        KeyCode::Enter => state.start_load_prompt(),
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete | KeyCode::Backspace => {
            state.clear_slot(state.selected_slot);
        }
        _ => {}
    }
    Ok(())
}

/// Handle input for the settings panel
fn handle_settings_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.prev_setting(),
        KeyCode::Down | KeyCode::Char('j') => state.next_setting(),

        KeyCode::Left => state.cycle_setting(-1),
        KeyCode::Right => state.cycle_setting(1),
        KeyCode::Char('+') | KeyCode::Char('=') => state.step_setting(true),
        KeyCode::Char('-') | KeyCode::Char('_') => state.step_setting(false),

        KeyCode::Enter | KeyCode::Char('e') => {
            state.start_color_edit();
        }
        _ => {}
    }
    Ok(())
}
