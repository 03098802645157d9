//! UI rendering module for mealboard
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. The meal card is always drawn;
//! popups are layered on top according to the app mode.

pub mod calendar;
pub mod dialogs;
pub mod food_popup;
pub mod help_overlay;
pub mod meal_card;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::app::{App, Mode};

pub use meal_card::render as render_meal_card;

/// Renders the whole screen for the current mode
pub fn render(frame: &mut Frame, app: &App) {
    meal_card::render(frame, app);

    match &app.mode {
        Mode::Main => {}
        Mode::FoodPopup => food_popup::render(frame, app),
        Mode::Calendar { cursor } => calendar::render(frame, app, *cursor),
        Mode::SignIn { input } => dialogs::render_sign_in(frame, input),
        Mode::LogoutConfirm => dialogs::render_logout_confirm(frame, app),
        Mode::Help => help_overlay::render(frame),
    }
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height.min(area.height)),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width.min(area.width)),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// Flattens a test buffer into one string with all spaces removed
///
/// Wide Hangul cells are followed by blank filler cells, so assertions compare
/// against text without spaces.
#[cfg(test)]
pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    buffer
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .filter(|symbol| !symbol.trim().is_empty())
        .collect()
}
