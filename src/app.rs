//! Application state management for mealboard
//!
//! This module contains the TUI state: the date window, the selected menu
//! item, and which popup is open. Key handling is synchronous and returns an
//! `AppAction` for anything that must talk to the orchestrator; the main loop
//! runs those with `App::perform`.

use chrono::{Duration, Months, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};

use crate::auth::AuthError;
use crate::orchestrator::{ActionError, MealOrchestrator};
use crate::window::DateWindow;

/// Number of dates shown in the window strip
pub const VISIBLE_DAYS: usize = 7;

/// Which view or popup has the keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Meal card for the current day
    Main,
    /// Rating and favorite controls for the selected item
    FoodPopup,
    /// Month grid with its own cursor
    Calendar { cursor: NaiveDate },
    /// User id entry
    SignIn { input: String },
    /// Sign-out confirmation
    LogoutConfirm,
    /// Keybinding overlay
    Help,
}

/// Work that needs the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Load every month touched by the visible dates
    EnsureWindow,
    Rate {
        food: String,
        value: u8,
        date: NaiveDate,
    },
    ToggleFavorite {
        food: String,
    },
    SignIn {
        credential: String,
    },
    SignOut,
}

/// Main application struct managing state and data
pub struct App {
    /// Current view or popup
    pub mode: Mode,
    /// Navigable dates and the current day
    pub window: DateWindow,
    /// Index of the selected item in the current day's menu
    pub selected_item: usize,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Set by the main loop while an action is running
    pub busy: bool,
    /// Confirmation of the last successful action
    pub status: Option<String>,
    /// Day `t` jumps back to
    pub today: NaiveDate,
    pub orchestrator: MealOrchestrator,
}

impl App {
    /// Creates an app showing `start`
    ///
    /// # Arguments
    /// * `orchestrator` - Session state the app reads and acts on
    /// * `start` - Initial current day
    /// * `today` - Target of the jump-to-today key
    pub fn new(orchestrator: MealOrchestrator, start: NaiveDate, today: NaiveDate) -> Self {
        Self {
            mode: Mode::Main,
            window: DateWindow::centered(start),
            selected_item: 0,
            should_quit: false,
            busy: false,
            status: None,
            today,
            orchestrator,
        }
    }

    /// The day the meal card shows
    pub fn current_date(&self) -> NaiveDate {
        self.window.current()
    }

    /// The dates shown in the window strip, around the current day
    pub fn visible_dates(&self) -> &[NaiveDate] {
        let dates = self.window.dates();
        let end = (self.window.current_index() + VISIBLE_DAYS / 2 + 1).min(dates.len());
        let start = end.saturating_sub(VISIBLE_DAYS);
        &dates[start..end]
    }

    /// Menu items for the current day
    pub fn current_items(&self) -> &[String] {
        self.orchestrator.meals_for_date(self.current_date())
    }

    /// The selected menu item, if the day has any
    pub fn selected_food(&self) -> Option<&str> {
        let items = self.current_items();
        if items.is_empty() {
            return None;
        }
        items
            .get(self.selected_item.min(items.len() - 1))
            .map(String::as_str)
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Arguments
    /// * `key_event` - The keyboard event to handle
    ///
    /// # Returns
    /// The action to perform, if the key needs the orchestrator
    ///
    /// # Key Bindings
    /// - `←`/`h`, `→`/`l`: Previous / next day
    /// - `↑`/`k`, `↓`/`j`: Select menu item
    /// - `Enter`: Open the food popup
    /// - `c`: Calendar, `t`: Today
    /// - `i`: Sign in, `o`: Sign out
    /// - `?`: Help, `q`/`Esc`: Quit
    pub fn handle_key(&mut self, key_event: KeyEvent) -> Option<AppAction> {
        // Messages last until the next key
        self.status = None;
        self.orchestrator.clear_error();

        match self.mode.clone() {
            Mode::Main => self.handle_main_key(key_event.code),
            Mode::FoodPopup => self.handle_popup_key(key_event.code),
            Mode::Calendar { cursor } => self.handle_calendar_key(key_event.code, cursor),
            Mode::SignIn { input } => self.handle_sign_in_key(key_event.code, input),
            Mode::LogoutConfirm => match key_event.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.mode = Mode::Main;
                    Some(AppAction::SignOut)
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.mode = Mode::Main;
                    None
                }
                _ => None,
            },
            Mode::Help => {
                if matches!(
                    key_event.code,
                    KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
                ) {
                    self.mode = Mode::Main;
                }
                None
            }
        }
    }

    fn handle_main_key(&mut self, code: KeyCode) -> Option<AppAction> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.window.previous();
                self.selected_item = 0;
                Some(AppAction::EnsureWindow)
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.window.next();
                self.selected_item = 0;
                Some(AppAction::EnsureWindow)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection_up();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection_down();
                None
            }
            KeyCode::Enter => {
                if self.selected_food().is_some() {
                    self.mode = Mode::FoodPopup;
                }
                None
            }
            KeyCode::Char('c') => {
                self.mode = Mode::Calendar {
                    cursor: self.current_date(),
                };
                None
            }
            KeyCode::Char('t') => {
                self.jump_to(self.today);
                Some(AppAction::EnsureWindow)
            }
            KeyCode::Char('i') => {
                self.mode = Mode::SignIn {
                    input: String::new(),
                };
                None
            }
            KeyCode::Char('o') => {
                if self.orchestrator.is_signed_in() {
                    self.mode = Mode::LogoutConfirm;
                }
                None
            }
            KeyCode::Char('?') => {
                self.mode = Mode::Help;
                None
            }
            _ => None,
        }
    }

    fn handle_popup_key(&mut self, code: KeyCode) -> Option<AppAction> {
        let Some(food) = self.selected_food().map(str::to_string) else {
            self.mode = Mode::Main;
            return None;
        };
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Main;
                None
            }
            KeyCode::Char(c @ '0'..='5') => {
                if !self.orchestrator.is_signed_in() {
                    self.require_sign_in();
                    return None;
                }
                let value = c.to_digit(10).map(|d| d as u8)?;
                Some(AppAction::Rate {
                    food,
                    value,
                    date: self.current_date(),
                })
            }
            KeyCode::Char('f') => {
                if !self.orchestrator.is_signed_in() {
                    self.require_sign_in();
                    return None;
                }
                Some(AppAction::ToggleFavorite { food })
            }
            _ => None,
        }
    }

    fn handle_calendar_key(&mut self, code: KeyCode, cursor: NaiveDate) -> Option<AppAction> {
        let moved = match code {
            KeyCode::Esc => {
                self.mode = Mode::Main;
                return None;
            }
            KeyCode::Enter => {
                self.mode = Mode::Main;
                self.jump_to(cursor);
                return Some(AppAction::EnsureWindow);
            }
            KeyCode::Left | KeyCode::Char('h') => cursor.checked_sub_signed(Duration::days(1)),
            KeyCode::Right | KeyCode::Char('l') => cursor.checked_add_signed(Duration::days(1)),
            KeyCode::Up | KeyCode::Char('k') => cursor.checked_sub_signed(Duration::days(7)),
            KeyCode::Down | KeyCode::Char('j') => cursor.checked_add_signed(Duration::days(7)),
            KeyCode::Char('[') => cursor.checked_sub_months(Months::new(1)),
            KeyCode::Char(']') => cursor.checked_add_months(Months::new(1)),
            _ => None,
        };
        if let Some(cursor) = moved {
            self.mode = Mode::Calendar { cursor };
        }
        None
    }

    fn handle_sign_in_key(&mut self, code: KeyCode, mut input: String) -> Option<AppAction> {
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Main;
                self.orchestrator
                    .report_error(AuthError::PopupClosed.to_string());
                None
            }
            KeyCode::Enter => {
                self.mode = Mode::Main;
                Some(AppAction::SignIn { credential: input })
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::SignIn { input };
                None
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::SignIn { input };
                None
            }
            _ => None,
        }
    }

    fn require_sign_in(&mut self) {
        self.orchestrator
            .report_error(ActionError::NotSignedIn.to_string());
        self.mode = Mode::SignIn {
            input: String::new(),
        };
    }

    fn jump_to(&mut self, date: NaiveDate) {
        self.window.jump_to(date);
        self.selected_item = 0;
    }

    /// Moves the selection up, wrapping to the bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.current_items().len();
        if count == 0 {
            return;
        }
        self.selected_item = match self.selected_item.min(count - 1) {
            0 => count - 1,
            index => index - 1,
        };
    }

    /// Moves the selection down, wrapping to the top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.current_items().len();
        if count == 0 {
            return;
        }
        self.selected_item = (self.selected_item + 1) % count;
    }

    /// Runs an action against the orchestrator
    ///
    /// Failures are already recorded as the orchestrator's error message;
    /// successes leave a short status line.
    pub async fn perform(&mut self, action: AppAction) {
        match action {
            AppAction::EnsureWindow => {
                let dates = self.visible_dates().to_vec();
                self.orchestrator.ensure_data_for_dates(&dates).await;
            }
            AppAction::Rate { food, value, date } => {
                match self.orchestrator.submit_rating(&food, value, date).await {
                    Ok(()) if value == 0 => {
                        self.status = Some(format!("{}의 별점을 삭제했습니다.", food));
                    }
                    Ok(()) => {
                        self.status = Some(format!("{}에 ★{}점을 주었습니다.", food, value));
                    }
                    Err(ActionError::NotSignedIn) => self.require_sign_in(),
                    Err(_) => {}
                }
            }
            AppAction::ToggleFavorite { food } => {
                match self.orchestrator.toggle_favorite(&food).await {
                    Ok(true) => self.status = Some(format!("{}을(를) 즐겨찾기에 추가했습니다.", food)),
                    Ok(false) => {
                        self.status = Some(format!("{}을(를) 즐겨찾기에서 제거했습니다.", food))
                    }
                    Err(ActionError::NotSignedIn) => self.require_sign_in(),
                    Err(_) => {}
                }
            }
            AppAction::SignIn { credential } => {
                if let Ok(user) = self.orchestrator.sign_in(&credential).await {
                    self.status = Some(format!("{}님으로 로그인했습니다.", user.uid));
                }
            }
            AppAction::SignOut => {
                if self.orchestrator.sign_out().await.is_ok() {
                    self.status = Some("로그아웃했습니다.".to_string());
                }
            }
        }
    }
}
