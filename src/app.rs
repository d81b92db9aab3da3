use std::sync::mpsc::Sender;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::{Config, ConfigStore};
use crate::engine::{Engine, EngineEvent, EngineOutput, Keystroke, TimerCommand};
use crate::runtime::{AppEvent, TickTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Test,
    Stats,
    Settings,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Test => Page::Stats,
            Page::Stats => Page::Settings,
            Page::Settings => Page::Test,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Test => Page::Settings,
            Page::Stats => Page::Test,
            Page::Settings => Page::Stats,
        }
    }
}

/// Rows of the settings page, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    Mode,
    Duration,
    Difficulty,
    Language,
    ClearHistory,
}

impl SettingsRow {
    pub const ALL: [SettingsRow; 5] = [
        SettingsRow::Mode,
        SettingsRow::Duration,
        SettingsRow::Difficulty,
        SettingsRow::Language,
        SettingsRow::ClearHistory,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsRow::Mode => "Mode",
            SettingsRow::Duration => "Duration",
            SettingsRow::Difficulty => "Difficulty",
            SettingsRow::Language => "Language",
            SettingsRow::ClearHistory => "Clear history",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    pub engine: Engine,
    pub config: Config,
    pub page: Page,
    pub settings_cursor: usize,
    config_store: Option<Box<dyn ConfigStore>>,
    events: Sender<AppEvent>,
    tick_interval: Duration,
    ticker: Option<TickTask>,
}

impl App {
    pub fn new(
        engine: Engine,
        config: Config,
        events: Sender<AppEvent>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            engine,
            config,
            page: Page::Test,
            settings_cursor: 0,
            config_store: None,
            events,
            tick_interval,
            ticker: None,
        }
    }

    pub fn with_config_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn ticker(&self) -> Option<&TickTask> {
        self.ticker.as_ref()
    }

    pub fn selected_row(&self) -> SettingsRow {
        SettingsRow::ALL[self.settings_cursor % SettingsRow::ALL.len()]
    }

    pub fn on_event(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Key(key) => return self.on_key(key),
            AppEvent::Tick(id) => {
                self.dispatch(EngineEvent::Tick(id));
            }
            AppEvent::Resize | AppEvent::Idle => {}
        }
        Control::Continue
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match key.code {
            KeyCode::Tab => {
                self.page = self.page.next();
                return Control::Continue;
            }
            KeyCode::BackTab => {
                self.page = self.page.previous();
                return Control::Continue;
            }
            _ => {}
        }

        match self.page {
            Page::Test => self.on_test_key(key),
            Page::Stats => {
                if key.code == KeyCode::Esc {
                    self.page = Page::Test;
                }
            }
            Page::Settings => self.on_settings_key(key),
        }
        Control::Continue
    }

    fn on_test_key(&mut self, key: KeyEvent) {
        let keystroke = match key.code {
            KeyCode::Esc => Keystroke::Escape,
            KeyCode::Backspace => Keystroke::Backspace,
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Keystroke::Char(c)
            }
            _ => return,
        };
        self.dispatch(EngineEvent::Key(keystroke));
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        let rows = SettingsRow::ALL.len();
        match key.code {
            KeyCode::Esc => self.page = Page::Test,
            KeyCode::Up => self.settings_cursor = (self.settings_cursor + rows - 1) % rows,
            KeyCode::Down => self.settings_cursor = (self.settings_cursor + 1) % rows,
            KeyCode::Right | KeyCode::Char('l') => self.change_setting(true),
            KeyCode::Left | KeyCode::Char('h') => self.change_setting(false),
            KeyCode::Enter => {
                if self.selected_row() == SettingsRow::ClearHistory {
                    self.engine.clear_history();
                } else {
                    self.change_setting(true);
                }
            }
            _ => {}
        }
    }

    fn change_setting(&mut self, forward: bool) {
        let mut config = self.config.clone();
        match self.selected_row() {
            SettingsRow::Mode => config.timed = !config.timed,
            SettingsRow::Duration if forward => config.duration_secs = config.next_duration(),
            SettingsRow::Duration => config.duration_secs = config.previous_duration(),
            SettingsRow::Difficulty if forward => config.difficulty = config.difficulty.next(),
            SettingsRow::Difficulty => config.difficulty = config.difficulty.previous(),
            SettingsRow::Language if forward => config.language = config.language.next(),
            SettingsRow::Language => config.language = config.language.previous(),
            SettingsRow::ClearHistory => return,
        }
        self.apply_config(config);
    }

    /// Switch to new settings; the current test is discarded.
    pub fn apply_config(&mut self, config: Config) {
        self.config = config;
        self.dispatch(EngineEvent::Configure(self.config.session_config()));

        if let Some(store) = &self.config_store {
            if let Err(e) = store.save(&self.config) {
                log::warn!("failed to save config: {e}");
            }
        }
    }

    fn dispatch(&mut self, event: EngineEvent) -> EngineOutput {
        let output = self.engine.handle(event);
        match output.timer {
            TimerCommand::Keep => {}
            TimerCommand::Arm(id) => {
                self.ticker = Some(TickTask::spawn(self.events.clone(), id, self.tick_interval));
            }
            TimerCommand::Cancel => {
                if let Some(task) = self.ticker.take() {
                    task.cancel();
                }
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::passage::FixedPassage;
    use crate::session::{SessionStatus, TestMode};
    use std::sync::mpsc;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app_with(passage: &str, config: Config) -> (App, ManualClock, mpsc::Receiver<AppEvent>) {
        let clock = ManualClock::new();
        let engine = Engine::new(
            config.session_config(),
            Box::new(FixedPassage(passage.to_string())),
            Box::new(clock.clone()),
        );
        let (tx, rx) = mpsc::channel();
        let app = App::new(engine, config, tx, Duration::from_millis(5));
        (app, clock, rx)
    }

    #[test]
    fn test_ctrl_c_quits() {
        let (mut app, _, _rx) = app_with("abc", Config::default());
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.on_event(ctrl_c), Control::Quit);
        assert_eq!(app.engine.snapshot().typed, "");
    }

    #[test]
    fn test_typing_routes_to_engine() {
        let (mut app, _, _rx) = app_with("abc", Config::default());
        app.on_event(key(KeyCode::Char('a')));
        app.on_event(key(KeyCode::Char('x')));
        app.on_event(key(KeyCode::Backspace));

        let snapshot = app.engine.snapshot();
        assert_eq!(snapshot.typed, "a");
        assert_eq!(snapshot.status, SessionStatus::Active);
    }

    #[test]
    fn test_first_key_in_timed_mode_arms_ticker() {
        let (mut app, _, rx) = app_with("abc", Config::default());
        assert!(app.ticker().is_none());

        app.on_event(key(KeyCode::Char('a')));

        let id = app.engine.session().map(|s| s.id()).unwrap();
        assert_eq!(app.ticker().map(|t| t.session()), Some(id));
        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            AppEvent::Tick(got) => assert_eq!(got, id),
            other => panic!("expected Tick, got {other:?}"),
        }
    }

    #[test]
    fn test_escape_cancels_ticker() {
        let (mut app, _, _rx) = app_with("abc", Config::default());
        app.on_event(key(KeyCode::Char('a')));
        assert!(app.ticker().is_some());

        app.on_event(key(KeyCode::Esc));

        assert!(app.ticker().is_none());
        assert_eq!(app.engine.snapshot().status, SessionStatus::Idle);
    }

    #[test]
    fn test_timed_test_finishes_from_tick_event() {
        let (mut app, clock, _rx) = app_with("abc", Config::default());
        app.on_event(key(KeyCode::Char('a')));
        let id = app.engine.session().map(|s| s.id()).unwrap();

        clock.advance_ms(60_000);
        app.on_event(AppEvent::Tick(id));

        assert_eq!(app.engine.snapshot().status, SessionStatus::Finished);
        assert!(app.ticker().is_none());
        assert_eq!(app.engine.history().len(), 1);
    }

    #[test]
    fn test_tab_cycles_pages_without_typing() {
        let (mut app, _, _rx) = app_with("abc", Config::default());
        app.on_event(key(KeyCode::Tab));
        assert_eq!(app.page, Page::Stats);
        app.on_event(key(KeyCode::Char('a')));
        assert_eq!(app.engine.snapshot().typed, "");
        app.on_event(key(KeyCode::Tab));
        assert_eq!(app.page, Page::Settings);
        app.on_event(key(KeyCode::BackTab));
        assert_eq!(app.page, Page::Stats);
        app.on_event(key(KeyCode::Esc));
        assert_eq!(app.page, Page::Test);
    }

    #[test]
    fn test_settings_change_resets_and_saves() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = crate::config::FileConfigStore::with_path(&path);
        let (app, _, _rx) = app_with("hello there", Config::default());
        let mut app = app.with_config_store(Box::new(store.clone()));

        app.on_event(key(KeyCode::Char('h')));
        app.page = Page::Settings;
        // Mode row is first
        app.on_event(key(KeyCode::Right));

        assert!(!app.config.timed);
        assert_eq!(app.engine.config().mode, TestMode::Free);
        assert_eq!(app.engine.snapshot().status, SessionStatus::Idle);
        assert!(app.ticker().is_none());
        assert_eq!(store.load(), app.config);
    }

    #[test]
    fn test_settings_cursor_and_duration() {
        let (mut app, _, _rx) = app_with("abc", Config::default());
        app.page = Page::Settings;

        app.on_event(key(KeyCode::Down));
        assert_eq!(app.selected_row(), SettingsRow::Duration);
        app.on_event(key(KeyCode::Right));
        assert_eq!(app.config.duration_secs, 120);
        assert_eq!(
            app.engine.config().mode,
            TestMode::Timed { duration_secs: 120 }
        );

        app.on_event(key(KeyCode::Up));
        app.on_event(key(KeyCode::Up));
        assert_eq!(app.selected_row(), SettingsRow::ClearHistory);
    }

    #[test]
    fn test_clear_history_from_settings() {
        let mut config = Config::default();
        config.timed = false;
        let (mut app, _, _rx) = app_with("a", config);
        app.on_event(key(KeyCode::Char('a')));
        assert_eq!(app.engine.history().len(), 1);

        app.page = Page::Settings;
        app.settings_cursor = 4;
        app.on_event(key(KeyCode::Enter));

        assert!(app.engine.history().is_empty());
    }
}
