use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keyrate::{
    app::{App, Control},
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore, DURATION_PRESETS},
    engine::Engine,
    language::{Difficulty, Language},
    logging,
    passage::{EmbeddedPassages, FixedPassage, PassageProvider},
    runtime::{CrosstermEventSource, EventSource, Runner, TICK_RATE_MS},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Stdout},
    path::PathBuf,
    time::Duration,
};

/// terminal typing speed test with live wpm and accuracy
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing speed test. Type the passage as fast and accurately as you can, against the clock or to the end of the text."
)]
pub struct Cli {
    /// language of the built-in passages
    #[clap(short = 'l', long, value_enum)]
    language: Option<Language>,

    /// passage length in free mode
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// seconds per timed test (15, 30, 60, 120 or 300)
    #[clap(short = 's', long, value_parser = parse_duration)]
    duration: Option<u64>,

    /// type the whole passage instead of racing the clock
    #[clap(long)]
    free: bool,

    /// custom passage to use instead of the built-in ones
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// where to write the log file
    #[clap(long)]
    log_file: Option<PathBuf>,
}

fn parse_duration(s: &str) -> Result<u64, String> {
    let secs: u64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if DURATION_PRESETS.contains(&secs) {
        Ok(secs)
    } else {
        Err(format!("duration must be one of {DURATION_PRESETS:?}"))
    }
}

impl Cli {
    /// Overlay the flags given on the command line onto stored settings
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
            config.timed = true;
        }
        if self.free {
            config.timed = false;
        }
        config
    }

    fn provider(&self) -> keyrate::error::Result<Box<dyn PassageProvider>> {
        Ok(match &self.prompt {
            Some(prompt) => Box::new(FixedPassage(prompt.clone())),
            None => Box::new(EmbeddedPassages::load()?),
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(e) = logging::init(&path) {
            eprintln!("keyrate: logging disabled ({}): {e}", path.display());
        }
    }

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    log::info!(
        "starting with {config:?} (settings in {})",
        store.path().display()
    );

    let tick_interval = Duration::from_millis(TICK_RATE_MS);
    let engine = Engine::new(
        config.session_config(),
        cli.provider()?,
        Box::new(SystemClock),
    );

    let mut terminal = setup_terminal()?;

    let runner = Runner::new(CrosstermEventSource::new(), tick_interval);
    let mut app = App::new(engine, config, runner.sender(), tick_interval)
        .with_config_store(Box::new(store));

    let res = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Raw mode plus alternate screen. Undone again if any step fails.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let terminal = execute!(io::stdout(), EnterAlternateScreen)
        .and_then(|_| Terminal::new(CrosstermBackend::new(io::stdout())));
    undo_on_error(terminal, || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })
}

fn undo_on_error<T>(res: io::Result<T>, undo: impl FnOnce()) -> io::Result<T> {
    if let Err(e) = &res {
        log::error!("terminal setup failed: {e}");
        undo();
    }
    res
}

fn run_app<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        if app.on_event(runner.step()) == Control::Quit {
            log::info!("quitting");
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use keyrate::clock::ManualClock;
    use keyrate::runtime::{AppEvent, TestEventSource};
    use ratatui::backend::TestBackend;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["keyrate"]);

        assert_eq!(cli.language, None);
        assert_eq!(cli.difficulty, None);
        assert_eq!(cli.duration, None);
        assert!(!cli.free);
        assert_eq!(cli.prompt, None);
        assert_eq!(cli.log_file, None);
        assert_eq!(cli.apply_to(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_language_and_difficulty() {
        let cli = Cli::parse_from(["keyrate", "-l", "tr", "-d", "hard"]);
        assert_eq!(cli.language, Some(Language::Turkish));
        assert_eq!(cli.difficulty, Some(Difficulty::Hard));

        let cli = Cli::parse_from(["keyrate", "--language", "ja"]);
        assert_eq!(cli.language, Some(Language::Japanese));

        assert!(Cli::try_parse_from(["keyrate", "-l", "xx"]).is_err());
    }

    #[test]
    fn test_cli_duration_must_be_a_preset() {
        let cli = Cli::parse_from(["keyrate", "-s", "30"]);
        assert_eq!(cli.duration, Some(30));

        assert!(Cli::try_parse_from(["keyrate", "-s", "45"]).is_err());
        assert!(Cli::try_parse_from(["keyrate", "--duration", "soon"]).is_err());
    }

    #[test]
    fn test_cli_custom_prompt() {
        let cli = Cli::parse_from(["keyrate", "-p", "hello world"]);
        assert_eq!(cli.prompt, Some("hello world".to_string()));

        let cli = Cli::parse_from(["keyrate", "--prompt", "custom text"]);
        assert_eq!(cli.prompt, Some("custom text".to_string()));
    }

    #[test]
    fn test_cli_overrides_stored_config() {
        let stored = Config {
            language: Language::French,
            difficulty: Difficulty::Easy,
            timed: true,
            duration_secs: 120,
        };

        let cli = Cli::parse_from(["keyrate", "--free", "-d", "medium"]);
        let config = cli.apply_to(stored.clone());
        assert!(!config.timed);
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(config.language, Language::French);
        assert_eq!(config.duration_secs, 120);

        let cli = Cli::parse_from(["keyrate", "-s", "15"]);
        let config = cli.apply_to(Config {
            timed: false,
            ..stored
        });
        assert!(config.timed);
        assert_eq!(config.duration_secs, 15);
    }

    #[test]
    fn test_prompt_selects_fixed_provider() {
        use keyrate::passage::PassageRequest;

        let cli = Cli::parse_from(["keyrate", "-p", "just this"]);
        let mut provider = cli.provider().unwrap();
        let passage = provider
            .get_passage(&PassageRequest {
                language: Language::English,
                min_length: Some(1200),
            })
            .unwrap();
        assert_eq!(passage, "just this");
    }

    #[test]
    fn test_failed_setup_step_is_undone() {
        let mut undone = false;
        let res: io::Result<()> = undo_on_error(Err(io::Error::other("no screen")), || {
            undone = true
        });
        assert!(res.is_err());
        assert!(undone);

        let mut undone = false;
        let res = undo_on_error(Ok(7), || undone = true);
        assert_eq!(res.unwrap(), 7);
        assert!(!undone);
    }

    #[test]
    fn test_run_app_draws_until_quit() {
        let runner = Runner::new(TestEventSource::new(), Duration::from_millis(5));
        let config = Config {
            timed: false,
            ..Config::default()
        };
        let engine = Engine::new(
            config.session_config(),
            Box::new(FixedPassage("hi there".to_string())),
            Box::new(ManualClock::new()),
        );
        let mut app = App::new(engine, config, runner.sender(), Duration::from_millis(5));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        let tx = runner.sender();
        tx.send(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('h'),
            KeyModifiers::NONE,
        )))
        .unwrap();
        tx.send(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )))
        .unwrap();

        run_app(&mut terminal, &mut app, &runner).unwrap();

        assert_eq!(app.engine.snapshot().typed, "h");
        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(rendered.contains("hi there"));
    }
}
