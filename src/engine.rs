use crate::clock::Clock;
use crate::error::{EngineError, Result};
use crate::history::HistoryStore;
use crate::passage::{fit_to_length, PassageProvider, PassageRequest};
use crate::session::{
    SessionConfig, SessionEvent, SessionId, SessionSnapshot, SessionStatus, TestMode,
    TestResult, TestSession, TimerReading, Transition,
};

/// Characters per second of test duration to provision in timed mode
const TIMED_CHARS_PER_SEC: usize = 20;

/// Upper bound on the timed-mode length request (a five minute test)
const MAX_TIMED_CHARS: usize = 300 * TIMED_CHARS_PER_SEC;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Backspace,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Key(Keystroke),
    Tick(SessionId),
    Reset,
    Configure(SessionConfig),
}

/// What the owner of the repeating timer should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Keep,
    /// Start ticking for this session
    Arm(SessionId),
    /// Stop any running ticker
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    /// Set exactly once per session, on the event that finished it
    pub completed: Option<TestResult>,
    pub timer: TimerCommand,
}

impl EngineOutput {
    fn keep() -> Self {
        Self {
            completed: None,
            timer: TimerCommand::Keep,
        }
    }
}

/// Owns the live session, its passage source and the result history.
pub struct Engine {
    provider: Box<dyn PassageProvider>,
    clock: Box<dyn Clock>,
    config: SessionConfig,
    session: Option<TestSession>,
    unavailable: Option<String>,
    last_id: Option<SessionId>,
    history: HistoryStore,
}

impl Engine {
    /// Builds the engine and provisions the first session. A provider failure
    /// leaves the engine without a session; see [`Engine::unavailable_reason`].
    pub fn new(
        config: SessionConfig,
        provider: Box<dyn PassageProvider>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut engine = Self {
            provider,
            clock,
            config,
            session: None,
            unavailable: None,
            last_id: None,
            history: HistoryStore::new(),
        };
        let _ = engine.reset();
        engine
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&TestSession> {
        self.session.as_ref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn clear_history(&mut self) {
        log::debug!("clearing {} history entries", self.history.len());
        self.history.clear();
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }

    pub fn handle(&mut self, event: EngineEvent) -> EngineOutput {
        match event {
            EngineEvent::Key(Keystroke::Escape) | EngineEvent::Reset => self.reset_output(),
            EngineEvent::Configure(config) => {
                log::debug!("applying new session config: {config:?}");
                self.config = config;
                self.reset_output()
            }
            EngineEvent::Key(Keystroke::Char(c)) => self.apply(SessionEvent::Char(c)),
            EngineEvent::Key(Keystroke::Backspace) => self.apply(SessionEvent::Backspace),
            EngineEvent::Tick(id) => self.apply(SessionEvent::Tick(id)),
        }
    }

    /// Replaces the live session with a fresh idle one.
    pub fn reset(&mut self) -> Result<()> {
        let id = self.last_id.map_or_else(SessionId::first, SessionId::next);
        self.last_id = Some(id);
        self.session = None;

        match self
            .provision()
            .and_then(|passage| TestSession::new(id, self.config, &passage))
        {
            Ok(session) => {
                log::debug!(
                    "session {} ready: {} chars, mode {}, language {}",
                    id.value(),
                    session.passage().chars().count(),
                    self.config.mode,
                    self.config.language
                );
                self.session = Some(session);
                self.unavailable = None;
                Ok(())
            }
            Err(err) => {
                log::warn!("refusing to start session {}: {err}", id.value());
                self.unavailable = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn reset_output(&mut self) -> EngineOutput {
        let _ = self.reset();
        EngineOutput {
            completed: None,
            timer: TimerCommand::Cancel,
        }
    }

    fn provision(&mut self) -> Result<String> {
        let request = PassageRequest {
            language: self.config.language,
            min_length: self
                .config
                .mode
                .duration_secs()
                .map(|secs| {
                    usize::try_from(secs)
                        .unwrap_or(usize::MAX)
                        .saturating_mul(TIMED_CHARS_PER_SEC)
                        .min(MAX_TIMED_CHARS)
                }),
        };
        let raw = self.provider.get_passage(&request)?;
        if raw.trim().is_empty() {
            return Err(EngineError::EmptyPassage {
                language: self.config.language.code(),
            });
        }

        Ok(match self.config.mode {
            TestMode::Free => fit_to_length(&raw, self.config.difficulty.max_length()),
            TestMode::Timed { .. } => raw,
        })
    }

    fn apply(&mut self, event: SessionEvent) -> EngineOutput {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return EngineOutput::keep();
        };

        match session.apply(event, now) {
            Transition::Ignored | Transition::Updated => EngineOutput::keep(),
            Transition::Started => EngineOutput {
                completed: None,
                timer: if session.config().mode.is_timed() {
                    TimerCommand::Arm(session.id())
                } else {
                    TimerCommand::Keep
                },
            },
            Transition::Finished(result) => {
                self.history.record(result.clone());
                EngineOutput {
                    completed: Some(result),
                    timer: TimerCommand::Cancel,
                }
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match &self.session {
            Some(session) => session.snapshot(self.clock.now()),
            None => SessionSnapshot {
                session_id: None,
                passage: String::new(),
                typed: String::new(),
                states: Vec::new(),
                live_wpm: 0,
                live_accuracy: 100,
                timer: match self.config.mode.duration_secs() {
                    Some(secs) => TimerReading::Remaining(secs),
                    None => TimerReading::Elapsed(0.0),
                },
                status: SessionStatus::Unavailable,
                result: None,
                notice: self.unavailable.clone(),
            },
        }
    }
}
