use crate::clock::millis_between;
use crate::diff::{classify, correct_count, CharacterState};
use crate::error::{EngineError, Result};
use crate::language::{Difficulty, Language};
use crate::score;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Identity of one session; ticks carry it so a superseded session's ticks
/// can be told apart from the live one's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn first() -> Self {
        SessionId(1)
    }

    pub fn next(self) -> Self {
        SessionId(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestMode {
    Timed { duration_secs: u64 },
    Free,
}

impl TestMode {
    pub fn duration_secs(&self) -> Option<u64> {
        match self {
            TestMode::Timed { duration_secs } => Some(*duration_secs),
            TestMode::Free => None,
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, TestMode::Timed { .. })
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestMode::Timed { duration_secs } if duration_secs % 60 == 0 => {
                write!(f, "{}m", duration_secs / 60)
            }
            TestMode::Timed { duration_secs } => write!(f, "{duration_secs}s"),
            TestMode::Free => write!(f, "free"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: TestMode,
    pub language: Language,
    pub difficulty: Difficulty,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: TestMode::Timed { duration_secs: 60 },
            language: Language::English,
            difficulty: Difficulty::Medium,
        }
    }
}

/// Snapshot of a finished test
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub wpm: u32,
    pub accuracy: u32,
    pub elapsed_secs: f64,
    pub mode: TestMode,
    pub difficulty: Difficulty,
    pub language: Language,
    pub date: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Active,
    Finished,
    /// No session could be started (the passage provider failed)
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerReading {
    Remaining(u64),
    Elapsed(f64),
}

/// Everything a renderer needs after an event has been processed
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: Option<SessionId>,
    pub passage: String,
    pub typed: String,
    pub states: Vec<CharacterState>,
    pub live_wpm: u32,
    pub live_accuracy: u32,
    pub timer: TimerReading,
    pub status: SessionStatus,
    pub result: Option<TestResult>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Char(char),
    Backspace,
    Tick(SessionId),
}

/// What an event did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Ignored,
    Updated,
    /// First accepted keystroke; the timing anchor is now set
    Started,
    Finished(TestResult),
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Active {
        started_at: Instant,
    },
    Finished {
        started_at: Instant,
        ended_at: Instant,
        result: TestResult,
    },
}

/// One typing test attempt
#[derive(Debug, Clone)]
pub struct TestSession {
    id: SessionId,
    config: SessionConfig,
    passage: Vec<char>,
    typed: Vec<char>,
    phase: Phase,
    live_wpm: u32,
    live_accuracy: u32,
    remaining_secs: Option<u64>,
}

impl TestSession {
    /// Refuses an empty (or whitespace-only) passage.
    pub fn new(id: SessionId, config: SessionConfig, passage: &str) -> Result<Self> {
        if passage.trim().is_empty() {
            return Err(EngineError::EmptyPassage {
                language: config.language.code(),
            });
        }

        Ok(Self {
            id,
            config,
            passage: passage.chars().collect(),
            typed: Vec::new(),
            phase: Phase::Idle,
            live_wpm: 0,
            live_accuracy: 100,
            remaining_secs: config.mode.duration_secs(),
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn passage(&self) -> String {
        self.passage.iter().collect()
    }

    pub fn typed(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn live_wpm(&self) -> u32 {
        self.live_wpm
    }

    pub fn live_accuracy(&self) -> u32 {
        self.live_accuracy
    }

    pub fn status(&self) -> SessionStatus {
        match self.phase {
            Phase::Idle => SessionStatus::Idle,
            Phase::Active { .. } => SessionStatus::Active,
            Phase::Finished { .. } => SessionStatus::Finished,
        }
    }

    pub fn started_at(&self) -> Option<Instant> {
        match self.phase {
            Phase::Idle => None,
            Phase::Active { started_at } | Phase::Finished { started_at, .. } => Some(started_at),
        }
    }

    pub fn ended_at(&self) -> Option<Instant> {
        match self.phase {
            Phase::Finished { ended_at, .. } => Some(ended_at),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&TestResult> {
        match &self.phase {
            Phase::Finished { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn character_states(&self) -> Vec<CharacterState> {
        classify(&self.passage, &self.typed)
    }

    /// The single transition function: every keystroke and tick goes through here.
    pub fn apply(&mut self, event: SessionEvent, now: Instant) -> Transition {
        if matches!(self.phase, Phase::Finished { .. }) {
            return Transition::Ignored;
        }

        match event {
            SessionEvent::Char(c) => self.on_char(c, now),
            SessionEvent::Backspace => self.on_backspace(),
            SessionEvent::Tick(id) => self.on_tick(id, now),
        }
    }

    fn on_char(&mut self, c: char, now: Instant) -> Transition {
        let (started_at, just_started) = match self.phase {
            Phase::Active { started_at } => (started_at, false),
            _ => {
                log::info!("session {} started", self.id.value());
                self.phase = Phase::Active { started_at: now };
                (now, true)
            }
        };

        self.typed.push(c);
        self.refresh_accuracy();

        if !self.config.mode.is_timed() && self.typed == self.passage {
            return Transition::Finished(self.finish(started_at, now));
        }

        self.live_wpm = score::wpm(millis_between(started_at, now), &self.typed());

        if just_started {
            Transition::Started
        } else {
            Transition::Updated
        }
    }

    fn on_backspace(&mut self) -> Transition {
        if self.typed.pop().is_none() {
            return Transition::Ignored;
        }
        self.refresh_accuracy();
        Transition::Updated
    }

    fn on_tick(&mut self, id: SessionId, now: Instant) -> Transition {
        if id != self.id {
            log::debug!(
                "ignoring tick for session {} on session {}",
                id.value(),
                self.id.value()
            );
            return Transition::Ignored;
        }
        let (Phase::Active { started_at }, Some(duration_secs)) =
            (&self.phase, self.config.mode.duration_secs())
        else {
            return Transition::Ignored;
        };
        let started_at = *started_at;

        let elapsed_ms = millis_between(started_at, now);
        if elapsed_ms >= duration_secs.saturating_mul(1000) {
            return Transition::Finished(self.finish(started_at, now));
        }

        self.remaining_secs = Some(score::remaining_seconds(duration_secs, elapsed_ms));
        Transition::Updated
    }

    fn refresh_accuracy(&mut self) {
        self.live_accuracy =
            score::accuracy(correct_count(&self.passage, &self.typed), self.typed.len());
    }

    fn finish(&mut self, started_at: Instant, ended_at: Instant) -> TestResult {
        let elapsed_ms = millis_between(started_at, ended_at);
        self.live_wpm = score::wpm(elapsed_ms, &self.typed());
        self.refresh_accuracy();
        if self.config.mode.is_timed() {
            self.remaining_secs = Some(0);
        }

        let result = TestResult {
            wpm: self.live_wpm,
            accuracy: self.live_accuracy,
            elapsed_secs: score::elapsed_seconds(elapsed_ms),
            mode: self.config.mode,
            difficulty: self.config.difficulty,
            language: self.config.language,
            date: Local::now(),
        };
        log::info!(
            "session {} finished: {} wpm, {}% accuracy in {:.1}s",
            self.id.value(),
            result.wpm,
            result.accuracy,
            result.elapsed_secs
        );

        self.phase = Phase::Finished {
            started_at,
            ended_at,
            result: result.clone(),
        };
        result
    }

    pub fn timer(&self, now: Instant) -> TimerReading {
        if let Some(remaining) = self.remaining_secs {
            return TimerReading::Remaining(remaining);
        }
        let elapsed_ms = match self.phase {
            Phase::Idle => 0,
            Phase::Active { started_at } => millis_between(started_at, now),
            Phase::Finished {
                started_at,
                ended_at,
                ..
            } => millis_between(started_at, ended_at),
        };
        TimerReading::Elapsed(score::elapsed_seconds(elapsed_ms))
    }

    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        SessionSnapshot {
            session_id: Some(self.id),
            passage: self.passage(),
            typed: self.typed(),
            states: self.character_states(),
            live_wpm: self.live_wpm,
            live_accuracy: self.live_accuracy,
            timer: self.timer(now),
            status: self.status(),
            result: self.result().cloned(),
            notice: None,
        }
    }
}
