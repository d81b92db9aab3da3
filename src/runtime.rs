use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::session::SessionId;

/// Interval of the session clock tick
pub const TICK_RATE_MS: u64 = 100;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Clock tick belonging to one session
    Tick(SessionId),
    /// Nothing arrived within the redraw interval
    Idle,
}

/// Source of terminal events (keyboard, resize, ticks)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;

    /// Handle for other producers (tick tasks) to feed the same queue
    fn sender(&self) -> Sender<AppEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if reader_tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if reader_tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("terminal event reader stopped: {e}");
                    break;
                }
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Event source fed by hand, for headless tests
pub struct TestEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: EventSource> {
    event_source: E,
    redraw_interval: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, redraw_interval: Duration) -> Self {
        Self {
            event_source,
            redraw_interval,
        }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.event_source.sender()
    }

    /// Blocks up to the redraw interval and returns the next event, or Idle on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.redraw_interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Idle,
        }
    }
}

/// Repeating tick for one session, running on its own thread.
///
/// Stops on [`TickTask::cancel`] or drop. A tick already queued when the
/// task is cancelled still carries this task's session id.
pub struct TickTask {
    session: SessionId,
    cancelled: Arc<AtomicBool>,
}

impl TickTask {
    pub fn spawn(tx: Sender<AppEvent>, session: SessionId, interval: Duration) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        thread::spawn(move || loop {
            thread::sleep(interval);
            if flag.load(Ordering::Acquire) {
                break;
            }
            if tx.send(AppEvent::Tick(session)).is_err() {
                break;
            }
        });

        log::debug!("tick task armed for session {}", session.value());
        Self { session, cancelled }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            log::debug!("tick task cancelled for session {}", self.session.value());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for TickTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_returns_idle_on_timeout() {
        let runner = Runner::new(TestEventSource::new(), Duration::from_millis(1));

        match runner.step() {
            AppEvent::Idle => {}
            other => panic!("expected Idle on timeout, got {other:?}"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let runner = Runner::new(TestEventSource::new(), Duration::from_millis(10));
        runner.sender().send(AppEvent::Resize).unwrap();

        match runner.step() {
            AppEvent::Resize => {}
            other => panic!("expected Resize event, got {other:?}"),
        }
    }

    #[test]
    fn tick_task_emits_ticks_for_its_session() {
        let (tx, rx) = mpsc::channel();
        let id = SessionId::first();
        let task = TickTask::spawn(tx, id, Duration::from_millis(2));

        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            AppEvent::Tick(got) => assert_eq!(got, id),
            other => panic!("expected Tick, got {other:?}"),
        }
        assert_eq!(task.session(), id);
        assert!(!task.is_cancelled());
    }

    #[test]
    fn cancelled_tick_task_goes_quiet() {
        let (tx, rx) = mpsc::channel();
        let task = TickTask::spawn(tx, SessionId::first(), Duration::from_millis(2));
        rx.recv_timeout(Duration::from_secs(2)).unwrap();

        task.cancel();
        assert!(task.is_cancelled());

        // drain anything sent before the flag was observed
        thread::sleep(Duration::from_millis(20));
        while rx.try_recv().is_ok() {}

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn dropping_tick_task_cancels_it() {
        let (tx, rx) = mpsc::channel();
        drop(TickTask::spawn(tx, SessionId::first(), Duration::from_millis(1)));

        thread::sleep(Duration::from_millis(20));
        while rx.try_recv().is_ok() {}
        // the thread exits and drops its sender, disconnecting the channel
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Disconnected)
        ));
    }
}
