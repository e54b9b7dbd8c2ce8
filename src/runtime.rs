use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::motion::{MotionDebouncer, MotionSample};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// A debounced shake detected in the motion replay; starts a new game
    Shake,
}

/// Source of events driving the game loop (keyboard, resize, etc.)
pub trait GameEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(GameEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(GameEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: GameEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: GameEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}

/// Replay a recorded motion trace on a background thread, pacing samples
/// by their timestamps and delivering one [`GameEvent::Shake`] per
/// debounced spike.
///
/// The sample timestamps are fed straight into the debouncer, so the
/// shake pattern is a function of the trace alone, not of wall-clock
/// scheduling jitter.
pub fn spawn_motion_replay(
    samples: Vec<MotionSample>,
    mut debouncer: MotionDebouncer,
    tx: Sender<GameEvent>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut prev_t_ms = samples.first().map(|s| s.t_ms).unwrap_or(0);

        for sample in samples {
            let gap = sample.t_ms.saturating_sub(prev_t_ms);
            if gap > 0 {
                std::thread::sleep(Duration::from_millis(gap));
            }
            prev_t_ms = sample.t_ms;

            if debouncer.on_sample(sample) && tx.send(GameEvent::Shake).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            GameEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            GameEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn motion_replay_delivers_debounced_shakes() {
        let samples = vec![
            MotionSample { t_ms: 0, x: 3.0, y: 0.0, z: 0.0 },
            // within cooldown of the first spike: suppressed
            MotionSample { t_ms: 100, x: 3.0, y: 0.0, z: 0.0 },
            // below threshold: ignored
            MotionSample { t_ms: 200, x: 0.1, y: 0.1, z: 0.1 },
            MotionSample { t_ms: 600, x: 0.0, y: 3.0, z: 0.0 },
        ];

        let (tx, rx) = mpsc::channel();
        let handle = spawn_motion_replay(samples, MotionDebouncer::new(2.7, 500), tx);
        handle.join().unwrap();

        let shakes: Vec<GameEvent> = rx.iter().collect();
        assert_eq!(shakes.len(), 2);
        assert!(shakes.iter().all(|e| matches!(e, GameEvent::Shake)));
    }

    #[test]
    fn motion_replay_empty_trace_sends_nothing() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_motion_replay(Vec::new(), MotionDebouncer::default(), tx);
        handle.join().unwrap();

        assert!(rx.iter().next().is_none());
    }
}
