use crate::core::scheduler::AetherHandle;
use crate::io::events::Impulse;
use crate::visual::params::{adjusted_speed, visual_params};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;

/// The waveform constants were tuned against a per-frame increment at 60 Hz;
/// wall-clock phase advance is normalized to that reference so the motion
/// keeps its original feel at any tick rate.
pub const PHASE_REFERENCE_HZ: f64 = 60.0;

pub const GOOD_NEWS_EVENT: &str = "Breaking News: World Peace Treaty Signed";
pub const BAD_NEWS_EVENT: &str = "Breaking News: Massive Solar Flare Incoming";

pub struct App {
    pub handle: AetherHandle,
    pub input: String,
    pub phase: f64,
    last_frame: Instant,
}

impl App {
    pub fn new(handle: AetherHandle) -> Self {
        Self {
            handle,
            input: String::new(),
            phase: 0.0,
            last_frame: Instant::now(),
        }
    }

    pub fn processing(&self) -> bool {
        *self.handle.processing_rx.borrow()
    }

    /// Advance the phase accumulator by elapsed wall-clock time, decoupling
    /// visible motion speed from the display tick rate.
    pub fn on_tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;

        let state = self.handle.state_rx.borrow().clone();
        let params = visual_params(state.mood);
        let speed = adjusted_speed(params.base_speed, state.energy_level);
        self.phase += phase_increment(speed, dt);
    }

    /// Returns true when the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::F(2) => self.send(Impulse::SimulateEvent(GOOD_NEWS_EVENT.to_string())),
            KeyCode::F(3) => self.send(Impulse::SimulateEvent(BAD_NEWS_EVENT.to_string())),
            KeyCode::Enter => {
                let text = self.input.trim().to_string();
                if !text.is_empty() && !self.processing() {
                    self.send(Impulse::Chat(text));
                    self.input.clear();
                }
            }
            KeyCode::Backspace => {
                if !self.processing() {
                    self.input.pop();
                }
            }
            KeyCode::Char(c) => {
                if !self.processing() {
                    self.input.push(c);
                }
            }
            _ => {}
        }
        false
    }

    fn send(&self, impulse: Impulse) {
        // A full queue just drops the keystroke; the scheduler is behind.
        let _ = self.handle.impulse_tx.try_send(impulse);
    }
}

pub fn phase_increment(adjusted_speed: f64, dt_secs: f64) -> f64 {
    adjusted_speed * dt_secs * PHASE_REFERENCE_HZ
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{AetherState, ChatMessage};
    use crate::io::environment::WeatherSnapshot;
    use tokio::sync::{mpsc, watch};

    fn test_app(processing: bool) -> (App, mpsc::Receiver<Impulse>) {
        let (impulse_tx, impulse_rx) = mpsc::channel(8);
        let (_state_tx, state_rx) = watch::channel(AetherState::boot());
        let (_weather_tx, weather_rx) = watch::channel(Some(WeatherSnapshot::fallback()));
        let (_transcript_tx, transcript_rx) = watch::channel(Vec::<ChatMessage>::new());
        let (_processing_tx, processing_rx) = watch::channel(processing);
        let app = App::new(AetherHandle {
            impulse_tx,
            state_rx,
            weather_rx,
            transcript_rx,
            processing_rx,
        });
        (app, impulse_rx)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_phase_increment_matches_reference_frame() {
        // One 60 Hz frame advances by exactly the adjusted speed.
        let speed = 0.0075;
        assert!((phase_increment(speed, 1.0 / 60.0) - speed).abs() < 1e-12);
        // Twice the elapsed time, twice the advance.
        assert!((phase_increment(speed, 2.0 / 60.0) - 2.0 * speed).abs() < 1e-12);
    }

    #[test]
    fn test_typing_and_enter_send_chat() {
        let (mut app, mut rx) = test_app(false);
        for c in "hello".chars() {
            app.handle_key(press(KeyCode::Char(c)));
        }
        assert_eq!(app.input, "hello");

        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.input, "");
        match rx.try_recv().unwrap() {
            Impulse::Chat(text) => assert_eq!(text, "hello"),
            other => panic!("unexpected impulse: {other:?}"),
        }
    }

    #[test]
    fn test_enter_on_empty_input_sends_nothing() {
        let (mut app, mut rx) = test_app(false);
        app.handle_key(press(KeyCode::Enter));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_function_keys_inject_demo_events() {
        let (mut app, mut rx) = test_app(false);
        app.handle_key(press(KeyCode::F(2)));
        app.handle_key(press(KeyCode::F(3)));
        match rx.try_recv().unwrap() {
            Impulse::SimulateEvent(text) => assert_eq!(text, GOOD_NEWS_EVENT),
            other => panic!("unexpected impulse: {other:?}"),
        }
        match rx.try_recv().unwrap() {
            Impulse::SimulateEvent(text) => assert_eq!(text, BAD_NEWS_EVENT),
            other => panic!("unexpected impulse: {other:?}"),
        }
    }

    #[test]
    fn test_input_is_frozen_while_processing() {
        let (mut app, mut rx) = test_app(true);
        app.input = "hel".to_string();

        // Neither insertion nor deletion may edit the buffer mid-exchange.
        app.handle_key(press(KeyCode::Char('p')));
        assert_eq!(app.input, "hel");
        app.handle_key(press(KeyCode::Backspace));
        assert_eq!(app.input, "hel");
        app.handle_key(press(KeyCode::Enter));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_escape_quits() {
        let (mut app, _rx) = test_app(false);
        assert!(app.handle_key(press(KeyCode::Esc)));
    }
}
