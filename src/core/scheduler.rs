//! State-evolution scheduler.
//!
//! A single task owns the affective state, the weather snapshot, the pending
//! transient event and the conversation transcript, and arbitrates the four
//! evolution triggers (boot, weather refresh, lifebeat, event injection) into
//! calls to the cognition oracle. Everything it publishes goes out through
//! `watch` channels as whole-value replacements, so readers always see a
//! consistent, if possibly stale, snapshot without any locking.

use crate::core::cortex::CognitionOracle;
use crate::core::state::{AetherConfig, AetherState, ChatMessage, Sender};
use crate::errors::AetherError;
use crate::io::environment::{EnvironmentProvider, WeatherSnapshot};
use crate::io::events::Impulse;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Read side handed to the interface: impulse injection plus snapshot
/// receivers for everything the scheduler publishes.
#[derive(Clone)]
pub struct AetherHandle {
    pub impulse_tx: mpsc::Sender<Impulse>,
    pub state_rx: watch::Receiver<AetherState>,
    pub weather_rx: watch::Receiver<Option<WeatherSnapshot>>,
    pub transcript_rx: watch::Receiver<Vec<ChatMessage>>,
    pub processing_rx: watch::Receiver<bool>,
}

pub struct Scheduler {
    oracle: Arc<dyn CognitionOracle>,
    environment: Arc<dyn EnvironmentProvider>,
    config: AetherConfig,

    // Loopback sender for tasks this scheduler spawns. When the scheduler is
    // torn down the channel closes and late completions are dropped on send.
    impulse_tx: mpsc::Sender<Impulse>,

    state_tx: watch::Sender<AetherState>,
    weather_tx: watch::Sender<Option<WeatherSnapshot>>,
    transcript_tx: watch::Sender<Vec<ChatMessage>>,
    processing_tx: watch::Sender<bool>,

    weather: Option<WeatherSnapshot>,
    transcript: Vec<ChatMessage>,
    event: Option<String>,
    event_gen: u64,
    issued_seq: u64,
    chat_in_flight: bool,
}

impl Scheduler {
    /// Wire up the channels and launch the scheduler task.
    pub fn spawn(
        oracle: Arc<dyn CognitionOracle>,
        environment: Arc<dyn EnvironmentProvider>,
        config: AetherConfig,
    ) -> (AetherHandle, tokio::task::JoinHandle<()>) {
        let (impulse_tx, impulse_rx) = mpsc::channel(64);
        let (state_tx, state_rx) = watch::channel(AetherState::boot());
        let (weather_tx, weather_rx) = watch::channel(None);
        let (transcript_tx, transcript_rx) = watch::channel(Vec::new());
        let (processing_tx, processing_rx) = watch::channel(false);

        let handle = AetherHandle {
            impulse_tx: impulse_tx.clone(),
            state_rx,
            weather_rx,
            transcript_rx,
            processing_rx,
        };

        let scheduler = Scheduler {
            oracle,
            environment,
            config,
            impulse_tx,
            state_tx,
            weather_tx,
            transcript_tx,
            processing_tx,
            weather: None,
            transcript: Vec::new(),
            event: None,
            event_gen: 0,
            issued_seq: 0,
            chat_in_flight: false,
        };

        let join = tokio::spawn(scheduler.run(impulse_rx));
        (handle, join)
    }

    async fn run(mut self, mut impulse_rx: mpsc::Receiver<Impulse>) {
        // Boot trigger: environment first, then the initial evolution.
        self.refresh_environment().await;
        self.request_evolution();

        let weather_period = Duration::from_secs(self.config.weather_poll_secs);
        let mut weather_timer = interval_at(Instant::now() + weather_period, weather_period);
        weather_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let lifebeat_period = Duration::from_secs(self.config.lifebeat_secs);
        let mut lifebeat = interval_at(Instant::now() + lifebeat_period, lifebeat_period);
        lifebeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Re-acquire signals only; the refresh itself never evolves.
                _ = weather_timer.tick() => self.refresh_environment().await,
                // Keep the lifeform alive even with no change in inputs.
                _ = lifebeat.tick() => self.request_evolution(),
                impulse = impulse_rx.recv() => match impulse {
                    Some(Impulse::SimulateEvent(text)) => self.inject_event(text),
                    Some(Impulse::EventExpired(gen)) => self.expire_event(gen),
                    Some(Impulse::Chat(text)) => self.begin_chat(text),
                    Some(Impulse::EvolutionDone { seq, outcome }) => {
                        self.finish_evolution(seq, outcome)
                    }
                    Some(Impulse::ChatDone(reply)) => self.finish_chat(reply),
                    Some(Impulse::SystemInterrupt) | None => break,
                }
            }
        }

        tracing::info!("scheduler: shut down, timers cancelled");
    }

    async fn refresh_environment(&mut self) {
        let point = self.environment.location().await;
        let snapshot = self.environment.weather(point).await;
        tracing::debug!(
            condition = %snapshot.condition,
            temperature = snapshot.temperature,
            "environment refreshed"
        );
        self.weather = Some(snapshot.clone());
        let _ = self.weather_tx.send(Some(snapshot));
    }

    /// Issue an evolution request against the current context.
    ///
    /// Guards: nothing is issued before the first weather snapshot exists,
    /// and nothing is *started* while a chat exchange is in flight (advisory,
    /// to avoid jarring state changes mid-conversation). Overlap between
    /// already-issued requests is resolved by sequence number on completion.
    fn request_evolution(&mut self) {
        let Some(weather) = self.weather.clone() else {
            return;
        };
        if self.chat_in_flight {
            return;
        }

        self.issued_seq += 1;
        let seq = self.issued_seq;
        let event = self.event.clone();
        let oracle = self.oracle.clone();
        let tx = self.impulse_tx.clone();

        tokio::spawn(async move {
            let outcome = oracle.evolve(&weather, event.as_deref()).await;
            // Send failure means the scheduler is gone; drop the result.
            let _ = tx.send(Impulse::EvolutionDone { seq, outcome }).await;
        });
    }

    /// Apply a completed evolution. Responses are ordered by issue sequence:
    /// anything older than the newest issued request is discarded, so
    /// overlapping requests can never apply out of order.
    fn finish_evolution(&mut self, seq: u64, outcome: Result<AetherState>) {
        if seq != self.issued_seq {
            tracing::debug!(seq, latest = self.issued_seq, "discarding stale evolution");
            return;
        }

        let next = match outcome {
            Ok(state) => state.clamped(),
            Err(e) => {
                let outage = AetherError::CognitionUnavailable(e.to_string());
                tracing::warn!(%outage, "evolution failed, applying fallback state");
                AetherState::fallback()
            }
        };

        tracing::info!(mood = %next.mood, thought = %next.thought, "state evolved");
        let _ = self.state_tx.send(next);
    }

    /// Store a transient event and restart its TTL. Last write wins: the
    /// generation counter invalidates any expiry armed for an older event.
    fn inject_event(&mut self, text: String) {
        tracing::info!(event = %text, "transient event injected");
        self.event = Some(text);
        self.event_gen += 1;

        let gen = self.event_gen;
        let ttl = Duration::from_secs(self.config.event_ttl_secs);
        let tx = self.impulse_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let _ = tx.send(Impulse::EventExpired(gen)).await;
        });

        self.request_evolution();
    }

    fn expire_event(&mut self, gen: u64) {
        if gen == self.event_gen {
            tracing::debug!("transient event expired");
            self.event = None;
        }
    }

    fn begin_chat(&mut self, text: String) {
        // Same boot guard as evolution: the persona needs an environment.
        let Some(weather) = self.weather.clone() else {
            return;
        };
        if self.chat_in_flight {
            return;
        }

        self.chat_in_flight = true;
        let _ = self.processing_tx.send(true);
        self.transcript.push(ChatMessage::new(Sender::User, text.clone()));
        let _ = self.transcript_tx.send(self.transcript.clone());

        let state = self.state_tx.borrow().clone();
        let history = self.transcript.clone();
        let oracle = self.oracle.clone();
        let tx = self.impulse_tx.clone();

        tokio::spawn(async move {
            let reply = match oracle.chat(&text, &state, &weather, &history).await {
                Ok(reply) => reply,
                Err(e) => {
                    let outage = AetherError::CognitionUnavailable(e.to_string());
                    tracing::warn!(%outage, "chat failed, substituting ellipsis");
                    "...".to_string()
                }
            };
            let _ = tx.send(Impulse::ChatDone(reply)).await;
        });
    }

    fn finish_chat(&mut self, reply: String) {
        self.transcript.push(ChatMessage::new(Sender::Aether, reply));
        let _ = self.transcript_tx.send(self.transcript.clone());
        self.chat_in_flight = false;
        let _ = self.processing_tx.send(false);
    }
}
