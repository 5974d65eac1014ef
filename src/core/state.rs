use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// The seven affective states the cortex is allowed to report.
///
/// The oracle is untrusted: anything it returns is narrowed through
/// [`Mood::from_label`] before it reaches the rest of the process.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
    Sad,
    Anxious,
    Excited,
    Tired,
    Angry,
}

impl Mood {
    pub const ALL: [Mood; 7] = [
        Mood::Neutral,
        Mood::Happy,
        Mood::Sad,
        Mood::Anxious,
        Mood::Excited,
        Mood::Tired,
        Mood::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Neutral => "Neutral",
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Anxious => "Anxious",
            Mood::Excited => "Excited",
            Mood::Tired => "Tired",
            Mood::Angry => "Angry",
        }
    }

    /// Narrow an untrusted label to the enumeration, Neutral on anything else.
    pub fn from_label(label: &str) -> Mood {
        match label.trim() {
            "Happy" => Mood::Happy,
            "Sad" => Mood::Sad,
            "Anxious" => Mood::Anxious,
            "Excited" => Mood::Excited,
            "Tired" => Mood::Tired,
            "Angry" => Mood::Angry,
            _ => Mood::Neutral,
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The lifeform's current affective state. Replaced wholesale on every
/// successful evolution, never partially mutated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AetherState {
    pub mood: Mood,
    pub thought: String,
    pub energy_level: f64,
    pub coherence: f64,
}

impl AetherState {
    /// State shown from process start until the first evolution lands.
    pub fn boot() -> Self {
        Self {
            mood: Mood::Neutral,
            thought: "Initializing systems...".to_string(),
            energy_level: 0.5,
            coherence: 0.8,
        }
    }

    /// Substitute applied whenever the cortex fails or times out.
    pub fn fallback() -> Self {
        Self {
            mood: Mood::Neutral,
            thought: "connection unstable".to_string(),
            energy_level: 0.5,
            coherence: 0.5,
        }
    }

    /// The two scalars come from an untrusted source; pin them to [0, 1]
    /// before the renderer sees them.
    pub fn clamped(mut self) -> Self {
        self.energy_level = self.energy_level.clamp(0.0, 1.0);
        self.coherence = self.coherence.clamp(0.0, 1.0);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Aether,
}

/// One entry in the append-only conversation transcript. The transcript is
/// display-only: evolution never reads it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AetherConfig {
    pub primary_model: String,
    pub fallback_model: String,
    /// Fixed coordinate override. When absent the provider falls back to its
    /// built-in default location.
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "default_weather_poll_secs")]
    pub weather_poll_secs: u64,
    #[serde(default = "default_lifebeat_secs")]
    pub lifebeat_secs: u64,
    #[serde(default = "default_event_ttl_secs")]
    pub event_ttl_secs: u64,
}

fn default_weather_poll_secs() -> u64 {
    600
}

fn default_lifebeat_secs() -> u64 {
    120
}

fn default_event_ttl_secs() -> u64 {
    30
}

impl Default for AetherConfig {
    fn default() -> Self {
        Self {
            primary_model: "gemini-2.5-flash".to_string(),
            fallback_model: "gemini-2.0-flash".to_string(),
            latitude: None,
            longitude: None,
            weather_poll_secs: default_weather_poll_secs(),
            lifebeat_secs: default_lifebeat_secs(),
            event_ttl_secs: default_event_ttl_secs(),
        }
    }
}

impl AetherConfig {
    /// Load `aether.toml` from the working directory, defaults if missing.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("invalid {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_narrowing_round_trips() {
        for mood in Mood::ALL {
            assert_eq!(Mood::from_label(mood.as_str()), mood);
        }
    }

    #[test]
    fn test_unknown_mood_defaults_to_neutral() {
        assert_eq!(Mood::from_label("Euphoric"), Mood::Neutral);
        assert_eq!(Mood::from_label(""), Mood::Neutral);
        assert_eq!(Mood::from_label("happy"), Mood::Neutral);
    }

    #[test]
    fn test_clamp_pins_untrusted_scalars() {
        let state = AetherState {
            mood: Mood::Excited,
            thought: "overflow".to_string(),
            energy_level: 7.3,
            coherence: -0.4,
        }
        .clamped();
        assert_eq!(state.energy_level, 1.0);
        assert_eq!(state.coherence, 0.0);
    }

    #[test]
    fn test_fallback_state_is_exact() {
        let f = AetherState::fallback();
        assert_eq!(f.mood, Mood::Neutral);
        assert_eq!(f.thought, "connection unstable");
        assert_eq!(f.energy_level, 0.5);
        assert_eq!(f.coherence, 0.5);
    }

    #[test]
    fn test_chat_message_serializes_whole() {
        let msg = ChatMessage::new(Sender::User, "hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "user");
        assert_eq!(json["text"], "hello");
        assert_eq!(json["id"].as_str().unwrap(), msg.id.to_string());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_config_defaults() {
        let cfg = AetherConfig::default();
        assert_eq!(cfg.weather_poll_secs, 600);
        assert_eq!(cfg.lifebeat_secs, 120);
        assert_eq!(cfg.event_ttl_secs, 30);
    }
}
