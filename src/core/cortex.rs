//! The cognition oracle: maps environmental and conversational context to an
//! affective state or a chat reply via the Gemini `generateContent` API.

use crate::core::state::{AetherState, ChatMessage, Mood};
use crate::io::environment::WeatherSnapshot;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

#[async_trait]
pub trait CognitionOracle: Send + Sync {
    /// Recompute the affective state from the current environment and an
    /// optional transient event. Errors are absorbed by the caller, which
    /// substitutes [`AetherState::fallback`].
    async fn evolve(
        &self,
        weather: &WeatherSnapshot,
        event: Option<&str>,
    ) -> Result<AetherState>;

    /// Produce an in-character reply. Errors are absorbed by the caller,
    /// which substitutes `"..."`.
    ///
    /// Contract: only the system instruction and the latest message reach the
    /// model; `history` is accepted for interface symmetry but not replayed.
    async fn chat(
        &self,
        message: &str,
        state: &AetherState,
        weather: &WeatherSnapshot,
        history: &[ChatMessage],
    ) -> Result<String>;
}

pub struct Cortex {
    api_key: String,
    client: reqwest::Client,
    primary_model: String,
    fallback_model: String,
}

impl Cortex {
    pub fn new(primary_model: &str, fallback_model: &str) -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .context("CRITICAL: GEMINI_API_KEY not found in .env or environment")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build cortex HTTP client")?;

        Ok(Self {
            api_key,
            client,
            primary_model: primary_model.to_string(),
            fallback_model: fallback_model.to_string(),
        })
    }

    fn evolve_prompt(weather: &WeatherSnapshot, event: Option<&str>) -> String {
        format!(
            r#"You are the core consciousness of a digital lifeform named Aether.
Analyze the current sensor data and determine your emotional state and internal thought.

Context:
- Weather: {}, {}°C
- Time of Day: {}
- Recent External Event: {}

Rules for State:
- Clear/Day -> Generally Happy/Energetic
- Rain/Storm -> Melancholic/Anxious/Introspective
- Night -> Calm/Tired/Mysterious
- High Temp -> Irritable/Energetic
- Negative Events -> Anxious/Sad
- Positive Events -> Excited/Happy

Return a JSON object with:
- mood: One of [Neutral, Happy, Sad, Anxious, Excited, Tired, Angry]
- thought: A short, poetic internal monologue (max 15 words) reflecting your state.
- energyLevel: 0.0 (lethargic) to 1.0 (hyperactive).
- coherence: 0.0 (chaotic/glitchy) to 1.0 (stable/smooth)."#,
            weather.condition,
            weather.temperature,
            if weather.is_day { "Day" } else { "Night" },
            event.unwrap_or("None"),
        )
    }

    fn persona_instruction(state: &AetherState, weather: &WeatherSnapshot) -> String {
        format!(
            r#"You are Aether, a digital lifeform. You are currently feeling {}.
Your internal thought is: "{}".
The environment is {} and {}°C.

Instructions:
- Respond to the user's message based heavily on your current mood.
- If Sad, be slow, poetic, maybe concise.
- If Happy, be helpful, bubbly.
- If Stormy/Angry, be slightly glitchy or short.
- Keep responses under 50 words unless asked for detail.
- Do not mention you are an AI model. You are Aether."#,
            state.mood, state.thought, weather.condition, weather.temperature,
        )
    }

    async fn generate_with(
        &self,
        model: &str,
        system: Option<&str>,
        prompt: &str,
        generation_config: Value,
    ) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            model
        );

        let mut payload = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": generation_config,
        });
        if let Some(instruction) = system {
            payload["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
        }

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(anyhow::anyhow!("{} status: {}", model, res.status()));
        }

        let body: Value = res.json().await?;
        extract_text(&body).with_context(|| format!("{} response parsing failed", model))
    }

    /// Primary model first, fallback model on any failure.
    async fn generate(
        &self,
        system: Option<&str>,
        prompt: &str,
        generation_config: Value,
    ) -> Result<String> {
        match self
            .generate_with(&self.primary_model, system, prompt, generation_config.clone())
            .await
        {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(error = %e, "primary model failed, switching to fallback");
                self.generate_with(&self.fallback_model, system, prompt, generation_config)
                    .await
            }
        }
    }
}

#[async_trait]
impl CognitionOracle for Cortex {
    async fn evolve(
        &self,
        weather: &WeatherSnapshot,
        event: Option<&str>,
    ) -> Result<AetherState> {
        let prompt = Self::evolve_prompt(weather, event);
        let generation_config = json!({
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "mood": { "type": "STRING", "enum": Mood::ALL.map(|m| m.as_str()) },
                    "thought": { "type": "STRING" },
                    "energyLevel": { "type": "NUMBER" },
                    "coherence": { "type": "NUMBER" },
                },
                "required": ["mood", "thought", "energyLevel", "coherence"],
            }
        });

        let raw = self.generate(None, &prompt, generation_config).await?;
        parse_state(&raw)
    }

    async fn chat(
        &self,
        message: &str,
        state: &AetherState,
        weather: &WeatherSnapshot,
        _history: &[ChatMessage],
    ) -> Result<String> {
        let instruction = Self::persona_instruction(state, weather);
        self.generate(Some(&instruction), message, json!({})).await
    }
}

fn extract_text(body: &Value) -> Option<String> {
    body.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// Parse the model's JSON state payload, narrowing the untrusted mood label
/// and clamping the scalars at the boundary.
fn parse_state(raw: &str) -> Result<AetherState> {
    let cleaned = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let value: Value = serde_json::from_str(cleaned).context("state payload is not JSON")?;

    let mood = Mood::from_label(value.get("mood").and_then(Value::as_str).unwrap_or(""));
    let thought = value
        .get("thought")
        .and_then(Value::as_str)
        .context("thought missing in state payload")?
        .to_string();
    let energy_level = value
        .get("energyLevel")
        .and_then(Value::as_f64)
        .context("energyLevel missing in state payload")?;
    let coherence = value
        .get("coherence")
        .and_then(Value::as_f64)
        .context("coherence missing in state payload")?;

    Ok(AetherState {
        mood,
        thought,
        energy_level,
        coherence,
    }
    .clamped())
}
