//! Mood to visual-parameter mapping, plus the continuous adjustment by the
//! state's energy and coherence scalars.

use crate::core::state::Mood;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Baseline animation parameters for one mood. Pure function of the mood
/// alone; energy and coherence are folded in at render time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualParams {
    pub primary_color: Rgb,
    pub secondary_color: Rgb,
    pub base_speed: f64,
    pub base_noise: f64,
    pub pulse_rate: f64,
}

/// The documented tuple for every mood. Total over the enumeration; mood
/// narrowing at the oracle boundary means anything unrecognized already
/// reads as Neutral here.
pub fn visual_params(mood: Mood) -> VisualParams {
    match mood {
        Mood::Happy => VisualParams {
            primary_color: Rgb(0xfa, 0xcc, 0x15),
            secondary_color: Rgb(0xfb, 0x92, 0x3c),
            base_speed: 0.008,
            base_noise: 0.3,
            pulse_rate: 0.02,
        },
        Mood::Excited => VisualParams {
            primary_color: Rgb(0x22, 0xd3, 0xee),
            secondary_color: Rgb(0xe8, 0x79, 0xf9),
            base_speed: 0.02,
            base_noise: 0.6,
            pulse_rate: 0.05,
        },
        Mood::Sad => VisualParams {
            primary_color: Rgb(0x47, 0x55, 0x69),
            secondary_color: Rgb(0x3b, 0x82, 0xf6),
            base_speed: 0.002,
            base_noise: 0.1,
            pulse_rate: 0.005,
        },
        Mood::Anxious => VisualParams {
            primary_color: Rgb(0xfb, 0x71, 0x85),
            secondary_color: Rgb(0xf4, 0x3f, 0x5e),
            base_speed: 0.015,
            base_noise: 1.5,
            pulse_rate: 0.08,
        },
        Mood::Angry => VisualParams {
            primary_color: Rgb(0xdc, 0x26, 0x26),
            secondary_color: Rgb(0x7f, 0x1d, 0x1d),
            base_speed: 0.01,
            base_noise: 0.8,
            pulse_rate: 0.01,
        },
        Mood::Tired => VisualParams {
            primary_color: Rgb(0x94, 0xa3, 0xb8),
            secondary_color: Rgb(0x64, 0x74, 0x8b),
            base_speed: 0.001,
            base_noise: 0.1,
            pulse_rate: 0.002,
        },
        Mood::Neutral => VisualParams {
            primary_color: Rgb(0x38, 0xbd, 0xf8),
            secondary_color: Rgb(0x81, 0x8c, 0xf8),
            base_speed: 0.005,
            base_noise: 0.4,
            pulse_rate: 0.01,
        },
    }
}

/// `base_speed * (0.5 + energy)`, energy clamped to [0, 1].
/// Range: [0.5·base, 1.5·base].
pub fn adjusted_speed(base_speed: f64, energy_level: f64) -> f64 {
    base_speed * (0.5 + energy_level.clamp(0.0, 1.0))
}

/// `base_noise * (2.0 - coherence)`, coherence clamped to [0, 1].
/// Less coherence = more noise. Range: [base, 2·base].
pub fn adjusted_noise(base_noise: f64, coherence: f64) -> f64 {
    base_noise * (2.0 - coherence.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mood_has_its_documented_tuple() {
        let expectations = [
            (Mood::Happy, Rgb(0xfa, 0xcc, 0x15), 0.008, 0.3, 0.02),
            (Mood::Excited, Rgb(0x22, 0xd3, 0xee), 0.02, 0.6, 0.05),
            (Mood::Sad, Rgb(0x47, 0x55, 0x69), 0.002, 0.1, 0.005),
            (Mood::Anxious, Rgb(0xfb, 0x71, 0x85), 0.015, 1.5, 0.08),
            (Mood::Angry, Rgb(0xdc, 0x26, 0x26), 0.01, 0.8, 0.01),
            (Mood::Tired, Rgb(0x94, 0xa3, 0xb8), 0.001, 0.1, 0.002),
            (Mood::Neutral, Rgb(0x38, 0xbd, 0xf8), 0.005, 0.4, 0.01),
        ];
        for (mood, primary, speed, noise, pulse) in expectations {
            let p = visual_params(mood);
            assert_eq!(p.primary_color, primary, "{mood}");
            assert_eq!(p.base_speed, speed, "{mood}");
            assert_eq!(p.base_noise, noise, "{mood}");
            assert_eq!(p.pulse_rate, pulse, "{mood}");
        }
    }

    #[test]
    fn test_unrecognized_mood_label_maps_to_neutral_tuple() {
        let narrowed = Mood::from_label("Cosmic Dread");
        assert_eq!(visual_params(narrowed), visual_params(Mood::Neutral));
    }

    #[test]
    fn test_adjusted_speed_boundaries() {
        assert_eq!(adjusted_speed(0.01, 0.0), 0.005);
        assert!((adjusted_speed(0.01, 1.0) - 0.015).abs() < 1e-12);
        assert!((adjusted_speed(0.01, 0.5) - 0.01).abs() < 1e-12);
        // Out-of-range scalars are clamped before use.
        assert_eq!(adjusted_speed(0.01, 42.0), adjusted_speed(0.01, 1.0));
        assert_eq!(adjusted_speed(0.01, -3.0), adjusted_speed(0.01, 0.0));
    }

    #[test]
    fn test_adjusted_noise_boundaries() {
        assert_eq!(adjusted_noise(0.4, 1.0), 0.4);
        assert_eq!(adjusted_noise(0.4, 0.0), 0.8);
        assert_eq!(adjusted_noise(0.4, 2.0), 0.4);
        assert_eq!(adjusted_noise(0.4, -1.0), 0.8);
    }
}
