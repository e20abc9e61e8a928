//! Waveform and envelope definitions

use crate::error::KeyglowError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }
}

impl FromStr for Waveform {
    type Err = KeyglowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" => Ok(Waveform::Triangle),
            other => Err(KeyglowError::Config(format!("unknown waveform '{}'", other))),
        }
    }
}

/// Gain envelope and tuning shared by every voice
///
/// Times are in seconds on the audio context's clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Envelope {
    pub attack: f64,
    pub peak_gain: f32,
    pub release: f64,
    /// Release used while sustain mode is on
    pub sustain_release: f64,
    /// Target of the exponential release ramp; must stay above zero
    pub gain_floor: f32,
    /// Frequency of A4 (MIDI 69)
    pub tuning_a4: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.05,
            peak_gain: 0.3,
            release: 0.2,
            sustain_release: 1.5,
            gain_floor: 0.001,
            tuning_a4: 440.0,
        }
    }
}

impl Envelope {
    pub fn release_for(&self, sustain: bool) -> f64 {
        if sustain {
            self.sustain_release
        } else {
            self.release
        }
    }
}
