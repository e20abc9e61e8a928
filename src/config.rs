//! # Configuration
//!
//! Optional YAML file tuning the keyboard, the synthesizer envelope and the token gate.
//! Every field has a default, so an empty document is a valid configuration.
//!
//! ```yaml
//! keyboard:
//!   octave-count: 2
//!   base-octave: 3
//!   octave-shift: 0
//!   white-key-width: 40
//! audio:
//!   waveform: triangle
//!   attack: 0.05
//!   release: 0.2
//!   sustain-release: 1.5
//! gate:
//!   chain-id: 8453
//!   token-contract: "0x..."
//!   extended-octaves: 4
//! ```

use crate::error::KeyglowError;
use crate::gate::GateConfig;
use crate::layout::KeyGeometry;
use crate::voice::{Envelope, Waveform};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const MIN_OCTAVE_SHIFT: i32 = -2;
pub const MAX_OCTAVE_SHIFT: i32 = 2;
pub const MAX_OCTAVES: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct KeyboardConfig {
    pub octave_count: usize,
    pub base_octave: i32,
    pub octave_shift: i32,
    pub white_key_width: f64,
    pub white_key_height: f64,
    pub black_key_width: f64,
    pub black_key_height: f64,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        let geometry = KeyGeometry::default();
        Self {
            octave_count: 2,
            base_octave: 3,
            octave_shift: 0,
            white_key_width: geometry.white_key_width,
            white_key_height: geometry.white_key_height,
            black_key_width: geometry.black_key_width,
            black_key_height: geometry.black_key_height,
        }
    }
}

impl KeyboardConfig {
    pub fn geometry(&self) -> KeyGeometry {
        KeyGeometry {
            white_key_width: self.white_key_width,
            white_key_height: self.white_key_height,
            black_key_width: self.black_key_width,
            black_key_height: self.black_key_height,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AudioConfig {
    pub waveform: Waveform,
    #[serde(flatten)]
    pub envelope: Envelope,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keyboard: KeyboardConfig,
    pub audio: AudioConfig,
    pub gate: GateConfig,
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self, KeyglowError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| KeyglowError::Config(e.to_string()))?;
        config.validated()
    }

    pub fn load(path: &Path) -> Result<Self, KeyglowError> {
        let content = fs::read_to_string(path)
            .map_err(|e| KeyglowError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    fn validated(mut self) -> Result<Self, KeyglowError> {
        let keyboard = &mut self.keyboard;
        if keyboard.octave_count == 0 || keyboard.octave_count > MAX_OCTAVES {
            return Err(invalid(format!("octave-count must be between 1 and {}", MAX_OCTAVES)));
        }
        if !(-1..=8).contains(&keyboard.base_octave) {
            return Err(invalid("base-octave must be between -1 and 8".to_string()));
        }
        let shift = keyboard
            .octave_shift
            .clamp(MIN_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT);
        if shift != keyboard.octave_shift {
            log::warn!(target: "config", "octave-shift {} clamped to {}", keyboard.octave_shift, shift);
            keyboard.octave_shift = shift;
        }
        let sizes = [
            ("white-key-width", keyboard.white_key_width),
            ("white-key-height", keyboard.white_key_height),
            ("black-key-width", keyboard.black_key_width),
            ("black-key-height", keyboard.black_key_height),
        ];
        for (field, value) in sizes {
            if !is_positive(value) {
                return Err(invalid(format!("{} must be positive", field)));
            }
        }
        if keyboard.black_key_width >= keyboard.white_key_width {
            return Err(invalid("black-key-width must be narrower than white-key-width".to_string()));
        }

        let envelope = &self.audio.envelope;
        if !envelope.attack.is_finite() || envelope.attack < 0.0 {
            return Err(invalid("attack must not be negative".to_string()));
        }
        if !is_positive(envelope.release) || !is_positive(envelope.sustain_release) {
            return Err(invalid("release times must be positive".to_string()));
        }
        if !is_positive(f64::from(envelope.gain_floor)) || envelope.gain_floor >= envelope.peak_gain {
            return Err(invalid("gain-floor must be above 0 and below peak-gain".to_string()));
        }
        if !is_positive(envelope.tuning_a4) {
            return Err(invalid("tuning-a4 must be positive".to_string()));
        }

        if self.gate.extended_octaves == 0 || self.gate.extended_octaves > MAX_OCTAVES {
            return Err(invalid(format!("extended-octaves must be between 1 and {}", MAX_OCTAVES)));
        }

        Ok(self)
    }
}

/// Finite and above zero. NaN and infinity are not.
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(message: String) -> KeyglowError {
    KeyglowError::Config(message)
}
