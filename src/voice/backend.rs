//! Audio engine abstraction
//!
//! The primitives mirror Web Audio's `OscillatorNode` + `GainNode` + `AudioParam`
//! scheduling, which is all the voice manager needs. Envelope logic lives in the
//! manager; a backend only executes what it is told.

use super::types::Waveform;
use crate::error::KeyglowError;

/// One audio context. A voice handle is an oscillator feeding a gain stage that is
/// connected to the output, created silent and not yet started.
pub trait AudioBackend {
    type Voice;

    /// Context clock in seconds
    fn current_time(&self) -> f64;

    /// Browsers start contexts suspended until a user gesture
    fn is_suspended(&self) -> bool;

    fn resume(&mut self) -> Result<(), KeyglowError>;

    fn create_voice(
        &mut self,
        frequency: f64,
        waveform: Waveform,
    ) -> Result<Self::Voice, KeyglowError>;

    fn start(&mut self, voice: &Self::Voice, at: f64) -> Result<(), KeyglowError>;

    fn stop(&mut self, voice: &Self::Voice, at: f64) -> Result<(), KeyglowError>;

    fn set_gain(&mut self, voice: &Self::Voice, value: f32, at: f64) -> Result<(), KeyglowError>;

    /// Gain value right now, including any ramp in progress
    fn gain(&self, voice: &Self::Voice) -> f32;

    fn linear_ramp_gain(
        &mut self,
        voice: &Self::Voice,
        value: f32,
        end: f64,
    ) -> Result<(), KeyglowError>;

    /// `value` must be strictly positive
    fn exponential_ramp_gain(
        &mut self,
        voice: &Self::Voice,
        value: f32,
        end: f64,
    ) -> Result<(), KeyglowError>;

    /// Drop every gain event scheduled at or after `from`
    fn cancel_gain_automation(&mut self, voice: &Self::Voice, from: f64)
        -> Result<(), KeyglowError>;
}
