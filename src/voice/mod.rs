//! # Voice Module
//!
//! Live synthesis for the audio variant of the keyboard: one oscillator and one gain
//! envelope per held key.
//!
//! ## Sub-modules
//! - `types` - Waveform and Envelope definitions
//! - `backend` - The `AudioBackend` trait an audio engine implements (Web Audio in the browser)
//! - `manager` - `VoiceManager`, which owns the audio context and the voice map
//!
//! ## Entry Points
//! - [`VoiceManager::press_start()`] - Start a voice for a MIDI note
//! - [`VoiceManager::press_end()`] - Release it, short or long depending on sustain
//! - [`VoiceManager::poll()`] - Drop voices whose release has finished
//!
//! ## Voice Lifecycle
//!
//! ```text
//! Idle --press_start--> Sounding --press_end--> Releasing --poll (after release)--> Idle
//! ```
//!
//! - A `press_start` for a note that already has a voice is a no-op, also while that
//!   voice is releasing. The release is never cut short and the attack never restarts.
//! - A `press_end` for a note without a voice, or one already releasing, is a no-op.
//! - A released voice keeps its record until strictly after its release ramp has ended,
//!   so a quick retrigger cannot overlap a still-audible tail.
//!
//! ## Envelope
//! - Attack: gain ramps linearly from 0 to `peak_gain` over `attack` seconds
//! - Release: gain ramps exponentially from its current value to `gain_floor` over
//!   `release` (or `sustain_release` with sustain on). Exponential ramps cannot reach
//!   zero, so the floor is a small positive value.
//!
//! ## Degradation
//! If the audio context cannot be created the manager switches to visual-only mode:
//! every press becomes a no-op and the failure is logged once.
//!
//! ## Example
//! ```rust
//! use keyglow::voice::{Envelope, VoiceManager, Waveform};
//! use keyglow::KeyglowError;
//! # use keyglow::voice::AudioBackend;
//! # struct NoAudio;
//! # impl AudioBackend for NoAudio {
//! #     type Voice = ();
//! #     fn current_time(&self) -> f64 { 0.0 }
//! #     fn is_suspended(&self) -> bool { false }
//! #     fn resume(&mut self) -> Result<(), KeyglowError> { Ok(()) }
//! #     fn create_voice(&mut self, _: f64, _: Waveform) -> Result<(), KeyglowError> { Ok(()) }
//! #     fn start(&mut self, _: &(), _: f64) -> Result<(), KeyglowError> { Ok(()) }
//! #     fn stop(&mut self, _: &(), _: f64) -> Result<(), KeyglowError> { Ok(()) }
//! #     fn set_gain(&mut self, _: &(), _: f32, _: f64) -> Result<(), KeyglowError> { Ok(()) }
//! #     fn gain(&self, _: &()) -> f32 { 0.0 }
//! #     fn linear_ramp_gain(&mut self, _: &(), _: f32, _: f64) -> Result<(), KeyglowError> { Ok(()) }
//! #     fn exponential_ramp_gain(&mut self, _: &(), _: f32, _: f64) -> Result<(), KeyglowError> { Ok(()) }
//! #     fn cancel_gain_automation(&mut self, _: &(), _: f64) -> Result<(), KeyglowError> { Ok(()) }
//! # }
//!
//! let mut voices = VoiceManager::new(Envelope::default(), || Ok(NoAudio));
//! assert!(voices.press_start(60, Waveform::Sine));
//! assert!(!voices.press_start(60, Waveform::Sine)); // already sounding
//! assert!(voices.press_end(60, false));
//! ```

mod backend;
mod manager;
mod types;


pub use backend::AudioBackend;
pub use manager::{Voice, VoiceManager, VoicePhase};
pub use types::{Envelope, Waveform};
