//! Voice map and envelope scheduling

use super::backend::AudioBackend;
use super::types::{Envelope, Waveform};
use crate::error::KeyglowError;
use crate::pitch::midi_to_frequency;
use std::collections::{BTreeSet, HashMap};

/// Extra time a released voice is kept after its ramp ends before the record is dropped
const REAP_MARGIN_SECS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoicePhase {
    Sounding,
    /// Gain is ramping down; the oscillator stops at `until`
    Releasing { until: f64 },
}

/// One sounding (or releasing) note
#[derive(Debug)]
pub struct Voice<H> {
    pub handle: H,
    pub started_at: f64,
    pub waveform: Waveform,
    pub phase: VoicePhase,
}

type Opener<B> = Box<dyn FnMut() -> Result<B, KeyglowError>>;

/// Owns the audio context (opened on first press) and one voice per MIDI note
pub struct VoiceManager<B: AudioBackend> {
    opener: Opener<B>,
    context: Option<B>,
    unavailable: bool,
    envelope: Envelope,
    voices: HashMap<u8, Voice<B::Voice>>,
}

impl<B: AudioBackend> VoiceManager<B> {
    /// `opener` is called once, on the first `press_start`
    pub fn new<F>(envelope: Envelope, opener: F) -> Self
    where
        F: FnMut() -> Result<B, KeyglowError> + 'static,
    {
        Self {
            opener: Box::new(opener),
            context: None,
            unavailable: false,
            envelope,
            voices: HashMap::new(),
        }
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn set_envelope(&mut self, envelope: Envelope) {
        self.envelope = envelope;
    }

    /// False once opening the audio context has failed
    pub fn is_available(&self) -> bool {
        !self.unavailable
    }

    pub fn backend(&self) -> Option<&B> {
        self.context.as_ref()
    }

    pub fn has_voice(&self, midi: u8) -> bool {
        self.voices.contains_key(&midi)
    }

    pub fn voice(&self, midi: u8) -> Option<&Voice<B::Voice>> {
        self.voices.get(&midi)
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Notes currently held down (not releasing)
    pub fn sounding_notes(&self) -> BTreeSet<u8> {
        self.voices
            .iter()
            .filter(|(_, v)| v.phase == VoicePhase::Sounding)
            .map(|(midi, _)| *midi)
            .collect()
    }

    /// Start a voice for `midi`. Returns true when a new voice was started.
    pub fn press_start(&mut self, midi: u8, waveform: Waveform) -> bool {
        if self.unavailable {
            return false;
        }
        match self.try_press_start(midi, waveform) {
            Ok(started) => started,
            Err(e) => {
                log::warn!(target: "audio", "press_start({}) failed: {}", midi, e);
                false
            }
        }
    }

    /// Release the voice for `midi`. Returns true when a release was scheduled.
    pub fn press_end(&mut self, midi: u8, sustain: bool) -> bool {
        match self.try_press_end(midi, sustain) {
            Ok(released) => released,
            Err(e) => {
                log::warn!(target: "audio", "press_end({}) failed, stopping voice now: {}", midi, e);
                self.silence(midi);
                false
            }
        }
    }

    /// Stop a voice immediately and leave its record for `poll` to reap
    fn silence(&mut self, midi: u8) {
        let (Some(context), Some(voice)) = (self.context.as_mut(), self.voices.get_mut(&midi)) else {
            return;
        };
        let now = context.current_time();
        if let Err(e) = context.stop(&voice.handle, now) {
            log::warn!(target: "audio", "voice {} could not be stopped: {}", midi, e);
        }
        voice.phase = VoicePhase::Releasing { until: now };
    }

    /// Release every sounding voice
    pub fn release_all(&mut self, sustain: bool) {
        for midi in self.sounding_notes() {
            self.press_end(midi, sustain);
        }
    }

    /// Drop voices whose release has finished. Returns how many were removed.
    pub fn poll(&mut self) -> usize {
        let Some(context) = self.context.as_ref() else {
            return 0;
        };
        let now = context.current_time();
        let before = self.voices.len();
        self.voices.retain(|_, voice| match voice.phase {
            VoicePhase::Sounding => true,
            VoicePhase::Releasing { until } => now <= until + REAP_MARGIN_SECS,
        });
        before - self.voices.len()
    }

    fn ensure_context(&mut self) -> Result<(), KeyglowError> {
        if self.context.is_none() {
            match (self.opener)() {
                Ok(context) => {
                    log::debug!(target: "audio", "audio context opened");
                    self.context = Some(context);
                }
                Err(e) => {
                    log::warn!(target: "audio", "no audio, keyboard is visual-only: {}", e);
                    self.unavailable = true;
                    return Err(e);
                }
            }
        }
        if let Some(context) = self.context.as_mut() {
            if context.is_suspended() {
                context.resume()?;
            }
        }
        Ok(())
    }

    fn try_press_start(&mut self, midi: u8, waveform: Waveform) -> Result<bool, KeyglowError> {
        self.ensure_context()?;
        self.poll();

        if self.voices.contains_key(&midi) {
            return Ok(false);
        }

        let context = self
            .context
            .as_mut()
            .ok_or_else(|| KeyglowError::Audio("audio context missing".to_string()))?;
        let envelope = &self.envelope;

        let now = context.current_time();
        let handle = context.create_voice(midi_to_frequency(midi, envelope.tuning_a4), waveform)?;
        context.set_gain(&handle, 0.0, now)?;
        context.linear_ramp_gain(&handle, envelope.peak_gain, now + envelope.attack)?;
        context.start(&handle, now)?;

        log::debug!(target: "audio", "voice {} started ({})", midi, waveform.as_str());
        self.voices.insert(
            midi,
            Voice {
                handle,
                started_at: now,
                waveform,
                phase: VoicePhase::Sounding,
            },
        );
        Ok(true)
    }

    fn try_press_end(&mut self, midi: u8, sustain: bool) -> Result<bool, KeyglowError> {
        self.poll();

        let Some(context) = self.context.as_mut() else {
            return Ok(false);
        };
        let Some(voice) = self.voices.get_mut(&midi) else {
            return Ok(false);
        };
        if voice.phase != VoicePhase::Sounding {
            return Ok(false);
        }

        let envelope = &self.envelope;
        let now = context.current_time();
        let until = now + envelope.release_for(sustain);

        context.cancel_gain_automation(&voice.handle, now)?;
        let current = context.gain(&voice.handle).max(envelope.gain_floor);
        context.set_gain(&voice.handle, current, now)?;
        context.exponential_ramp_gain(&voice.handle, envelope.gain_floor, until)?;
        context.stop(&voice.handle, until)?;

        log::debug!(target: "audio", "voice {} releasing until {:.3}", midi, until);
        voice.phase = VoicePhase::Releasing { until };
        Ok(true)
    }
}
