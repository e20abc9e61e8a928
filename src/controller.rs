//! # Application State
//!
//! Owns the current theory result, the request status, the saved presets and the
//! keyboard settings. Every external failure is turned into state here: callers
//! never see an error from this type, only `error()` messages and log lines.
//!
//! ## Requests
//! Resolving a query is asynchronous in the browser, so it is split in two:
//!
//! ```text
//! submit(query) -> ticket     status = Loading, previous result cleared
//! complete(ticket, outcome)   result or error stored
//! ```
//!
//! Submitting again while loading issues another request; nothing is cancelled.
//! A response for an older ticket still overwrites the current result. That race is
//! accepted and logged; the status only returns to `Idle` when the newest ticket
//! settles.
//!
//! ## Views
//! [`AppState::view()`] recomputes the whole keyboard from the current state.
//! There is no cached or incrementally patched view.

use crate::config::{Config, MAX_OCTAVES, MAX_OCTAVE_SHIFT, MIN_OCTAVE_SHIFT};
use crate::error::KeyglowError;
use crate::gate::{GateConfig, OctaveAccess};
use crate::highlight::annotate;
use crate::layout::{KeyGeometry, LayoutSpec};
use crate::preset::{KeyValueStore, Preset, PresetLibrary};
use crate::theory::{TheoryResolver, TheoryResult};
use crate::view::KeyboardView;
use crate::voice::Waveform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Idle,
    Loading,
}

/// Sequence number of a resolver request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestTicket(pub u64);

/// User-facing keyboard controls
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardSettings {
    pub octave_count: usize,
    pub base_octave: i32,
    pub octave_shift: i32,
    pub geometry: KeyGeometry,
    pub waveform: Waveform,
    pub sustain: bool,
}

impl KeyboardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            octave_count: config.keyboard.octave_count,
            base_octave: config.keyboard.base_octave,
            octave_shift: config.keyboard.octave_shift,
            geometry: config.keyboard.geometry(),
            waveform: config.audio.waveform,
            sustain: false,
        }
    }

    pub fn layout_spec(&self) -> LayoutSpec {
        LayoutSpec::new(self.octave_count, self.base_octave)
            .with_shift(self.octave_shift)
            .with_geometry(self.geometry)
    }
}

pub struct AppState<S: KeyValueStore> {
    query: String,
    result: Option<TheoryResult>,
    status: RequestStatus,
    error: Option<String>,
    presets: PresetLibrary<S>,
    settings: KeyboardSettings,
    default_octaves: usize,
    gate: GateConfig,
    access: OctaveAccess,
    pressed: BTreeSet<u8>,
    last_ticket: u64,
}

impl<S: KeyValueStore> AppState<S> {
    /// Loads saved presets from `store`; a broken store starts empty
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            query: String::new(),
            result: None,
            status: RequestStatus::Idle,
            error: None,
            presets: PresetLibrary::load(store),
            settings: KeyboardSettings::from_config(config),
            default_octaves: config.keyboard.octave_count,
            gate: config.gate.clone(),
            access: OctaveAccess::Default,
            pressed: BTreeSet::new(),
            last_ticket: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn result(&self) -> Option<&TheoryResult> {
        self.result.as_ref()
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn presets(&self) -> &[Preset] {
        self.presets.presets()
    }

    pub fn settings(&self) -> &KeyboardSettings {
        &self.settings
    }

    pub fn access(&self) -> OctaveAccess {
        self.access
    }

    pub fn pressed(&self) -> &BTreeSet<u8> {
        &self.pressed
    }

    /// Start a request. Blank queries are ignored.
    pub fn submit(&mut self, query: &str) -> Option<RequestTicket> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.last_ticket += 1;
        self.query = query.to_string();
        self.status = RequestStatus::Loading;
        self.error = None;
        self.result = None;
        log::debug!(target: "resolver", "request {} submitted: {}", self.last_ticket, query);
        Some(RequestTicket(self.last_ticket))
    }

    /// Settle a request with the resolver's outcome
    pub fn complete(&mut self, ticket: RequestTicket, outcome: Result<TheoryResult, KeyglowError>) {
        let latest = ticket.0 == self.last_ticket;
        if !latest {
            log::warn!(
                target: "resolver",
                "response for request {} arrived after request {} was issued",
                ticket.0,
                self.last_ticket
            );
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                log::warn!(target: "resolver", "request {} failed: {}", ticket.0, e);
                self.result = None;
                self.error = Some(e.to_string());
            }
        }

        if latest {
            self.status = RequestStatus::Idle;
        }
    }

    /// Settle a request with the resolver's raw text
    pub fn complete_payload(&mut self, ticket: RequestTicket, payload: &str) {
        self.complete(ticket, TheoryResult::from_json(payload));
    }

    /// Submit and settle in one go against a synchronous resolver
    pub fn resolve_with(
        &mut self,
        resolver: &mut dyn TheoryResolver,
        query: &str,
    ) -> Option<RequestTicket> {
        let ticket = self.submit(query)?;
        let outcome = resolver.resolve(query);
        self.complete(ticket, outcome);
        Some(ticket)
    }

    /// Snapshot the current result. Returns the new preset's id.
    pub fn save_preset(&mut self, name: &str, now_ms: u64) -> Option<String> {
        let result = self.result.clone()?;
        match self.presets.save(name, result, now_ms) {
            Ok(preset) => Some(preset.id.clone()),
            Err(e) => {
                log::warn!(target: "presets", "saving preset failed: {}", e);
                self.error = Some(e.to_string());
                None
            }
        }
    }

    pub fn delete_preset(&mut self, id: &str) -> bool {
        match self.presets.delete(id) {
            Ok(deleted) => deleted,
            Err(e) => {
                log::warn!(target: "presets", "deleting preset failed: {}", e);
                self.error = Some(e.to_string());
                false
            }
        }
    }

    /// Make a saved result the current one
    pub fn load_preset(&mut self, id: &str) -> bool {
        let Some(preset) = self.presets.get(id) else {
            return false;
        };
        self.query = preset.name.clone();
        self.result = Some(preset.result.clone());
        self.error = None;
        true
    }

    /// Clamped to [-2, 2]
    pub fn set_octave_shift(&mut self, shift: i32) -> i32 {
        self.settings.octave_shift = shift.clamp(MIN_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT);
        self.settings.octave_shift
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.settings.waveform = waveform;
    }

    pub fn set_sustain(&mut self, sustain: bool) {
        self.settings.sustain = sustain;
    }

    /// Apply the outcome of a token check to the octave count
    pub fn apply_access(&mut self, access: OctaveAccess) {
        self.access = access;
        self.settings.octave_count = access
            .octave_count(self.default_octaves, self.gate.extended_octaves)
            .min(MAX_OCTAVES);
        let count = self.settings.octave_count;
        let spec = self.settings.layout_spec();
        let layout = spec.generate();
        // Keys that scrolled off the keyboard can no longer be held
        self.pressed
            .retain(|midi| layout.key_for_midi(*midi).is_some());
        log::debug!(target: "gate", "{:?} access, {} octaves", access, count);
    }

    pub fn press(&mut self, midi: u8) {
        self.pressed.insert(midi);
    }

    pub fn release(&mut self, midi: u8) {
        self.pressed.remove(&midi);
    }

    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.result = None;
        self.error = None;
    }

    pub fn view(&self) -> KeyboardView {
        let layout = self.settings.layout_spec().generate();
        let (notes, root) = match &self.result {
            Some(result) => (result.notes.as_slice(), Some(result.root.as_str())),
            None => (&[][..], None),
        };
        let states = annotate(&layout, notes, root, &self.pressed);
        KeyboardView::new(layout, states)
    }
}
