use keyglow::config::MAX_OCTAVES;
use keyglow::{
    AppState, AudioBackend, Config, KeyValueStore, KeyglowError, LayoutSpec, OctaveAccess,
    RequestTicket, StaticResolver, TheoryResult, VoiceManager, Waveform,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, AudioContextState, AudioScheduledSourceNode, GainNode, OscillatorNode, OscillatorType, Storage};

#[derive(Serialize)]
struct BindingError {
    kind: &'static str,
    message: String,
}

fn error_to_binding_error(e: &KeyglowError) -> BindingError {
    let (kind, message) = match e {
        KeyglowError::Resolver(msg) => ("resolver", msg),
        KeyglowError::MalformedPayload(msg) => ("malformed-payload", msg),
        KeyglowError::Storage(msg) => ("storage", msg),
        KeyglowError::Audio(msg) => ("audio", msg),
        KeyglowError::Gate(msg) => ("gate", msg),
        KeyglowError::Config(msg) => ("config", msg),
        KeyglowError::Serialization(msg) => ("serialization", msg),
    };
    BindingError {
        kind,
        message: message.clone(),
    }
}

fn to_js_error(e: KeyglowError) -> JsValue {
    let json = serde_json::to_string(&error_to_binding_error(&e)).unwrap_or_else(|_| e.to_string());
    JsValue::from_str(&json)
}

fn audio_error(action: &str, e: JsValue) -> KeyglowError {
    KeyglowError::Audio(format!("{}: {:?}", action, e))
}

/// One oscillator feeding one gain node
pub struct WebVoice {
    oscillator: OscillatorNode,
    gain: GainNode,
}

impl WebVoice {
    fn source(&self) -> &AudioScheduledSourceNode {
        self.oscillator.as_ref()
    }
}

/// Web Audio implementation of the voice backend
pub struct WebAudioBackend {
    context: AudioContext,
}

impl WebAudioBackend {
    pub fn open() -> Result<Self, KeyglowError> {
        let context = AudioContext::new().map_err(|e| audio_error("creating AudioContext", e))?;
        Ok(Self { context })
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Triangle => OscillatorType::Triangle,
    }
}

impl AudioBackend for WebAudioBackend {
    type Voice = WebVoice;

    fn current_time(&self) -> f64 {
        self.context.current_time()
    }

    fn is_suspended(&self) -> bool {
        self.context.state() == AudioContextState::Suspended
    }

    fn resume(&mut self) -> Result<(), KeyglowError> {
        // The returned promise settles on its own; nothing waits for it
        self.context
            .resume()
            .map(|_| ())
            .map_err(|e| audio_error("resuming AudioContext", e))
    }

    fn create_voice(&mut self, frequency: f64, waveform: Waveform) -> Result<WebVoice, KeyglowError> {
        let oscillator = self
            .context
            .create_oscillator()
            .map_err(|e| audio_error("creating oscillator", e))?;
        oscillator.set_type(oscillator_type(waveform));
        oscillator.frequency().set_value(frequency as f32);

        let gain = self
            .context
            .create_gain()
            .map_err(|e| audio_error("creating gain node", e))?;
        gain.gain().set_value(0.0);

        oscillator
            .connect_with_audio_node(&gain)
            .map_err(|e| audio_error("connecting oscillator", e))?;
        gain.connect_with_audio_node(&self.context.destination())
            .map_err(|e| audio_error("connecting gain node", e))?;

        Ok(WebVoice { oscillator, gain })
    }

    fn start(&mut self, voice: &WebVoice, at: f64) -> Result<(), KeyglowError> {
        voice
            .source()
            .start_with_when(at)
            .map_err(|e| audio_error("starting oscillator", e))
    }

    fn stop(&mut self, voice: &WebVoice, at: f64) -> Result<(), KeyglowError> {
        voice
            .source()
            .stop_with_when(at)
            .map_err(|e| audio_error("stopping oscillator", e))
    }

    fn set_gain(&mut self, voice: &WebVoice, value: f32, at: f64) -> Result<(), KeyglowError> {
        voice
            .gain
            .gain()
            .set_value_at_time(value, at)
            .map(|_| ())
            .map_err(|e| audio_error("setting gain", e))
    }

    fn gain(&self, voice: &WebVoice) -> f32 {
        voice.gain.gain().value()
    }

    fn linear_ramp_gain(&mut self, voice: &WebVoice, value: f32, end: f64) -> Result<(), KeyglowError> {
        voice
            .gain
            .gain()
            .linear_ramp_to_value_at_time(value, end)
            .map(|_| ())
            .map_err(|e| audio_error("scheduling attack", e))
    }

    fn exponential_ramp_gain(
        &mut self,
        voice: &WebVoice,
        value: f32,
        end: f64,
    ) -> Result<(), KeyglowError> {
        voice
            .gain
            .gain()
            .exponential_ramp_to_value_at_time(value, end)
            .map(|_| ())
            .map_err(|e| audio_error("scheduling release", e))
    }

    fn cancel_gain_automation(&mut self, voice: &WebVoice, from: f64) -> Result<(), KeyglowError> {
        voice
            .gain
            .gain()
            .cancel_scheduled_values(from)
            .map(|_| ())
            .map_err(|e| audio_error("cancelling gain automation", e))
    }
}

/// `localStorage`, or nothing when the page has no storage (private mode, sandboxed iframes)
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!(target: "presets", "localStorage unavailable, presets will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyglowError> {
        match &self.storage {
            Some(storage) => storage
                .get_item(key)
                .map_err(|e| KeyglowError::Storage(format!("{:?}", e))),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KeyglowError> {
        match &self.storage {
            Some(storage) => storage
                .set_item(key, value)
                .map_err(|e| KeyglowError::Storage(format!("{:?}", e))),
            None => Err(KeyglowError::Storage("localStorage unavailable".to_string())),
        }
    }
}

/// Offline resolver over the embedded theory library
fn library_resolver() -> StaticResolver {
    let mut resolver = StaticResolver::new();
    for entry in theory_library::get_all_entries() {
        match TheoryResult::from_json(&entry.content) {
            Ok(result) => {
                resolver.insert(&entry.name, result.clone());
                resolver.insert_result(result);
            }
            Err(e) => log::warn!(target: "resolver", "skipping library entry {}: {}", entry.name, e),
        }
    }
    resolver
}

/// `balanceOf` answers arrive from JavaScript as decimal or 0x-prefixed hex strings
fn parse_balance(raw: &str) -> Result<u128, KeyglowError> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some("") => Ok(0),
        Some(hex) => u128::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| KeyglowError::Gate(format!("unreadable balance '{}': {}", raw, e)))
}

/// The whole keyboard application behind one handle
#[wasm_bindgen]
pub struct KeyglowApp {
    state: AppState<LocalStorageStore>,
    voices: VoiceManager<WebAudioBackend>,
    library: StaticResolver,
    config: Config,
}

#[wasm_bindgen]
impl KeyglowApp {
    /// `config_yaml` uses the same format as the command-line config file
    #[wasm_bindgen(constructor)]
    pub fn new(config_yaml: Option<String>) -> Result<KeyglowApp, JsValue> {
        let config = match config_yaml {
            Some(yaml) => Config::from_yaml(&yaml).map_err(to_js_error)?,
            None => Config::default(),
        };
        Ok(KeyglowApp {
            state: AppState::new(LocalStorageStore::open(), &config),
            voices: VoiceManager::new(config.audio.envelope, WebAudioBackend::open),
            library: library_resolver(),
            config,
        })
    }

    /// Start a request; returns its ticket, or nothing for a blank query
    pub fn submit(&mut self, query: &str) -> Option<u64> {
        self.state.submit(query).map(|ticket| ticket.0)
    }

    /// Settle a request with the model's raw answer
    pub fn complete(&mut self, ticket: u64, payload: &str) {
        self.state.complete_payload(RequestTicket(ticket), payload);
    }

    /// Settle a request whose call failed (network error, HTTP status)
    pub fn fail(&mut self, ticket: u64, message: &str) {
        self.state
            .complete(RequestTicket(ticket), Err(KeyglowError::Resolver(message.to_string())));
    }

    /// Answer from the embedded library; returns whether a result is now shown
    pub fn resolve_offline(&mut self, query: &str) -> bool {
        self.state.resolve_with(&mut self.library, query);
        self.state.result().is_some()
    }

    pub fn library_names(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&theory_library::list_entries()).map_err(JsValue::from)
    }

    pub fn query(&self) -> String {
        self.state.query().to_string()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.error().map(str::to_string)
    }

    pub fn result_json(&self) -> Result<Option<String>, JsValue> {
        self.state
            .result()
            .map(|result| result.to_json())
            .transpose()
            .map_err(to_js_error)
    }

    /// `now_ms` is `Date.now()`
    pub fn save_preset(&mut self, name: &str, now_ms: f64) -> Option<String> {
        self.state.save_preset(name, now_ms.max(0.0) as u64)
    }

    pub fn delete_preset(&mut self, id: &str) -> bool {
        self.state.delete_preset(id)
    }

    pub fn load_preset(&mut self, id: &str) -> bool {
        self.state.load_preset(id)
    }

    pub fn presets(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.state.presets()).map_err(JsValue::from)
    }

    /// Mark a key pressed and start its voice. Returns whether a voice started.
    pub fn press_start(&mut self, midi: u8) -> bool {
        self.state.press(midi);
        self.voices.press_start(midi, self.state.settings().waveform)
    }

    pub fn press_end(&mut self, midi: u8) -> bool {
        self.state.release(midi);
        self.voices.press_end(midi, self.state.settings().sustain)
    }

    /// Call from `requestAnimationFrame`; returns how many finished voices were dropped
    pub fn poll(&mut self) -> usize {
        self.voices.poll()
    }

    pub fn audio_available(&self) -> bool {
        self.voices.is_available()
    }

    pub fn set_waveform(&mut self, name: &str) -> Result<(), JsValue> {
        let waveform: Waveform = name.parse().map_err(to_js_error)?;
        self.state.set_waveform(waveform);
        Ok(())
    }

    pub fn set_sustain(&mut self, sustain: bool) {
        self.state.set_sustain(sustain);
    }

    /// Held keys are released first so no voice outlives its key. Returns the clamped shift.
    pub fn set_octave_shift(&mut self, shift: i32) -> i32 {
        self.voices.release_all(self.state.settings().sustain);
        self.state.release_all();
        self.state.set_octave_shift(shift)
    }

    /// Chain id and token contract the page's wallet code should query
    pub fn gate_config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.config.gate).map_err(JsValue::from)
    }

    /// Feed the result of the page's `balanceOf` call. Unreadable balances keep the default range.
    pub fn apply_token_balance(&mut self, balance: &str) -> usize {
        let access = match parse_balance(balance) {
            Ok(balance) => OctaveAccess::from_balance(balance),
            Err(e) => {
                log::warn!(target: "gate", "{}", e);
                OctaveAccess::Default
            }
        };
        self.state.apply_access(access);
        self.state.settings().octave_count
    }

    pub fn view_json(&self) -> Result<String, JsValue> {
        self.state.view().to_json().map_err(to_js_error)
    }

    pub fn svg(&self) -> String {
        keyglow::to_svg(&self.state.view())
    }
}

/// Pitch class 0-11 of a note name, or -1 when it is not a note
#[wasm_bindgen]
pub fn resolve_pitch_class(note: &str) -> i32 {
    keyglow::resolve(note).map_or(-1, |pc| pc.value() as i32)
}

/// Stateless rendering: keyboard view JSON for a note list
#[wasm_bindgen]
pub fn render_keyboard(
    notes: JsValue,
    root: Option<String>,
    octaves: usize,
    base_octave: i32,
    octave_shift: i32,
) -> Result<String, JsValue> {
    let notes: Vec<String> = serde_wasm_bindgen::from_value(notes).map_err(JsValue::from)?;
    let spec = LayoutSpec::new(octaves.clamp(1, MAX_OCTAVES), base_octave).with_shift(octave_shift);
    keyglow::render(&notes, root.as_deref(), &spec)
        .to_json()
        .map_err(to_js_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance() {
        assert_eq!(parse_balance("0").unwrap(), 0);
        assert_eq!(parse_balance(" 1500000000000000000 ").unwrap(), 1_500_000_000_000_000_000);
        assert_eq!(parse_balance("0x0").unwrap(), 0);
        assert_eq!(parse_balance("0x").unwrap(), 0);
        assert_eq!(parse_balance("0xff").unwrap(), 255);
        assert!(matches!(parse_balance("lots"), Err(KeyglowError::Gate(_))));
        assert!(matches!(parse_balance("-1"), Err(KeyglowError::Gate(_))));
    }

    #[test]
    fn test_error_kinds() {
        let err = error_to_binding_error(&KeyglowError::MalformedPayload("no JSON object found".to_string()));
        assert_eq!(err.kind, "malformed-payload");
        assert_eq!(err.message, "no JSON object found");
        let json = serde_json::to_string(&error_to_binding_error(&KeyglowError::Audio("x".to_string()))).unwrap();
        assert_eq!(json, r#"{"kind":"audio","message":"x"}"#);

        let err = error_to_binding_error(&KeyglowError::Serialization("key must be a string".to_string()));
        assert_eq!(err.kind, "serialization");
    }

    #[test]
    fn test_library_resolver_answers_by_name_and_title() {
        let mut resolver = library_resolver();
        let mut state = AppState::new(keyglow::MemoryStore::new(), &Config::default());

        state.resolve_with(&mut resolver, "C Major Scale");
        assert_eq!(state.result().unwrap().root, "C");

        state.resolve_with(&mut resolver, "F# Dominant 7th");
        assert_eq!(state.result().unwrap().notes, vec!["F#", "A#", "C#", "E"]);

        state.resolve_with(&mut resolver, "Bb Major");
        assert_eq!(state.result().unwrap().root, "Bb");
    }
}
