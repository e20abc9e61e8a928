pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod highlight;
pub mod layout;
pub mod pitch;
pub mod preset;
pub mod svg;
pub mod theory;
pub mod view;
pub mod voice;

pub use api::{render, render_payload, render_result, render_svg};
pub use config::Config;
pub use controller::{AppState, KeyboardSettings, RequestStatus, RequestTicket};
pub use error::*;
pub use gate::{check_access, GateConfig, OctaveAccess, TokenGate};
pub use highlight::{annotate, VisualState};
pub use layout::{generate, KeyDescriptor, KeyGeometry, KeyKind, KeyboardLayout, LayoutSpec};
pub use pitch::{midi_to_frequency, parse_note, resolve, PitchClass};
pub use preset::{FileStore, KeyValueStore, MemoryStore, Preset, PresetLibrary};
pub use svg::to_svg;
pub use theory::{StaticResolver, TheoryResolver, TheoryResult};
pub use view::{KeyView, KeyboardView};
pub use voice::{AudioBackend, Envelope, VoiceManager, Waveform};
