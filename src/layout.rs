//! # Keyboard Layout
//!
//! Generates the geometry of a multi-octave piano keyboard.
//!
//! ## Geometry
//! Every octave is seven white-key slots wide. White keys sit in their own slot;
//! black keys are centered on the gap *after* a white slot:
//!
//! ```text
//! slot gap:     1   2       4   5   6
//!             | C#| D#|   | F#| G#| A#|
//!           | C | D | E | F | G | A | B |
//! slot:       0   1   2   3   4   5   6
//! ```
//!
//! Positions depend only on the key kind, the render-local octave index and the slot.
//! The octave shift and the absolute octave number feed labels and MIDI numbers only,
//! so shifting the keyboard never moves a rectangle.
//!
//! ## Draw Order
//! Within an octave the seven white keys come first and the five black keys after them.
//! Renderers that draw in sequence get the black keys on top.

use crate::pitch::PitchClass;
use serde::{Deserialize, Serialize};

/// Pitch classes of the white keys, by slot
const WHITE_KEYS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
/// (pitch class, white-slot gap the key is centered on)
const BLACK_KEYS: [(u8, u8); 5] = [(1, 1), (3, 2), (6, 4), (8, 5), (10, 6)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    White,
    Black,
}

/// Key dimensions in surface units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyGeometry {
    pub white_key_width: f64,
    pub white_key_height: f64,
    pub black_key_width: f64,
    pub black_key_height: f64,
}

impl Default for KeyGeometry {
    fn default() -> Self {
        Self {
            white_key_width: 40.0,
            white_key_height: 160.0,
            black_key_width: 24.0,
            black_key_height: 100.0,
        }
    }
}

/// One rendered key
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDescriptor {
    pub kind: KeyKind,
    pub pitch_class: PitchClass,
    /// 0-based octave within the rendered keyboard
    pub octave_index: usize,
    /// Absolute octave number: base + index + shift
    pub octave_number: i32,
    /// Present for the audio variant, and only when inside 0..=127
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi_note: Option<u8>,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl KeyDescriptor {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Ordered keys of a keyboard, white keys before black keys in every octave
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardLayout {
    pub keys: Vec<KeyDescriptor>,
    pub octave_count: usize,
    pub base_octave: i32,
    pub octave_shift: i32,
    pub width: f64,
    pub height: f64,
}

impl KeyboardLayout {
    pub fn white_keys(&self) -> impl Iterator<Item = &KeyDescriptor> {
        self.keys.iter().filter(|k| k.kind == KeyKind::White)
    }

    pub fn black_keys(&self) -> impl Iterator<Item = &KeyDescriptor> {
        self.keys.iter().filter(|k| k.kind == KeyKind::Black)
    }

    /// Topmost key under a point. Black keys win where they overlap white keys.
    pub fn key_at(&self, x: f64, y: f64) -> Option<&KeyDescriptor> {
        self.keys.iter().rev().find(|k| k.contains(x, y))
    }

    pub fn key_for_midi(&self, midi: u8) -> Option<&KeyDescriptor> {
        self.keys.iter().find(|k| k.midi_note == Some(midi))
    }
}

/// Parameters for [`LayoutSpec::generate`]
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSpec {
    pub octave_count: usize,
    pub base_octave: i32,
    pub octave_shift: i32,
    pub geometry: KeyGeometry,
    /// Attach MIDI note numbers (audio variant)
    pub with_midi: bool,
}

impl LayoutSpec {
    pub fn new(octave_count: usize, base_octave: i32) -> Self {
        Self {
            octave_count,
            base_octave,
            octave_shift: 0,
            geometry: KeyGeometry::default(),
            with_midi: true,
        }
    }

    pub fn with_shift(mut self, octave_shift: i32) -> Self {
        self.octave_shift = octave_shift;
        self
    }

    pub fn with_geometry(mut self, geometry: KeyGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Visual-only keyboard: no MIDI numbers
    pub fn visual(mut self) -> Self {
        self.with_midi = false;
        self
    }

    pub fn generate(&self) -> KeyboardLayout {
        let g = &self.geometry;
        let octave_width = 7.0 * g.white_key_width;
        let mut keys = Vec::with_capacity(self.octave_count * 12);

        for octave_index in 0..self.octave_count {
            let x_offset = octave_index as f64 * octave_width;
            let octave_number = self.base_octave + octave_index as i32 + self.octave_shift;

            for (slot, &pc) in WHITE_KEYS.iter().enumerate() {
                keys.push(self.key(
                    KeyKind::White,
                    pc,
                    octave_index,
                    octave_number,
                    x_offset + slot as f64 * g.white_key_width,
                ));
            }

            for &(pc, gap) in BLACK_KEYS.iter() {
                keys.push(self.key(
                    KeyKind::Black,
                    pc,
                    octave_index,
                    octave_number,
                    x_offset + gap as f64 * g.white_key_width - g.black_key_width / 2.0,
                ));
            }
        }

        KeyboardLayout {
            keys,
            octave_count: self.octave_count,
            base_octave: self.base_octave,
            octave_shift: self.octave_shift,
            width: octave_width * self.octave_count as f64,
            height: g.white_key_height,
        }
    }

    fn key(
        &self,
        kind: KeyKind,
        pc: u8,
        octave_index: usize,
        octave_number: i32,
        x: f64,
    ) -> KeyDescriptor {
        let pitch_class = PitchClass::from_semitones(pc as i32);
        let (width, height) = match kind {
            KeyKind::White => (self.geometry.white_key_width, self.geometry.white_key_height),
            KeyKind::Black => (self.geometry.black_key_width, self.geometry.black_key_height),
        };
        let midi_note = if self.with_midi {
            midi_number(octave_number, pitch_class)
        } else {
            None
        };

        KeyDescriptor {
            kind,
            pitch_class,
            octave_index,
            octave_number,
            midi_note,
            label: format!("{}{}", pitch_class.name(false), octave_number),
            x,
            y: 0.0,
            width,
            height,
        }
    }
}

/// `(octave + 1) * 12 + pitch class`, so C4 = 60. `None` outside the MIDI range.
pub fn midi_number(octave_number: i32, pitch_class: PitchClass) -> Option<u8> {
    let midi = (octave_number + 1) * 12 + pitch_class.value() as i32;
    u8::try_from(midi).ok().filter(|m| *m <= 127)
}

/// Generate a keyboard with default geometry and MIDI numbers attached.
///
/// # Example
/// ```
/// use keyglow::layout::generate;
///
/// let layout = generate(2, 3, 0);
/// assert_eq!(layout.white_keys().count(), 14);
/// assert_eq!(layout.black_keys().count(), 10);
/// assert_eq!(layout.keys[0].label, "C3");
/// assert_eq!(layout.keys[0].midi_note, Some(48));
/// ```
pub fn generate(octave_count: usize, base_octave: i32, octave_shift: i32) -> KeyboardLayout {
    LayoutSpec::new(octave_count, base_octave)
        .with_shift(octave_shift)
        .generate()
}
