//! Pitch-class resolution
//!
//! Maps free-form note names ("F#", "Bb3", "cb", "E♭") onto the twelve chromatic
//! positions, 0 = C. Resolver output is model text and may contain noise, so nothing
//! here fails loudly: an unrecognized token is simply `None`.

use serde::{Deserialize, Serialize};
use std::fmt;

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Canonical chromatic position within an octave (0 = C, 11 = B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Returns `None` for values outside 0..=11
    pub fn new(value: u8) -> Option<Self> {
        (value < 12).then_some(Self(value))
    }

    /// Wraps any semitone offset into the 0..=11 range
    pub fn from_semitones(semitones: i32) -> Self {
        Self(semitones.rem_euclid(12) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// C#, D#, F#, G# and A# sit on black keys
    pub fn is_black(self) -> bool {
        matches!(self.0, 1 | 3 | 6 | 8 | 10)
    }

    /// Spell the pitch class, using flats for black keys when `prefer_flat` is set
    pub fn name(self, prefer_flat: bool) -> &'static str {
        if prefer_flat {
            FLAT_NAMES[self.0 as usize]
        } else {
            SHARP_NAMES[self.0 as usize]
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(false))
    }
}

/// Natural note letters A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    /// Semitone offset of the natural note from C
    pub fn semitones(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }
}

/// A note name split into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedNote {
    pub letter: Letter,
    /// Semitones added by the accidental: -2 (double flat) to +2 (double sharp)
    pub accidental: i8,
    /// Octave suffix, if the token carried one. Never used for pitch-class lookup.
    pub octave: Option<i8>,
}

impl ParsedNote {
    pub fn pitch_class(&self) -> PitchClass {
        PitchClass::from_semitones(self.letter.semitones() + self.accidental as i32)
    }
}

/// Accidental marker to semitone offset. ASCII and Unicode spellings are both accepted.
fn accidental_offset(marker: &str) -> Option<i8> {
    match marker {
        "" | "♮" => Some(0),
        "#" | "♯" => Some(1),
        "b" | "♭" => Some(-1),
        "##" | "♯♯" | "x" | "𝄪" => Some(2),
        "bb" | "♭♭" | "𝄫" => Some(-2),
        _ => None,
    }
}

/// Parse a note token such as "Bb3", "c#", "F##" or "C-1".
///
/// The letter is case-insensitive; the accidental is not ("B" is never a flat).
/// Digits are stripped wherever they appear, together with a minus sign directly in
/// front of them, and kept aside as the octave suffix.
pub fn parse_note(token: &str) -> Option<ParsedNote> {
    let mut chars = token.trim().chars();
    let letter = Letter::from_char(chars.next()?)?;

    let rest: Vec<char> = chars.collect();
    let mut marker = String::new();
    let mut octave_digits = String::new();
    for (i, &c) in rest.iter().enumerate() {
        if c.is_ascii_digit() {
            octave_digits.push(c);
        } else if c == '-' && rest.get(i + 1).is_some_and(|next| next.is_ascii_digit()) {
            octave_digits.push(c);
        } else {
            marker.push(c);
        }
    }

    let accidental = accidental_offset(&marker)?;
    let octave = if octave_digits.is_empty() {
        None
    } else {
        octave_digits.parse().ok()
    };

    Some(ParsedNote {
        letter,
        accidental,
        octave,
    })
}

/// Resolve a note name to its pitch class, or `None` when it is not a note.
///
/// # Examples
/// ```
/// use keyglow::pitch::{resolve, PitchClass};
///
/// assert_eq!(resolve("C#"), resolve("Db"));
/// assert_eq!(resolve("Bb3"), PitchClass::new(10));
/// assert_eq!(resolve("cb"), PitchClass::new(11));
/// assert_eq!(resolve("major"), None);
/// ```
pub fn resolve(note: &str) -> Option<PitchClass> {
    parse_note(note).map(|parsed| parsed.pitch_class())
}

/// Frequency in Hz of a MIDI note in 12-tone equal temperament (MIDI 69 = A4 = `tuning_a4`)
pub fn midi_to_frequency(midi: u8, tuning_a4: f64) -> f64 {
    tuning_a4 * 2.0_f64.powf((midi as f64 - 69.0) / 12.0)
}
