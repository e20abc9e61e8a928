//! Per-key visual state
//!
//! Combines the resolver's notes, the root and the currently pressed MIDI notes into one
//! fill category per key. The mapping is pure: the same inputs always give the same states.

use crate::layout::{KeyDescriptor, KeyboardLayout};
use crate::pitch::{resolve, PitchClass};
use serde::Serialize;
use std::collections::BTreeSet;

/// Fill category of a key. Variants are ordered by precedence, highest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualState {
    Default,
    Active,
    Root,
    Pressed,
}

impl VisualState {
    pub fn as_str(self) -> &'static str {
        match self {
            VisualState::Default => "default",
            VisualState::Active => "active",
            VisualState::Root => "root",
            VisualState::Pressed => "pressed",
        }
    }
}

/// Active pitch classes and root, resolved once from note names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlights {
    active: BTreeSet<PitchClass>,
    root: Option<PitchClass>,
}

impl Highlights {
    /// Unrecognized names are dropped; they never make a key active.
    pub fn new<S: AsRef<str>>(active_notes: &[S], root: Option<&str>) -> Self {
        let active = active_notes
            .iter()
            .filter_map(|note| resolve(note.as_ref()))
            .collect();
        let root = root.and_then(resolve);
        Self { active, root }
    }

    pub fn active(&self) -> &BTreeSet<PitchClass> {
        &self.active
    }

    pub fn root(&self) -> Option<PitchClass> {
        self.root
    }

    /// pressed > root > active > default
    pub fn state_for(&self, key: &KeyDescriptor, pressed: &BTreeSet<u8>) -> VisualState {
        if key.midi_note.is_some_and(|midi| pressed.contains(&midi)) {
            VisualState::Pressed
        } else if self.root == Some(key.pitch_class) {
            VisualState::Root
        } else if self.active.contains(&key.pitch_class) {
            VisualState::Active
        } else {
            VisualState::Default
        }
    }
}

/// Visual state of every key, in layout order.
///
/// # Example
/// ```
/// use keyglow::highlight::{annotate, VisualState};
/// use keyglow::layout::generate;
/// use std::collections::BTreeSet;
///
/// let layout = generate(1, 4, 0);
/// let states = annotate(&layout, &["C", "E", "G"], Some("C"), &BTreeSet::new());
/// assert_eq!(states[0], VisualState::Root);   // C4
/// assert_eq!(states[2], VisualState::Active); // E4
/// assert_eq!(states[1], VisualState::Default); // D4
/// ```
pub fn annotate<S: AsRef<str>>(
    layout: &KeyboardLayout,
    active_notes: &[S],
    root: Option<&str>,
    pressed: &BTreeSet<u8>,
) -> Vec<VisualState> {
    let highlights = Highlights::new(active_notes, root);
    layout
        .keys
        .iter()
        .map(|key| highlights.state_for(key, pressed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{generate, LayoutSpec};

    fn state_of(layout: &KeyboardLayout, states: &[VisualState], label: &str) -> VisualState {
        let idx = layout.keys.iter().position(|k| k.label == label).unwrap();
        states[idx]
    }

    #[test]
    fn test_pressed_beats_active() {
        let layout = generate(1, 4, 0);
        let e4 = layout.keys.iter().find(|k| k.label == "E4").unwrap();
        let pressed: BTreeSet<u8> = [e4.midi_note.unwrap()].into_iter().collect();

        let states = annotate(&layout, &["C", "E", "G"], Some("C"), &pressed);
        assert_eq!(state_of(&layout, &states, "E4"), VisualState::Pressed);
        assert_eq!(state_of(&layout, &states, "C4"), VisualState::Root);
        assert_eq!(state_of(&layout, &states, "G4"), VisualState::Active);
        assert_eq!(state_of(&layout, &states, "F4"), VisualState::Default);
    }

    #[test]
    fn test_pressed_beats_root() {
        let layout = generate(1, 4, 0);
        let pressed: BTreeSet<u8> = [60].into_iter().collect();
        let states = annotate(&layout, &["C"], Some("C"), &pressed);
        assert_eq!(state_of(&layout, &states, "C4"), VisualState::Pressed);
    }

    #[test]
    fn test_every_octave_highlighted() {
        let layout = generate(2, 3, 0);
        let states = annotate(&layout, &["F#", "Bb"], None, &BTreeSet::new());
        assert_eq!(state_of(&layout, &states, "F#3"), VisualState::Active);
        assert_eq!(state_of(&layout, &states, "F#4"), VisualState::Active);
        assert_eq!(state_of(&layout, &states, "A#3"), VisualState::Active);
        assert_eq!(states.iter().filter(|s| **s == VisualState::Active).count(), 4);
    }

    #[test]
    fn test_unrecognized_notes_are_dropped() {
        let layout = generate(1, 4, 0);
        let states = annotate(&layout, &["C", "??", "major", "E4"], Some("H"), &BTreeSet::new());
        assert_eq!(state_of(&layout, &states, "C4"), VisualState::Active);
        assert_eq!(state_of(&layout, &states, "E4"), VisualState::Active);
        assert_eq!(states.iter().filter(|s| **s != VisualState::Default).count(), 2);
    }

    #[test]
    fn test_root_outside_active_set_still_marked() {
        let layout = generate(1, 4, 0);
        let states = annotate(&layout, &["E", "G"], Some("Db"), &BTreeSet::new());
        assert_eq!(state_of(&layout, &states, "C#4"), VisualState::Root);
    }

    #[test]
    fn test_visual_layout_ignores_pressed() {
        let layout = LayoutSpec::new(1, 4).visual().generate();
        let pressed: BTreeSet<u8> = [60].into_iter().collect();
        let states = annotate(&layout, &["C"], None, &pressed);
        assert_eq!(states[0], VisualState::Active);
    }

    #[test]
    fn test_annotate_is_deterministic() {
        let layout = generate(2, 3, 0);
        let pressed: BTreeSet<u8> = [52, 61].into_iter().collect();
        let first = annotate(&layout, &["D", "F#", "A"], Some("D"), &pressed);
        let second = annotate(&layout, &["D", "F#", "A"], Some("D"), &pressed);
        assert_eq!(first, second);
    }

    #[test]
    fn test_precedence_order() {
        assert!(VisualState::Pressed > VisualState::Root);
        assert!(VisualState::Root > VisualState::Active);
        assert!(VisualState::Active > VisualState::Default);
    }
}
