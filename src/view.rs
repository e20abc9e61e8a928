//! Keyboard view: the layout paired with one visual state per key

use crate::error::KeyglowError;
use crate::highlight::VisualState;
use crate::layout::{KeyDescriptor, KeyboardLayout};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyView {
    #[serde(flatten)]
    pub key: KeyDescriptor,
    pub state: VisualState,
}

/// Everything a renderer needs, recomputed from scratch whenever an input changes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardView {
    pub keys: Vec<KeyView>,
    pub width: f64,
    pub height: f64,
    pub octave_count: usize,
    pub octave_shift: i32,
}

impl KeyboardView {
    /// `states` must be in layout order, as `annotate` returns them
    pub fn new(layout: KeyboardLayout, states: Vec<VisualState>) -> Self {
        let keys = layout
            .keys
            .into_iter()
            .zip(states)
            .map(|(key, state)| KeyView { key, state })
            .collect();
        Self {
            keys,
            width: layout.width,
            height: layout.height,
            octave_count: layout.octave_count,
            octave_shift: layout.octave_shift,
        }
    }

    pub fn key(&self, label: &str) -> Option<&KeyView> {
        self.keys.iter().find(|k| k.key.label == label)
    }

    pub fn state_of(&self, label: &str) -> Option<VisualState> {
        self.key(label).map(|k| k.state)
    }

    /// Labels of the keys in a given state, in layout order
    pub fn labels_in(&self, state: VisualState) -> Vec<&str> {
        self.keys
            .iter()
            .filter(|k| k.state == state)
            .map(|k| k.key.label.as_str())
            .collect()
    }

    pub fn to_json(&self) -> Result<String, KeyglowError> {
        serde_json::to_string(self).map_err(|e| KeyglowError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::annotate;
    use crate::layout::generate;
    use std::collections::BTreeSet;

    #[test]
    fn test_view_pairs_keys_and_states() {
        let layout = generate(1, 4, 0);
        let states = annotate(&layout, &["C", "E", "G"], Some("C"), &BTreeSet::new());
        let view = KeyboardView::new(layout, states);

        assert_eq!(view.keys.len(), 12);
        assert_eq!(view.state_of("C4"), Some(VisualState::Root));
        assert_eq!(view.labels_in(VisualState::Active), vec!["E4", "G4"]);
        assert_eq!(view.state_of("C9"), None);
    }

    #[test]
    fn test_view_json_shape() {
        let layout = generate(1, 4, 0);
        let states = annotate(&layout, &["C"], None, &BTreeSet::new());
        let json = KeyboardView::new(layout, states).to_json().unwrap();

        assert!(json.contains("\"octaveCount\":1"));
        assert!(json.contains("\"label\":\"C4\""));
        assert!(json.contains("\"midiNote\":60"));
        assert!(json.contains("\"pitchClass\":0"));
        assert!(json.contains("\"state\":\"active\""));
        assert!(json.contains("\"kind\":\"black\""));
    }
}
