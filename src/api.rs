//! # Public API
//!
//! One-shot entry points for callers that only want a picture of a keyboard. The
//! interactive application state lives in [`crate::controller`].
//!
//! ## Rendering Functions
//!
//! - [`render()`] - Highlight a note list on a keyboard
//! - [`render_result()`] - Highlight a parsed theory result
//! - [`render_payload()`] - Parse the resolver's raw text, then highlight it
//! - [`render_svg()`] - Same as `render_payload`, as SVG markup
//!
//! ## Typical Usage
//!
//! ```rust
//! use keyglow::{render_svg, LayoutSpec};
//!
//! let payload = r#"{"root":"C","type":"Major","notes":["C","E","G"]}"#;
//! let svg = render_svg(payload, &LayoutSpec::new(2, 3))?;
//! assert!(svg.contains("key white root"));
//! # Ok::<(), keyglow::KeyglowError>(())
//! ```

use crate::highlight::annotate;
use crate::layout::LayoutSpec;
use crate::svg::to_svg;
use crate::theory::TheoryResult;
use crate::view::KeyboardView;
use crate::KeyglowError;
use std::collections::BTreeSet;

/// Highlight `notes` on the keyboard described by `spec`.
///
/// Notes may carry octaves ("E4"); only their pitch class counts, and every octave
/// lights up. Unrecognized names are ignored. Nothing is pressed.
///
/// # Example
/// ```rust
/// use keyglow::{render, LayoutSpec, VisualState};
///
/// let view = render(&["D", "F#", "A"], Some("D"), &LayoutSpec::new(1, 4));
/// assert_eq!(view.state_of("D4"), Some(VisualState::Root));
/// assert_eq!(view.state_of("F#4"), Some(VisualState::Active));
/// ```
pub fn render<S: AsRef<str>>(notes: &[S], root: Option<&str>, spec: &LayoutSpec) -> KeyboardView {
    let layout = spec.generate();
    let states = annotate(&layout, notes, root, &BTreeSet::new());
    KeyboardView::new(layout, states)
}

/// Highlight a theory result: its notes as active keys, its root as root keys
pub fn render_result(result: &TheoryResult, spec: &LayoutSpec) -> KeyboardView {
    render(&result.notes, Some(result.root.as_str()), spec)
}

/// Parse a resolver payload and highlight it.
///
/// # Errors
/// Returns [`KeyglowError::MalformedPayload`] when the text holds no valid result.
pub fn render_payload(payload: &str, spec: &LayoutSpec) -> Result<KeyboardView, KeyglowError> {
    let result = TheoryResult::from_json(payload)?;
    Ok(render_result(&result, spec))
}

/// Parse a resolver payload and render it as SVG
pub fn render_svg(payload: &str, spec: &LayoutSpec) -> Result<String, KeyglowError> {
    Ok(to_svg(&render_payload(payload, spec)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::VisualState;

    #[test]
    fn test_render_with_octave_suffixes() {
        let view = render(&["C4", "E4", "G4"], Some("C"), &LayoutSpec::new(2, 3));
        assert_eq!(view.labels_in(VisualState::Root), vec!["C3", "C4"]);
        assert_eq!(view.labels_in(VisualState::Active), vec!["E3", "G3", "E4", "G4"]);
    }

    #[test]
    fn test_render_payload_rejects_prose() {
        let err = render_payload("No idea, sorry.", &LayoutSpec::new(2, 3)).unwrap_err();
        assert!(matches!(err, KeyglowError::MalformedPayload(_)));
    }

    #[test]
    fn test_render_result_uses_shift() {
        let result =
            TheoryResult::from_json(r#"{"root":"A","type":"Minor","notes":["A","C","E"]}"#).unwrap();
        let view = render_result(&result, &LayoutSpec::new(1, 3).with_shift(-1));
        assert_eq!(view.state_of("A2"), Some(VisualState::Root));
        assert_eq!(view.octave_shift, -1);
    }
}
