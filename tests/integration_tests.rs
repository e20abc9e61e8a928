//! Integration tests for keyglow
//!
//! Drives the application state end to end: request, result, keyboard view,
//! presets and SVG output.

use keyglow::{
    AppState, Config, FileStore, KeyboardView, LayoutSpec, MemoryStore, OctaveAccess,
    StaticResolver, TheoryResult, VisualState,
};

const C_MAJOR_SCALE: &str = r#"```json
{
  "root": "C",
  "type": "Major",
  "category": "scale",
  "notes": ["C", "D", "E", "F", "G", "A", "B"],
  "intervals": ["R", "M2", "M3", "P4", "P5", "M6", "M7"],
  "description": "The diatonic major scale.",
  "keySignature": { "accidental": "none", "count": 0, "notes": [] }
}
```"#;

const F_SHARP_7: &str = r#"{
  "root": "F#",
  "type": "Dominant 7th",
  "category": "chord",
  "notes": ["F#", "A#", "C#", "E"],
  "intervals": ["R", "M3", "P5", "m7"]
}"#;

fn app() -> AppState<MemoryStore> {
    AppState::new(MemoryStore::new(), &Config::default())
}

fn states_by_pitch_class(view: &KeyboardView) -> Vec<(u8, VisualState)> {
    view.keys
        .iter()
        .map(|k| (k.key.pitch_class.value(), k.state))
        .collect()
}

#[test]
fn test_payload_to_keyboard() {
    let mut app = app();
    let ticket = app.submit("C Major Scale").unwrap();
    app.complete_payload(ticket, C_MAJOR_SCALE);

    let view = app.view();
    assert_eq!(view.keys.len(), 24);
    for key in &view.keys {
        let expected = match (key.key.pitch_class.is_black(), key.key.pitch_class.value()) {
            (true, _) => VisualState::Default,
            (false, 0) => VisualState::Root,
            (false, _) => VisualState::Active,
        };
        assert_eq!(key.state, expected, "{}", key.key.label);
    }
}

#[test]
fn test_sharps_light_black_keys_in_every_octave() {
    let mut app = app();
    let ticket = app.submit("F# Dominant 7th").unwrap();
    app.complete_payload(ticket, F_SHARP_7);

    let view = app.view();
    assert_eq!(view.labels_in(VisualState::Root), vec!["F#3", "F#4"]);
    assert_eq!(
        view.labels_in(VisualState::Active),
        vec!["E3", "C#3", "A#3", "E4", "C#4", "A#4"]
    );
}

#[test]
fn test_flat_and_sharp_spellings_agree() {
    let spec = LayoutSpec::new(1, 4);
    let flats = keyglow::render(&["Bb", "Db", "Gb"], Some("Eb"), &spec);
    let sharps = keyglow::render(&["A#", "C#", "F#"], Some("D#"), &spec);
    assert_eq!(states_by_pitch_class(&flats), states_by_pitch_class(&sharps));
}

#[test]
fn test_shift_moves_labels_not_highlights() {
    let mut app = app();
    let ticket = app.submit("C Major Scale").unwrap();
    app.complete_payload(ticket, C_MAJOR_SCALE);
    let before = app.view();

    app.set_octave_shift(2);
    let after = app.view();
    assert_eq!(after.keys[0].key.label, "C5");
    assert_eq!(states_by_pitch_class(&before), states_by_pitch_class(&after));
    for (a, b) in before.keys.iter().zip(after.keys.iter()) {
        assert_eq!(a.key.x, b.key.x);
    }
}

#[test]
fn test_pressed_keys_override_highlights() {
    let mut app = app();
    let ticket = app.submit("C Major Scale").unwrap();
    app.complete_payload(ticket, C_MAJOR_SCALE);

    app.press(48);
    app.press(61);
    let view = app.view();
    assert_eq!(view.state_of("C3"), Some(VisualState::Pressed));
    assert_eq!(view.state_of("C#4"), Some(VisualState::Pressed));
    assert_eq!(view.state_of("C4"), Some(VisualState::Root));

    app.release_all();
    assert!(app.view().labels_in(VisualState::Pressed).is_empty());
}

#[test]
fn test_resolver_failure_then_success() {
    let result = TheoryResult::from_json(F_SHARP_7).unwrap();
    let mut resolver = StaticResolver::new();
    resolver.insert_result(result);

    let mut app = app();
    app.resolve_with(&mut resolver, "Lydian Augmented");
    assert!(app.error().is_some());
    assert!(app.view().keys.iter().all(|k| k.state == VisualState::Default));

    app.resolve_with(&mut resolver, "f# dominant 7th");
    assert!(app.error().is_none());
    assert_eq!(app.result().unwrap().root, "F#");
}

#[test]
fn test_presets_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();

    let id = {
        let mut app = AppState::new(FileStore::new(dir.path()), &config);
        let ticket = app.submit("C Major Scale").unwrap();
        app.complete_payload(ticket, C_MAJOR_SCALE);
        app.save_preset("Warmup", 1_700_000_000_000).unwrap()
    };

    let mut app = AppState::new(FileStore::new(dir.path()), &config);
    assert_eq!(app.presets().len(), 1);
    assert_eq!(app.presets()[0].name, "Warmup");
    assert!(app.result().is_none());

    assert!(app.load_preset(&id));
    assert_eq!(app.view().state_of("C3"), Some(VisualState::Root));
}

#[test]
fn test_token_access_widens_keyboard() {
    let config = Config::from_yaml("gate:\n  extended-octaves: 3\n").unwrap();
    let mut app = AppState::new(MemoryStore::new(), &config);

    app.apply_access(OctaveAccess::Extended);
    let view = app.view();
    assert_eq!(view.octave_count, 3);
    assert_eq!(view.keys.last().unwrap().key.label, "A#5");
}

#[test]
fn test_svg_output() {
    let svg = keyglow::render_svg(F_SHARP_7, &LayoutSpec::new(2, 3)).unwrap();
    assert_eq!(svg.matches("<rect").count(), 24);
    assert_eq!(svg.matches("key black root").count(), 2);
    assert!(svg.contains("data-midi=\"54\""));
}
