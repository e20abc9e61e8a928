use crate::layout::KeyKind;
use crate::view::{KeyView, KeyboardView};

/// Render a keyboard view as SVG markup.
///
/// Keys are emitted in view order, so black keys land on top of white keys. Only
/// classes and data attributes are written; colours come from the host page's CSS.
pub fn to_svg(view: &KeyboardView) -> String {
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="keyboard" width="{}" height="{}" viewBox="0 0 {} {}" data-octaves="{}" data-shift="{}">"#,
        fmt_num(view.width),
        fmt_num(view.height),
        fmt_num(view.width),
        fmt_num(view.height),
        view.octave_count,
        view.octave_shift
    ));
    svg.push('\n');

    for key in &view.keys {
        svg.push_str(&key_to_svg(key));
    }

    svg.push_str("</svg>\n");
    svg
}

fn key_to_svg(key: &KeyView) -> String {
    let k = &key.key;
    let kind = match k.kind {
        KeyKind::White => "white",
        KeyKind::Black => "black",
    };

    let mut rect = String::new();
    rect.push_str(&format!(
        "  <rect class=\"key {} {}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
        kind,
        key.state.as_str(),
        fmt_num(k.x),
        fmt_num(k.y),
        fmt_num(k.width),
        fmt_num(k.height)
    ));
    rect.push_str(&format!(" data-pitch-class=\"{}\"", k.pitch_class.value()));
    // Visual keyboards carry no MIDI numbers
    if let Some(midi) = k.midi_note {
        rect.push_str(&format!(" data-midi=\"{}\"", midi));
    }
    rect.push_str(&format!(">\n    <title>{}</title>\n  </rect>\n", escape_xml(&k.label)));
    rect
}

/// Whole numbers without a trailing ".0"
fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
