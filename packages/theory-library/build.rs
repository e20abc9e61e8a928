use std::env;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("library.rs");

    let library_dir = Path::new("library");
    let mut entries: Vec<(String, String)> = Vec::new();

    if library_dir.exists() {
        for entry in WalkDir::new(library_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
        {
            let path = entry.path();
            // "chords/c-major.json" -> "chords/c-major"
            let Ok(relative_path) = path.strip_prefix(library_dir) else {
                continue;
            };
            let name = relative_path
                .with_extension("")
                .to_string_lossy()
                .replace('\\', "/");

            if let Ok(content) = fs::read_to_string(path) {
                entries.push((name, content));
            }
        }
    }
    entries.sort();

    let mut code = String::new();
    code.push_str("/// Embedded theory payloads\n");
    code.push_str("pub static LIBRARY: &[(&str, &str)] = &[\n");
    for (name, content) in &entries {
        // Debug formatting yields valid Rust string literals
        code.push_str(&format!("    ({:?}, {:?}),\n", name, content));
    }
    code.push_str("];\n");

    fs::write(&dest_path, code).expect("failed to write embedded library");

    println!("cargo:rerun-if-changed=library");
}
