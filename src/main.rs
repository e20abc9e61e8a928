use keyglow::{Config, KeyglowError, KeyboardView, LayoutSpec};
use std::env;
use std::fs;
use std::path::Path;
use std::process;

const USAGE: &str = "Usage: keyglow [--config FILE] [--json] [--shift N] <result.json> [output.svg]
       keyglow [--config FILE] [--json] [--shift N] --notes C,E,G [--root C] [output.svg]";

#[derive(Default)]
struct Options {
    config: Option<String>,
    json: bool,
    shift: Option<i32>,
    notes: Option<String>,
    root: Option<String>,
    positional: Vec<String>,
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    eprintln!("{}", USAGE);
    process::exit(1);
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--config" | "--shift" | "--notes" | "--root" => {
                let Some(value) = iter.next() else {
                    usage_error(&format!("Missing value for {}", arg));
                };
                match arg.as_str() {
                    "--config" => options.config = Some(value.clone()),
                    "--shift" => match value.parse() {
                        Ok(shift) => options.shift = Some(shift),
                        Err(_) => usage_error(&format!("Invalid octave shift '{}'", value)),
                    },
                    "--notes" => options.notes = Some(value.clone()),
                    _ => options.root = Some(value.clone()),
                }
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            flag if flag.starts_with("--") => usage_error(&format!("Unknown option {}", flag)),
            _ => options.positional.push(arg.clone()),
        }
    }

    options
}

fn build_view(options: &Options, config: &Config) -> Result<KeyboardView, KeyglowError> {
    let keyboard = &config.keyboard;
    let shift = options.shift.unwrap_or(keyboard.octave_shift).clamp(
        keyglow::config::MIN_OCTAVE_SHIFT,
        keyglow::config::MAX_OCTAVE_SHIFT,
    );
    let spec = LayoutSpec::new(keyboard.octave_count, keyboard.base_octave)
        .with_shift(shift)
        .with_geometry(keyboard.geometry());

    match &options.notes {
        Some(notes) => {
            let notes: Vec<&str> = notes.split(',').map(str::trim).collect();
            Ok(keyglow::render(&notes, options.root.as_deref(), &spec))
        }
        None => {
            let input_path = &options.positional[0];
            let payload = match fs::read_to_string(input_path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading file '{}': {}", input_path, e);
                    process::exit(1);
                }
            };
            keyglow::render_payload(&payload, &spec)
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args);

    // With --notes every positional argument is an output path
    let inputs = if options.notes.is_some() { 0 } else { 1 };
    if options.positional.len() < inputs {
        usage_error("Missing input file");
    }
    if options.positional.len() > inputs + 1 {
        usage_error("Too many arguments");
    }
    let output_path = options.positional.get(inputs);

    let config = match &options.config {
        Some(path) => match Config::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    let view = match build_view(&options, &config) {
        Ok(view) => view,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let output = if options.json {
        match view.to_json() {
            Ok(json) => json,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    } else {
        keyglow::to_svg(&view)
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &output) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote keyboard to {}", path);
        }
        None => {
            println!("{}", output);
        }
    }
}
