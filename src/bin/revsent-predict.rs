//! Developer utility to classify review text with a saved model.

use std::path::PathBuf;

use revsent::config::{self, RevsentConfig};
use revsent::persist;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let config: RevsentConfig = match &options.config {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    let model_dir = match options.model_dir {
        Some(dir) => dir,
        None => config.model_dir().map_err(|err| err.to_string())?,
    };
    let model = persist::load_model(&model_dir, &config).map_err(|err| err.to_string())?;
    let prediction = model.predict(&options.text).map_err(|err| err.to_string())?;
    println!(
        "Prediction: {}\nProbability: {:.2}%",
        prediction.label,
        prediction.probability * 100.0
    );
    Ok(())
}

#[derive(Debug, Clone)]
struct CliOptions {
    model_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    text: String,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut model_dir = None;
    let mut config = None;
    let mut words: Vec<String> = Vec::new();

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--model-dir" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model-dir requires a value".to_string())?;
                model_dir = Some(PathBuf::from(value));
            }
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                config = Some(PathBuf::from(value));
            }
            "--" => {
                words.extend(args[idx + 1..].iter().cloned());
                break;
            }
            word => words.push(word.to_string()),
        }
        idx += 1;
    }

    if words.is_empty() {
        return Err(help_text());
    }
    Ok(CliOptions {
        model_dir,
        config,
        text: words.join(" "),
    })
}

fn help_text() -> String {
    [
        "revsent-predict",
        "",
        "Prints the predicted sentiment and its probability for a review.",
        "",
        "Usage:",
        "  revsent-predict [--model-dir <dir>] [--config <file>] <text...>",
    ]
    .join("\n")
}
