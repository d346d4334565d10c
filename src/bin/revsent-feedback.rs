//! Developer utility to record labeled reviews and fold them back into a saved model.

use std::path::PathBuf;

use revsent::config::{self, RevsentConfig};
use revsent::dataset::Sentiment;
use revsent::feedback::{self, ReviewStore};
use revsent::logging::{self, LoggingOptions};
use revsent::persist;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init_with(&LoggingOptions {
        log_to_file: false,
        ..LoggingOptions::default()
    }) {
        eprintln!("Logging unavailable: {err}");
    }
    let config: RevsentConfig = match &options.config {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    let db = options
        .db
        .clone()
        .or_else(|| config.data.feedback_db.clone())
        .ok_or_else(|| "--db is required when data.feedback_db is not configured".to_string())?;
    let store = ReviewStore::open(&db).map_err(|err| err.to_string())?;

    match options.action {
        Action::Add { sentiment, text } => {
            let id = store.insert(&text, sentiment).map_err(|err| err.to_string())?;
            println!("stored review {id} as {sentiment}");
        }
        Action::Update => {
            let model_dir = match &options.model_dir {
                Some(dir) => dir.clone(),
                None => config.model_dir().map_err(|err| err.to_string())?,
            };
            let mut model =
                persist::load_model(&model_dir, &config).map_err(|err| err.to_string())?;
            let applied =
                feedback::update_model(&store, &mut model, config.training.feedback_batch_size)
                    .map_err(|err| err.to_string())?;
            persist::save(&model_dir, model.stopwords(), model.classifier())
                .map_err(|err| err.to_string())?;
            println!("applied {applied} stored reviews; model saved to {}", model_dir.display());
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum Action {
    Add { sentiment: Sentiment, text: String },
    Update,
}

#[derive(Debug, Clone)]
struct CliOptions {
    db: Option<PathBuf>,
    model_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    action: Action,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut db = None;
    let mut model_dir = None;
    let mut config = None;
    let mut action = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--db" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--db requires a value".to_string())?;
                db = Some(PathBuf::from(value));
            }
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
            "--add" => {
                let label = args
                    .get(idx + 1)
                    .ok_or_else(|| "--add requires a label and a review".to_string())?;
                let text = args
                    .get(idx + 2)
                    .ok_or_else(|| "--add requires a label and a review".to_string())?;
                let sentiment = label.parse::<Sentiment>()?;
                action = Some(Action::Add {
                    sentiment,
                    text: text.clone(),
                });
                idx += 2;
            }
            "--update" => action = Some(Action::Update),
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let action = action.ok_or_else(help_text)?;
    Ok(CliOptions {
        db,
        model_dir,
        config,
        action,
    })
}

fn help_text() -> String {
    [
        "revsent-feedback",
        "",
        "Stores user-labeled reviews in SQLite and replays them into the saved model.",
        "",
        "Usage:",
        "  revsent-feedback [--db reviews.sqlite] --add <negative|positive> <review>",
        "  revsent-feedback [--db reviews.sqlite] [--model-dir <dir>] --update",
        "",
        "Options:",
        "  --db <file>        Feedback database (default: data.feedback_db from config).",
        "  --model-dir <dir>  Model objects to update (default: app model_objects dir).",
        "  --config <file>    Config file (default: app config.toml).",
    ]
    .join("\n")
}
