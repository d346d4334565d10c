//! Default run: train from the configured CSV, score the hold-out, persist, reload, predict.

use std::path::PathBuf;

use revsent::config::{self, RevsentConfig};
use revsent::logging::{self, LoggingOptions};
use revsent::persist;
use revsent::training;

const EXAMPLE_REVIEW: &str = "I love this movie";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config = load_config()?;
    if let Err(err) = logging::init_with(&LoggingOptions {
        default_filter: config.logging.level.clone(),
        log_to_file: config.logging.to_file,
        log_dir: None,
    }) {
        eprintln!("File logging disabled: {err}");
    }

    let model_dir = config.model_dir().map_err(|err| err.to_string())?;
    let (_, report) =
        training::run(&config, &config.data.csv_path, &model_dir).map_err(|err| err.to_string())?;
    println!(
        "trained on {} reviews in {} batches",
        report.train.records, report.train.batches
    );
    if let Some(holdout) = &report.holdout {
        println!("hold-out reviews: {}", holdout.records);
        for line in holdout.evaluation.report_lines(&["negative", "positive"]) {
            println!("{line}");
        }
    }

    let model = persist::load_model(&model_dir, &config).map_err(|err| err.to_string())?;
    let prediction = model.predict(EXAMPLE_REVIEW).map_err(|err| err.to_string())?;
    println!(
        "{EXAMPLE_REVIEW:?} -> {} ({:.2}%)",
        prediction.label,
        prediction.probability * 100.0
    );
    Ok(())
}

fn load_config() -> Result<RevsentConfig, String> {
    let mut args = std::env::args().skip(1);
    match (args.next().as_deref(), args.next()) {
        (None, _) => config::load_or_default().map_err(|err| err.to_string()),
        (Some("--config"), Some(path)) => {
            config::load_from(&PathBuf::from(path)).map_err(|err| err.to_string())
        }
        (Some("-h" | "--help"), _) => Err(
            "revsent [--config <file>]\n\nTrains, evaluates and persists the sentiment model, \
             then predicts on a sample review."
                .to_string(),
        ),
        (Some(other), _) => Err(format!("Unknown argument: {other}")),
    }
}
