//! Developer utility to train the sentiment model out-of-core with command-line overrides.

use std::path::PathBuf;

use revsent::config::{self, RevsentConfig};
use revsent::logging::{self, LoggingOptions};
use revsent::training;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let config = apply_overrides(load_config(&options)?, &options);
    if let Err(err) = logging::init_with(&LoggingOptions {
        default_filter: config.logging.level.clone(),
        log_to_file: config.logging.to_file,
        log_dir: None,
    }) {
        eprintln!("File logging disabled: {err}");
    }

    let csv = options
        .csv
        .clone()
        .unwrap_or_else(|| config.data.csv_path.clone());
    let model_dir = config.model_dir().map_err(|err| err.to_string())?;
    let (_, report) = training::run(&config, &csv, &model_dir).map_err(|err| err.to_string())?;

    println!(
        "trained on {} reviews in {} batches{}",
        report.train.records,
        report.train.batches,
        if report.train.stream_exhausted {
            " (stream exhausted)"
        } else {
            ""
        }
    );
    if let Some(loss) = report.train.last_loss {
        println!("last batch loss: {loss:.4}");
    }
    match &report.holdout {
        Some(holdout) => {
            println!("hold-out reviews: {}", holdout.records);
            for line in holdout.evaluation.report_lines(&["negative", "positive"]) {
                println!("{line}");
            }
            if holdout.fitted {
                println!("hold-out batch folded into the model");
            }
        }
        None => println!("no hold-out evaluation"),
    }
    println!("model saved to {}", report.model_dir.display());
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    csv: Option<PathBuf>,
    model_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    batch_size: Option<usize>,
    batches: Option<usize>,
    holdout: Option<usize>,
    seed: Option<u64>,
}

fn load_config(options: &CliOptions) -> Result<RevsentConfig, String> {
    let loaded = match &options.config {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    };
    loaded.map_err(|err| err.to_string())
}

fn apply_overrides(mut config: RevsentConfig, options: &CliOptions) -> RevsentConfig {
    if let Some(dir) = &options.model_dir {
        config.data.model_dir = Some(dir.clone());
    }
    if let Some(size) = options.batch_size {
        config.training.batch_size = size;
    }
    if let Some(count) = options.batches {
        config.training.max_batches = count;
    }
    if let Some(size) = options.holdout {
        config.training.holdout_size = size;
    }
    if let Some(seed) = options.seed {
        config.classifier.seed = seed;
    }
    config.normalized()
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "-h" | "--help" => return Err(help_text()),
            "--csv" | "--model-dir" | "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| format!("{flag} requires a value"))?;
                let path = Some(PathBuf::from(value));
                match flag {
                    "--csv" => options.csv = path,
                    "--model-dir" => options.model_dir = path,
                    _ => options.config = path,
                }
            }
            "--batch-size" | "--batches" | "--holdout" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| format!("{flag} requires a value"))?;
                let parsed = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid {flag} value: {value}"))?;
                match flag {
                    "--batch-size" => options.batch_size = Some(parsed),
                    "--batches" => options.batches = Some(parsed),
                    _ => options.holdout = Some(parsed),
                }
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                options.seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "revsent-train",
        "",
        "Streams the review CSV in mini-batches, trains the online classifier,",
        "scores a hold-out batch and saves the model objects.",
        "",
        "Usage:",
        "  revsent-train [--csv movie_data.csv] [options]",
        "",
        "Options:",
        "  --csv <file>        Review CSV (default: data.csv_path from config).",
        "  --model-dir <dir>   Where to write stopwords.json and classifier.json.",
        "  --config <file>     Config file (default: app config.toml).",
        "  --batch-size <n>    Reviews per training batch (default: 1000).",
        "  --batches <n>       Maximum training batches (default: 45).",
        "  --holdout <n>       Hold-out batch size, 0 disables (default: 5000).",
        "  --seed <u64>        Shuffle seed (default: 1).",
    ]
    .join("\n")
}
