//! Developer utility to assemble the shuffled review CSV from an IMDb-style review tree.

use std::path::PathBuf;

use revsent::dataset::imdb;
use revsent::logging::{self, LoggingOptions};

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
    if !options.dataset_dir.is_dir() {
        return Err(format!(
            "Dataset path is not a directory: {}",
            options.dataset_dir.display()
        ));
    }
    let summary = imdb::build_csv(&options.dataset_dir, &options.out, options.seed)
        .map_err(|err| err.to_string())?;
    println!(
        "wrote {} reviews ({} positive, {} negative) to {}",
        summary.records,
        summary.positive,
        summary.negative,
        options.out.display()
    );
    Ok(())
}

#[derive(Debug, Clone)]
struct CliOptions {
    dataset_dir: PathBuf,
    out: PathBuf,
    seed: u64,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut dataset_dir: Option<PathBuf> = None;
    let mut out = PathBuf::from("movie_data.csv");
    let mut seed = 0u64;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--dataset" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--dataset requires a value".to_string())?;
                dataset_dir = Some(PathBuf::from(value));
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                out = PathBuf::from(value);
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid --seed value: {value}"))?;
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let dataset_dir = dataset_dir.ok_or_else(help_text)?;
    Ok(CliOptions {
        dataset_dir,
        out,
        seed,
    })
}

fn help_text() -> String {
    [
        "revsent-build-csv",
        "",
        "Collects {test,train}/{pos,neg}/*.txt reviews into one shuffled review,sentiment CSV.",
        "",
        "Usage:",
        "  revsent-build-csv --dataset <dir> [--out movie_data.csv] [--seed 0]",
        "",
        "Options:",
        "  --dataset <dir>  Root of the extracted review tree (required).",
        "  --out <file>     Output CSV path (default: movie_data.csv).",
        "  --seed <u64>     Shuffle seed (default: 0).",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_defaults_and_overrides() {
        let options = parse_args(args(&["--dataset", "aclImdb"])).unwrap();
        assert_eq!(options.out, PathBuf::from("movie_data.csv"));
        assert_eq!(options.seed, 0);

        let options =
            parse_args(args(&["--dataset", "aclImdb", "--out", "x.csv", "--seed", "7"])).unwrap();
        assert_eq!(options.out, PathBuf::from("x.csv"));
        assert_eq!(options.seed, 7);
    }

    #[test]
    fn dataset_is_required() {
        assert!(parse_args(Vec::new()).unwrap_err().contains("Usage:"));
        assert!(parse_args(args(&["--seed", "x", "--dataset", "d"])).is_err());
    }
}
