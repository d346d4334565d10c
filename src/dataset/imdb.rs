//! Assemble the labeled review tree into one shuffled CSV.
//!
//! Expected layout: `<root>/{train,test}/{pos,neg}/*.txt`, one review per file.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};

use super::{DatasetError, Record, Sentiment};

const SPLITS: [&str; 2] = ["test", "train"];
const POLARITIES: [(&str, Sentiment); 2] = [("pos", Sentiment::Positive), ("neg", Sentiment::Negative)];
const PROGRESS_EVERY: usize = 5_000;

/// Counts written by [`build_csv`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub records: usize,
    pub positive: usize,
    pub negative: usize,
}

/// Read every review under `root` in a deterministic (sorted) order.
pub fn collect_reviews(root: &Path) -> Result<Vec<Record>, DatasetError> {
    let mut records = Vec::new();
    for split in SPLITS {
        for (polarity, sentiment) in POLARITIES {
            let dir = root.join(split).join(polarity);
            for path in review_files(&dir)? {
                let review = fs::read_to_string(&path)
                    .map_err(|source| DatasetError::ReadFile { path, source })?;
                records.push(Record::new(review, sentiment));
                if records.len() % PROGRESS_EVERY == 0 {
                    tracing::info!("Collected {} reviews", records.len());
                }
            }
        }
    }
    Ok(records)
}

/// Shuffle `records` with a seeded generator and write them as `review,sentiment` CSV.
pub fn write_shuffled_csv(
    mut records: Vec<Record>,
    out: &Path,
    seed: u64,
) -> Result<BuildSummary, DatasetError> {
    let mut rng = StdRng::seed_from_u64(seed);
    records.shuffle(&mut rng);

    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| DatasetError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let write_err = |source: csv::Error| DatasetError::Write {
        path: out.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(out)
        .map_err(write_err)?;
    writer.write_record(["review", "sentiment"]).map_err(write_err)?;

    let mut summary = BuildSummary::default();
    for record in &records {
        writer.serialize(record).map_err(write_err)?;
        summary.records += 1;
        match record.sentiment {
            Sentiment::Positive => summary.positive += 1,
            Sentiment::Negative => summary.negative += 1,
        }
    }
    writer
        .flush()
        .map_err(|source| DatasetError::Flush {
            path: out.to_path_buf(),
            source,
        })?;
    Ok(summary)
}

/// Collect the review tree under `root` and write it to `out` in shuffled order.
pub fn build_csv(root: &Path, out: &Path, seed: u64) -> Result<BuildSummary, DatasetError> {
    let records = collect_reviews(root)?;
    tracing::info!("Collected {} reviews from {}", records.len(), root.display());
    let summary = write_shuffled_csv(records, out, seed)?;
    tracing::info!(
        "Wrote {} reviews ({} positive, {} negative) to {}",
        summary.records,
        summary.positive,
        summary.negative,
        out.display()
    );
    Ok(summary)
}

fn review_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    if !dir.is_dir() {
        return Err(DatasetError::MissingDir(dir.to_path_buf()));
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| DatasetError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("txt"))
        .collect();
    files.sort();
    Ok(files)
}
