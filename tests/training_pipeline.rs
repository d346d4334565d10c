mod support;

use revsent::config::{FeatureSettings, RevsentConfig, TrainingSettings};
use revsent::dataset::{ReviewStream, Sentiment};
use revsent::persist;
use revsent::training;
use support::fixtures::write_review_csv;
use tempfile::tempdir;

fn small_config(batch_size: usize, max_batches: usize, holdout_size: usize) -> RevsentConfig {
    RevsentConfig {
        features: FeatureSettings {
            n_features: 1 << 12,
            ..FeatureSettings::default()
        },
        training: TrainingSettings {
            batch_size,
            max_batches,
            holdout_size,
            ..TrainingSettings::default()
        },
        ..RevsentConfig::default()
    }
}

#[test]
fn run_trains_scores_and_persists() {
    let dir = tempdir().unwrap();
    let csv = write_review_csv(dir.path(), 120);
    let model_dir = dir.path().join("model_objects");
    let config = small_config(20, 5, 20);

    let (model, report) = training::run(&config, &csv, &model_dir).unwrap();

    assert_eq!(report.train.batches, 5);
    assert_eq!(report.train.records, 100);
    assert!(!report.train.stream_exhausted);
    let holdout = report.holdout.expect("hold-out report");
    assert_eq!(holdout.records, 20);
    assert!(holdout.evaluation.accuracy > 0.9);
    assert_eq!(model.classifier().samples_seen, 120);
    assert!(model_dir.join(persist::STOPWORDS_FILE_NAME).is_file());
    assert!(model_dir.join(persist::CLASSIFIER_FILE_NAME).is_file());
}

#[test]
fn reloaded_model_predicts_like_the_trained_one() {
    let dir = tempdir().unwrap();
    let csv = write_review_csv(dir.path(), 80);
    let model_dir = dir.path().join("model_objects");
    let config = small_config(20, 3, 20);

    let (trained, _) = training::run(&config, &csv, &model_dir).unwrap();
    let reloaded = persist::load_model(&model_dir, &config).unwrap();

    for text in ["I love this movie", "a terrible and boring film", ""] {
        let a = trained.predict(text).unwrap();
        let b = reloaded.predict(text).unwrap();
        assert_eq!(a.label, b.label);
        assert!((a.probability - b.probability).abs() < 1e-12);
    }
    let positive = reloaded.predict("a wonderful, brilliant movie").unwrap();
    assert_eq!(positive.label, Sentiment::Positive);
    assert!(positive.probability > 0.5);
}

#[test]
fn short_csv_skips_holdout() {
    let dir = tempdir().unwrap();
    let csv = write_review_csv(dir.path(), 30);
    let model_dir = dir.path().join("model_objects");
    let config = small_config(20, 45, 10);

    let (model, report) = training::run(&config, &csv, &model_dir).unwrap();

    assert_eq!(report.train.batches, 2);
    assert_eq!(report.train.records, 30);
    assert!(report.train.stream_exhausted);
    assert!(report.holdout.is_none());
    assert_eq!(model.classifier().batches_seen, 2);
}

#[test]
fn zero_training_batches_skip_holdout_and_still_save() {
    let dir = tempdir().unwrap();
    let csv = write_review_csv(dir.path(), 2);
    let model_dir = dir.path().join("model_objects");
    let config = small_config(20, 0, 2);

    let (model, report) = training::run(&config, &csv, &model_dir).unwrap();

    assert_eq!(report.train.batches, 0);
    assert!(report.holdout.is_none());
    assert!(!model.classifier().is_fitted());
    assert!(model_dir.join(persist::CLASSIFIER_FILE_NAME).is_file());
}

#[test]
fn same_seed_gives_identical_blobs() {
    let dir = tempdir().unwrap();
    let csv = write_review_csv(dir.path(), 60);
    let config = small_config(15, 4, 0);
    let first = dir.path().join("first");
    let second = dir.path().join("second");

    training::run(&config, &csv, &first).unwrap();
    training::run(&config, &csv, &second).unwrap();

    let read = |dir: &std::path::Path| {
        std::fs::read(dir.join(persist::CLASSIFIER_FILE_NAME)).unwrap()
    };
    assert_eq!(read(&first), read(&second));
}

#[test]
fn stream_over_fixture_batches_by_floor_and_remainder() {
    let dir = tempdir().unwrap();
    let csv = write_review_csv(dir.path(), 23);
    let mut stream = ReviewStream::open(&csv).unwrap();
    let sizes: Vec<usize> = stream.batches(5).map(|batch| batch.unwrap().len()).collect();
    assert_eq!(sizes, vec![5, 5, 5, 5, 3]);
    assert!(stream.is_exhausted());
}
