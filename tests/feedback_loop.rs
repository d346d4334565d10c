mod support;

use revsent::config::{FeatureSettings, RevsentConfig, TrainingSettings};
use revsent::dataset::Sentiment;
use revsent::feedback::{ReviewStore, update_model};
use revsent::persist;
use revsent::training;
use support::fixtures::write_review_csv;
use tempfile::tempdir;

#[test]
fn stored_feedback_updates_saved_model() {
    let dir = tempdir().unwrap();
    let csv = write_review_csv(dir.path(), 40);
    let model_dir = dir.path().join("model_objects");
    let config = RevsentConfig {
        features: FeatureSettings {
            n_features: 1 << 12,
            ..FeatureSettings::default()
        },
        training: TrainingSettings {
            batch_size: 20,
            max_batches: 2,
            holdout_size: 0,
            ..TrainingSettings::default()
        },
        ..RevsentConfig::default()
    };
    training::run(&config, &csv, &model_dir).unwrap();

    let store = ReviewStore::open(dir.path().join("reviews.sqlite")).unwrap();
    for _ in 0..3 {
        store
            .insert("the soundtrack was magnificent", Sentiment::Positive)
            .unwrap();
        store.insert("the soundtrack was grating", Sentiment::Negative).unwrap();
    }

    let mut model = persist::load_model(&model_dir, &config).unwrap();
    let before = model.classifier().batches_seen;
    assert_eq!(update_model(&store, &mut model, 4).unwrap(), 6);
    assert_eq!(model.classifier().batches_seen, before + 2);
    persist::save(&model_dir, model.stopwords(), model.classifier()).unwrap();

    let reloaded = persist::load_model(&model_dir, &config).unwrap();
    assert_eq!(reloaded.classifier().samples_seen, 46);
}
