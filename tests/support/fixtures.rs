use std::fs;
use std::path::{Path, PathBuf};

const POSITIVE: &[&str] = &[
    "A wonderful film with brilliant acting and a moving story :)",
    "I loved every minute, a truly great and beautiful movie.",
    "Excellent direction, superb cast, one of the best films this year!",
    "<br />Delightful and charming, I would happily watch it again.",
];

const NEGATIVE: &[&str] = &[
    "An awful film with terrible acting and a boring story :(",
    "I hated every minute, a truly bad and ugly movie.",
    "Dreadful direction, weak cast, one of the worst films this year!",
    "<br />Tedious and dull, I would never watch it again.",
];

/// `count` labeled reviews alternating positive and negative.
pub fn reviews(count: usize) -> Vec<(String, u8)> {
    (0..count)
        .map(|i| {
            let pick = (i / 2) % POSITIVE.len();
            if i % 2 == 0 {
                (POSITIVE[pick].to_string(), 1)
            } else {
                (NEGATIVE[pick].to_string(), 0)
            }
        })
        .collect()
}

/// Write a `review,sentiment` CSV with `count` rows into `dir`.
pub fn write_review_csv(dir: &Path, count: usize) -> PathBuf {
    let path = dir.join("movie_data.csv");
    let mut writer = csv::Writer::from_path(&path).expect("csv writer");
    writer.write_record(["review", "sentiment"]).expect("header");
    for (review, label) in reviews(count) {
        writer
            .write_record([review.as_str(), &label.to_string()])
            .expect("row");
    }
    writer.flush().expect("flush");
    path
}

/// Lay out `{test,train}/{pos,neg}/<n>_<rating>.txt` with `per_dir` files each.
pub fn write_review_tree(root: &Path, per_dir: usize) {
    for split in ["test", "train"] {
        for (polarity, texts) in [("pos", POSITIVE), ("neg", NEGATIVE)] {
            let dir = root.join(split).join(polarity);
            fs::create_dir_all(&dir).expect("create review dir");
            for i in 0..per_dir {
                let text = texts[i % texts.len()];
                fs::write(dir.join(format!("{i}_7.txt")), format!("{split} {i}: {text}"))
                    .expect("write review");
            }
        }
    }
}
