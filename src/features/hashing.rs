use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SparseVector;
use crate::config::FeatureSettings;
use crate::text::Normalizer;

/// Row normalization applied after hashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    #[default]
    L2,
    None,
}

/// Stateless bag-of-words vectorizer over a fixed hashed feature space.
///
/// There is no vocabulary: a token's column is a slice of its BLAKE3 digest modulo
/// `n_features`, so unrelated tokens can collide. With `alternate_sign` a second digest
/// bit picks the sign, which keeps collisions from only ever adding up.
#[derive(Debug, Clone)]
pub struct HashingVectorizer {
    n_features: usize,
    alternate_sign: bool,
    norm: Norm,
    binary: bool,
    normalizer: Normalizer,
}

impl HashingVectorizer {
    pub fn new(settings: &FeatureSettings, normalizer: Normalizer) -> Self {
        Self {
            n_features: settings.n_features.max(1),
            alternate_sign: settings.alternate_sign,
            norm: settings.norm,
            binary: settings.binary,
            normalizer,
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Column and sign for a single token.
    pub fn bucket(&self, token: &str) -> (u32, f64) {
        let digest = blake3::hash(token.as_bytes());
        let bytes = digest.as_bytes();
        let raw = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let index = (raw as u64 % self.n_features as u64) as u32;
        let sign = if self.alternate_sign && bytes[4] & 1 == 1 {
            -1.0
        } else {
            1.0
        };
        (index, sign)
    }

    /// Hash an already-normalized token sequence.
    pub fn transform_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> SparseVector {
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for token in tokens {
            let (index, sign) = self.bucket(token.as_ref());
            *counts.entry(index).or_insert(0.0) += sign;
        }
        let mut row = SparseVector::from_sorted(
            self.n_features,
            counts.into_iter().filter(|(_, value)| *value != 0.0),
        );
        if self.binary {
            row.fill(1.0);
        }
        self.normalize_row(&mut row);
        row
    }

    /// Normalize then hash one raw document.
    pub fn transform_text(&self, text: &str) -> SparseVector {
        let tokens = self.normalizer.normalize(text);
        self.transform_tokens(&tokens)
    }

    pub fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Vec<SparseVector> {
        docs.iter()
            .map(|doc| self.transform_text(doc.as_ref()))
            .collect()
    }

    fn normalize_row(&self, row: &mut SparseVector) {
        let total = match self.norm {
            Norm::None => return,
            Norm::L1 => row.values().iter().map(|v| v.abs()).sum::<f64>(),
            Norm::L2 => row.l2_norm(),
        };
        if total > 0.0 {
            row.scale(1.0 / total);
        }
    }
}
