//! Sparse on-disk form of the dense weight vector.
//!
//! Only touched columns are non-zero, so the blob stores `(index, weight)` pairs plus the
//! dimension instead of millions of zeros.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
struct StoredWeights {
    dim: usize,
    entries: Vec<(u32, f64)>,
}

pub(super) fn serialize<S: Serializer>(weights: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    let entries = weights
        .iter()
        .enumerate()
        .filter(|(_, w)| **w != 0.0)
        .map(|(idx, w)| (idx as u32, *w))
        .collect();
    StoredWeights {
        dim: weights.len(),
        entries,
    }
    .serialize(serializer)
}

pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let stored = StoredWeights::deserialize(deserializer)?;
    let mut weights = vec![0.0; stored.dim];
    for (idx, value) in stored.entries {
        let slot = weights.get_mut(idx as usize).ok_or_else(|| {
            D::Error::custom(format!("weight index {idx} out of range {}", stored.dim))
        })?;
        *slot = value;
    }
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super")]
        w: Vec<f64>,
    }

    #[test]
    fn stores_only_non_zero_entries() {
        let holder = Holder {
            w: vec![0.0, 1.5, 0.0, -2.0],
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"w":{"dim":4,"entries":[[1,1.5],[3,-2.0]]}}"#);
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.w, holder.w);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let result = serde_json::from_str::<Holder>(r#"{"w":{"dim":2,"entries":[[5,1.0]]}}"#);
        assert!(result.is_err());
    }
}
