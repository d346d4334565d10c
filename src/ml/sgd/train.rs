use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};

use super::{CLASSES, ClassifierError, LearningRate, SgdClassifier};
use crate::features::SparseVector;

/// Largest magnitude a single update may take.
const MAX_UPDATE: f64 = 1e12;
/// Rescale raw weights once the shared scale drops below this.
const MIN_WSCALE: f64 = 1e-9;
/// Intercept step damping for sparse inputs.
const SPARSE_INTERCEPT_DECAY: f64 = 0.01;

/// Summary of one incremental update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialFitStats {
    pub samples: usize,
    /// Mean log loss over the batch, measured before each sample's step.
    pub mean_loss: f64,
    /// Step size used for the last sample.
    pub last_eta: f64,
}

impl SgdClassifier {
    /// Run one epoch of SGD over a single mini-batch.
    ///
    /// `classes` must be the full label set `{0, 1}` on every call. Samples are visited in
    /// an order shuffled by a generator seeded from `seed` and the batch count, so the
    /// same sequence of batches always produces the same weights.
    pub fn partial_fit(
        &mut self,
        x: &[SparseVector],
        y: &[u8],
        classes: &[u8],
    ) -> Result<PartialFitStats, ClassifierError> {
        self.check_classes(classes)?;
        if x.len() != y.len() {
            return Err(ClassifierError::LengthMismatch {
                rows: x.len(),
                labels: y.len(),
            });
        }
        for row in x {
            self.check_dim(row)?;
        }
        if let Some(&label) = y.iter().find(|label| !CLASSES.contains(label)) {
            return Err(ClassifierError::InvalidLabel(label));
        }
        if self.classes.is_none() {
            self.classes = Some(CLASSES.to_vec());
        }

        let mut order: Vec<usize> = (0..x.len()).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.batches_seen));
            order.shuffle(&mut rng);
        }

        let optimal_init = self.optimal_init();
        let mut total_loss = 0.0;
        let mut eta = 0.0;
        for &idx in &order {
            let row = &x[idx];
            let target = if y[idx] == CLASSES[1] { 1.0 } else { -1.0 };
            eta = match self.learning_rate {
                LearningRate::Optimal => 1.0 / (self.alpha * (optimal_init + self.t - 1.0)),
                LearningRate::Constant => self.eta0,
            };

            let p = self.margin(row);
            total_loss += log_loss(p, target);
            let update = (-eta * log_dloss(p, target)).clamp(-MAX_UPDATE, MAX_UPDATE);

            self.wscale *= (1.0 - eta * self.alpha).max(0.0);
            if self.wscale < MIN_WSCALE {
                self.reset_wscale();
            }
            if update != 0.0 {
                let step = update / self.wscale;
                for (col, value) in row.iter() {
                    self.raw_weights[col] += step * value;
                }
                self.intercept += update * SPARSE_INTERCEPT_DECAY;
            }
            self.t += 1.0;
        }
        self.reset_wscale();

        self.batches_seen += 1;
        self.samples_seen += x.len() as u64;
        let mean_loss = if x.is_empty() {
            0.0
        } else {
            total_loss / x.len() as f64
        };
        Ok(PartialFitStats {
            samples: x.len(),
            mean_loss,
            last_eta: eta,
        })
    }

    fn check_classes(&self, classes: &[u8]) -> Result<(), ClassifierError> {
        let mut sorted = classes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let expected = self.classes.as_deref().unwrap_or(&CLASSES);
        if sorted != expected {
            return Err(ClassifierError::ClassMismatch {
                expected: expected.to_vec(),
                found: classes.to_vec(),
            });
        }
        Ok(())
    }

    /// `t0` for the optimal schedule, chosen so the first step has a typical size.
    fn optimal_init(&self) -> f64 {
        let typw = (1.0 / self.alpha.sqrt()).sqrt();
        let initial_eta0 = typw / log_dloss(-typw, 1.0).abs().max(1.0);
        1.0 / (initial_eta0 * self.alpha)
    }

    fn reset_wscale(&mut self) {
        if self.wscale != 1.0 {
            for weight in &mut self.raw_weights {
                *weight *= self.wscale;
            }
            self.wscale = 1.0;
        }
    }
}

/// `log(1 + exp(-p * y))` for `y` in `{-1, 1}`.
fn log_loss(p: f64, y: f64) -> f64 {
    let z = p * y;
    if z > 18.0 {
        (-z).exp()
    } else if z < -18.0 {
        -z
    } else {
        (-z).exp().ln_1p()
    }
}

/// Derivative of [`log_loss`] with respect to `p`.
fn log_dloss(p: f64, y: f64) -> f64 {
    let z = p * y;
    if z > 18.0 {
        (-z).exp() * -y
    } else if z < -18.0 {
        -y
    } else {
        -y / (z.exp() + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierSettings;

    const DIM: usize = 16;

    fn row(entries: &[(u32, f64)]) -> SparseVector {
        SparseVector::from_sorted(DIM, entries.iter().copied())
    }

    fn toy_batch() -> (Vec<SparseVector>, Vec<u8>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            if i % 2 == 0 {
                x.push(row(&[(1, 1.0), (3, 0.5)]));
                y.push(1);
            } else {
                x.push(row(&[(2, 1.0), (3, 0.5)]));
                y.push(0);
            }
        }
        (x, y)
    }

    #[test]
    fn learns_separable_toy_problem() {
        let mut clf = SgdClassifier::new(DIM, &ClassifierSettings::default());
        let (x, y) = toy_batch();
        for _ in 0..5 {
            clf.partial_fit(&x, &y, &CLASSES).unwrap();
        }
        assert_eq!(clf.predict(&row(&[(1, 1.0)])).unwrap(), 1);
        assert_eq!(clf.predict(&row(&[(2, 1.0)])).unwrap(), 0);
        assert_eq!(clf.score(&x, &y).unwrap(), 1.0);
        assert_eq!(clf.batches_seen, 5);
        assert_eq!(clf.samples_seen, 200);
    }

    #[test]
    fn loss_decreases_across_batches() {
        let mut clf = SgdClassifier::new(DIM, &ClassifierSettings::default());
        let (x, y) = toy_batch();
        let first = clf.partial_fit(&x, &y, &CLASSES).unwrap();
        let mut last = first;
        for _ in 0..4 {
            last = clf.partial_fit(&x, &y, &CLASSES).unwrap();
        }
        assert!(last.mean_loss < first.mean_loss);
        assert!(first.mean_loss < std::f64::consts::LN_2);
    }

    #[test]
    fn same_seed_same_weights() {
        let (x, y) = toy_batch();
        let train = || {
            let mut clf = SgdClassifier::new(DIM, &ClassifierSettings::default());
            clf.partial_fit(&x, &y, &CLASSES).unwrap();
            clf.partial_fit(&x, &y, &CLASSES).unwrap();
            clf
        };
        let a = train();
        let b = train();
        assert_eq!(a.coef(), b.coef());
        assert_eq!(a.intercept, b.intercept);
        let probe = row(&[(1, 0.3), (2, 0.2)]);
        assert_eq!(
            a.predict_proba(&probe).unwrap(),
            b.predict_proba(&probe).unwrap()
        );
    }

    #[test]
    fn rejects_bad_inputs() {
        let mut clf = SgdClassifier::new(DIM, &ClassifierSettings::default());
        let x = vec![row(&[(1, 1.0)])];
        assert!(matches!(
            clf.partial_fit(&x, &[1], &[1]),
            Err(ClassifierError::ClassMismatch { .. })
        ));
        assert_eq!(
            clf.partial_fit(&x, &[2], &CLASSES),
            Err(ClassifierError::InvalidLabel(2))
        );
        assert_eq!(
            clf.partial_fit(&x, &[1, 0], &CLASSES),
            Err(ClassifierError::LengthMismatch { rows: 1, labels: 2 })
        );
        let wide = vec![SparseVector::from_sorted(DIM + 1, [(0, 1.0)])];
        assert_eq!(
            clf.partial_fit(&wide, &[1], &CLASSES),
            Err(ClassifierError::DimensionMismatch {
                expected: DIM,
                found: DIM + 1
            })
        );
        assert!(!clf.is_fitted());
    }

    #[test]
    fn empty_batch_marks_fitted_without_moving_weights() {
        let mut clf = SgdClassifier::new(DIM, &ClassifierSettings::default());
        let stats = clf.partial_fit(&[], &[], &[1, 0]).unwrap();
        assert_eq!(stats.samples, 0);
        assert!(clf.is_fitted());
        assert!(clf.coef().iter().all(|w| *w == 0.0));
        assert_eq!(clf.predict(&row(&[(1, 1.0)])).unwrap(), 0);
    }

    #[test]
    fn constant_schedule_uses_eta0() {
        let settings = ClassifierSettings {
            learning_rate: LearningRate::Constant,
            eta0: 0.5,
            ..ClassifierSettings::default()
        };
        let mut clf = SgdClassifier::new(DIM, &settings);
        let (x, y) = toy_batch();
        let stats = clf.partial_fit(&x, &y, &CLASSES).unwrap();
        assert_eq!(stats.last_eta, 0.5);
    }

    #[test]
    fn dloss_matches_loss_slope() {
        let h = 1e-6;
        for &(p, y) in &[(0.3, 1.0), (-1.2, 1.0), (2.0, -1.0)] {
            let numeric = (log_loss(p + h, y) - log_loss(p - h, y)) / (2.0 * h);
            assert!((numeric - log_dloss(p, y)).abs() < 1e-6);
        }
    }
}
