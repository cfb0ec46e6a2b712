use ndarray::ArrayView1;

use crate::error::{ensure_len, Error, Result};

/// Outcome counts of a binary classifier on a labeled set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub true_negative: u64,
    pub false_positive: u64,
    pub false_negative: u64,
}

/// Scores derived from a confusion matrix. A score whose denominator is zero is NaN
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub specificity: f64,
    pub f1: f64,
}

fn as_class(index: usize, value: f64) -> Result<bool> {
    if value == 1.0 {
        Ok(true)
    } else if value == 0.0 {
        Ok(false)
    } else {
        Err(Error::NonBinaryLabel { index, value })
    }
}

impl ConfusionMatrix {
    /// Tally predictions against the actual labels. Both must hold only 0s and 1s
    pub fn from_predictions(
        predictions: &ArrayView1<f64>,
        actual: &ArrayView1<f64>,
    ) -> Result<ConfusionMatrix> {
        ensure_len("predictions vs labels", actual.len(), predictions.len())?;

        let mut matrix = ConfusionMatrix::default();
        for (index, (&predicted, &truth)) in predictions.iter().zip(actual.iter()).enumerate() {
            match (as_class(index, predicted)?, as_class(index, truth)?) {
                (true, true) => matrix.true_positive += 1,
                (false, false) => matrix.true_negative += 1,
                (true, false) => matrix.false_positive += 1,
                (false, true) => matrix.false_negative += 1,
            }
        }

        Ok(matrix)
    }

    pub fn total(&self) -> u64 {
        self.true_positive + self.true_negative + self.false_positive + self.false_negative
    }

    pub fn metrics(&self) -> Metrics {
        let tp = self.true_positive as f64;
        let tn = self.true_negative as f64;
        let fp = self.false_positive as f64;
        let fn_ = self.false_negative as f64;

        let precision = tp / (tp + fp);
        let recall = tp / (tp + fn_);

        Metrics {
            accuracy: (tp + tn) / self.total() as f64,
            precision,
            recall,
            specificity: tn / (tn + fp),
            f1: 2.0 * precision * recall / (precision + recall),
        }
    }
}

impl Metrics {
    /// Names of the scores that came out NaN or infinite
    pub fn non_finite(&self) -> Vec<&'static str> {
        [
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("specificity", self.specificity),
            ("f1", self.f1),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
        .collect()
    }
}
