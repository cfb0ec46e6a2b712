use ndarray::{Array1, Array2};
use rand::Rng;

use crate::error::Result;
use crate::metrics::{ConfusionMatrix, Metrics};
use crate::model::logistic::{init_weights, InitMethod, LogisticRegression};
use crate::model::{Model, TrainOutcome};
use crate::parsing::{split, Dataset};
use crate::scaling::{self, ScalingParams};

/// Hyperparameters of one train/evaluate run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub train_percent: f64,
    pub learning_rate: f64,
    pub epsilon: f64,
    pub max_iterations: usize,
    pub initialization: InitMethod,
}

/// Everything produced by a run, kept for reporting
pub struct Evaluation {
    pub train: Dataset,
    pub test: Dataset,
    pub scaled_train: Array2<f64>,
    pub scaling: ScalingParams,
    pub model: LogisticRegression,
    pub outcome: TrainOutcome,
    pub predictions: Array1<f64>,
    pub confusion_matrix: ConfusionMatrix,
    pub metrics: Metrics,
}

impl Evaluation {
    /// Scale unseen features with the training statistics and classify them
    pub fn classify(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        let scaled = scaling::transform(&features.view(), &self.scaling)?;

        self.model.predict(&scaled.view())
    }
}

/// Split, scale, train and evaluate.
/// `rng` drives the shuffle and, for `InitMethod::Uniform`, the initial weights
pub fn train_and_evaluate<R: Rng + ?Sized>(
    dataset: &Dataset,
    config: &PipelineConfig,
    rng: &mut R,
) -> Result<Evaluation> {
    let (train, test) = split(dataset, config.train_percent, rng)?;
    tracing::info!(train = train.len(), test = test.len(), "split dataset");

    let (scaled_train, scaling) = scaling::fit_transform(&train.data.view())?;
    let scaled_test = scaling::transform(&test.data.view(), &scaling)?;

    let initial_weights = init_weights(train.num_features(), config.initialization, rng);
    let mut model = LogisticRegression::new(
        initial_weights,
        config.learning_rate,
        config.epsilon,
        config.max_iterations,
    );
    let outcome = model.fit(&Dataset::new(scaled_train.clone(), train.target.clone())?)?;

    let predictions = model.predict(&scaled_test.view())?;
    let confusion_matrix =
        ConfusionMatrix::from_predictions(&predictions.view(), &test.target.view())?;
    let metrics = confusion_matrix.metrics();

    let non_finite = metrics.non_finite();
    if !non_finite.is_empty() {
        tracing::warn!(scores = ?non_finite, "some scores are undefined for this test set");
    }

    Ok(Evaluation {
        train,
        test,
        scaled_train,
        scaling,
        model,
        outcome,
        predictions,
        confusion_matrix,
        metrics,
    })
}
