use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use rand::distributions::Distribution;
use rand::Rng;

use super::Model;
use crate::error::{ensure_len, Error, Result};
use crate::parsing::Dataset;

/// How often the training loop reports progress at debug level
const LOG_EVERY: usize = 10_000;

/// Probability at or above which an instance is assigned the positive class
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitMethod {
    Zeros,
    Uniform,
}

/// Build the initial weight vector for `num_features` features plus the bias
pub fn init_weights<R: Rng + ?Sized>(
    num_features: usize,
    method: InitMethod,
    rng: &mut R,
) -> Array1<f64> {
    match method {
        InitMethod::Zeros => Array1::zeros(num_features + 1),
        InitMethod::Uniform => {
            let distribution = rand::distributions::Uniform::new(-0.3, 0.3);
            Array1::from_shape_fn(num_features + 1, |_| distribution.sample(rng))
        }
    }
}

pub fn sigmoid(z: f64) -> f64 {
    (1f64 + (-z).exp()).recip()
}

/// Prepend a column of ones so the first weight acts as the intercept
pub fn add_bias_column(features: &ArrayView2<f64>) -> Array2<f64> {
    let mut augmented = Array2::ones((features.nrows(), features.ncols() + 1));
    augmented.slice_mut(s![.., 1..]).assign(features);

    augmented
}

/// Logistic response of every row of `features` (bias column included)
pub fn hypothesis(weights: &ArrayView1<f64>, features: &ArrayView2<f64>) -> Result<Array1<f64>> {
    ensure_len("hypothesis weights", features.ncols(), weights.len())?;

    Ok(features.dot(weights).mapv_into(sigmoid))
}

/// Gradient of the mean cross-entropy cost: X^T (h - y) / n
pub fn gradient(
    hypothesis: &ArrayView1<f64>,
    features: &ArrayView2<f64>,
    labels: &ArrayView1<f64>,
) -> Result<Array1<f64>> {
    ensure_len("gradient hypothesis", features.nrows(), hypothesis.len())?;
    ensure_len("gradient labels", features.nrows(), labels.len())?;

    let error = hypothesis - labels;
    let n = features.nrows() as f64;

    Ok(features.t().dot(&error) / n)
}

pub fn l2_norm(vector: &ArrayView1<f64>) -> f64 {
    vector.dot(vector).sqrt()
}

/// Classify every row of `features` (no bias column) as 0 or 1
pub fn predict(weights: &ArrayView1<f64>, features: &ArrayView2<f64>) -> Result<Array1<f64>> {
    let augmented = add_bias_column(features);
    let probabilities = hypothesis(weights, &augmented.view())?;

    Ok(probabilities.mapv_into(|p| if p >= DECISION_THRESHOLD { 1f64 } else { 0f64 }))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainerState {
    Initialized,
    Iterating,
    Converged,
}

/// Result of a training run
#[derive(Clone, Debug, PartialEq)]
pub enum TrainOutcome {
    /// The gradient norm dropped below the threshold
    Converged {
        weights: Array1<f64>,
        iterations: usize,
        gradient_norm: f64,
    },
    /// The iteration cap was hit first. Holds the weights with the smallest gradient norm seen
    MaxIterationsExceeded {
        weights: Array1<f64>,
        iterations: usize,
        gradient_norm: f64,
    },
}

impl TrainOutcome {
    pub fn weights(&self) -> &Array1<f64> {
        match self {
            TrainOutcome::Converged { weights, .. } => weights,
            TrainOutcome::MaxIterationsExceeded { weights, .. } => weights,
        }
    }

    pub fn iterations(&self) -> usize {
        match self {
            TrainOutcome::Converged { iterations, .. } => *iterations,
            TrainOutcome::MaxIterationsExceeded { iterations, .. } => *iterations,
        }
    }

    pub fn gradient_norm(&self) -> f64 {
        match self {
            TrainOutcome::Converged { gradient_norm, .. } => *gradient_norm,
            TrainOutcome::MaxIterationsExceeded { gradient_norm, .. } => *gradient_norm,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, TrainOutcome::Converged { .. })
    }
}

/// Batch gradient descent over a fixed training set
pub struct GradientDescent {
    features: Array2<f64>, // Training features with the bias column prepended
    labels: Array1<f64>,
    weights: Array1<f64>,
    learning_rate: f64,
    threshold: f64,
    state: TrainerState,
    iteration: usize,
    last_norm: f64,
    best: Option<(f64, Array1<f64>)>, // Smallest gradient norm seen and the weights it was taken at
    history: Vec<(usize, f64)>,
}

fn positive_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidHyperparameter { name, value })
    }
}

impl GradientDescent {
    /// Set up training on `features` (no bias column) and their labels.
    /// `initial_weights` holds the bias followed by one weight per feature
    pub fn new(
        features: &ArrayView2<f64>,
        labels: &ArrayView1<f64>,
        initial_weights: Array1<f64>,
        learning_rate: f64,
        threshold: f64,
    ) -> Result<GradientDescent> {
        positive_finite("learning rate", learning_rate)?;
        positive_finite("stopping threshold", threshold)?;
        if features.nrows() == 0 {
            return Err(Error::EmptyDataset("no training rows"));
        }
        ensure_len("training labels", features.nrows(), labels.len())?;
        ensure_len("initial weights", features.ncols() + 1, initial_weights.len())?;

        Ok(GradientDescent {
            features: add_bias_column(features),
            labels: labels.to_owned(),
            weights: initial_weights,
            learning_rate,
            threshold,
            state: TrainerState::Initialized,
            iteration: 0,
            last_norm: f64::NAN,
            best: None,
            history: vec![],
        })
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn weights(&self) -> ArrayView1<f64> {
        self.weights.view()
    }

    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Gradient norm of every iteration so far, as (iteration, norm)
    pub fn history(&self) -> &[(usize, f64)] {
        &self.history
    }

    /// Perform one descent step and return the gradient norm it was based on.
    /// Once converged the weights are frozen and the last norm is returned
    pub fn step(&mut self) -> Result<f64> {
        if self.state == TrainerState::Converged {
            return Ok(self.last_norm);
        }
        self.state = TrainerState::Iterating;

        let hypothesis = hypothesis(&self.weights.view(), &self.features.view())?;
        let gradient = gradient(
            &hypothesis.view(),
            &self.features.view(),
            &self.labels.view(),
        )?;
        let norm = l2_norm(&gradient.view());

        let improved = match &self.best {
            Some((best_norm, _)) => norm < *best_norm || best_norm.is_nan(),
            None => true,
        };
        if improved {
            self.best = Some((norm, self.weights.clone()));
        }

        self.weights.scaled_add(-self.learning_rate, &gradient);
        self.iteration += 1;
        self.last_norm = norm;
        self.history.push((self.iteration, norm));

        if norm < self.threshold {
            self.state = TrainerState::Converged;
        }

        Ok(norm)
    }

    /// Step until convergence, or until `max_iterations` steps have been taken in total
    pub fn run(&mut self, max_iterations: usize) -> Result<TrainOutcome> {
        if max_iterations == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "max iterations",
                value: 0.0,
            });
        }

        while self.state != TrainerState::Converged && self.iteration < max_iterations {
            let norm = self.step()?;

            if self.iteration % LOG_EVERY == 0 {
                tracing::debug!(iteration = self.iteration, gradient_norm = norm, "training");
            }
        }

        if self.state == TrainerState::Converged {
            tracing::info!(
                iterations = self.iteration,
                gradient_norm = self.last_norm,
                "gradient descent converged"
            );

            return Ok(TrainOutcome::Converged {
                weights: self.weights.clone(),
                iterations: self.iteration,
                gradient_norm: self.last_norm,
            });
        }

        let (gradient_norm, weights) = self
            .best
            .clone()
            .unwrap_or_else(|| (self.last_norm, self.weights.clone()));
        tracing::warn!(
            iterations = self.iteration,
            gradient_norm,
            threshold = self.threshold,
            "gradient descent stopped before converging"
        );

        Ok(TrainOutcome::MaxIterationsExceeded {
            weights,
            iterations: self.iteration,
            gradient_norm,
        })
    }
}

/// Binary logistic regression classifier
pub struct LogisticRegression {
    pub weights: Array1<f64>, // Bias first, then one weight per feature
    pub learning_rate: f64,
    pub epsilon: f64,
    pub max_iterations: usize,
    pub history: Vec<(usize, f64)>,
}

impl LogisticRegression {
    /// Construct an untrained classifier that will start descending from `initial_weights`
    pub fn new(
        initial_weights: Array1<f64>,
        learning_rate: f64,
        epsilon: f64,
        max_iterations: usize,
    ) -> LogisticRegression {
        LogisticRegression {
            weights: initial_weights,
            learning_rate,
            epsilon,
            max_iterations,
            history: vec![],
        }
    }
}

impl Model for LogisticRegression {
    /// Fit the weights to the dataset
    /// The gradient norm of every iteration is kept in `history`
    fn fit(&mut self, dataset: &Dataset) -> Result<TrainOutcome> {
        let mut trainer = GradientDescent::new(
            &dataset.data.view(),
            &dataset.target.view(),
            self.weights.clone(),
            self.learning_rate,
            self.epsilon,
        )?;

        let outcome = trainer.run(self.max_iterations)?;
        self.history = trainer.history;
        self.weights = outcome.weights().clone();

        Ok(outcome)
    }

    fn predict(&self, inputs: &ArrayView2<f64>) -> Result<Array1<f64>> {
        predict(&self.weights.view(), inputs)
    }
}
