use ndarray::{Array1, ArrayView2};

use crate::error::Result;
use crate::parsing::Dataset;

pub mod logistic;

pub use logistic::TrainOutcome;

pub trait Model {
    fn fit(&mut self, dataset: &Dataset) -> Result<TrainOutcome>;
    fn predict(&self, inputs: &ArrayView2<f64>) -> Result<Array1<f64>>;
}
