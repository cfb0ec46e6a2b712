use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{ensure_len, Error, Result};

/// Per-column statistics learned from the training features
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingParams {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl ScalingParams {
    /// Population mean and standard deviation of every column
    pub fn fit(features: &ArrayView2<f64>) -> Result<ScalingParams> {
        let mean = features
            .mean_axis(Axis(0))
            .ok_or(Error::EmptyDataset("cannot compute scaling statistics"))?;
        let std = features.std_axis(Axis(0), 0.0);

        for (col, s) in std.iter().enumerate() {
            if *s == 0.0 {
                tracing::warn!(
                    column = col,
                    "feature has zero variance, scaled values will not be finite"
                );
            }
        }

        Ok(ScalingParams { mean, std })
    }

    pub fn num_features(&self) -> usize {
        self.mean.len()
    }
}

/// Standardize the training features. Returns the scaled matrix together with
/// the statistics needed to scale any later data the same way
pub fn fit_transform(features: &ArrayView2<f64>) -> Result<(Array2<f64>, ScalingParams)> {
    let params = ScalingParams::fit(features)?;
    let scaled = transform(features, &params)?;

    Ok((scaled, params))
}

/// Scale features with statistics computed elsewhere (normally the training set)
pub fn transform(features: &ArrayView2<f64>, params: &ScalingParams) -> Result<Array2<f64>> {
    ensure_len("scaled feature columns", params.num_features(), features.ncols())?;

    Ok((features - &params.mean) / &params.std)
}
