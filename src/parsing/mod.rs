use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{ensure_len, Error, Result};

pub mod tabular;

/// Feature rows paired with their binary labels
#[derive(Debug, Clone)]
pub struct Dataset {
    pub data: Array2<f64>,
    pub target: Array1<f64>,
}

impl Dataset {
    /// Pair a feature matrix with its labels, one label per row
    pub fn new(data: Array2<f64>, target: Array1<f64>) -> Result<Dataset> {
        ensure_len("dataset labels", data.nrows(), target.len())?;

        Ok(Dataset { data, target })
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_features(&self) -> usize {
        self.data.ncols()
    }

    /// Copy the given rows, in the given order, into a new dataset
    fn take_rows(&self, indices: &[usize]) -> Dataset {
        let data = Array2::from_shape_fn((indices.len(), self.num_features()), |(row, col)| {
            self.data[[indices[row], col]]
        });
        let target = indices.iter().map(|&idx| self.target[idx]).collect();

        Dataset { data, target }
    }
}

/// Shuffle the rows and split them into a training and a testing set.
/// `train_percent` (0 to 100) of the rows, rounded down, go to the training set
pub fn split<R: Rng + ?Sized>(
    dataset: &Dataset,
    train_percent: f64,
    rng: &mut R,
) -> Result<(Dataset, Dataset)> {
    if !(0.0..=100.0).contains(&train_percent) {
        return Err(Error::InvalidHyperparameter {
            name: "train percent",
            value: train_percent,
        });
    }

    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    indices.shuffle(rng);

    let splitting_point = (dataset.len() as f64 * train_percent / 100.0).floor() as usize;
    let (train_indices, test_indices) = indices.split_at(splitting_point);

    Ok((
        dataset.take_rows(train_indices),
        dataset.take_rows(test_indices),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn numbered_dataset(rows: usize) -> Dataset {
        // Row i holds (i, 10 * i) and label i % 2, so rows can be traced after shuffling
        let data = Array::from_shape_fn((rows, 2), |(r, c)| (r * (1 + 9 * c)) as f64);
        let target = (0..rows).map(|r| (r % 2) as f64).collect();

        Dataset::new(data, target).unwrap()
    }

    #[test]
    fn split_sizes_round_down() {
        let mut rng = StdRng::seed_from_u64(7);

        for rows in [0, 1, 7, 10, 33] {
            for percent in [0.0, 25.0, 50.0, 70.0, 80.0, 99.0, 100.0] {
                let dataset = numbered_dataset(rows);
                let (train, test) = split(&dataset, percent, &mut rng).unwrap();
                let expected = (rows as f64 * percent / 100.0).floor() as usize;

                assert_eq!(train.len(), expected, "rows={rows} percent={percent}");
                assert_eq!(test.len(), rows - expected, "rows={rows} percent={percent}");
            }
        }
    }

    #[test]
    fn split_keeps_rows_and_labels_together() {
        let dataset = numbered_dataset(20);
        let mut rng = StdRng::seed_from_u64(1);
        let (train, test) = split(&dataset, 60.0, &mut rng).unwrap();

        let mut seen = vec![];
        for part in [&train, &test] {
            for (row, label) in part.data.rows().into_iter().zip(part.target.iter()) {
                let original = row[0] as usize;
                assert_eq!(row[1], 10.0 * row[0]);
                assert_eq!(*label, (original % 2) as f64);
                seen.push(original);
            }
        }

        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_reproducible_for_a_seed() {
        let dataset = numbered_dataset(50);
        let (first, _) = split(&dataset, 50.0, &mut StdRng::seed_from_u64(42)).unwrap();
        let (second, _) = split(&dataset, 50.0, &mut StdRng::seed_from_u64(42)).unwrap();

        assert_eq!(first.data, second.data);
        assert_eq!(first.target, second.target);
    }

    #[test]
    fn split_rejects_out_of_range_percent() {
        let dataset = numbered_dataset(4);
        let mut rng = StdRng::seed_from_u64(0);

        for percent in [-1.0, 100.5, f64::NAN] {
            assert!(matches!(
                split(&dataset, percent, &mut rng),
                Err(Error::InvalidHyperparameter { .. })
            ));
        }
    }

    #[test]
    fn new_rejects_label_count_mismatch() {
        let result = Dataset::new(array![[1.0], [2.0]], array![1.0]);

        assert!(matches!(
            result,
            Err(Error::ShapeMismatch {
                expected: 2,
                got: 1,
                ..
            })
        ));
    }
}
