use super::Dataset;
use crate::error::{Error, Result};
use csv::{ReaderBuilder, Trim};
use ndarray::{Array, Array2, ArrayView};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read every record of a headered CSV as a row of floats.
/// Returns the number of header columns and the rows
fn read_rows<R: Read>(reader: R) -> Result<(usize, Vec<Vec<f64>>)> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let num_columns = reader.headers()?.len();
    let mut rows = vec![];

    // Records of a different width than the header are rejected by the reader itself
    for record in reader.records() {
        let row: Vec<f64> = record?.deserialize(None)?;
        rows.push(row);
    }

    Ok((num_columns, rows))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a labeled dataset. The last column holds the label, the rest are features
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let (num_columns, rows) = read_rows(reader)?;
    if num_columns < 2 {
        return Err(Error::MissingColumns {
            expected: 2,
            got: num_columns,
        });
    }

    let num_features = num_columns - 1;
    let mut data = Array::zeros((0, num_features));
    let mut target = Vec::with_capacity(rows.len());

    for row in rows {
        data.push_row(ArrayView::from(&row[..num_features]))?;
        target.push(row[num_features]);
    }

    Dataset::new(data, Array::from(target))
}

/// Parse an unlabeled dataset where every column is a feature
pub fn read_features<R: Read>(reader: R) -> Result<Array2<f64>> {
    let (num_columns, rows) = read_rows(reader)?;
    if num_columns < 1 {
        return Err(Error::MissingColumns {
            expected: 1,
            got: num_columns,
        });
    }

    let mut data = Array::zeros((0, num_columns));
    for row in rows {
        data.push_row(ArrayView::from(&row))?;
    }

    Ok(data)
}

/// Load a labeled CSV file
pub fn parse_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let dataset = read_dataset(open(path.as_ref())?)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        rows = dataset.len(),
        features = dataset.num_features(),
        "loaded labeled dataset"
    );

    Ok(dataset)
}

/// Load an unlabeled CSV file
pub fn parse_features(path: impl AsRef<Path>) -> Result<Array2<f64>> {
    let data = read_features(open(path.as_ref())?)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        rows = data.nrows(),
        features = data.ncols(),
        "loaded unlabeled dataset"
    );

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn splits_label_from_features() {
        let csv = "glucose,bmi,outcome\n148, 33.6, 1\n85,26.6,0\n183,23.3,1\n";
        let dataset = read_dataset(csv.as_bytes()).unwrap();

        assert_eq!(
            dataset.data,
            array![[148.0, 33.6], [85.0, 26.6], [183.0, 23.3]]
        );
        assert_eq!(dataset.target, array![1.0, 0.0, 1.0]);
    }

    #[test]
    fn header_only_gives_empty_dataset() {
        let dataset = read_dataset("a,b,y\n".as_bytes()).unwrap();

        assert!(dataset.is_empty());
        assert_eq!(dataset.num_features(), 2);
    }

    #[test]
    fn unlabeled_rows_keep_every_column() {
        let data = read_features("a,b\n1,2\n3,4\n".as_bytes()).unwrap();

        assert_eq!(data, array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn rejects_ragged_rows() {
        let result = read_dataset("a,b,y\n1,2,0\n1,2\n".as_bytes());

        assert!(matches!(result, Err(Error::Csv(_))));
    }

    #[test]
    fn rejects_non_numeric_fields() {
        let result = read_dataset("a,y\nabc,1\n".as_bytes());

        assert!(matches!(result, Err(Error::Csv(_))));
    }

    #[test]
    fn labeled_data_needs_two_columns() {
        let result = read_dataset("y\n1\n".as_bytes());

        assert!(matches!(
            result,
            Err(Error::MissingColumns {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = parse_dataset("does/not/exist.csv");

        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
