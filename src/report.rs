use json::object;
use ndarray::{ArrayView1, ArrayView2};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::metrics::{ConfusionMatrix, Metrics};
use crate::model::TrainOutcome;

const CELL_WIDTH: usize = 36;
const RULE_WIDTH: usize = 120;

/// One line of the convergence trace
#[derive(Serialize)]
struct HistoryRecord {
    iteration: usize,
    gradient_norm: f64,
}

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

fn table_row(out: &mut String, cells: [&str; 3]) {
    let _ = writeln!(
        out,
        "| {:>w$} | {:>w$} | {:>w$} |",
        cells[0],
        cells[1],
        cells[2],
        w = CELL_WIDTH
    );
    let _ = writeln!(out, "{}", rule());
}

/// Render the confusion matrix and the scores as a console table
pub fn format_report(
    matrix: &ConfusionMatrix,
    metrics: &Metrics,
    positive_name: &str,
    negative_name: &str,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}\nConfusion matrix\n{}", rule(), rule());
    table_row(
        &mut out,
        [
            "",
            &format!("Actual {positive_name} (1)"),
            &format!("Actual {negative_name} (0)"),
        ],
    );
    table_row(
        &mut out,
        [
            &format!("Predicted {positive_name} (1)"),
            &matrix.true_positive.to_string(),
            &matrix.false_positive.to_string(),
        ],
    );
    table_row(
        &mut out,
        [
            &format!("Predicted {negative_name} (0)"),
            &matrix.false_negative.to_string(),
            &matrix.true_negative.to_string(),
        ],
    );

    let _ = writeln!(out, "\n{}\nPerformance metrics\n{}", rule(), rule());
    let _ = writeln!(out, "Accuracy: {}", metrics.accuracy);
    let _ = writeln!(out, "Precision: {}", metrics.precision);
    let _ = writeln!(out, "Recall: {}", metrics.recall);
    let _ = writeln!(out, "Specificity: {}", metrics.specificity);
    let _ = writeln!(out, "F1 Score: {}", metrics.f1);

    out
}

/// Render a matrix one row per line, each followed by its label when given
pub fn format_rows(
    title: &str,
    data: &ArrayView2<f64>,
    labels: Option<&ArrayView1<f64>>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n{}\n{}", rule(), title, rule());

    for (idx, row) in data.rows().into_iter().enumerate() {
        let values: Vec<String> = row.iter().map(|x| x.to_string()).collect();
        match labels {
            Some(labels) => {
                let _ = writeln!(out, "[{}] {}", values.join(", "), labels[idx]);
            }
            None => {
                let _ = writeln!(out, "[{}]", values.join(", "));
            }
        }
    }

    out
}

/// Write the gradient norm history as CSV with an `iteration,gradient_norm` header
pub fn write_history<W: Write>(writer: W, history: &[(usize, f64)]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    for &(iteration, gradient_norm) in history {
        writer.serialize(HistoryRecord {
            iteration,
            gradient_norm,
        })?;
    }
    writer.flush().map_err(|err| Error::Report(err.to_string()))?;

    Ok(())
}

/// Build the JSON report: training outcome, confusion matrix and scores.
/// Non-finite scores are written as null
pub fn report_json(
    outcome: &TrainOutcome,
    matrix: &ConfusionMatrix,
    metrics: &Metrics,
) -> json::JsonValue {
    let weights: Vec<f64> = outcome.weights().to_vec();
    let mut data = object! {};
    let mut counts = object! {};
    let mut scores = object! {};

    data["converged"] = outcome.is_converged().into();
    data["iterations"] = outcome.iterations().into();
    data["gradient_norm"] = outcome.gradient_norm().into();
    data["weights"] = weights.into();

    counts["true_positive"] = matrix.true_positive.into();
    counts["true_negative"] = matrix.true_negative.into();
    counts["false_positive"] = matrix.false_positive.into();
    counts["false_negative"] = matrix.false_negative.into();
    data["confusion_matrix"] = counts;

    for (name, value) in [
        ("accuracy", metrics.accuracy),
        ("precision", metrics.precision),
        ("recall", metrics.recall),
        ("specificity", metrics.specificity),
        ("f1", metrics.f1),
    ] {
        scores[name] = value.into();
    }
    data["metrics"] = scores;

    data
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_history_file(path: impl AsRef<Path>, history: &[(usize, f64)]) -> Result<()> {
    write_history(create(path.as_ref())?, history)
}

pub fn write_report_file(
    path: impl AsRef<Path>,
    outcome: &TrainOutcome,
    matrix: &ConfusionMatrix,
    metrics: &Metrics,
) -> Result<()> {
    let mut file = create(path.as_ref())?;
    let report = report_json(outcome, matrix, metrics);

    file.write_all(report.pretty(2).as_bytes())
        .map_err(|err| Error::Report(err.to_string()))
}
