use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_logreg::model::logistic::InitMethod;
use rust_logreg::parsing::tabular;
use rust_logreg::pipeline::{train_and_evaluate, PipelineConfig};
use rust_logreg::report;
use std::io::Write;
use tempfile::NamedTempFile;

/// 40 rows: class 0 has x1 in 0..20, class 1 has x1 in 40..60, x2 is noise
fn write_training_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "x1,x2,label").unwrap();

    for i in 0..40 {
        let (x1, label) = if i < 20 { (i, 0) } else { (i + 20, 1) };
        writeln!(file, "{},{},{}", x1, (i * 7) % 11, label).unwrap();
    }

    file
}

fn config() -> PipelineConfig {
    PipelineConfig {
        train_percent: 75.0,
        learning_rate: 0.1,
        epsilon: 1e-3,
        max_iterations: 200_000,
        initialization: InitMethod::Zeros,
    }
}

#[test]
fn trains_and_evaluates_from_csv() {
    let file = write_training_csv();
    let dataset = tabular::parse_dataset(file.path()).unwrap();
    assert_eq!(dataset.len(), 40);
    assert_eq!(dataset.num_features(), 2);

    let mut rng = StdRng::seed_from_u64(2020);
    let evaluation = train_and_evaluate(&dataset, &config(), &mut rng).unwrap();

    assert_eq!(evaluation.train.len(), 30);
    assert_eq!(evaluation.test.len(), 10);
    assert!(evaluation.outcome.is_converged());
    assert_eq!(evaluation.outcome.weights().len(), 3);
    assert_eq!(evaluation.predictions.len(), 10);

    assert_eq!(evaluation.confusion_matrix.total(), 10);
    assert_eq!(evaluation.metrics.accuracy, 1.0);
    assert_eq!(evaluation.model.history.len(), evaluation.outcome.iterations());
}

#[test]
fn same_seed_same_result() {
    let file = write_training_csv();
    let dataset = tabular::parse_dataset(file.path()).unwrap();

    let first = train_and_evaluate(&dataset, &config(), &mut StdRng::seed_from_u64(9)).unwrap();
    let second = train_and_evaluate(&dataset, &config(), &mut StdRng::seed_from_u64(9)).unwrap();

    assert_eq!(first.train.data, second.train.data);
    assert_eq!(first.outcome, second.outcome);
    assert_eq!(first.confusion_matrix, second.confusion_matrix);
}

#[test]
fn test_rows_are_scaled_with_training_statistics() {
    let file = write_training_csv();
    let dataset = tabular::parse_dataset(file.path()).unwrap();
    let evaluation = train_and_evaluate(&dataset, &config(), &mut StdRng::seed_from_u64(1)).unwrap();

    let mean = evaluation.train.data.mean_axis(ndarray::Axis(0)).unwrap();
    assert_eq!(evaluation.scaling.mean, mean);

    let mut unlabeled = NamedTempFile::new().unwrap();
    writeln!(unlabeled, "x1,x2\n5,3\n55,3\n12,9\n47,0").unwrap();
    let features = tabular::parse_features(unlabeled.path()).unwrap();

    let predictions = evaluation.classify(&features).unwrap();
    assert_eq!(predictions, array![0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn iteration_cap_is_reported_not_fatal() {
    let file = write_training_csv();
    let dataset = tabular::parse_dataset(file.path()).unwrap();
    let config = PipelineConfig {
        max_iterations: 5,
        initialization: InitMethod::Uniform,
        ..config()
    };

    let evaluation = train_and_evaluate(&dataset, &config, &mut StdRng::seed_from_u64(3)).unwrap();

    assert!(!evaluation.outcome.is_converged());
    assert_eq!(evaluation.outcome.iterations(), 5);
    assert_eq!(evaluation.confusion_matrix.total(), 10);
}

#[test]
fn writes_history_and_json_report() {
    let file = write_training_csv();
    let dataset = tabular::parse_dataset(file.path()).unwrap();
    let evaluation = train_and_evaluate(&dataset, &config(), &mut StdRng::seed_from_u64(4)).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let history_path = dir.path().join("norms.csv");
    report::write_history_file(&history_path, &evaluation.model.history).unwrap();
    let history = std::fs::read_to_string(&history_path).unwrap();
    assert!(history.starts_with("iteration,gradient_norm\n1,"));
    assert_eq!(history.lines().count(), evaluation.outcome.iterations() + 1);

    let report_path = dir.path().join("report.json");
    report::write_report_file(
        &report_path,
        &evaluation.outcome,
        &evaluation.confusion_matrix,
        &evaluation.metrics,
    )
    .unwrap();
    let parsed = json::parse(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(parsed["converged"].as_bool(), Some(true));
    assert_eq!(parsed["weights"].len(), 3);
    assert_eq!(parsed["metrics"]["accuracy"].as_f64(), Some(1.0));
}
