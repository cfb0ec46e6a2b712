use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_logreg::model::logistic::InitMethod;
use rust_logreg::parsing::tabular;
use rust_logreg::pipeline::{self, PipelineConfig};
use rust_logreg::{logging, report, Result};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The path of the labeled dataset. The label is the last column
    #[arg(short, long)]
    data_path: String,

    /// Percentage of the rows used for training, the rest is used for testing
    #[arg(short, long, default_value_t = 80.0, value_parser = parse_percent)]
    split: f64,

    /// Learning rate of gradient descent
    #[arg(short, long, default_value_t = 0.01, value_parser = parse_positive)]
    learning_rate: f64,

    /// Training stops once the L2 norm of the gradient is below this value
    #[arg(short, long, default_value_t = 0.001, value_parser = parse_positive)]
    epsilon: f64,

    /// Give up after this many iterations if the gradient norm is still too large
    #[arg(short, long, default_value_t = 1_000_000)]
    max_iterations: usize,

    /// Weight initialization method
    #[arg(short, long, value_enum, default_value_t = InitMethod::Zeros)]
    initialization: InitMethod,

    /// Seed for shuffling and weight initialization
    #[arg(long, default_value = None)]
    seed: Option<u64>,

    /// Print the training data before and after scaling
    #[arg(long)]
    show_data: bool,

    /// Debug mode (save the gradient norm of every iteration as CSV)
    #[arg(long, default_value = None)]
    debug_path: Option<String>,

    /// Export the weights, confusion matrix and scores in JSON format
    #[arg(long, default_value = None)]
    report_path: Option<String>,

    /// Unlabeled dataset to classify with the trained model
    #[arg(long, default_value = None)]
    predict_path: Option<String>,

    /// Name of class 1 in the confusion matrix
    #[arg(long, default_value = "positive")]
    positive_name: String,

    /// Name of class 0 in the confusion matrix
    #[arg(long, default_value = "negative")]
    negative_name: String,
}

fn parse_percent(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not between 0 and 100"))
    }
}

fn parse_positive(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be a positive number"))
    }
}

fn run(args: Args) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let dataset = tabular::parse_dataset(&args.data_path)?;
    let config = PipelineConfig {
        train_percent: args.split,
        learning_rate: args.learning_rate,
        epsilon: args.epsilon,
        max_iterations: args.max_iterations,
        initialization: args.initialization,
    };

    let evaluation = pipeline::train_and_evaluate(&dataset, &config, &mut rng)?;

    if args.show_data {
        let train = &evaluation.train;
        print!(
            "{}",
            report::format_rows(
                "Training data and labels",
                &train.data.view(),
                Some(&train.target.view())
            )
        );
        print!(
            "{}",
            report::format_rows("Scaled training data", &evaluation.scaled_train.view(), None)
        );
    }

    println!("Weights: {}", evaluation.outcome.weights());
    if !evaluation.outcome.is_converged() {
        println!(
            "Did not converge after {} iterations (gradient norm {})",
            evaluation.outcome.iterations(),
            evaluation.outcome.gradient_norm()
        );
    }
    print!(
        "{}",
        report::format_report(
            &evaluation.confusion_matrix,
            &evaluation.metrics,
            &args.positive_name,
            &args.negative_name
        )
    );

    if let Some(debug_path) = args.debug_path {
        report::write_history_file(&debug_path, &evaluation.model.history)?;
    }

    if let Some(report_path) = args.report_path {
        report::write_report_file(
            &report_path,
            &evaluation.outcome,
            &evaluation.confusion_matrix,
            &evaluation.metrics,
        )?;
    }

    if let Some(predict_path) = args.predict_path {
        let features = tabular::parse_features(&predict_path)?;
        let predictions = evaluation.classify(&features)?;
        print!(
            "{}",
            report::format_rows("Predictions", &features.view(), Some(&predictions.view()))
        );
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(err) = logging::init() {
        eprintln!("{err}");
    }

    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
