//! Evaluation report and test set IO

mod report;

pub use report::{load_test_set, EvaluationReport};
