//! Accuracy figures computed from prediction outcomes.
//!
//! Accuracy over zero samples is `NaN` (0 / 0) and is left that way; a class
//! with no samples makes the combined score `NaN` as well. JSON output
//! renders `NaN` as `null`.

use crate::prediction::PredictionOutcome;
use brain_tumor::TumorClass;
use serde::Serialize;
use std::collections::BTreeMap;

/// Percentage of `classifications` equal to `target`.
pub fn accuracy(classifications: &[i64], target: i64) -> f64 {
    let matching = classifications.iter().filter(|&&c| c == target).count();
    matching as f64 / classifications.len() as f64 * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedPrediction {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReport {
    pub class: TumorClass,
    /// Samples found under the class folder.
    pub samples: usize,
    /// Samples the service answered.
    pub predicted: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub mean_confidence: Option<f64>,
    /// How the answered samples were classified.
    pub confusion: BTreeMap<TumorClass, usize>,
    /// Answers with a classification outside the known codes.
    pub unknown: usize,
    pub failures: Vec<FailedPrediction>,
}

impl ClassReport {
    pub fn from_outcomes(class: TumorClass, outcomes: &[PredictionOutcome]) -> Self {
        let mut classifications = Vec::with_capacity(outcomes.len());
        let mut confidences = Vec::new();
        let mut confusion = BTreeMap::new();
        let mut unknown = 0;
        let mut failures = Vec::new();

        for outcome in outcomes {
            match outcome {
                PredictionOutcome::Predicted { result, .. } => {
                    classifications.push(result.classification);
                    confidences.extend(result.confidence);
                    match result.class() {
                        Some(predicted) => *confusion.entry(predicted).or_insert(0) += 1,
                        None => unknown += 1,
                    }
                }
                PredictionOutcome::Failed { url, error } => failures.push(FailedPrediction {
                    url: url.clone(),
                    error: error.to_string(),
                }),
            }
        }

        let mean_confidence = (!confidences.is_empty())
            .then(|| confidences.iter().sum::<f64>() / confidences.len() as f64);

        Self {
            class,
            samples: outcomes.len(),
            predicted: classifications.len(),
            correct: confusion.get(&class).copied().unwrap_or(0),
            accuracy: accuracy(&classifications, class.code()),
            mean_confidence,
            confusion,
            unknown,
            failures,
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Every key in the bucket, including ones outside the class folders.
    pub total_keys: usize,
    pub classes: Vec<ClassReport>,
    /// Unweighted mean of the per-class accuracies.
    pub combined_accuracy: f64,
}

impl EvaluationReport {
    pub fn new(total_keys: usize, classes: Vec<ClassReport>) -> Self {
        let combined_accuracy =
            classes.iter().map(|c| c.accuracy).sum::<f64>() / classes.len() as f64;
        Self {
            total_keys,
            classes,
            combined_accuracy,
        }
    }

    pub fn class(&self, class: TumorClass) -> Option<&ClassReport> {
        self.classes.iter().find(|report| report.class == class)
    }

    pub fn predicted(&self) -> usize {
        self.classes.iter().map(|c| c.predicted).sum()
    }

    pub fn failed(&self) -> usize {
        self.classes.iter().map(ClassReport::failed).sum()
    }
}
