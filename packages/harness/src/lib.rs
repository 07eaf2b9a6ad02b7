//! Accuracy harness for the brain tumor prediction service.
//!
//! Lists the labeled sample bucket, sends every sample's public URL to the
//! prediction endpoint in fixed-size batches and scores the answers against
//! the class implied by each key's folder.
//!
//! ```rust,ignore
//! use brain_tumor_harness::{evaluate, HarnessSettings, HttpPredictor, S3Lister, StorageSettings};
//!
//! let lister = S3Lister::from_settings(&StorageSettings::default()).await;
//! let predictor = HttpPredictor::new("http://0.0.0.0:8000", None);
//! let report = evaluate(&lister, &predictor, &HarnessSettings::default()).await?;
//! println!("Accuracy: {}", report.combined_accuracy);
//! ```

pub mod batch;
pub mod error;
pub mod evaluate;
pub mod prediction;
pub mod score;
pub mod storage;

pub use batch::{DEFAULT_BATCH_SIZE, batches, predict_batched, public_url};
pub use error::{HarnessError, HarnessResult, PredictionError};
pub use evaluate::{HarnessSettings, evaluate, evaluate_class};
pub use prediction::{HttpPredictor, PredictUrlRequest, PredictionOutcome, PredictionResult, Predictor};
pub use score::{ClassReport, EvaluationReport, FailedPrediction, accuracy};
pub use storage::{ListPage, ObjectLister, S3Lister, StorageSettings, list_all_keys, partition_by_prefix};
