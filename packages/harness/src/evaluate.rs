use crate::batch::{DEFAULT_BATCH_SIZE, predict_batched, public_url};
use crate::error::{HarnessError, HarnessResult};
use crate::prediction::Predictor;
use crate::score::{ClassReport, EvaluationReport};
use crate::storage::{ObjectLister, list_all_keys, partition_by_prefix};
use brain_tumor::{ConfigError, ConfigResult, TumorClass};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

pub const DEFAULT_BUCKET: &str = "detect-brain-tumor";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://www.brain-tumor-static.nbaron.com/";

/// Settings of one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessSettings {
    pub bucket: String,
    /// Prefix prepended to a bucket key to get its public URL.
    pub public_base_url: String,
    pub batch_size: NonZeroUsize,
    /// Probe the service's health endpoint before listing.
    pub check_health: bool,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            check_health: true,
        }
    }
}

impl HarnessSettings {
    pub fn with_batch_size(mut self, batch_size: usize) -> ConfigResult<Self> {
        self.batch_size = NonZeroUsize::new(batch_size).ok_or_else(|| ConfigError::Invalid {
            key: "BATCH_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        })?;
        Ok(self)
    }
}

/// Predicts every key of one class folder and scores the answers.
pub async fn evaluate_class<P>(
    predictor: &P,
    settings: &HarnessSettings,
    class: TumorClass,
    keys: &[String],
) -> ClassReport
where
    P: Predictor + ?Sized,
{
    let urls: Vec<String> = keys
        .iter()
        .map(|key| public_url(&settings.public_base_url, key))
        .collect();

    let outcomes = predict_batched(predictor, &urls, settings.batch_size).await;
    let report = ClassReport::from_outcomes(class, &outcomes);

    tracing::info!(
        class = %class,
        samples = report.samples,
        failed = report.failed(),
        accuracy = report.accuracy,
        "Evaluated class"
    );
    report
}

/// Full run: list the bucket, then evaluate glioma, meningioma, no tumor
/// and pituitary in that order.
pub async fn evaluate<L, P>(
    lister: &L,
    predictor: &P,
    settings: &HarnessSettings,
) -> HarnessResult<EvaluationReport>
where
    L: ObjectLister + ?Sized,
    P: Predictor + ?Sized,
{
    if settings.check_health {
        predictor.health().await.map_err(HarnessError::HealthCheck)?;
    }

    let keys = list_all_keys(lister, &settings.bucket).await?;

    let mut classes = Vec::with_capacity(TumorClass::ALL.len());
    for class in TumorClass::ALL {
        let class_keys = partition_by_prefix(&keys, class.folder_prefix());
        classes.push(evaluate_class(predictor, settings, class, &class_keys).await);
    }

    let report = EvaluationReport::new(keys.len(), classes);
    tracing::info!(
        keys = report.total_keys,
        predicted = report.predicted(),
        failed = report.failed(),
        combined_accuracy = report.combined_accuracy,
        "Evaluation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_labeled_bucket() {
        let settings = HarnessSettings::default();
        assert_eq!(settings.bucket, "detect-brain-tumor");
        assert_eq!(settings.batch_size.get(), 10);
        assert!(settings.public_base_url.ends_with('/'));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = HarnessSettings::default().with_batch_size(0).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == "BATCH_SIZE"));

        let settings = HarnessSettings::default().with_batch_size(4).unwrap();
        assert_eq!(settings.batch_size.get(), 4);
    }
}
