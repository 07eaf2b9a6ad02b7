use crate::prediction::{PredictionOutcome, Predictor};
use futures::future::join_all;
use std::num::NonZeroUsize;

pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(size) => size,
    None => unreachable!(),
};

/// Consecutive slices of `batch_size` items; only the last may be shorter.
pub fn batches<T>(items: &[T], batch_size: NonZeroUsize) -> std::slice::Chunks<'_, T> {
    items.chunks(batch_size.get())
}

/// Public URL of a bucket object. Plain concatenation, `base` carries the
/// trailing slash.
pub fn public_url(base: &str, key: &str) -> String {
    format!("{base}{key}")
}

/// Sends every URL to `predictor`, `batch_size` requests at a time.
///
/// Requests inside a batch run concurrently; the next batch starts only once
/// all of them settled. Outcomes are returned in input order and a failed
/// request never cancels the others.
pub async fn predict_batched<P>(
    predictor: &P,
    urls: &[String],
    batch_size: NonZeroUsize,
) -> Vec<PredictionOutcome>
where
    P: Predictor + ?Sized,
{
    let mut outcomes = Vec::with_capacity(urls.len());

    for (index, batch) in batches(urls, batch_size).enumerate() {
        tracing::debug!(batch = index, size = batch.len(), "Sending prediction batch");

        let requests = batch.iter().map(|url| async move {
            match predictor.predict(url).await {
                Ok(result) => PredictionOutcome::Predicted {
                    url: url.clone(),
                    result,
                },
                Err(error) => {
                    tracing::warn!(url = %url, error = %error, "Prediction failed");
                    PredictionOutcome::Failed {
                        url: url.clone(),
                        error,
                    }
                }
            }
        });

        outcomes.extend(join_all(requests).await);
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictionError;
    use crate::prediction::PredictionResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn splits_into_ceil_n_over_size_batches() {
        let items: Vec<usize> = (0..25).collect();
        let split: Vec<&[usize]> = batches(&items, DEFAULT_BATCH_SIZE).collect();

        assert_eq!(split.len(), 3);
        assert_eq!(split.iter().map(|b| b.len()).collect::<Vec<_>>(), vec![10, 10, 5]);
        assert_eq!(split.concat(), items);
    }

    #[test]
    fn exact_multiple_has_no_short_batch() {
        let items: Vec<usize> = (0..20).collect();
        assert!(batches(&items, DEFAULT_BATCH_SIZE).all(|b| b.len() == 10));
        assert_eq!(batches(&items, DEFAULT_BATCH_SIZE).count(), 2);
    }

    #[test]
    fn empty_input_has_no_batches() {
        let items: Vec<usize> = Vec::new();
        assert_eq!(batches(&items, size(10)).count(), 0);
    }

    #[test]
    fn public_url_is_concatenation() {
        assert_eq!(
            public_url("https://www.brain-tumor-static.nbaron.com/", "glioma/a.jpg"),
            "https://www.brain-tumor-static.nbaron.com/glioma/a.jpg"
        );
    }

    /// Yields once per request so the whole batch is in flight together.
    #[derive(Default)]
    struct CountingPredictor {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl Predictor for CountingPredictor {
        async fn predict(&self, url: &str) -> Result<PredictionResult, PredictionError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if url.ends_with("bad.jpg") {
                return Err(PredictionError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            let classification = url.len() as i64 % 4;
            Ok(PredictionResult {
                success: true,
                classification,
                confidence: None,
                error_message: None,
            })
        }
    }

    #[tokio::test]
    async fn never_exceeds_batch_size_in_flight() {
        let predictor = CountingPredictor::default();
        let urls: Vec<String> = (0..23).map(|i| format!("u/{i}.jpg")).collect();

        let outcomes = predict_batched(&predictor, &urls, DEFAULT_BATCH_SIZE).await;

        assert_eq!(outcomes.len(), 23);
        assert_eq!(predictor.max_in_flight.load(Ordering::SeqCst), 10);
        assert_eq!(predictor.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn keeps_input_order_and_isolates_failures() {
        let predictor = CountingPredictor::default();
        let urls: Vec<String> = ["a.jpg", "bad.jpg", "ccc.jpg", "dddd.jpg"]
            .iter()
            .map(|u| u.to_string())
            .collect();

        let outcomes = predict_batched(&predictor, &urls, size(3)).await;

        let order: Vec<&str> = outcomes.iter().map(|o| o.url()).collect();
        assert_eq!(order, vec!["a.jpg", "bad.jpg", "ccc.jpg", "dddd.jpg"]);
        assert!(matches!(outcomes[1], PredictionOutcome::Failed { .. }));
        assert_eq!(outcomes.iter().filter(|o| o.result().is_some()).count(), 3);
    }
}
