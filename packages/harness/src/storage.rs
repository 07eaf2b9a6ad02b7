//! Listing of the labeled sample bucket.

use crate::error::{HarnessError, HarnessResult};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use serde::{Deserialize, Serialize};

/// One page of a `ListObjectsV2` style listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub keys: Vec<String>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

#[async_trait]
pub trait ObjectLister: Send + Sync {
    async fn list_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> HarnessResult<ListPage>;
}

/// Connection settings for S3 compatible storage (AWS, Cloudflare R2, MinIO).
///
/// Without static keys the default AWS credential chain is used.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageSettings {
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: "auto".to_string(),
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
        }
    }
}

pub struct S3Lister {
    client: aws_sdk_s3::Client,
}

impl std::fmt::Debug for S3Lister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Lister").finish()
    }
}

impl S3Lister {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    pub async fn from_settings(settings: &StorageSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        if let (Some(access_key), Some(secret_key)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "accuracy-test",
            ));
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.force_path_style);

        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self::new(aws_sdk_s3::Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl ObjectLister for S3Lister {
    async fn list_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> HarnessResult<ListPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| HarnessError::Listing {
                bucket: bucket.to_string(),
                message: DisplayErrorContext(e).to_string(),
            })?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key())
            .map(str::to_string)
            .collect();

        Ok(ListPage {
            keys,
            is_truncated: output.is_truncated().unwrap_or(false),
            next_continuation_token: output.next_continuation_token().map(str::to_string),
        })
    }
}

/// Follows continuation tokens until the listing is complete.
///
/// Keys come back in listing order. On any failure the error is logged and
/// returned; keys gathered so far are dropped.
pub async fn list_all_keys<L>(lister: &L, bucket: &str) -> HarnessResult<Vec<String>>
where
    L: ObjectLister + ?Sized,
{
    let mut keys = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = match lister.list_page(bucket, token.as_deref()).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(bucket, error = %e, "Failed to list bucket objects");
                return Err(e);
            }
        };
        pages += 1;
        keys.extend(page.keys);

        if !page.is_truncated {
            break;
        }

        match page.next_continuation_token {
            Some(next) => token = Some(next),
            None => {
                let e = HarnessError::Listing {
                    bucket: bucket.to_string(),
                    message: format!("page {pages} is truncated but has no continuation token"),
                };
                tracing::error!(bucket, error = %e, "Failed to list bucket objects");
                return Err(e);
            }
        }
    }

    tracing::info!(bucket, pages, keys = keys.len(), "Listed bucket objects");
    Ok(keys)
}

/// Keys starting with `prefix`, in their original order.
pub fn partition_by_prefix(keys: &[String], prefix: &str) -> Vec<String> {
    keys.iter()
        .filter(|key| key.starts_with(prefix))
        .cloned()
        .collect()
}
