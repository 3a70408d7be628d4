use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use log::{debug, info};

use super::{ClientFactory, StorageClient};
use crate::core::errors::ClientError;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Builds path-style S3 clients with static credentials, which is what
/// MinIO and most self-hosted S3 servers expect.
#[derive(Debug, Clone)]
pub struct S3ClientFactory {
    region: String,
}

impl Default for S3ClientFactory {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

impl S3ClientFactory {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }
}

impl ClientFactory for S3ClientFactory {
    fn build(
        &self,
        host: &str,
        access_key: &str,
        secret_key: &str,
        secure: bool,
    ) -> Result<Arc<dyn StorageClient>, ClientError> {
        let endpoint = endpoint_url(host, secure)?;
        info!("Building S3 client for {}", endpoint);

        let credentials = Credentials::new(access_key, secret_key, None, None, "objprobe-profile");
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .endpoint_url(endpoint.clone())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Arc::new(S3StorageClient {
            inner: aws_sdk_s3::Client::from_conf(config),
            endpoint,
        }))
    }
}

pub struct S3StorageClient {
    inner: aws_sdk_s3::Client,
    endpoint: String,
}

impl S3StorageClient {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StorageClient for S3StorageClient {
    async fn list_buckets(&self) -> Result<Vec<String>, ClientError> {
        let output = self
            .inner
            .list_buckets()
            .send()
            .await
            .map_err(|e| ClientError::Request(DisplayErrorContext(&e).to_string()))?;

        let names: Vec<String> = output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_owned))
            .collect();
        debug!("{} listed {} bucket(s)", self.endpoint, names.len());
        Ok(names)
    }
}

/// `host` may carry a scheme; it is replaced by the one `secure` asks for.
fn endpoint_url(host: &str, secure: bool) -> Result<String, ClientError> {
    let bare = host.trim();
    let bare = bare
        .strip_prefix("https://")
        .or_else(|| bare.strip_prefix("http://"))
        .unwrap_or(bare)
        .trim_end_matches('/');
    if bare.is_empty() || bare.contains(char::is_whitespace) {
        return Err(ClientError::InvalidEndpoint(host.to_string()));
    }
    let scheme = if secure { "https" } else { "http" };
    Ok(format!("{scheme}://{bare}"))
}
