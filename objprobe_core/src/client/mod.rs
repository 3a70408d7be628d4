use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::ClientError;

#[cfg(feature = "s3")]
pub mod s3;

#[cfg(feature = "s3")]
pub use s3::{S3ClientFactory, S3StorageClient};

/// A handle to one object-storage endpoint.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Enumerate the top-level buckets. Used purely as a connectivity probe.
    async fn list_buckets(&self) -> Result<Vec<String>, ClientError>;
}

/// Builds a [`StorageClient`] from the connection settings of a profile.
pub trait ClientFactory: Send + Sync {
    fn build(
        &self,
        host: &str,
        access_key: &str,
        secret_key: &str,
        secure: bool,
    ) -> Result<Arc<dyn StorageClient>, ClientError>;
}
