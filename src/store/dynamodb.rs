//! DynamoDB-backed record store.
//!
//! # Responsibilities
//! - Build an SDK client from region, credentials, and endpoint settings
//! - Issue a single `GetItem` per existence check
//! - Classify SDK failures into `StoreError` variants
//!
//! The client is cheap to clone and safe to share across tasks; build it
//! once at startup and inject it.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use crate::config::StoreConfig;
use crate::store::types::{StoreError, StoreResult};
use crate::store::RecordStore;

const CREDENTIALS_PROVIDER_NAME: &str = "host-router-static";

/// Record store backed by a DynamoDB table.
#[derive(Clone, Debug)]
pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    /// Wrap an already configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from configuration.
    ///
    /// Static credentials are used when both keys are set; otherwise the
    /// SDK default provider chain (environment, profile, IMDS) applies.
    /// SDK-level retries are disabled: one check is one request.
    pub async fn from_config(config: &StoreConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::disabled());

        match (&config.access_key, &config.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                loader = loader.credentials_provider(Credentials::new(
                    access_key.clone(),
                    secret_key.clone(),
                    None,
                    None,
                    CREDENTIALS_PROVIDER_NAME,
                ));
            }
            _ => tracing::debug!("No static credentials configured, using default provider chain"),
        }

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;

        tracing::info!(
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            "DynamoDB client initialized"
        );

        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl RecordStore for DynamoStore {
    async fn contains(&self, table: &str, key_name: &str, key: &str) -> StoreResult<bool> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key(key_name, AttributeValue::S(key.to_string()))
            // Only the key attribute is needed to prove existence
            .projection_expression("#k")
            .expression_attribute_names("#k", key_name)
            .send()
            .await
            .map_err(|e| classify(table, e))?;

        Ok(output.item().is_some())
    }
}

fn classify(table: &str, err: SdkError<GetItemError>) -> StoreError {
    match err.as_service_error() {
        Some(GetItemError::ResourceNotFoundException(_)) => {
            StoreError::TableNotFound(table.to_string())
        }
        Some(GetItemError::ProvisionedThroughputExceededException(_))
        | Some(GetItemError::RequestLimitExceeded(_)) => {
            StoreError::Throttled(DisplayErrorContext(&err).to_string())
        }
        _ => StoreError::Remote(DisplayErrorContext(&err).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_is_remote_error() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = StoreConfig {
            region: "eu-west-1".into(),
            access_key: Some("AKIAEXAMPLE".into()),
            secret_key: Some("secret".into()),
            endpoint_url: Some(format!("http://{}", addr)),
        };
        let store = DynamoStore::from_config(&config).await;

        let result = store.contains("tenants", "domain", "shop").await;
        assert!(matches!(result, Err(StoreError::Remote(_))), "got {:?}", result);
    }
}
