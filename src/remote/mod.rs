pub mod probe;

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::error::AppError;

pub use probe::{AlwaysOnline, ConnectivityProbe, HttpProbe};

/// A raw remote row before sanitization.
pub type RemoteRow = Map<String, Value>;

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl RemoteConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("SUPABASE_URL")
            .map_err(|_| AppError::Config("SUPABASE_URL is not set".to_string()))?;
        let anon_key = env::var("SUPABASE_ANON_KEY")
            .map_err(|_| AppError::Config("SUPABASE_ANON_KEY is not set".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Rows of `table` changed after `since`. Without a watermark the
    /// initial pull takes only live rows when the table soft-deletes,
    /// or everything when it does not.
    async fn fetch_rows(
        &self,
        table: &str,
        since: Option<&str>,
        has_delete_flag: bool,
    ) -> Result<Vec<RemoteRow>, AppError>;
}

/// PostgREST client for the authoritative Supabase store.
pub struct SupabaseClient {
    client: Client,
    config: RemoteConfig,
}

impl SupabaseClient {
    pub fn new(config: RemoteConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl RemoteStore for SupabaseClient {
    async fn fetch_rows(
        &self,
        table: &str,
        since: Option<&str>,
        has_delete_flag: bool,
    ) -> Result<Vec<RemoteRow>, AppError> {
        let url = format!("{}/rest/v1/{}", self.config.base_url, table);

        let mut request = self
            .client
            .get(&url)
            .header("apikey", &self.config.anon_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.anon_key),
            )
            .query(&[("select", "*")]);

        if let Some(since) = since {
            request = request.query(&[("updated_at", format!("gt.{}", since))]);
        } else if has_delete_flag {
            request = request.query(&[("is_deleted", "is.false")]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Remote(format!("request to {} failed: {}", table, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Remote(format!(
                "query failed for {}: {} {}",
                table, status, body
            )));
        }

        response
            .json::<Vec<RemoteRow>>()
            .await
            .map_err(|e| AppError::Remote(format!("invalid response for {}: {}", table, e)))
    }
}
