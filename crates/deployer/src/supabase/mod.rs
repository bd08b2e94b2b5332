// Supabase Management API client

use crate::api::{ApiResponse, FunctionsApi};
use anyhow::{Context, Result};
use async_trait::async_trait;
use edge_deploy_core::{DeployConfig, FunctionPayload};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;

/// Upper bound for each request, including connect and body transfer
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ManagementClient {
    client: reqwest::Client,
    functions_url: String,
}

impl ManagementClient {
    pub fn new(config: &DeployConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.service_role_key))
                .context("Service role key is not a valid header value")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            functions_url: config.functions_endpoint(),
        })
    }

    fn function_url(&self, slug: &str) -> String {
        format!("{}/{}", self.functions_url, slug)
    }

    async fn read_response(response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "management API responded");
        Ok(ApiResponse { status, body })
    }
}

#[async_trait]
impl FunctionsApi for ManagementClient {
    async fn create_function(&self, payload: &FunctionPayload<'_>) -> Result<ApiResponse> {
        debug!(url = %self.functions_url, slug = payload.slug, "POST create function");
        let response = self
            .client
            .post(&self.functions_url)
            .json(payload)
            .send()
            .await?;
        Self::read_response(response).await
    }

    async fn update_function(
        &self,
        slug: &str,
        payload: &FunctionPayload<'_>,
    ) -> Result<ApiResponse> {
        let url = self.function_url(slug);
        debug!(url = %url, slug, "PATCH update function");
        let response = self.client.patch(&url).json(payload).send().await?;
        Self::read_response(response).await
    }
}
