use async_trait::async_trait;
use edge_deploy_core::FunctionPayload;

/// Status and raw body of a management API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// 200 and 201 are the only statuses treated as success
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    pub fn is_conflict(&self) -> bool {
        self.status == 409
    }
}

/// Management API operations used by the deploy pipeline.
///
/// `Err` is reserved for transport failures (connect errors, timeouts);
/// any HTTP status, including errors, comes back as `Ok(ApiResponse)`.
#[async_trait]
pub trait FunctionsApi {
    async fn create_function(&self, payload: &FunctionPayload<'_>) -> anyhow::Result<ApiResponse>;

    async fn update_function(
        &self,
        slug: &str,
        payload: &FunctionPayload<'_>,
    ) -> anyhow::Result<ApiResponse>;
}
