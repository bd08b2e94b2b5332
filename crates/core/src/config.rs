use crate::error::{Error, Result};
use crate::types::DEFAULT_FUNCTIONS_ROOT;
use std::path::PathBuf;

pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const SUPABASE_MANAGEMENT_API_URL: &str = "SUPABASE_MANAGEMENT_API_URL";

pub const DEFAULT_MANAGEMENT_API_URL: &str = "https://api.supabase.com";

/// Resolved deployment configuration
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Project URL with any trailing slash removed
    pub supabase_url: String,
    pub service_role_key: String,
    /// First label of the project URL's host
    pub project_id: String,
    /// Management API base, without trailing slash
    pub api_url: String,
    pub functions_root: PathBuf,
}

impl DeployConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup (useful for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();

        let supabase_url = read(SUPABASE_URL).trim_end_matches('/').to_string();
        if supabase_url.is_empty() {
            return Err(Error::MissingEnv(SUPABASE_URL));
        }

        let service_role_key = read(SUPABASE_SERVICE_ROLE_KEY);
        if service_role_key.is_empty() {
            return Err(Error::MissingEnv(SUPABASE_SERVICE_ROLE_KEY));
        }

        let project_id = derive_project_id(&supabase_url)?;

        let api_url = match read(SUPABASE_MANAGEMENT_API_URL) {
            url if url.is_empty() => DEFAULT_MANAGEMENT_API_URL.to_string(),
            url => url.trim_end_matches('/').to_string(),
        };

        Ok(Self {
            supabase_url,
            service_role_key,
            project_id,
            api_url,
            functions_root: PathBuf::from(DEFAULT_FUNCTIONS_ROOT),
        })
    }

    pub fn with_functions_root(mut self, root: PathBuf) -> Self {
        self.functions_root = root;
        self
    }

    /// Endpoint for creating functions in this project
    pub fn functions_endpoint(&self) -> String {
        format!("{}/v1/projects/{}/functions", self.api_url, self.project_id)
    }
}

/// Extract the project identifier from a Supabase project URL
///
/// `https://abcxyz.supabase.co` → `abcxyz`
pub fn derive_project_id(url: &str) -> Result<String> {
    let (_, rest) = url.split_once("//").ok_or_else(|| {
        Error::InvalidUrl(format!(
            "Could not extract project id from '{}': missing scheme",
            url
        ))
    })?;

    let host = rest.split('/').next().unwrap_or_default();
    let project_id = host.split('.').next().unwrap_or_default();

    if project_id.is_empty() {
        return Err(Error::InvalidUrl(format!(
            "Could not extract project id from '{}'",
            url
        )));
    }

    Ok(project_id.to_string())
}
