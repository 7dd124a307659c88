use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::model::fixture::fixture_plugins;
use crate::model::plugin::{PageResult, PluginSummary, RawPage};

/// Page size requested from the registry.
pub const PER_PAGE: u32 = 12;

const PLUGIN_LIST_PATH: &str = "/api/github/plugin_list";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Network(String),

    #[error("registry request timed out after {0:?}")]
    Timeout(Duration),

    #[error("registry returned HTTP {0}")]
    Status(u16),

    #[error("registry response was not valid plugin data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Which page to load and from where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based server page.
    pub page: u32,
    pub per_page: u32,
    pub use_fixture_data: bool,
}

/// Anything that can produce one page of plugin data.
pub trait PluginSource: Send + Sync {
    fn fetch_page(&self, page: u32, per_page: u32) -> Result<PageResult, RegistryError>;
}

pub struct HttpRegistry {
    base_url: String,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

impl HttpRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        Self::with_builder(base_url, timeout, reqwest::blocking::Client::builder())
    }

    pub fn with_builder(
        base_url: &str,
        timeout: Duration,
        builder: reqwest::blocking::ClientBuilder,
    ) -> Result<Self, RegistryError> {
        let client = builder
            .timeout(timeout)
            .user_agent(concat!("yoapi-plugins/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| RegistryError::Network(err.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    pub fn page_url(&self, page: u32, per_page: u32) -> String {
        format!(
            "{}{PLUGIN_LIST_PATH}?page={page}&per_page={per_page}",
            self.base_url
        )
    }

    fn map_transport_error(&self, err: reqwest::Error) -> RegistryError {
        if err.is_timeout() {
            RegistryError::Timeout(self.timeout)
        } else {
            RegistryError::Network(err.to_string())
        }
    }
}

impl PluginSource for HttpRegistry {
    fn fetch_page(&self, page: u32, per_page: u32) -> Result<PageResult, RegistryError> {
        let url = self.page_url(page, per_page);
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| self.map_transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .map_err(|err| self.map_transport_error(err))?;
        parse_page(&body)
    }
}

/// Decode a registry response body, defaulting any missing envelope or item fields.
pub fn parse_page(body: &[u8]) -> Result<PageResult, RegistryError> {
    let raw: RawPage = serde_json::from_slice(body)?;
    Ok(raw.into())
}

/// Serves the bundled fixture list as a single, final page.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    plugins: Vec<PluginSummary>,
}

impl FixtureSource {
    pub fn new(plugins: Vec<PluginSummary>) -> Self {
        Self { plugins }
    }
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new(fixture_plugins())
    }
}

impl PluginSource for FixtureSource {
    fn fetch_page(&self, _page: u32, _per_page: u32) -> Result<PageResult, RegistryError> {
        Ok(PageResult {
            items: self.plugins.clone(),
            total_count: self.plugins.len() as u64,
            has_next_page: false,
        })
    }
}

/// Routes a request to the remote registry or the fixture list.
#[derive(Clone)]
pub struct RegistryClient {
    remote: Arc<dyn PluginSource>,
    fixture: Arc<FixtureSource>,
}

impl RegistryClient {
    pub fn new(remote: Arc<dyn PluginSource>, fixture: FixtureSource) -> Self {
        Self {
            remote,
            fixture: Arc::new(fixture),
        }
    }

    pub fn fetch(&self, request: PageRequest) -> Result<PageResult, RegistryError> {
        if request.use_fixture_data {
            self.fixture.fetch_page(request.page, request.per_page)
        } else {
            let mut page = self.remote.fetch_page(request.page, request.per_page)?;
            let limit = request.per_page as usize;
            if page.items.len() > limit {
                tracing::warn!(
                    "registry sent {} items for per_page={limit}, truncating",
                    page.items.len()
                );
                page.items.truncate(limit);
            }
            Ok(page)
        }
    }
}
