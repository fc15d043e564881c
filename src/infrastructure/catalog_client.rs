use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::domain::{CatalogService, DomainError};
use crate::models::{BookId, CatalogItem};

const USER_AGENT: &str = concat!("BiblioDesk/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed client for the remote catalog service
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let mut base = Url::parse(base_url).map_err(|e| {
            DomainError::Validation(format!("Invalid catalog URL '{}': {}", base_url, e))
        })?;

        // Url::join drops the last segment unless the path ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, DomainError> {
        self.base_url
            .join(path)
            .map_err(|e| DomainError::Internal(format!("Bad endpoint '{}': {}", path, e)))
    }

    async fn post_action(&self, action: &str, id: &BookId) -> Result<(), DomainError> {
        let url = self.endpoint(&format!("{}/{}", action, id))?;

        let resp = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| DomainError::External(format!("Failed to send request: {}", e)))?;

        if !resp.status().is_success() {
            return Err(DomainError::External(format!(
                "POST /{}/{} returned status: {}",
                action,
                id,
                resp.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl CatalogService for HttpCatalogClient {
    async fn fetch_books(&self) -> Result<Vec<CatalogItem>, DomainError> {
        let url = self.endpoint("books")?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::External(format!("Failed to send request: {}", e)))?;

        if !resp.status().is_success() {
            return Err(DomainError::External(format!(
                "Catalog service returned status: {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| DomainError::External(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| DomainError::External(format!("Failed to parse catalog: {}", e)))
    }

    async fn borrow(&self, id: &BookId) -> Result<(), DomainError> {
        self.post_action("borrow", id).await
    }

    async fn return_book(&self, id: &BookId) -> Result<(), DomainError> {
        self.post_action("return", id).await
    }
}
