use crate::error::Result;
use crate::types::RawRecord;
use async_trait::async_trait;

/// Raw HTTP transport. Implementations map connection and timeout failures
/// to `CatalogError::Transport` and return every status code as data.
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpGetResult>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl HttpGetResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Read-only access to the upstream catalog. No retries happen here.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /pokemon/{name}`; the caller lower-cases the name.
    async fn fetch_by_name(&self, name: &str) -> Result<RawRecord>;

    /// `GET /pokemon-species/{name}`
    async fn fetch_species(&self, name: &str) -> Result<RawRecord>;

    /// Follows an evolution-chain link taken from a species payload, verbatim.
    async fn fetch_evolution_chain(&self, url: &str) -> Result<RawRecord>;

    /// Names in one page of the listing endpoint, in listing order.
    async fn fetch_page(&self, limit: usize, offset: usize) -> Result<Vec<String>>;

    /// `GET /type/{name}`
    async fn fetch_type(&self, name: &str) -> Result<RawRecord>;
}
