use crate::app::ports::{CatalogApi, HttpClientPort};
use crate::config::ApiConfig;
use crate::constants::{listing_url, resource_url, CREATURE_PATH, SPECIES_PATH, TYPE_PATH};
use crate::error::{CatalogError, Result};
use crate::infra::http_client::ReqwestHttp;
use crate::normalize::map_name_listing;
use crate::types::RawRecord;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Client for the public PokeAPI REST service.
pub struct PokeApiClient<H> {
    http: H,
    base_url: String,
}

impl PokeApiClient<ReqwestHttp> {
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(ReqwestHttp::new(config.timeout())?, &config.base_url))
    }
}

impl<H: HttpClientPort> PokeApiClient<H> {
    pub fn new(http: H, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GETs `url` and decodes the body as a JSON object.
    async fn get_json(&self, url: &str, resource: &str) -> Result<RawRecord> {
        let resp = self.http.get(url).await?;

        if resp.status == 404 {
            debug!(%url, "Upstream reported not found");
            return Err(CatalogError::NotFound(resource.to_string()));
        }
        if !resp.is_success() {
            warn!(%url, status = resp.status, "Upstream request failed");
            return Err(CatalogError::Transport(format!(
                "HTTP {} from {}",
                resp.status, url
            )));
        }

        let value: RawRecord = serde_json::from_slice(&resp.bytes).map_err(|e| {
            CatalogError::Decode(format!(
                "{} ({}, {} bytes): {}",
                url,
                resp.content_type,
                resp.bytes.len(),
                e
            ))
        })?;
        if !value.is_object() {
            return Err(CatalogError::Decode(format!(
                "{}: expected a JSON object",
                url
            )));
        }
        Ok(value)
    }
}

#[async_trait]
impl<H: HttpClientPort> CatalogApi for PokeApiClient<H> {
    #[instrument(skip(self))]
    async fn fetch_by_name(&self, name: &str) -> Result<RawRecord> {
        let url = resource_url(&self.base_url, CREATURE_PATH, name)?;
        self.get_json(&url, &format!("creature '{}'", name)).await
    }

    #[instrument(skip(self))]
    async fn fetch_species(&self, name: &str) -> Result<RawRecord> {
        let url = resource_url(&self.base_url, SPECIES_PATH, name)?;
        self.get_json(&url, &format!("species '{}'", name)).await
    }

    #[instrument(skip(self))]
    async fn fetch_evolution_chain(&self, url: &str) -> Result<RawRecord> {
        self.get_json(url, &format!("evolution chain {}", url)).await
    }

    /// Never returns more than `limit` names, even when upstream ignores
    /// the requested page size.
    #[instrument(skip(self))]
    async fn fetch_page(&self, limit: usize, offset: usize) -> Result<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let url = listing_url(&self.base_url, limit, offset)?;
        let raw = self
            .get_json(&url, &format!("listing limit={} offset={}", limit, offset))
            .await?;
        let mut names = map_name_listing(&raw)?;
        if names.len() > limit {
            debug!(returned = names.len(), limit, "Truncating oversized listing page");
            names.truncate(limit);
        }
        Ok(names)
    }

    #[instrument(skip(self))]
    async fn fetch_type(&self, name: &str) -> Result<RawRecord> {
        let url = resource_url(&self.base_url, TYPE_PATH, name)?;
        self.get_json(&url, &format!("type '{}'", name)).await
    }
}
