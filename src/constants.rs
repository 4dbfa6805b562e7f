//! Upstream endpoint constants, so URL shapes live in one place.

use crate::error::{CatalogError, Result};
use reqwest::Url;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_REQUESTS_PER_MIN: u64 = 100;
pub const DEFAULT_DATABASE_PATH: &str = "data/pokedex.db";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const USER_AGENT: &str = concat!("pokedex/", env!("CARGO_PKG_VERSION"));

pub const CREATURE_PATH: &str = "pokemon";
pub const SPECIES_PATH: &str = "pokemon-species";
pub const TYPE_PATH: &str = "type";

/// Parses `base_url` and appends `segments` as escaped path segments.
fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url.trim_end_matches('/'))
        .map_err(|e| CatalogError::Config(format!("invalid base_url '{}': {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| CatalogError::Config(format!("base_url '{}' cannot take a path", base_url)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Builds `{base}/{resource}/{name}`. `name` is a single percent-encoded
/// segment, so `/`, `?` and `#` never reach the path or query.
pub fn resource_url(base_url: &str, resource: &str, name: &str) -> Result<String> {
    Ok(endpoint(base_url, &[resource, name])?.into())
}

pub fn listing_url(base_url: &str, limit: usize, offset: usize) -> Result<String> {
    let mut url = endpoint(base_url, &[CREATURE_PATH])?;
    url.query_pairs_mut()
        .append_pair("limit", &limit.to_string())
        .append_pair("offset", &offset.to_string());
    Ok(url.into())
}
