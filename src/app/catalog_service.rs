use crate::app::ports::CatalogApi;
use crate::error::{CatalogError, Result};
use crate::metrics::CatalogMetrics;
use crate::normalize::{flatten, map_creature, map_type_roster, species_chain_url};
use crate::rate_limiter::{Limits, RateLimiter};
use crate::storage::Store;
use crate::types::{
    name_key, AbilitySlot, Creature, EvolutionStage, MoveRef, SpriteSet, StatEntry, TypeRoster,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Outcome of a bulk import. Per-name failures never abort the batch.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Names returned by the listing page
    pub requested: usize,
    pub imported: usize,
    pub failures: Vec<ImportFailure>,
}

#[derive(Debug)]
pub struct ImportFailure {
    pub name: String,
    pub error: CatalogError,
}

/// Emitted after each name of an import has been looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProgress {
    /// 1-based
    pub current: usize,
    pub total: usize,
    pub name: String,
    pub succeeded: bool,
}

/// Cache-first access to the catalog: the local [`Store`] is consulted
/// before the upstream [`CatalogApi`], and fetched creatures are persisted.
pub struct CatalogService<A, S> {
    api: A,
    store: S,
    limiter: Option<RateLimiter>,
}

impl<A: CatalogApi, S: Store> CatalogService<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self {
            api,
            store,
            limiter: None,
        }
    }

    /// Throttles every upstream request issued by this service.
    pub fn with_rate_limit(mut self, limits: Limits) -> Self {
        self.limiter = Some(RateLimiter::new(limits));
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
    }

    /// Returns the cached creature, or fetches, maps and persists it.
    ///
    /// Upstream `NotFound` surfaces as `NotFound`; any other failure of the
    /// fallback fetch surfaces unchanged.
    #[instrument(skip(self))]
    pub async fn lookup(&mut self, name: &str) -> Result<Creature> {
        let name = name_key(name);
        if name.is_empty() {
            return Err(CatalogError::NotFound("empty creature name".to_string()));
        }

        if let Some(creature) = self.store.get(&name)? {
            debug!(state = "cache_hit", id = creature.id);
            CatalogMetrics::record_cache_hit();
            return Ok(creature);
        }
        debug!(state = "cache_miss");
        CatalogMetrics::record_cache_miss();

        self.throttle().await;
        let raw = match self.api.fetch_by_name(&name).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(state = "fetch_failed", error = %e);
                CatalogMetrics::record_upstream_error(e.kind());
                return Err(e);
            }
        };

        let mapped = map_creature(&raw)?;
        if mapped.skipped > 0 {
            CatalogMetrics::record_skipped_elements(mapped.skipped);
        }

        self.store.save(&mapped.creature)?;
        debug!(state = "persisted", id = mapped.creature.id);
        Ok(mapped.creature)
    }

    /// Lists `limit` names from `offset` upstream and looks each one up in turn.
    pub async fn import_range(&mut self, limit: usize, offset: usize) -> Result<ImportReport> {
        self.import_range_with_progress(limit, offset, |_| {}).await
    }

    #[instrument(skip(self, on_progress))]
    pub async fn import_range_with_progress<F>(
        &mut self,
        limit: usize,
        offset: usize,
        mut on_progress: F,
    ) -> Result<ImportReport>
    where
        F: FnMut(&ImportProgress),
    {
        if limit == 0 {
            return Ok(ImportReport::default());
        }

        self.throttle().await;
        let mut names = self.api.fetch_page(limit, offset).await?;
        names.truncate(limit);
        info!(count = names.len(), "Importing creatures");

        let mut report = ImportReport {
            requested: names.len(),
            ..Default::default()
        };

        for (index, name) in names.iter().enumerate() {
            let succeeded = match self.lookup(name).await {
                Ok(_) => {
                    report.imported += 1;
                    true
                }
                Err(error) => {
                    warn!(%name, %error, "Import failed for creature");
                    report.failures.push(ImportFailure {
                        name: name.clone(),
                        error,
                    });
                    false
                }
            };
            on_progress(&ImportProgress {
                current: index + 1,
                total: names.len(),
                name: name.clone(),
                succeeded,
            });
        }

        CatalogMetrics::record_import(report.imported, report.failures.len());
        info!(
            imported = report.imported,
            failed = report.failures.len(),
            "Import finished"
        );
        Ok(report)
    }

    /// Species, then its evolution-chain link, then the flattened chain.
    #[instrument(skip(self))]
    pub async fn evolution_chain_for(&self, species_name: &str) -> Result<Vec<EvolutionStage>> {
        let species_name = name_key(species_name);
        if species_name.is_empty() {
            return Err(CatalogError::NotFound("empty species name".to_string()));
        }

        self.throttle().await;
        let species = self.api.fetch_species(&species_name).await?;
        let chain_url = species_chain_url(&species)?;

        self.throttle().await;
        let chain = self.api.fetch_evolution_chain(&chain_url).await?;
        let stages = flatten(chain.get("chain").unwrap_or(&Value::Null));
        debug!(stages = stages.len(), "Flattened evolution chain");
        Ok(stages)
    }

    /// Stored creatures in ascending id order; callers track their own cursor.
    pub fn page(&self, offset: usize, limit: usize) -> Result<Vec<Creature>> {
        self.store.page(offset, limit)
    }

    /// Stored creatures carrying the given type.
    pub fn creatures_by_type(&self, type_name: &str) -> Result<Vec<Creature>> {
        self.store.by_type(&name_key(type_name))
    }

    /// Every creature name the upstream catalog lists under a type.
    #[instrument(skip(self))]
    pub async fn type_roster(&self, type_name: &str) -> Result<TypeRoster> {
        let type_name = name_key(type_name);
        self.throttle().await;
        let raw = self.api.fetch_type(&type_name).await?;
        map_type_roster(&raw)
    }

    pub async fn abilities_for(&mut self, name: &str) -> Result<Vec<AbilitySlot>> {
        Ok(self.lookup(name).await?.abilities)
    }

    pub async fn stats_for(&mut self, name: &str) -> Result<Vec<StatEntry>> {
        Ok(self.lookup(name).await?.stats)
    }

    pub async fn moves_for(&mut self, name: &str) -> Result<Vec<MoveRef>> {
        Ok(self.lookup(name).await?.moves)
    }

    /// Missing images are `None` fields, never an error.
    pub async fn sprites_for(&mut self, name: &str) -> Result<SpriteSet> {
        Ok(self.lookup(name).await?.sprites)
    }
}
