//! Creature catalog core.
//!
//! Fetches creature records from the public PokeAPI, maps the loosely-typed
//! JSON into domain records, flattens evolution chains, and keeps a local
//! cache with stateless pagination. [`app::CatalogService`] is the entry point
//! for presentation layers.

pub mod apis;
pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod rate_limiter;
pub mod storage;
pub mod types;

pub use app::{CatalogApi, CatalogService, ImportReport};
pub use error::{CatalogError, Result};
pub use storage::{InMemoryStore, SqliteStore, Store};
pub use types::{Creature, EvolutionStage, RawRecord};
