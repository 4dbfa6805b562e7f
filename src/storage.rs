pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
pub(crate) use crate::types::name_key;
use crate::types::Creature;

/// Local creature cache keyed by case-insensitive name.
///
/// Writes take `&mut self`; an instance is used from one place at a time and
/// callers that share one across threads add their own locking.
pub trait Store {
    /// Exact, case-insensitive name match. Absence is `Ok(None)`.
    fn get(&self, name: &str) -> Result<Option<Creature>>;

    fn exists(&self, name: &str) -> Result<bool>;

    /// Upsert by name. Child collections are replaced, never merged, so
    /// saving the same creature twice leaves the same state.
    fn save(&mut self, creature: &Creature) -> Result<()>;

    /// Creatures in ascending id order, `limit` items from `offset`.
    /// Out-of-range windows return fewer or no items.
    fn page(&self, offset: usize, limit: usize) -> Result<Vec<Creature>>;

    /// Creatures having a type slot with this name, ascending id.
    fn by_type(&self, type_name: &str) -> Result<Vec<Creature>>;

    fn count(&self) -> Result<usize>;
}
