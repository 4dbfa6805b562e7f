use super::{name_key, Store};
use crate::error::Result;
use crate::types::Creature;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// In-memory store for development/testing
#[derive(Debug, Default)]
pub struct InMemoryStore {
    by_id: BTreeMap<u32, Creature>,
    ids_by_name: HashMap<String, u32>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for InMemoryStore {
    fn get(&self, name: &str) -> Result<Option<Creature>> {
        Ok(self
            .ids_by_name
            .get(&name_key(name))
            .and_then(|id| self.by_id.get(id))
            .cloned())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.ids_by_name.contains_key(&name_key(name)))
    }

    fn save(&mut self, creature: &Creature) -> Result<()> {
        let key = name_key(&creature.name);

        // Drop whatever row currently holds this name or this id
        if let Some(previous_id) = self.ids_by_name.remove(&key) {
            self.by_id.remove(&previous_id);
        }
        if let Some(previous) = self.by_id.remove(&creature.id) {
            self.ids_by_name.remove(&name_key(&previous.name));
        }

        self.ids_by_name.insert(key, creature.id);
        self.by_id.insert(creature.id, creature.clone());

        debug!("Saved creature: {} with id {}", creature.name, creature.id);
        Ok(())
    }

    fn page(&self, offset: usize, limit: usize) -> Result<Vec<Creature>> {
        Ok(self
            .by_id
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn by_type(&self, type_name: &str) -> Result<Vec<Creature>> {
        let type_name = type_name.trim();
        Ok(self
            .by_id
            .values()
            .filter(|c| c.has_type(type_name))
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.by_id.len())
    }
}
