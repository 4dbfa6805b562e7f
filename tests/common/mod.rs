#![allow(dead_code)]

use async_trait::async_trait;
use pokedex::app::CatalogApi;
use pokedex::error::{CatalogError, Result};
use pokedex::types::{
    AbilitySlot, Creature, MoveRef, RawRecord, SpriteSet, StatEntry, StatName, TypeSlot,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Upstream payload for `/pokemon/{name}` shaped like the real API.
pub fn creature_record(id: u32, name: &str, type_name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "base_experience": 64,
        "height": 7,
        "weight": 69,
        "order": id,
        "abilities": [
            { "ability": { "name": "overgrow", "url": "https://pokeapi.co/api/v2/ability/65/" }, "is_hidden": false, "slot": 1 },
            { "ability": { "name": "chlorophyll", "url": "https://pokeapi.co/api/v2/ability/34/" }, "is_hidden": true, "slot": 3 }
        ],
        "stats": [
            { "base_stat": 45, "effort": 0, "stat": { "name": "hp", "url": "https://pokeapi.co/api/v2/stat/1/" } },
            { "base_stat": 49, "effort": 0, "stat": { "name": "attack", "url": "https://pokeapi.co/api/v2/stat/2/" } }
        ],
        "types": [
            { "slot": 1, "type": { "name": type_name, "url": "https://pokeapi.co/api/v2/type/12/" } }
        ],
        "moves": [
            {
                "move": { "name": "razor-wind", "url": "https://pokeapi.co/api/v2/move/13/" },
                "version_group_details": [
                    {
                        "level_learned_at": 0,
                        "move_learn_method": { "name": "egg", "url": "https://pokeapi.co/api/v2/move-learn-method/2/" },
                        "version_group": { "name": "gold-silver", "url": "https://pokeapi.co/api/v2/version-group/3/" }
                    }
                ]
            }
        ],
        "sprites": {
            "front_default": format!("https://img.test/{}.png", id),
            "front_shiny": format!("https://img.test/shiny/{}.png", id)
        }
    })
}

/// A stored-side creature built directly, for store tests.
pub fn creature(id: u32, name: &str) -> Creature {
    Creature {
        id,
        name: name.to_string(),
        base_experience: 100 + id,
        height: 10,
        weight: 100,
        display_order: id as i32,
        abilities: vec![AbilitySlot {
            name: "static".to_string(),
            url: "https://pokeapi.co/api/v2/ability/9/".to_string(),
            is_hidden: false,
            slot: 1,
        }],
        stats: vec![StatEntry {
            stat: StatName::Speed,
            base_stat: 90,
            effort: 2,
        }],
        types: vec![TypeSlot {
            slot: 1,
            name: "electric".to_string(),
            url: "https://pokeapi.co/api/v2/type/13/".to_string(),
        }],
        moves: vec![MoveRef {
            name: "thunder-shock".to_string(),
            url: "https://pokeapi.co/api/v2/move/84/".to_string(),
            version_group_details: vec![],
        }],
        sprites: SpriteSet {
            front_default: Some(format!("https://img.test/{}.png", id)),
            ..Default::default()
        },
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Failure {
    NotFound,
    Transport,
    Decode,
}

impl Failure {
    fn error(self, what: &str) -> CatalogError {
        match self {
            Failure::NotFound => CatalogError::NotFound(what.to_string()),
            Failure::Transport => CatalogError::Transport(format!("connection reset: {}", what)),
            Failure::Decode => CatalogError::Decode(format!("not JSON: {}", what)),
        }
    }
}

/// In-process stand-in for the upstream catalog. Unknown names are `NotFound`.
#[derive(Default)]
pub struct FakeApi {
    pub creatures: HashMap<String, Value>,
    pub species: HashMap<String, Value>,
    pub chains: HashMap<String, Value>,
    pub types: HashMap<String, Value>,
    pub listing: Vec<String>,
    pub failures: HashMap<String, Failure>,
    /// Serve the whole listing from `offset`, like an upstream that
    /// falls back to its own page size.
    pub listing_ignores_limit: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn with_creature(mut self, record: Value) -> Self {
        let name = record["name"].as_str().unwrap().to_string();
        self.listing.push(name.clone());
        self.creatures.insert(name, record);
        self
    }

    pub fn failing(mut self, name: &str, failure: Failure) -> Self {
        self.listing.push(name.to_string());
        self.failures.insert(name.to_string(), failure);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn lookup(map: &HashMap<String, Value>, key: &str, what: &str) -> Result<RawRecord> {
        map.get(key)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("{} '{}'", what, key)))
    }
}

#[async_trait]
impl CatalogApi for FakeApi {
    async fn fetch_by_name(&self, name: &str) -> Result<RawRecord> {
        self.record(format!("pokemon/{}", name));
        if let Some(failure) = self.failures.get(name) {
            return Err(failure.error(name));
        }
        Self::lookup(&self.creatures, name, "creature")
    }

    async fn fetch_species(&self, name: &str) -> Result<RawRecord> {
        self.record(format!("pokemon-species/{}", name));
        Self::lookup(&self.species, name, "species")
    }

    async fn fetch_evolution_chain(&self, url: &str) -> Result<RawRecord> {
        self.record(url.to_string());
        Self::lookup(&self.chains, url, "evolution chain")
    }

    async fn fetch_page(&self, limit: usize, offset: usize) -> Result<Vec<String>> {
        self.record(format!("pokemon?limit={}&offset={}", limit, offset));
        let take = if self.listing_ignores_limit {
            usize::MAX
        } else {
            limit
        };
        Ok(self.listing.iter().skip(offset).take(take).cloned().collect())
    }

    async fn fetch_type(&self, name: &str) -> Result<RawRecord> {
        self.record(format!("type/{}", name));
        Self::lookup(&self.types, name, "type")
    }
}
