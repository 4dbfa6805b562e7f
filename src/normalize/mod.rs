//! Conversion of raw upstream records into typed domain values.

pub mod creature;
pub mod evolution;
pub mod fields;

pub use creature::{
    map_creature, map_name_listing, map_type_roster, species_chain_url, MappedCreature,
};
pub use evolution::{flatten, EvolutionNode};
