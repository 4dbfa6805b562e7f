use crate::error::{CatalogError, Result};
use crate::normalize::fields::{
    bool_field, i32_field, list_field, named_resource, object, object_field, opt_str_field,
    str_field, unsigned_field, FieldResult,
};
use crate::types::{
    AbilitySlot, Creature, MoveRef, RawRecord, SpriteSet, StatEntry, StatName, TypeMember,
    TypeRoster, TypeSlot, VersionGroupDetail,
};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

const MAX_TYPE_SLOTS: usize = 2;

/// A mapped creature plus the number of list elements that were dropped
#[derive(Debug, Clone, PartialEq)]
pub struct MappedCreature {
    pub creature: Creature,
    pub skipped: usize,
}

/// Maps a `/pokemon/{name}` payload into a [`Creature`].
///
/// Required scalars fail the whole record. Malformed elements of the nested
/// lists are skipped and counted in [`MappedCreature::skipped`]; duplicate
/// ability or type slots fail the whole record.
pub fn map_creature(raw: &RawRecord) -> Result<MappedCreature> {
    let data = object(raw, "creature record").map_err(malformed)?;

    let id: u32 = unsigned_field(data, "id").map_err(malformed)?;
    let name = str_field(data, "name").map_err(malformed)?.to_string();
    let base_experience: u32 = unsigned_field(data, "base_experience").map_err(malformed)?;
    let height: u32 = unsigned_field(data, "height").map_err(malformed)?;
    let weight: u32 = unsigned_field(data, "weight").map_err(malformed)?;
    let display_order = i32_field(data, "order").map_err(malformed)?;

    let mut skipped = 0;

    let abilities = map_list(data, "abilities", &name, &mut skipped, map_ability)?;
    ensure_unique_slots(abilities.iter().map(|a| a.slot), "ability", &name)?;

    let stats = map_list(data, "stats", &name, &mut skipped, map_stat)?;

    let mut types = map_list(data, "types", &name, &mut skipped, map_type_slot)?;
    types.sort_by_key(|t| t.slot);
    // Slots are confined to 1..=2, so this also caps a creature at two types
    ensure_unique_slots(types.iter().map(|t| t.slot), "type", &name)?;

    let mut moves = Vec::new();
    for (index, element) in list_field(data, "moves").map_err(malformed)?.iter().enumerate() {
        match map_move(element) {
            Ok((mv, dropped_details)) => {
                skipped += dropped_details;
                moves.push(mv);
            }
            Err(reason) => {
                warn!(
                    creature = %name,
                    list = "moves",
                    index,
                    %reason,
                    "Skipping malformed element"
                );
                skipped += 1;
            }
        }
    }

    let sprites = match data.get("sprites").and_then(Value::as_object) {
        Some(sprites) => map_sprites(sprites),
        None => SpriteSet::default(),
    };

    if skipped > 0 {
        warn!(creature = %name, skipped, "Mapped creature with skipped list elements");
    } else {
        debug!(creature = %name, id, "Mapped creature");
    }

    Ok(MappedCreature {
        creature: Creature {
            id,
            name,
            base_experience,
            height,
            weight,
            display_order,
            abilities,
            stats,
            types,
            moves,
            sprites,
        },
        skipped,
    })
}

fn malformed(reason: String) -> CatalogError {
    CatalogError::MalformedRecord(reason)
}

fn map_list<T>(
    data: &Map<String, Value>,
    key: &'static str,
    creature: &str,
    skipped: &mut usize,
    map_element: fn(&Value) -> FieldResult<T>,
) -> Result<Vec<T>> {
    let elements = list_field(data, key).map_err(malformed)?;
    let mut mapped = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match map_element(element) {
            Ok(value) => mapped.push(value),
            Err(reason) => {
                warn!(%creature, list = key, index, %reason, "Skipping malformed element");
                *skipped += 1;
            }
        }
    }
    Ok(mapped)
}

fn ensure_unique_slots(
    slots: impl Iterator<Item = u8>,
    kind: &str,
    creature: &str,
) -> Result<()> {
    let mut seen = HashSet::new();
    for slot in slots {
        if !seen.insert(slot) {
            return Err(CatalogError::MalformedRecord(format!(
                "{} has duplicate {} slot {}",
                creature, kind, slot
            )));
        }
    }
    Ok(())
}

fn map_ability(element: &Value) -> FieldResult<AbilitySlot> {
    let data = object(element, "ability entry")?;
    let (name, url) = named_resource(data, "ability")?;
    Ok(AbilitySlot {
        name,
        url,
        is_hidden: bool_field(data, "is_hidden")?,
        slot: unsigned_field(data, "slot")?,
    })
}

fn map_stat(element: &Value) -> FieldResult<StatEntry> {
    let data = object(element, "stat entry")?;
    let stat_data = object_field(data, "stat")?;
    let stat: StatName = str_field(stat_data, "name")?.parse()?;
    Ok(StatEntry {
        stat,
        base_stat: unsigned_field(data, "base_stat")?,
        effort: unsigned_field(data, "effort")?,
    })
}

fn map_type_slot(element: &Value) -> FieldResult<TypeSlot> {
    let data = object(element, "type entry")?;
    let slot: u8 = unsigned_field(data, "slot")?;
    if !(1..=MAX_TYPE_SLOTS as u8).contains(&slot) {
        return Err(format!("type slot {} outside 1..={}", slot, MAX_TYPE_SLOTS));
    }
    let (name, url) = named_resource(data, "type")?;
    Ok(TypeSlot { slot, name, url })
}

/// Returns the move and how many of its version-group details were dropped.
fn map_move(element: &Value) -> FieldResult<(MoveRef, usize)> {
    let data = object(element, "move entry")?;
    let (name, url) = named_resource(data, "move")?;

    let mut dropped = 0;
    let mut version_group_details = Vec::new();
    for detail in list_field(data, "version_group_details")? {
        match map_version_group_detail(detail) {
            Ok(detail) => version_group_details.push(detail),
            Err(reason) => {
                debug!(%name, %reason, "Skipping malformed version group detail");
                dropped += 1;
            }
        }
    }

    Ok((
        MoveRef {
            name,
            url,
            version_group_details,
        },
        dropped,
    ))
}

fn map_version_group_detail(detail: &Value) -> FieldResult<VersionGroupDetail> {
    let data = object(detail, "version group detail")?;
    Ok(VersionGroupDetail {
        level_learned_at: unsigned_field(data, "level_learned_at")?,
        learn_method: str_field(object_field(data, "move_learn_method")?, "name")?.to_string(),
        version_group: str_field(object_field(data, "version_group")?, "name")?.to_string(),
    })
}

fn map_sprites(data: &Map<String, Value>) -> SpriteSet {
    SpriteSet {
        front_default: opt_str_field(data, "front_default"),
        back_default: opt_str_field(data, "back_default"),
        front_shiny: opt_str_field(data, "front_shiny"),
        back_shiny: opt_str_field(data, "back_shiny"),
        front_female: opt_str_field(data, "front_female"),
        back_female: opt_str_field(data, "back_female"),
        front_shiny_female: opt_str_field(data, "front_shiny_female"),
        back_shiny_female: opt_str_field(data, "back_shiny_female"),
    }
}

/// Names from a `/pokemon?limit=&offset=` listing, in listing order.
pub fn map_name_listing(raw: &RawRecord) -> Result<Vec<String>> {
    let data = object(raw, "listing").map_err(malformed)?;
    let results = match data.get("results") {
        Some(Value::Array(results)) => results,
        _ => {
            return Err(CatalogError::MalformedRecord(
                "listing has no 'results' list".to_string(),
            ))
        }
    };

    let mut names = Vec::with_capacity(results.len());
    for (index, entry) in results.iter().enumerate() {
        match entry.get("name").and_then(Value::as_str) {
            Some(name) => names.push(name.to_string()),
            None => warn!(index, "Skipping listing entry without a name"),
        }
    }
    Ok(names)
}

/// Decodes a `/type/{name}` payload into the creatures carrying that type.
pub fn map_type_roster(raw: &RawRecord) -> Result<TypeRoster> {
    let data = object(raw, "type record").map_err(malformed)?;
    let type_name = str_field(data, "name").map_err(malformed)?.to_string();

    let mut members = Vec::new();
    for (index, entry) in list_field(data, "pokemon").map_err(malformed)?.iter().enumerate() {
        let member = object(entry, "type member").and_then(|entry| {
            let slot: u8 = unsigned_field(entry, "slot")?;
            let (name, _) = named_resource(entry, "pokemon")?;
            Ok(TypeMember { name, slot })
        });
        match member {
            Ok(member) => members.push(member),
            Err(reason) => warn!(
                type_name = %type_name,
                index,
                %reason,
                "Skipping malformed type member"
            ),
        }
    }

    Ok(TypeRoster { type_name, members })
}

/// The evolution-chain link embedded in a `/pokemon-species/{name}` payload.
pub fn species_chain_url(raw: &RawRecord) -> Result<String> {
    let data = object(raw, "species record").map_err(malformed)?;
    let chain = object_field(data, "evolution_chain").map_err(|e| {
        CatalogError::MalformedRecord(format!("species has no evolution chain link: {}", e))
    })?;
    str_field(chain, "url")
        .map(str::to_string)
        .map_err(|e| CatalogError::MalformedRecord(format!("evolution_chain: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pikachu() -> Value {
        json!({
            "id": 25,
            "name": "pikachu",
            "base_experience": 112,
            "height": 4,
            "weight": 60,
            "order": 35,
            "abilities": [
                { "ability": { "name": "static", "url": "https://pokeapi.co/api/v2/ability/9/" }, "is_hidden": false, "slot": 1 },
                { "ability": { "name": "lightning-rod", "url": "https://pokeapi.co/api/v2/ability/31/" }, "is_hidden": true, "slot": 3 }
            ],
            "stats": [
                { "base_stat": 35, "effort": 0, "stat": { "name": "hp", "url": "https://pokeapi.co/api/v2/stat/1/" } },
                { "base_stat": 90, "effort": 2, "stat": { "name": "speed", "url": "https://pokeapi.co/api/v2/stat/6/" } }
            ],
            "types": [
                { "slot": 1, "type": { "name": "electric", "url": "https://pokeapi.co/api/v2/type/13/" } }
            ],
            "moves": [
                {
                    "move": { "name": "thunder-shock", "url": "https://pokeapi.co/api/v2/move/84/" },
                    "version_group_details": [
                        {
                            "level_learned_at": 1,
                            "move_learn_method": { "name": "level-up", "url": "https://pokeapi.co/api/v2/move-learn-method/1/" },
                            "version_group": { "name": "red-blue", "url": "https://pokeapi.co/api/v2/version-group/1/" }
                        }
                    ]
                }
            ],
            "sprites": {
                "front_default": "https://img/25.png",
                "back_default": "https://img/back/25.png",
                "front_female": null
            }
        })
    }

    #[test]
    fn test_maps_full_record() {
        let mapped = map_creature(&pikachu()).unwrap();
        assert_eq!(mapped.skipped, 0);

        let creature = mapped.creature;
        assert_eq!(creature.id, 25);
        assert_eq!(creature.name, "pikachu");
        assert_eq!(creature.base_experience, 112);
        assert_eq!(creature.display_order, 35);
        assert_eq!(creature.abilities.len(), 2);
        assert!(creature.abilities[1].is_hidden);
        assert_eq!(creature.stat(StatName::Speed).unwrap().effort, 2);
        assert_eq!(creature.types[0].name, "electric");
        assert_eq!(creature.moves[0].version_group_details[0].learn_method, "level-up");
        assert_eq!(creature.sprites.front_default.as_deref(), Some("https://img/25.png"));
        assert_eq!(creature.sprites.front_female, None);
        assert_eq!(creature.sprites.back_shiny_female, None);
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let mut raw = pikachu();
        raw.as_object_mut().unwrap().remove("id");
        let err = map_creature(&raw).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecord(ref m) if m.contains("'id'")));
    }

    #[test]
    fn test_wrong_scalar_type_is_malformed() {
        let mut raw = pikachu();
        raw["height"] = json!("four");
        assert!(matches!(map_creature(&raw), Err(CatalogError::MalformedRecord(_))));
    }

    #[test]
    fn test_duplicate_ability_slot_is_malformed() {
        let mut raw = pikachu();
        raw["abilities"][1]["slot"] = json!(1);
        let err = map_creature(&raw).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MalformedRecord(ref m) if m.contains("duplicate ability slot 1")
        ));
    }

    #[test]
    fn test_duplicate_type_slot_is_malformed() {
        let mut raw = pikachu();
        raw["types"] = json!([
            { "slot": 1, "type": { "name": "electric", "url": "u1" } },
            { "slot": 1, "type": { "name": "fairy", "url": "u2" } }
        ]);
        assert!(matches!(map_creature(&raw), Err(CatalogError::MalformedRecord(_))));
    }

    #[test]
    fn test_types_are_sorted_by_slot() {
        let mut raw = pikachu();
        raw["types"] = json!([
            { "slot": 2, "type": { "name": "flying", "url": "u2" } },
            { "slot": 1, "type": { "name": "normal", "url": "u1" } }
        ]);
        let creature = map_creature(&raw).unwrap().creature;
        let names: Vec<_> = creature.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["normal", "flying"]);
    }

    #[test]
    fn test_malformed_elements_are_skipped_and_counted() {
        let mut raw = pikachu();
        raw["stats"] = json!([
            { "base_stat": 35, "effort": 0, "stat": { "name": "hp" } },
            { "base_stat": 10, "effort": 0, "stat": { "name": "luck" } },
            { "base_stat": -5, "effort": 0, "stat": { "name": "attack" } }
        ]);
        raw["abilities"][0] = json!({ "is_hidden": false, "slot": 1 });
        raw["types"][0]["slot"] = json!(3);

        let mapped = map_creature(&raw).unwrap();
        assert_eq!(mapped.skipped, 4);
        assert_eq!(mapped.creature.stats.len(), 1);
        assert_eq!(mapped.creature.abilities.len(), 1);
        assert!(mapped.creature.types.is_empty());
    }

    #[test]
    fn test_malformed_version_detail_keeps_move() {
        let mut raw = pikachu();
        raw["moves"][0]["version_group_details"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "level_learned_at": 5 }));

        let mapped = map_creature(&raw).unwrap();
        assert_eq!(mapped.skipped, 1);
        assert_eq!(mapped.creature.moves.len(), 1);
        assert_eq!(mapped.creature.moves[0].version_group_details.len(), 1);
    }

    #[test]
    fn test_absent_lists_and_sprites_are_empty() {
        let raw = json!({
            "id": 132, "name": "ditto", "base_experience": 101,
            "height": 3, "weight": 40, "order": 214
        });
        let mapped = map_creature(&raw).unwrap();
        assert!(mapped.creature.abilities.is_empty());
        assert!(mapped.creature.moves.is_empty());
        assert!(mapped.creature.sprites.is_empty());
    }

    #[test]
    fn test_non_list_collection_is_malformed() {
        let mut raw = pikachu();
        raw["moves"] = json!("none");
        assert!(matches!(map_creature(&raw), Err(CatalogError::MalformedRecord(_))));
    }

    #[test]
    fn test_name_listing() {
        let raw = json!({
            "count": 1302,
            "next": "https://pokeapi.co/api/v2/pokemon?offset=3&limit=3",
            "results": [
                { "name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/" },
                { "url": "https://pokeapi.co/api/v2/pokemon/2/" },
                { "name": "venusaur", "url": "https://pokeapi.co/api/v2/pokemon/3/" }
            ]
        });
        assert_eq!(map_name_listing(&raw).unwrap(), vec!["bulbasaur", "venusaur"]);
        assert!(matches!(
            map_name_listing(&json!({ "count": 0 })),
            Err(CatalogError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_type_roster() {
        let raw = json!({
            "name": "ghost",
            "pokemon": [
                { "slot": 1, "pokemon": { "name": "gastly", "url": "https://pokeapi.co/api/v2/pokemon/92/" } },
                { "slot": 2, "pokemon": { "name": "sableye", "url": "https://pokeapi.co/api/v2/pokemon/302/" } },
                { "pokemon": { "name": "broken", "url": "x" } }
            ]
        });
        let roster = map_type_roster(&raw).unwrap();
        assert_eq!(roster.type_name, "ghost");
        assert_eq!(
            roster.members,
            vec![
                TypeMember { name: "gastly".into(), slot: 1 },
                TypeMember { name: "sableye".into(), slot: 2 },
            ]
        );
    }

    #[test]
    fn test_species_chain_url() {
        let raw = json!({
            "name": "charmander",
            "evolution_chain": { "url": "https://pokeapi.co/api/v2/evolution-chain/2/" }
        });
        assert_eq!(
            species_chain_url(&raw).unwrap(),
            "https://pokeapi.co/api/v2/evolution-chain/2/"
        );
        assert!(matches!(
            species_chain_url(&json!({ "name": "charmander" })),
            Err(CatalogError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_third_type_is_rejected_as_duplicate_slot() {
        let mut raw = pikachu();
        raw["types"] = json!([
            { "slot": 1, "type": { "name": "grass", "url": "u/12" } },
            { "slot": 2, "type": { "name": "poison", "url": "u/4" } },
            { "slot": 2, "type": { "name": "flying", "url": "u/3" } }
        ]);
        let err = map_creature(&raw).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MalformedRecord(ref m) if m.contains("duplicate type slot 2")
        ));
    }
}
