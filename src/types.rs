use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Case-insensitive lookup key for creature and type names.
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Decoded API response prior to mapping
pub type RawRecord = serde_json::Value;

/// One catalog entry, fully mapped from an upstream record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub id: u32,
    pub name: String,
    pub base_experience: u32,
    pub height: u32,
    pub weight: u32,
    pub display_order: i32,
    pub abilities: Vec<AbilitySlot>,
    pub stats: Vec<StatEntry>,
    pub types: Vec<TypeSlot>,
    pub moves: Vec<MoveRef>,
    pub sprites: SpriteSet,
}

impl Creature {
    pub fn has_type(&self, type_name: &str) -> bool {
        self.types
            .iter()
            .any(|t| name_key(&t.name) == name_key(type_name))
    }

    pub fn stat(&self, stat: StatName) -> Option<&StatEntry> {
        self.stats.iter().find(|s| s.stat == stat)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub name: String,
    pub url: String,
    pub is_hidden: bool,
    pub slot: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    pub stat: StatName,
    pub base_stat: u32,
    pub effort: u32,
}

/// The fixed stat vocabulary used by the upstream catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatName {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl StatName {
    pub const ALL: [StatName; 6] = [
        StatName::Hp,
        StatName::Attack,
        StatName::Defense,
        StatName::SpecialAttack,
        StatName::SpecialDefense,
        StatName::Speed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatName::Hp => "hp",
            StatName::Attack => "attack",
            StatName::Defense => "defense",
            StatName::SpecialAttack => "special-attack",
            StatName::SpecialDefense => "special-defense",
            StatName::Speed => "speed",
        }
    }
}

impl fmt::Display for StatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        StatName::ALL
            .into_iter()
            .find(|stat| stat.as_str() == s)
            .ok_or_else(|| format!("unknown stat name '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    pub slot: u8,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRef {
    pub name: String,
    pub url: String,
    pub version_group_details: Vec<VersionGroupDetail>,
}

/// How and when a move is learned in one version group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionGroupDetail {
    pub level_learned_at: u32,
    pub learn_method: String,
    pub version_group: String,
}

/// Image URLs for a creature. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSet {
    pub front_default: Option<String>,
    pub back_default: Option<String>,
    pub front_shiny: Option<String>,
    pub back_shiny: Option<String>,
    pub front_female: Option<String>,
    pub back_female: Option<String>,
    pub front_shiny_female: Option<String>,
    pub back_shiny_female: Option<String>,
}

impl SpriteSet {
    pub fn is_empty(&self) -> bool {
        self.urls().all(|url| url.is_none())
    }

    /// All eight slots in a fixed order: front/back x default/shiny x male/female
    pub fn urls(&self) -> impl Iterator<Item = Option<&str>> {
        [
            &self.front_default,
            &self.back_default,
            &self.front_shiny,
            &self.back_shiny,
            &self.front_female,
            &self.back_female,
            &self.front_shiny_female,
            &self.back_shiny_female,
        ]
        .into_iter()
        .map(|url| url.as_deref())
    }
}

/// One entry of a flattened evolution chain. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionStage {
    pub species_name: String,
    pub species_url: String,
    /// `evolution_details` passed through verbatim
    pub trigger_details: Vec<RawRecord>,
    /// Index in depth-first preorder
    pub position: usize,
    /// Distance from the chain root
    pub depth: usize,
}

/// Creature names listed under one type upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRoster {
    pub type_name: String,
    pub members: Vec<TypeMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMember {
    pub name: String,
    pub slot: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_name_round_trips_through_str() {
        for stat in StatName::ALL {
            assert_eq!(stat.as_str().parse::<StatName>().unwrap(), stat);
        }
        assert!("luck".parse::<StatName>().is_err());
    }

    #[test]
    fn test_stat_name_serializes_kebab_case() {
        let json = serde_json::to_string(&StatName::SpecialDefense).unwrap();
        assert_eq!(json, "\"special-defense\"");
    }

    #[test]
    fn test_empty_sprite_set() {
        let sprites = SpriteSet::default();
        assert!(sprites.is_empty());

        let sprites = SpriteSet {
            back_shiny: Some("https://img/back_shiny.png".to_string()),
            ..Default::default()
        };
        assert!(!sprites.is_empty());
        assert_eq!(sprites.urls().flatten().count(), 1);
    }
}
