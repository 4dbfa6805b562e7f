use super::{name_key, Store};
use crate::error::Result;
use crate::types::{
    AbilitySlot, Creature, MoveRef, SpriteSet, StatEntry, StatName, TypeSlot, VersionGroupDetail,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS creatures (
        id                          INTEGER PRIMARY KEY,
        name                        TEXT NOT NULL,
        name_key                    TEXT NOT NULL UNIQUE,
        base_experience             INTEGER NOT NULL,
        height                      INTEGER NOT NULL,
        weight                      INTEGER NOT NULL,
        display_order               INTEGER NOT NULL,
        sprite_front_default        TEXT,
        sprite_back_default         TEXT,
        sprite_front_shiny          TEXT,
        sprite_back_shiny           TEXT,
        sprite_front_female         TEXT,
        sprite_back_female          TEXT,
        sprite_front_shiny_female   TEXT,
        sprite_back_shiny_female    TEXT
    );
    CREATE TABLE IF NOT EXISTS abilities (
        creature_id  INTEGER NOT NULL REFERENCES creatures(id) ON DELETE CASCADE,
        slot         INTEGER NOT NULL,
        position     INTEGER NOT NULL,
        name         TEXT NOT NULL,
        url          TEXT NOT NULL,
        is_hidden    INTEGER NOT NULL,
        PRIMARY KEY (creature_id, slot)
    );
    CREATE TABLE IF NOT EXISTS stats (
        creature_id  INTEGER NOT NULL REFERENCES creatures(id) ON DELETE CASCADE,
        position     INTEGER NOT NULL,
        stat         TEXT NOT NULL,
        base_stat    INTEGER NOT NULL,
        effort       INTEGER NOT NULL,
        PRIMARY KEY (creature_id, position)
    );
    CREATE TABLE IF NOT EXISTS types (
        creature_id  INTEGER NOT NULL REFERENCES creatures(id) ON DELETE CASCADE,
        slot         INTEGER NOT NULL,
        name         TEXT NOT NULL,
        name_key     TEXT NOT NULL,
        url          TEXT NOT NULL,
        PRIMARY KEY (creature_id, slot)
    );
    CREATE INDEX IF NOT EXISTS types_by_name ON types (name_key);
    CREATE TABLE IF NOT EXISTS moves (
        creature_id  INTEGER NOT NULL REFERENCES creatures(id) ON DELETE CASCADE,
        position     INTEGER NOT NULL,
        name         TEXT NOT NULL,
        url          TEXT NOT NULL,
        PRIMARY KEY (creature_id, position)
    );
    CREATE TABLE IF NOT EXISTS move_details (
        creature_id       INTEGER NOT NULL,
        move_position     INTEGER NOT NULL,
        position          INTEGER NOT NULL,
        level_learned_at  INTEGER NOT NULL,
        learn_method      TEXT NOT NULL,
        version_group     TEXT NOT NULL,
        PRIMARY KEY (creature_id, move_position, position),
        FOREIGN KEY (creature_id, move_position)
            REFERENCES moves (creature_id, position) ON DELETE CASCADE
    );
"#;

const CREATURE_COLUMNS: &str = "id, name, base_experience, height, weight, display_order, \
    sprite_front_default, sprite_back_default, sprite_front_shiny, sprite_back_shiny, \
    sprite_front_female, sprite_back_female, sprite_front_shiny_female, sprite_back_shiny_female";

/// SQLite-backed creature cache. Child rows cascade with their creature.
///
/// Name lookups go through `name_key` columns holding the Unicode-lowercased
/// name, since `COLLATE NOCASE` only folds ASCII.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!(path = %db_path.display(), "Opened creature store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn query_creatures(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Creature>> {
        let mut stmt = self.conn.prepare(sql)?;
        let headers = stmt
            .query_map(params, creature_header)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        headers
            .into_iter()
            .map(|creature| self.load_children(creature))
            .collect()
    }

    fn load_children(&self, mut creature: Creature) -> Result<Creature> {
        let id = creature.id;

        let mut stmt = self.conn.prepare(
            "SELECT name, url, is_hidden, slot FROM abilities
             WHERE creature_id = ?1 ORDER BY position",
        )?;
        creature.abilities = stmt
            .query_map(params![id], |row| {
                Ok(AbilitySlot {
                    name: row.get(0)?,
                    url: row.get(1)?,
                    is_hidden: row.get(2)?,
                    slot: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT stat, base_stat, effort FROM stats WHERE creature_id = ?1 ORDER BY position",
        )?;
        creature.stats = stmt
            .query_map(params![id], |row| {
                let stat: String = row.get(0)?;
                let stat = stat.parse::<StatName>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })?;
                Ok(StatEntry {
                    stat,
                    base_stat: row.get(1)?,
                    effort: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut stmt = self
            .conn
            .prepare("SELECT slot, name, url FROM types WHERE creature_id = ?1 ORDER BY slot")?;
        creature.types = stmt
            .query_map(params![id], |row| {
                Ok(TypeSlot {
                    slot: row.get(0)?,
                    name: row.get(1)?,
                    url: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT name, url FROM moves WHERE creature_id = ?1 ORDER BY position",
        )?;
        let mut moves: Vec<MoveRef> = stmt
            .query_map(params![id], |row| {
                Ok(MoveRef {
                    name: row.get(0)?,
                    url: row.get(1)?,
                    version_group_details: Vec::new(),
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT move_position, level_learned_at, learn_method, version_group
             FROM move_details WHERE creature_id = ?1 ORDER BY move_position, position",
        )?;
        let details = stmt.query_map(params![id], |row| {
            let move_position: usize = row.get::<_, i64>(0)? as usize;
            Ok((
                move_position,
                VersionGroupDetail {
                    level_learned_at: row.get(1)?,
                    learn_method: row.get(2)?,
                    version_group: row.get(3)?,
                },
            ))
        })?;
        for detail in details {
            let (move_position, detail) = detail?;
            if let Some(mv) = moves.get_mut(move_position) {
                mv.version_group_details.push(detail);
            }
        }
        creature.moves = moves;

        Ok(creature)
    }
}

fn creature_header(row: &Row<'_>) -> rusqlite::Result<Creature> {
    Ok(Creature {
        id: row.get(0)?,
        name: row.get(1)?,
        base_experience: row.get(2)?,
        height: row.get(3)?,
        weight: row.get(4)?,
        display_order: row.get(5)?,
        abilities: Vec::new(),
        stats: Vec::new(),
        types: Vec::new(),
        moves: Vec::new(),
        sprites: SpriteSet {
            front_default: row.get(6)?,
            back_default: row.get(7)?,
            front_shiny: row.get(8)?,
            back_shiny: row.get(9)?,
            front_female: row.get(10)?,
            back_female: row.get(11)?,
            front_shiny_female: row.get(12)?,
            back_shiny_female: row.get(13)?,
        },
    })
}

fn to_sql_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl Store for SqliteStore {
    fn get(&self, name: &str) -> Result<Option<Creature>> {
        let header = self
            .conn
            .query_row(
                &format!("SELECT {} FROM creatures WHERE name_key = ?1", CREATURE_COLUMNS),
                params![name_key(name)],
                creature_header,
            )
            .optional()?;

        header.map(|creature| self.load_children(creature)).transpose()
    }

    fn exists(&self, name: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM creatures WHERE name_key = ?1",
                params![name_key(name)],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn save(&mut self, creature: &Creature) -> Result<()> {
        let tx = self.conn.transaction()?;

        // Cascades to every child table
        let key = name_key(&creature.name);
        tx.execute(
            "DELETE FROM creatures WHERE id = ?1 OR name_key = ?2",
            params![creature.id, key],
        )?;

        let sprites = &creature.sprites;
        tx.execute(
            &format!(
                "INSERT INTO creatures ({}, name_key)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                CREATURE_COLUMNS
            ),
            params![
                creature.id,
                creature.name.trim(),
                creature.base_experience,
                creature.height,
                creature.weight,
                creature.display_order,
                sprites.front_default,
                sprites.back_default,
                sprites.front_shiny,
                sprites.back_shiny,
                sprites.front_female,
                sprites.back_female,
                sprites.front_shiny_female,
                sprites.back_shiny_female,
                key,
            ],
        )?;

        for (position, ability) in creature.abilities.iter().enumerate() {
            tx.execute(
                "INSERT INTO abilities (creature_id, slot, position, name, url, is_hidden)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    creature.id,
                    ability.slot,
                    to_sql_i64(position),
                    ability.name,
                    ability.url,
                    ability.is_hidden
                ],
            )?;
        }

        for (position, stat) in creature.stats.iter().enumerate() {
            tx.execute(
                "INSERT INTO stats (creature_id, position, stat, base_stat, effort)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    creature.id,
                    to_sql_i64(position),
                    stat.stat.as_str(),
                    stat.base_stat,
                    stat.effort
                ],
            )?;
        }

        for type_slot in &creature.types {
            tx.execute(
                "INSERT INTO types (creature_id, slot, name, name_key, url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    creature.id,
                    type_slot.slot,
                    type_slot.name,
                    name_key(&type_slot.name),
                    type_slot.url
                ],
            )?;
        }

        for (move_position, mv) in creature.moves.iter().enumerate() {
            tx.execute(
                "INSERT INTO moves (creature_id, position, name, url) VALUES (?1, ?2, ?3, ?4)",
                params![creature.id, to_sql_i64(move_position), mv.name, mv.url],
            )?;
            for (position, detail) in mv.version_group_details.iter().enumerate() {
                tx.execute(
                    "INSERT INTO move_details
                     (creature_id, move_position, position,
                      level_learned_at, learn_method, version_group)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        creature.id,
                        to_sql_i64(move_position),
                        to_sql_i64(position),
                        detail.level_learned_at,
                        detail.learn_method,
                        detail.version_group
                    ],
                )?;
            }
        }

        tx.commit()?;
        debug!("Saved creature: {} with id {}", creature.name, creature.id);
        Ok(())
    }

    fn page(&self, offset: usize, limit: usize) -> Result<Vec<Creature>> {
        self.query_creatures(
            &format!(
                "SELECT {} FROM creatures ORDER BY id ASC LIMIT ?1 OFFSET ?2",
                CREATURE_COLUMNS
            ),
            params![to_sql_i64(limit), to_sql_i64(offset)],
        )
    }

    fn by_type(&self, type_name: &str) -> Result<Vec<Creature>> {
        self.query_creatures(
            &format!(
                "SELECT {} FROM creatures c
                 WHERE EXISTS (SELECT 1 FROM types t WHERE t.creature_id = c.id AND t.name_key = ?1)
                 ORDER BY c.id ASC",
                CREATURE_COLUMNS
            ),
            params![name_key(type_name)],
        )
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM creatures", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
