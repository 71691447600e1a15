//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! PostgreSQL progression store
//!
//! Tables live in the `rpg` schema:
//!
//! - `rpg.players(identity, level, xp, credits, created_at, updated_at)`
//! - `rpg.player_skills(identity, skill_key, level)`, cascading on player delete

use super::{PersistenceError, ProgressStore};
use async_trait::async_trait;
use rpg_common::{PlayerIdentity, PlayerRecord, SkillRecord};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const SCHEMA: &[&str] = &[
    "CREATE SCHEMA IF NOT EXISTS rpg",
    "CREATE TABLE IF NOT EXISTS rpg.players (
        identity   TEXT        PRIMARY KEY,
        level      INTEGER     NOT NULL DEFAULT 0,
        xp         BIGINT      NOT NULL DEFAULT 0,
        credits    BIGINT      NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS rpg.player_skills (
        identity  TEXT    NOT NULL REFERENCES rpg.players (identity) ON DELETE CASCADE,
        skill_key TEXT    NOT NULL,
        level     INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (identity, skill_key)
    )",
];

/// Progression store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgProgressStore {
    pool: PgPool,
}

/// Row values converted to their column types.
struct PlayerRow {
    level: i32,
    xp: i64,
    credits: i64,
}

impl PgProgressStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a store whose pool connects on first use.
    pub fn connect_lazy(url: &str) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new().max_connections(5).connect_lazy(url)?;
        Ok(Self::new(pool))
    }

    /// Create the schema and tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Progression schema ready");
        Ok(())
    }

    fn to_row(record: &PlayerRecord) -> Result<PlayerRow, PersistenceError> {
        let out_of_range = |field| PersistenceError::OutOfRange {
            identity: record.identity.clone(),
            field,
        };
        Ok(PlayerRow {
            level: i32::try_from(record.level).map_err(|_| out_of_range("level"))?,
            xp: i64::try_from(record.xp).map_err(|_| out_of_range("xp"))?,
            credits: i64::try_from(record.credits).map_err(|_| out_of_range("credits"))?,
        })
    }

    async fn upsert_skills(
        record: &PlayerRecord,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), PersistenceError> {
        for skill in &record.skills {
            let level = i32::try_from(skill.level).map_err(|_| PersistenceError::OutOfRange {
                identity: record.identity.clone(),
                field: "skill level",
            })?;
            sqlx::query(
                "INSERT INTO rpg.player_skills (identity, skill_key, level)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (identity, skill_key) DO UPDATE SET level = EXCLUDED.level",
            )
            .bind(record.identity.as_str())
            .bind(&skill.key)
            .bind(level)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    async fn load(&self, identity: &PlayerIdentity) -> Result<Option<PlayerRecord>, PersistenceError> {
        let row: Option<(i32, i64, i64)> = sqlx::query_as(
            "SELECT level, xp, credits FROM rpg.players WHERE identity = $1",
        )
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some((level, xp, credits)) = row else {
            return Ok(None);
        };

        let out_of_range = |field| PersistenceError::OutOfRange {
            identity: identity.clone(),
            field,
        };

        let rows: Vec<(String, i32)> = sqlx::query_as(
            "SELECT skill_key, level FROM rpg.player_skills WHERE identity = $1 ORDER BY skill_key",
        )
        .bind(identity.as_str())
        .fetch_all(&self.pool)
        .await?;

        let skills = rows
            .into_iter()
            .map(|(key, level)| {
                u32::try_from(level)
                    .map(|level| SkillRecord::new(key, level))
                    .map_err(|_| out_of_range("skill level"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(PlayerRecord {
            identity: identity.clone(),
            level: u32::try_from(level).map_err(|_| out_of_range("level"))?,
            xp: u64::try_from(xp).map_err(|_| out_of_range("xp"))?,
            credits: u64::try_from(credits).map_err(|_| out_of_range("credits"))?,
            skills,
        }))
    }

    async fn create(&self, record: &PlayerRecord) -> Result<(), PersistenceError> {
        let row = Self::to_row(record)?;
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO rpg.players (identity, level, xp, credits)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (identity) DO NOTHING",
        )
        .bind(record.identity.as_str())
        .bind(row.level)
        .bind(row.xp)
        .bind(row.credits)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(PersistenceError::AlreadyExists(record.identity.clone()));
        }

        Self::upsert_skills(record, &mut tx).await?;
        tx.commit().await?;

        tracing::info!("Created progression for player {}", record.identity);
        Ok(())
    }

    async fn save(&self, record: &PlayerRecord) -> Result<(), PersistenceError> {
        let row = Self::to_row(record)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO rpg.players (identity, level, xp, credits)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (identity) DO UPDATE
             SET level = EXCLUDED.level, xp = EXCLUDED.xp, credits = EXCLUDED.credits, updated_at = NOW()",
        )
        .bind(record.identity.as_str())
        .bind(row.level)
        .bind(row.xp)
        .bind(row.credits)
        .execute(&mut *tx)
        .await?;

        Self::upsert_skills(record, &mut tx).await?;
        tx.commit().await?;

        tracing::debug!("Saved progression for player {}", record.identity);
        Ok(())
    }
}
