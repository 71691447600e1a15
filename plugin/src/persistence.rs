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

//! Progression storage
//!
//! Players are keyed by their stable [`PlayerIdentity`]. A store holds one row
//! per player (level, xp, credits) and one row per (player, skill key).
//!
//! Saving only ever inserts or updates skill rows. Rows of skills that are no
//! longer installed stay in storage untouched and come back to life if the
//! skill is reinstalled.

mod memory;
mod postgres;

pub use memory::MemoryProgressStore;
pub use postgres::PgProgressStore;

use async_trait::async_trait;
use rpg_common::{PlayerIdentity, PlayerRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Player {0} already exists")]
    AlreadyExists(PlayerIdentity),

    #[error("Player {0} does not exist")]
    NotFound(PlayerIdentity),

    #[error("Stored {field} of player {identity} is out of range")]
    OutOfRange {
        identity: PlayerIdentity,
        field: &'static str,
    },
}

/// Identity-keyed progression store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Saved progression, or `None` for a player never seen before.
    async fn load(&self, identity: &PlayerIdentity) -> Result<Option<PlayerRecord>, PersistenceError>;

    /// Insert a new player.
    async fn create(&self, record: &PlayerRecord) -> Result<(), PersistenceError>;

    /// Write a player's current progression.
    async fn save(&self, record: &PlayerRecord) -> Result<(), PersistenceError>;
}
