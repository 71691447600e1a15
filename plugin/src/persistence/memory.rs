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

//! In-memory progression store

use super::{PersistenceError, ProgressStore};
use async_trait::async_trait;
use rpg_common::{PlayerIdentity, PlayerRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory storage for testing and local development.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: RwLock<HashMap<PlayerIdentity, PlayerRecord>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn load(&self, identity: &PlayerIdentity) -> Result<Option<PlayerRecord>, PersistenceError> {
        let records = self.records.read().await;
        Ok(records.get(identity).cloned())
    }

    async fn create(&self, record: &PlayerRecord) -> Result<(), PersistenceError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.identity) {
            return Err(PersistenceError::AlreadyExists(record.identity.clone()));
        }
        records.insert(record.identity.clone(), record.clone());
        Ok(())
    }

    async fn save(&self, record: &PlayerRecord) -> Result<(), PersistenceError> {
        let mut records = self.records.write().await;
        let stored = records
            .entry(record.identity.clone())
            .or_insert_with(|| PlayerRecord::new(record.identity.clone()));

        stored.level = record.level;
        stored.xp = record.xp;
        stored.credits = record.credits;
        for skill in &record.skills {
            match stored.skills.iter_mut().find(|s| s.key == skill.key) {
                Some(existing) => existing.level = skill.level,
                None => stored.skills.push(skill.clone()),
            }
        }
        Ok(())
    }
}
