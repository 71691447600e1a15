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

//! Persisted progression rows

use crate::player::PlayerIdentity;
use serde::{Deserialize, Serialize};

/// Saved progression of one player.
///
/// Maps to: `rpg.players` (one row) and `rpg.player_skills` (one row per skill)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub identity: PlayerIdentity,
    pub level: u32,
    pub xp: u64,
    pub credits: u64,
    pub skills: Vec<SkillRecord>,
}

impl PlayerRecord {
    /// Zeroed record for a player that has never been saved.
    pub fn new(identity: PlayerIdentity) -> Self {
        Self {
            identity,
            level: 0,
            xp: 0,
            credits: 0,
            skills: Vec::new(),
        }
    }

    /// Saved level of a skill, if the record has a row for it.
    pub fn skill_level(&self, key: &str) -> Option<u32> {
        self.skills.iter().find(|s| s.key == key).map(|s| s.level)
    }
}

/// Saved level of one skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub key: String,
    pub level: u32,
}

impl SkillRecord {
    pub fn new(key: impl Into<String>, level: u32) -> Self {
        Self {
            key: key.into(),
            level,
        }
    }
}
