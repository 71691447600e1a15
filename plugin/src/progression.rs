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

//! # Player Progression
//!
//! Experience, levels, credits and the player's skill instances.
//!
//! ## Leveling
//! The experience needed to advance from level `L` is
//!
//! XP(L) = base + per_level * L
//!
//! With the default `100 + 20 * L`:
//!
//! | Level | XP to next | Total XP |
//! |-------|------------|----------|
//! | 0     | 100        | 100      |
//! | 1     | 120        | 220      |
//! | 2     | 140        | 360      |
//! | 3     | 160        | 520      |
//!
//! Granted experience is added to the current progress, then every full
//! threshold is consumed, so one large grant can yield several levels.
//! Afterwards `xp < XP(level)` always holds. Each level gained awards
//! `credits_per_level` credits.
//!
//! Levels stop at [`MAX_LEVEL`]; experience beyond the last threshold is
//! dropped. Balances never exceed [`MAX_BALANCE`].
//!
//! ## Notifications
//! Mutations that other components care about queue a [`ProgressEvent`]; the
//! owner collects them with [`Progression::drain_events`].

use crate::host::HostPlayer;
use crate::skills::{EventArgs, EventContext, Skill, SkillEvent, SkillRegistry};
use rpg_common::{PlayerIdentity, PlayerRecord, SkillRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Highest reachable level. Same range as the stored level column.
pub const MAX_LEVEL: u32 = i32::MAX as u32;

/// Ceiling of experience and credits. Same range as the stored balance columns.
pub const MAX_BALANCE: u64 = i64::MAX as u64;

/// Rejected progression calls. None of them mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Unknown skill '{0}'")]
    UnknownSkill(String),
}

/// Notification queued by a progression mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    LevelUp { levels: u32, credits: u64 },
    SkillUpgraded { skill_key: String, level: u32 },
    SkillDowngraded { skill_key: String, level: u32 },
}

/// Leveling curve and rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Leveling {
    pub required_xp_base: u64,
    pub required_xp_per_level: u64,
    pub credits_per_level: u64,
}

impl Default for Leveling {
    fn default() -> Self {
        Self {
            required_xp_base: 100,
            required_xp_per_level: 20,
            credits_per_level: 5,
        }
    }
}

impl Leveling {
    /// Experience needed to advance from `level` to `level + 1`. Never zero.
    pub fn required_xp(&self, level: u32) -> u64 {
        self.required_xp_per_level
            .saturating_mul(u64::from(level))
            .saturating_add(self.required_xp_base)
            .max(1)
    }

    /// Experience needed to advance `count` levels starting at `level`, the
    /// sum of [`required_xp`](Self::required_xp) over those levels.
    fn xp_for_levels(&self, level: u32, count: u32) -> u128 {
        let base = u128::from(self.required_xp_base);
        let per_level = u128::from(self.required_xp_per_level);
        let (level, count) = (u128::from(level), u128::from(count));

        // level + (level + 1) + ... + (level + count - 1)
        let level_sum = count
            .saturating_mul(level)
            .saturating_add(count.saturating_mul(count.saturating_sub(1)) / 2);
        let mut total = count
            .saturating_mul(base)
            .saturating_add(per_level.saturating_mul(level_sum));

        // Thresholds that would be zero cost one.
        if base == 0 {
            if per_level == 0 {
                total = total.saturating_add(count);
            } else if level == 0 && count > 0 {
                total = total.saturating_add(1);
            }
        }
        total
    }

    pub fn validate(&self) -> Result<(), ProgressError> {
        if self.required_xp_base == 0 {
            return Err(ProgressError::InvalidArgument(
                "required_xp_base must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Progression state of one player.
#[derive(Debug)]
pub struct Progression {
    identity: PlayerIdentity,
    leveling: Leveling,
    level: u32,
    xp: u64,
    credits: u64,
    /// In registry order; dispatch follows this order.
    skills: Vec<Skill>,
    pending: Vec<ProgressEvent>,
}

impl Progression {
    /// Zeroed progression without any skills.
    pub fn new(identity: PlayerIdentity, leveling: Leveling) -> Self {
        Self {
            identity,
            leveling,
            level: 0,
            xp: 0,
            credits: 0,
            skills: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Zeroed progression owning one unlearned skill per registered type.
    pub fn from_registry(
        identity: PlayerIdentity,
        leveling: Leveling,
        registry: &SkillRegistry,
    ) -> Self {
        let mut progression = Self::new(identity, leveling);
        for skill_type in registry.iter() {
            progression.add_skill(Skill::new(Arc::clone(skill_type)));
        }
        progression
    }

    /// Attach a skill, replacing an existing one with the same key.
    pub fn add_skill(&mut self, skill: Skill) {
        match self.skills.iter_mut().find(|s| s.key() == skill.key()) {
            Some(existing) => *existing = skill,
            None => self.skills.push(skill),
        }
    }

    /// Run every skill's init handler for the player they now belong to.
    pub fn init_skills(&mut self, player: &dyn HostPlayer) {
        for skill in &mut self.skills {
            skill.init(player);
        }
    }

    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    pub fn leveling(&self) -> &Leveling {
        &self.leveling
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn credits(&self) -> u64 {
        self.credits
    }

    /// Experience needed to reach the next level.
    pub fn required_xp(&self) -> u64 {
        self.leveling.required_xp(self.level)
    }

    pub fn skills(&self) -> impl Iterator<Item = &Skill> + '_ {
        self.skills.iter()
    }

    pub fn skill(&self, key: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.key() == key)
    }

    fn skill_mut(&mut self, key: &str) -> Result<&mut Skill, ProgressError> {
        self.skills
            .iter_mut()
            .find(|s| s.key() == key)
            .ok_or_else(|| ProgressError::UnknownSkill(key.to_string()))
    }

    /// Grant experience, leveling up as many times as it covers.
    ///
    /// Returns the number of levels gained.
    pub fn grant_xp(&mut self, amount: i64) -> Result<u32, ProgressError> {
        let amount = u64::try_from(amount).map_err(|_| {
            ProgressError::InvalidArgument(format!("Negative XP amount {}", amount))
        })?;
        Ok(self.add_xp(amount))
    }

    /// Infallible form of [`grant_xp`](Self::grant_xp) for amounts computed
    /// by the plugin itself.
    pub fn add_xp(&mut self, amount: u64) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        self.settle()
    }

    /// Consume every full threshold and queue a level-up if any was crossed.
    fn settle(&mut self) -> u32 {
        let xp = u128::from(self.xp);

        // Largest number of levels the current experience pays for.
        let (mut levels, mut high) = (0, MAX_LEVEL.saturating_sub(self.level));
        while levels < high {
            let mid = levels + (high - levels).div_ceil(2);
            if self.leveling.xp_for_levels(self.level, mid) <= xp {
                levels = mid;
            } else {
                high = mid - 1;
            }
        }

        if levels > 0 {
            let spent = self.leveling.xp_for_levels(self.level, levels);
            self.xp = u64::try_from(xp - spent).unwrap_or(MAX_BALANCE);
            self.level += levels;
        }
        if self.level == MAX_LEVEL {
            self.xp = self.xp.min(self.required_xp() - 1);
        }
        self.xp = self.xp.min(MAX_BALANCE);

        if levels > 0 {
            let credits = u64::from(levels).saturating_mul(self.leveling.credits_per_level);
            self.credits = self.credits.saturating_add(credits).min(MAX_BALANCE);
            tracing::debug!(
                "{} reached level {} (+{} levels, +{} credits)",
                self.identity,
                self.level,
                levels,
                credits
            );
            self.pending.push(ProgressEvent::LevelUp { levels, credits });
        }
        levels
    }

    /// Set the level directly and clear progress towards the next one.
    pub fn set_level(&mut self, value: i64) -> Result<(), ProgressError> {
        let level = u32::try_from(value)
            .ok()
            .filter(|level| *level <= MAX_LEVEL)
            .ok_or_else(|| ProgressError::InvalidArgument(format!("Invalid level {}", value)))?;
        self.level = level;
        self.xp = 0;
        Ok(())
    }

    /// Zero level, experience, credits and every skill level.
    pub fn reset_progress(&mut self) {
        self.level = 0;
        self.xp = 0;
        self.credits = 0;
        for skill in &mut self.skills {
            skill.set_level(0);
        }
    }

    pub fn can_upgrade_skill(&self, key: &str) -> bool {
        self.skill(key)
            .is_some_and(|s| s.can_upgrade() && self.credits >= s.upgrade_cost())
    }

    pub fn can_downgrade_skill(&self, key: &str) -> bool {
        self.skill(key).is_some_and(Skill::can_downgrade)
    }

    /// Buy one level of a skill.
    pub fn upgrade_skill(&mut self, key: &str) -> Result<(), ProgressError> {
        let credits = self.credits;
        let skill = self.skill_mut(key)?;
        if !skill.can_upgrade() {
            return Err(ProgressError::InvalidOperation(format!(
                "Skill '{}' is already at its maximum level",
                key
            )));
        }
        let cost = skill.upgrade_cost();
        if credits < cost {
            return Err(ProgressError::InvalidOperation(format!(
                "Upgrading '{}' costs {} credits but only {} are available",
                key, cost, credits
            )));
        }

        let level = skill.level() + 1;
        skill.set_level(level);
        self.credits -= cost;
        self.pending.push(ProgressEvent::SkillUpgraded {
            skill_key: key.to_string(),
            level,
        });
        Ok(())
    }

    /// Sell one level of a skill.
    pub fn downgrade_skill(&mut self, key: &str) -> Result<(), ProgressError> {
        let skill = self.skill_mut(key)?;
        if !skill.can_downgrade() {
            return Err(ProgressError::InvalidOperation(format!(
                "Skill '{}' has no levels to downgrade",
                key
            )));
        }

        let refund = skill.downgrade_refund();
        let level = skill.level() - 1;
        skill.set_level(level);
        self.credits = self.credits.saturating_add(refund).min(MAX_BALANCE);
        self.pending.push(ProgressEvent::SkillDowngraded {
            skill_key: key.to_string(),
            level,
        });
        Ok(())
    }

    /// Dispatch an event to every leveled skill, in registry order.
    pub fn trigger_skills(&mut self, event: SkillEvent, player: &dyn HostPlayer, args: &EventArgs) {
        let ctx = EventContext::new(event, player, args);
        for skill in self.skills.iter_mut().filter(|s| s.level() > 0) {
            skill.dispatch(&ctx);
        }
    }

    /// Dispatch an event to one skill regardless of its level.
    pub fn dispatch_to(
        &mut self,
        key: &str,
        event: SkillEvent,
        player: &dyn HostPlayer,
        args: &EventArgs,
    ) -> Result<(), ProgressError> {
        let skill = self.skill_mut(key)?;
        skill.dispatch(&EventContext::new(event, player, args));
        Ok(())
    }

    /// Take every queued notification, oldest first.
    pub fn drain_events(&mut self) -> Vec<ProgressEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Apply saved values.
    ///
    /// Saved levels of skills this progression does not own are ignored, and
    /// levels above a skill's cap are clamped. If the curve has changed since the
    /// record was written, leftover experience is settled immediately.
    pub fn restore(&mut self, record: &PlayerRecord) {
        self.level = record.level.min(MAX_LEVEL);
        self.xp = record.xp;
        self.credits = record.credits.min(MAX_BALANCE);

        for saved in &record.skills {
            match self.skills.iter_mut().find(|s| s.key() == saved.key) {
                Some(skill) => {
                    let level = match skill.max_level() {
                        Some(max) if saved.level > max => {
                            tracing::warn!(
                                "Clamping {}'s skill '{}' from level {} to {}",
                                self.identity,
                                saved.key,
                                saved.level,
                                max
                            );
                            max
                        }
                        _ => saved.level,
                    };
                    skill.set_level(level);
                }
                None => tracing::debug!(
                    "Ignoring {}'s saved level in unknown skill '{}'",
                    self.identity,
                    saved.key
                ),
            }
        }

        self.settle();
    }

    /// Snapshot for persistence.
    pub fn to_record(&self) -> PlayerRecord {
        PlayerRecord {
            identity: self.identity.clone(),
            level: self.level,
            xp: self.xp,
            credits: self.credits,
            skills: self
                .skills
                .iter()
                .map(|s| SkillRecord::new(s.key(), s.level()))
                .collect(),
        }
    }
}
