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

//! Per-player skill instances
//!
//! ## Economics
//! Upgrading from level `L` costs `(L + 1) * 5` credits. Downgrading from level
//! `L` refunds `L * 4` credits, so undoing an upgrade never returns everything
//! that was paid for it.
//!
//! | Level | Upgrade cost | Downgrade refund |
//! |-------|--------------|------------------|
//! | 0     | 5            | 0                |
//! | 1     | 10           | 4                |
//! | 2     | 15           | 8                |
//! | 3     | 20           | 12               |

use super::event::EventContext;
use super::skill_type::SkillType;
use crate::host::HostPlayer;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Credits needed to raise a skill from `level` to `level + 1`.
pub fn upgrade_cost(level: u32) -> u64 {
    (u64::from(level) + 1) * 5
}

/// Credits returned for lowering a skill from `level` to `level - 1`.
pub fn downgrade_refund(level: u32) -> u64 {
    u64::from(level) * 4
}

/// One player's instance of a [`SkillType`].
pub struct Skill {
    skill_type: Arc<SkillType>,
    level: u32,
    /// Private handler state, created by the type's init handler.
    state: Option<Box<dyn Any + Send + Sync>>,
}

impl Skill {
    pub fn new(skill_type: Arc<SkillType>) -> Self {
        Self {
            skill_type,
            level: 0,
            state: None,
        }
    }

    pub fn key(&self) -> &str {
        self.skill_type.key()
    }

    pub fn skill_type(&self) -> &Arc<SkillType> {
        &self.skill_type
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Only the progression state machine changes levels.
    pub(crate) fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn max_level(&self) -> Option<u32> {
        self.skill_type.max_level()
    }

    pub fn upgrade_cost(&self) -> u64 {
        upgrade_cost(self.level)
    }

    pub fn downgrade_refund(&self) -> u64 {
        downgrade_refund(self.level)
    }

    /// Whether the skill is below its cap. Credits are checked by the owner.
    pub fn can_upgrade(&self) -> bool {
        self.skill_type.below_cap(self.level)
    }

    pub fn can_downgrade(&self) -> bool {
        self.level > 0
    }

    /// Run the type's init handler for a freshly attached instance.
    pub fn init(&mut self, player: &dyn HostPlayer) {
        let skill_type = Arc::clone(&self.skill_type);
        if let Some(callback) = skill_type.on_init() {
            callback(self, player);
        }
    }

    /// Invoke the handler bound to `ctx.event`, if any.
    ///
    /// Does not look at the level; leveled-only dispatch is the owner's job.
    pub fn dispatch(&mut self, ctx: &EventContext<'_>) {
        let skill_type = Arc::clone(&self.skill_type);
        if let Some(callback) = skill_type.handler(ctx.event) {
            tracing::trace!("Dispatching {} to skill '{}'", ctx.event, self.key());
            callback(self, skill_type.variables(), skill_type.strings(), ctx);
        }
    }

    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.as_ref().and_then(|s| s.downcast_ref::<T>())
    }

    pub fn state_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.state.as_mut().and_then(|s| s.downcast_mut::<T>())
    }

    pub fn set_state<T: Any + Send + Sync>(&mut self, state: T) {
        self.state = Some(Box::new(state));
    }
}

impl fmt::Debug for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skill")
            .field("key", &self.key())
            .field("level", &self.level)
            .field("max_level", &self.max_level())
            .finish()
    }
}
