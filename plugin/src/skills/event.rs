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

//! Skill-visible events and their argument shapes

use crate::host::HostPlayer;
use flagset::{FlagSet, flags};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

flags! {
    /// Argument shape carried by a [`SkillEvent`].
    ///
    /// Handlers declare the set of shapes they accept so that a manifest binding
    /// a handler to an incompatible event is rejected at load time.
    pub enum EventShape: u8 {
        /// Only the owning player.
        Solo = 1 << 0,
        /// Attacker, victim, damage and weapon.
        Combat = 1 << 1,
        /// The skill whose level changed.
        SkillChange = 1 << 2,
    }
}

pub type EventShapes = FlagSet<EventShape>;

/// Every event name a skill handler can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillEvent {
    PlayerSpawn,
    PlayerJump,
    PlayerDisconnect,
    /// Once per second while the player is connected.
    PlayerTick,
    PlayerAttack,
    PlayerVictim,
    PlayerSelfharm,
    PlayerKill,
    PlayerDeath,
    PlayerSuicide,
    /// Sent to the skill that was upgraded.
    SkillUpgrade,
    /// Sent to the skill that was downgraded.
    SkillDowngrade,
    /// Sent to every leveled skill of a player who upgraded a skill.
    PlayerUpgradeSkill,
    /// Sent to every leveled skill of a player who downgraded a skill.
    PlayerDowngradeSkill,
}

impl SkillEvent {
    pub fn iter() -> impl Iterator<Item = Self> {
        [
            SkillEvent::PlayerSpawn,
            SkillEvent::PlayerJump,
            SkillEvent::PlayerDisconnect,
            SkillEvent::PlayerTick,
            SkillEvent::PlayerAttack,
            SkillEvent::PlayerVictim,
            SkillEvent::PlayerSelfharm,
            SkillEvent::PlayerKill,
            SkillEvent::PlayerDeath,
            SkillEvent::PlayerSuicide,
            SkillEvent::SkillUpgrade,
            SkillEvent::SkillDowngrade,
            SkillEvent::PlayerUpgradeSkill,
            SkillEvent::PlayerDowngradeSkill,
        ]
        .into_iter()
    }

    pub fn name(&self) -> &'static str {
        match self {
            SkillEvent::PlayerSpawn => "player_spawn",
            SkillEvent::PlayerJump => "player_jump",
            SkillEvent::PlayerDisconnect => "player_disconnect",
            SkillEvent::PlayerTick => "player_tick",
            SkillEvent::PlayerAttack => "player_attack",
            SkillEvent::PlayerVictim => "player_victim",
            SkillEvent::PlayerSelfharm => "player_selfharm",
            SkillEvent::PlayerKill => "player_kill",
            SkillEvent::PlayerDeath => "player_death",
            SkillEvent::PlayerSuicide => "player_suicide",
            SkillEvent::SkillUpgrade => "skill_upgrade",
            SkillEvent::SkillDowngrade => "skill_downgrade",
            SkillEvent::PlayerUpgradeSkill => "player_upgrade_skill",
            SkillEvent::PlayerDowngradeSkill => "player_downgrade_skill",
        }
    }

    /// Shape of the arguments this event is dispatched with.
    pub fn shape(&self) -> EventShape {
        match self {
            SkillEvent::PlayerSpawn
            | SkillEvent::PlayerJump
            | SkillEvent::PlayerDisconnect
            | SkillEvent::PlayerTick => EventShape::Solo,
            SkillEvent::PlayerAttack
            | SkillEvent::PlayerVictim
            | SkillEvent::PlayerSelfharm
            | SkillEvent::PlayerKill
            | SkillEvent::PlayerDeath
            | SkillEvent::PlayerSuicide => EventShape::Combat,
            SkillEvent::SkillUpgrade
            | SkillEvent::SkillDowngrade
            | SkillEvent::PlayerUpgradeSkill
            | SkillEvent::PlayerDowngradeSkill => EventShape::SkillChange,
        }
    }
}

impl fmt::Display for SkillEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SkillEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkillEvent::iter()
            .find(|event| event.name() == s)
            .ok_or_else(|| format!("Unknown skill event '{}'", s))
    }
}

/// Participants of a two-subject event.
#[derive(Clone)]
pub struct CombatArgs {
    /// `None` for world damage and self harm.
    pub attacker: Option<Arc<dyn HostPlayer>>,
    pub victim: Arc<dyn HostPlayer>,
    /// Health removed by the hit, `0` for deaths.
    pub damage: i32,
    pub weapon: String,
}

impl fmt::Debug for CombatArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatArgs")
            .field("attacker", &self.attacker.as_ref().map(|a| a.userid()))
            .field("victim", &self.victim.userid())
            .field("damage", &self.damage)
            .field("weapon", &self.weapon)
            .finish()
    }
}

/// Event specific arguments.
#[derive(Debug, Clone)]
pub enum EventArgs {
    Solo,
    Combat(CombatArgs),
    SkillChange { skill_key: String },
}

impl EventArgs {
    pub fn shape(&self) -> EventShape {
        match self {
            EventArgs::Solo => EventShape::Solo,
            EventArgs::Combat(_) => EventShape::Combat,
            EventArgs::SkillChange { .. } => EventShape::SkillChange,
        }
    }

    pub fn combat(&self) -> Option<&CombatArgs> {
        match self {
            EventArgs::Combat(args) => Some(args),
            _ => None,
        }
    }

    pub fn changed_skill(&self) -> Option<&str> {
        match self {
            EventArgs::SkillChange { skill_key } => Some(skill_key.as_str()),
            _ => None,
        }
    }
}

/// Everything a handler gets to see about the event besides its own skill.
pub struct EventContext<'a> {
    pub event: SkillEvent,
    /// The player owning the skill being dispatched to.
    pub player: &'a dyn HostPlayer,
    pub args: &'a EventArgs,
}

impl<'a> EventContext<'a> {
    pub fn new(event: SkillEvent, player: &'a dyn HostPlayer, args: &'a EventArgs) -> Self {
        Self {
            event,
            player,
            args,
        }
    }
}
