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

//! Host event routing
//!
//! | Host event          | Attacker distinct          | Self-harm (none, same, unknown) |
//! |---------------------|----------------------------|---------------------------------|
//! | `player_hurt`       | `player_attack` / `player_victim` | `player_selfharm`        |
//! | `player_death`      | `player_kill` / `player_death`    | `player_suicide`         |
//!
//! Spawn, jump and disconnect are passed through under their own names to
//! players on a playing team. A distinct attacker also earns experience.

use crate::config::XpGainConfig;
use crate::progression::ProgressEvent;
use crate::session::{PlayerSession, Sessions};
use crate::skills::{CombatArgs, EventArgs, SkillEvent};
use rpg_common::{HostEvent, UserId};
use std::sync::Arc;

/// Skill events raised by one two-subject host event.
#[derive(Debug, Clone, Copy)]
struct CombatEvents {
    attack: SkillEvent,
    victim: SkillEvent,
    selfharm: SkillEvent,
}

const HURT: CombatEvents = CombatEvents {
    attack: SkillEvent::PlayerAttack,
    victim: SkillEvent::PlayerVictim,
    selfharm: SkillEvent::PlayerSelfharm,
};

const DEATH: CombatEvents = CombatEvents {
    attack: SkillEvent::PlayerKill,
    victim: SkillEvent::PlayerDeath,
    selfharm: SkillEvent::PlayerSuicide,
};

/// Turns host events into skill dispatches and experience awards
#[derive(Debug, Clone)]
pub struct EventRouter {
    xp_gain: XpGainConfig,
}

impl EventRouter {
    pub fn new(xp_gain: XpGainConfig) -> Self {
        Self { xp_gain }
    }

    pub fn route(&self, sessions: &mut Sessions, event: &HostEvent) {
        tracing::debug!("Routing {} for {}", event.name(), event.userid());
        match event {
            HostEvent::PlayerSpawn { userid } => {
                self.route_solo(sessions, *userid, SkillEvent::PlayerSpawn)
            }
            HostEvent::PlayerJump { userid } => {
                self.route_solo(sessions, *userid, SkillEvent::PlayerJump)
            }
            HostEvent::PlayerDisconnect { userid } => {
                self.route_solo(sessions, *userid, SkillEvent::PlayerDisconnect)
            }
            HostEvent::PlayerHurt {
                userid,
                attacker,
                damage,
                weapon,
            } => {
                let attacker = self.route_combat(sessions, *userid, *attacker, *damage, weapon, HURT);
                if let Some(attacker) = attacker {
                    self.award(sessions, attacker, self.xp_gain.damage_xp(*damage));
                }
            }
            HostEvent::PlayerDeath {
                userid,
                attacker,
                weapon,
            } => {
                let attacker = self.route_combat(sessions, *userid, *attacker, 0, weapon, DEATH);
                if let Some(attacker) = attacker {
                    let victim_level = sessions
                        .get(userid)
                        .map(|s| s.progression.level())
                        .unwrap_or_default();
                    self.award(sessions, attacker, self.xp_gain.kill_xp(victim_level));
                }
            }
        }
    }

    /// Raise the per-second tick for every connected player.
    pub fn tick(&self, sessions: &mut Sessions) {
        let userids: Vec<UserId> = sessions.keys().copied().collect();
        for userid in userids {
            self.route_solo(sessions, userid, SkillEvent::PlayerTick);
        }
    }

    /// Let skills react to a skill transaction of their own player.
    ///
    /// Every leveled skill sees the player-wide event first, then the changed
    /// skill sees its own event even if it has just dropped to level zero.
    pub fn redispatch(&self, session: &mut PlayerSession, event: &ProgressEvent) {
        let (player_event, skill_event, skill_key) = match event {
            ProgressEvent::SkillUpgraded { skill_key, .. } => (
                SkillEvent::PlayerUpgradeSkill,
                SkillEvent::SkillUpgrade,
                skill_key,
            ),
            ProgressEvent::SkillDowngraded { skill_key, .. } => (
                SkillEvent::PlayerDowngradeSkill,
                SkillEvent::SkillDowngrade,
                skill_key,
            ),
            ProgressEvent::LevelUp { .. } => return,
        };

        let args = EventArgs::SkillChange {
            skill_key: skill_key.clone(),
        };
        let host = session.host.as_ref();
        session.progression.trigger_skills(player_event, host, &args);
        if let Err(e) = session
            .progression
            .dispatch_to(skill_key, skill_event, host, &args)
        {
            tracing::debug!("Skipping {} redispatch: {}", skill_event, e);
        }
    }

    fn route_solo(&self, sessions: &mut Sessions, userid: UserId, event: SkillEvent) {
        let Some(session) = sessions.get_mut(&userid) else {
            tracing::debug!("Ignoring {} for unknown player {}", event, userid);
            return;
        };
        if !session.host.team().is_playing() {
            tracing::debug!("Ignoring {} for {} outside a playing team", event, userid);
            return;
        }
        session
            .progression
            .trigger_skills(event, session.host.as_ref(), &EventArgs::Solo);
    }

    /// Dispatch a two-subject event and return the attacker if it was distinct.
    fn route_combat(
        &self,
        sessions: &mut Sessions,
        victim: UserId,
        attacker: Option<UserId>,
        damage: i32,
        weapon: &str,
        events: CombatEvents,
    ) -> Option<UserId> {
        let Some(victim_host) = sessions.get(&victim).map(|s| Arc::clone(&s.host)) else {
            tracing::debug!("Ignoring combat event for unknown player {}", victim);
            return None;
        };
        let attacker_host = attacker
            .and_then(|id| sessions.get(&id))
            .map(|s| Arc::clone(&s.host));
        let distinct = attacker.filter(|id| *id != victim && attacker_host.is_some());

        let args = EventArgs::Combat(CombatArgs {
            attacker: attacker_host.clone(),
            victim: Arc::clone(&victim_host),
            damage,
            weapon: weapon.to_string(),
        });

        match (distinct, attacker_host) {
            (Some(attacker), Some(attacker_host)) => {
                if let Some(session) = sessions.get_mut(&attacker) {
                    session
                        .progression
                        .trigger_skills(events.attack, attacker_host.as_ref(), &args);
                }
                if let Some(session) = sessions.get_mut(&victim) {
                    session
                        .progression
                        .trigger_skills(events.victim, victim_host.as_ref(), &args);
                }
                Some(attacker)
            }
            _ => {
                if let Some(session) = sessions.get_mut(&victim) {
                    session
                        .progression
                        .trigger_skills(events.selfharm, victim_host.as_ref(), &args);
                }
                None
            }
        }
    }

    fn award(&self, sessions: &mut Sessions, userid: UserId, amount: u64) {
        if amount == 0 {
            return;
        }
        if let Some(session) = sessions.get_mut(&userid) {
            tracing::debug!("Awarding {} XP to {}", amount, userid);
            session.progression.add_xp(amount);
        }
    }
}
