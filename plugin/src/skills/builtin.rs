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

//! Built-in skill handlers
//!
//! | Handler                           | Events                    | Variables                                               |
//! |-----------------------------------|---------------------------|---------------------------------------------------------|
//! | `health.apply`                    | solo, skill change        | `health_per_level`                                      |
//! | `health.clamp`                    | skill change              | `health_per_level`                                      |
//! | `icestab.freeze`                  | combat                    | `duration_per_level`                                    |
//! | `impulse.init`                    | init                      |                                                         |
//! | `impulse.boost`                   | combat                    | `boost.base`, `boost.per_level`, `duration.base`, `duration.per_level` |
//! | `impulse.cancel`                  | solo, combat              |                                                         |
//! | `longjump.jump`                   | solo                      | `velocity_multiplier_per_level`                         |
//! | `regeneration.init`               | init                      |                                                         |
//! | `regeneration.start`              | combat, skill change      | `regeneration_per_second_per_level`                     |
//! | `regeneration.tick`               | solo                      |                                                         |
//! | `regeneration.stop`               | solo, combat              |                                                         |
//! | `regeneration.stop_if_unlearned`  | skill change              |                                                         |
//! | `stealth.apply`                   | solo, skill change        | `base_stealth`, `stealth_per_level`                     |
//! | `vampirism.drain`                 | combat                    | `heal_per_damage_per_level`, `maximum_heal_per_level`   |

use super::catalog::HandlerCatalog;
use super::event::{EventContext, EventShape};
use super::skill::Skill;
use super::skill_type::{SkillStrings, Variables, event_callback, init_callback};
use crate::host::TimedEffect;
use rpg_common::Button;
use std::time::Duration;

/// Health every player spawns with before bonuses.
pub const BASE_HEALTH: i32 = 100;

/// Weapon name the ice stab reacts to.
const KNIFE: &str = "knife";

impl HandlerCatalog {
    /// Catalog containing every built-in handler.
    pub fn builtin() -> Self {
        let mut catalog = HandlerCatalog::new();

        catalog.register_handler(
            "health.apply",
            EventShape::Solo | EventShape::SkillChange,
            &["health_per_level"],
            event_callback(health_apply),
        );

        catalog.register_handler(
            "health.clamp",
            EventShape::SkillChange,
            &["health_per_level"],
            event_callback(health_clamp),
        );

        catalog.register_handler(
            "icestab.freeze",
            EventShape::Combat,
            &["duration_per_level"],
            event_callback(icestab_freeze),
        );

        catalog
            .register_init("impulse.init", &[], init_callback(|skill, _player| {
                skill.set_state(ImpulseState::default());
            }))
            .register_handler(
                "impulse.boost",
                EventShape::Combat,
                &["boost.base", "boost.per_level", "duration.base", "duration.per_level"],
                event_callback(impulse_boost),
            )
            .register_handler(
                "impulse.cancel",
                EventShape::Solo | EventShape::Combat,
                &[],
                event_callback(impulse_cancel),
            );

        catalog.register_handler(
            "longjump.jump",
            EventShape::Solo,
            &["velocity_multiplier_per_level"],
            event_callback(longjump_jump),
        );

        catalog
            .register_init("regeneration.init", &[], init_callback(|skill, _player| {
                skill.set_state(RegenerationState::default());
            }))
            .register_handler(
                "regeneration.start",
                EventShape::Combat | EventShape::SkillChange,
                &["regeneration_per_second_per_level"],
                event_callback(regeneration_start),
            )
            .register_handler(
                "regeneration.tick",
                EventShape::Solo,
                &[],
                event_callback(regeneration_tick),
            )
            .register_handler(
                "regeneration.stop",
                EventShape::Solo | EventShape::Combat,
                &[],
                event_callback(regeneration_stop),
            )
            .register_handler(
                "regeneration.stop_if_unlearned",
                EventShape::SkillChange,
                &[],
                event_callback(regeneration_stop_if_unlearned),
            );

        catalog.register_handler(
            "stealth.apply",
            EventShape::Solo | EventShape::SkillChange,
            &["base_stealth", "stealth_per_level"],
            event_callback(stealth_apply),
        );

        catalog.register_handler(
            "vampirism.drain",
            EventShape::Combat,
            &["heal_per_damage_per_level", "maximum_heal_per_level"],
            event_callback(vampirism_drain),
        );

        catalog
    }
}

fn var(variables: &Variables, path: &str) -> f64 {
    variables.get_f64(path).unwrap_or_default()
}

fn seconds(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}

// Health

fn max_health(skill: &Skill, variables: &Variables) -> i32 {
    BASE_HEALTH + (f64::from(skill.level()) * var(variables, "health_per_level")) as i32
}

fn health_apply(skill: &mut Skill, variables: &Variables, _: &SkillStrings, ctx: &EventContext<'_>) {
    let max_health = max_health(skill, variables);
    ctx.player.set_max_health(max_health);
    ctx.player.set_health(max_health);
}

/// Lower the cap without healing.
fn health_clamp(skill: &mut Skill, variables: &Variables, _: &SkillStrings, ctx: &EventContext<'_>) {
    let max_health = max_health(skill, variables);
    ctx.player.set_max_health(max_health);
    ctx.player.set_health(ctx.player.health().min(max_health));
}

// Ice Stab

fn icestab_freeze(skill: &mut Skill, variables: &Variables, _: &SkillStrings, ctx: &EventContext<'_>) {
    let Some(combat) = ctx.args.combat() else {
        return;
    };
    if combat.weapon == KNIFE && ctx.player.buttons().contains(Button::Attack2) {
        let duration = var(variables, "duration_per_level") * f64::from(skill.level());
        combat.victim.freeze(seconds(duration));
    }
}

// Impulse

#[derive(Default)]
struct ImpulseState {
    boost: Option<Box<dyn TimedEffect>>,
}

fn impulse_boost(skill: &mut Skill, variables: &Variables, _: &SkillStrings, ctx: &EventContext<'_>) {
    let level = f64::from(skill.level());
    let Some(state) = skill.state_mut::<ImpulseState>() else {
        return;
    };
    // One boost at a time.
    if state.boost.as_ref().is_some_and(|boost| boost.is_running()) {
        return;
    }
    let amount = var(variables, "boost.base") + var(variables, "boost.per_level") * level;
    let duration = var(variables, "duration.base") + var(variables, "duration.per_level") * level;
    state.boost = Some(ctx.player.shift_speed(amount as f32, seconds(duration)));
}

fn impulse_cancel(skill: &mut Skill, _: &Variables, _: &SkillStrings, _: &EventContext<'_>) {
    if let Some(state) = skill.state_mut::<ImpulseState>() {
        if let Some(mut boost) = state.boost.take() {
            if boost.is_running() {
                boost.cancel();
            }
        }
    }
}

// Long Jump

fn longjump_jump(skill: &mut Skill, variables: &Variables, _: &SkillStrings, ctx: &EventContext<'_>) {
    let multiplier = 1.0 + var(variables, "velocity_multiplier_per_level") * f64::from(skill.level());
    let mut velocity = ctx.player.velocity();
    velocity.x *= multiplier as f32;
    velocity.y *= multiplier as f32;
    ctx.player.set_base_velocity(velocity);
}

// Regeneration

#[derive(Debug, Default)]
struct RegenerationState {
    active: bool,
    per_tick: i32,
}

fn regeneration_start(
    skill: &mut Skill,
    variables: &Variables,
    _: &SkillStrings,
    _: &EventContext<'_>,
) {
    let per_tick =
        (f64::from(skill.level()) * var(variables, "regeneration_per_second_per_level")) as i32;
    if let Some(state) = skill.state_mut::<RegenerationState>() {
        state.active = per_tick > 0;
        state.per_tick = per_tick;
    }
}

fn regeneration_tick(skill: &mut Skill, _: &Variables, _: &SkillStrings, ctx: &EventContext<'_>) {
    let Some(state) = skill.state_mut::<RegenerationState>() else {
        return;
    };
    if !state.active {
        return;
    }
    let max_health = ctx.player.max_health();
    let health = (ctx.player.health() + state.per_tick).min(max_health);
    ctx.player.set_health(health);
    if health >= max_health {
        state.active = false;
    }
}

fn regeneration_stop(skill: &mut Skill, _: &Variables, _: &SkillStrings, _: &EventContext<'_>) {
    if let Some(state) = skill.state_mut::<RegenerationState>() {
        state.active = false;
    }
}

fn regeneration_stop_if_unlearned(
    skill: &mut Skill,
    variables: &Variables,
    strings: &SkillStrings,
    ctx: &EventContext<'_>,
) {
    if skill.level() == 0 {
        regeneration_stop(skill, variables, strings, ctx);
    }
}

// Stealth

fn stealth_apply(skill: &mut Skill, variables: &Variables, _: &SkillStrings, ctx: &EventContext<'_>) {
    let invisibility = var(variables, "base_stealth")
        + var(variables, "stealth_per_level") * f64::from(skill.level());
    let alpha = (255.0 * (1.0 - invisibility.clamp(0.0, 1.0))).round() as u8;
    ctx.player.set_alpha(alpha);
}

// Vampirism

fn vampirism_drain(skill: &mut Skill, variables: &Variables, _: &SkillStrings, ctx: &EventContext<'_>) {
    let Some(combat) = ctx.args.combat() else {
        return;
    };
    let level = f64::from(skill.level());
    let attempt = (f64::from(combat.damage) * level * var(variables, "heal_per_damage_per_level")) as i32;
    let cap = (level * var(variables, "maximum_heal_per_level")) as i32;
    let heal = attempt.min(cap).max(0);
    let max_health = ctx.player.max_health();
    ctx.player
        .set_health((ctx.player.health() + heal).min(max_health));
}
