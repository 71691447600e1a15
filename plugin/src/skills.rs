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

//! # Skills
//!
//! A [`SkillType`] is the shared definition of a skill: its key, level cap, text
//! handles, tunable variables and event handlers. Types are loaded once at
//! startup into the [`SkillRegistry`] and never change afterwards.
//!
//! A [`Skill`] is one player's instance of a type and carries nothing but a level
//! and private handler state. Every connected player owns one instance of every
//! registered type, in registry order.
//!
//! Handlers are plain Rust functions registered by name in a
//! [`HandlerCatalog`]; manifests bind event names to catalog names.

mod builtin;
mod catalog;
mod event;
mod registry;
mod skill;
mod skill_type;

pub use builtin::BASE_HEALTH;
pub use catalog::HandlerCatalog;
pub use event::{CombatArgs, EventArgs, EventContext, EventShape, EventShapes, SkillEvent};
pub use registry::{
    MANIFEST_FILE, ORDER_FILE, RegistryError, SkillBuildError, SkillRegistry, build_skill_type,
};
pub use skill::{Skill, downgrade_refund, upgrade_cost};
pub use skill_type::{
    EventCallback, InitCallback, SkillStrings, SkillType, SkillTypeBuilder, Variables,
    event_callback, init_callback,
};
