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

//! RPG Common Types
//!
//! This crate defines the types shared between the progression engine and the
//! host bindings that feed it:
//! - Player handles and identities ([`UserId`], [`PlayerIdentity`], [`Team`])
//! - Host input state ([`Buttons`], [`Vector`])
//! - Game events raised by the host ([`HostEvent`])
//! - Persisted progression rows ([`PlayerRecord`], [`SkillRecord`])

pub mod event;
pub mod player;
pub mod record;

pub use event::HostEvent;
pub use player::{Button, Buttons, PlayerIdentity, Team, UserId, Vector};
pub use record::{PlayerRecord, SkillRecord};
