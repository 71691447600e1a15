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

//! Host collaborator interfaces
//!
//! The plugin never owns the game simulation. Everything it can observe or change
//! about a player goes through these traits, which host bindings implement on
//! top of the engine's own player objects and menu widgets.

use rpg_common::{Buttons, Team, UserId, Vector};
use std::time::Duration;

/// Proxy for a host player entity.
///
/// Methods take `&self`: the proxy forwards every call into the engine, which
/// owns the actual entity state.
pub trait HostPlayer: Send + Sync {
    fn userid(&self) -> UserId;
    fn name(&self) -> String;
    fn is_bot(&self) -> bool;
    fn team(&self) -> Team;

    fn health(&self) -> i32;
    fn set_health(&self, value: i32);
    fn max_health(&self) -> i32;
    fn set_max_health(&self, value: i32);

    fn velocity(&self) -> Vector;
    fn set_base_velocity(&self, value: Vector);

    /// Buttons held during the current frame.
    fn buttons(&self) -> Buttons;

    /// Render alpha, `0` invisible through `255` opaque.
    fn set_alpha(&self, alpha: u8);

    /// Freeze the player in place for `duration`.
    fn freeze(&self, duration: Duration);

    /// Temporarily add `amount` to the player's speed multiplier.
    fn shift_speed(&self, amount: f32, duration: Duration) -> Box<dyn TimedEffect>;
}

/// Handle to a temporary effect scheduled by the host.
pub trait TimedEffect: Send + Sync {
    fn is_running(&self) -> bool;
    /// Revert the effect early. No-op once it has expired.
    fn cancel(&mut self);
}

/// Localized text lookup keyed by skill key and string name.
pub trait TextLookup: Send + Sync {
    fn lookup(&self, skill_key: &str, name: &str) -> Option<String>;
}

/// Lookup that never resolves anything, leaving callers with their fallbacks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTranslations;

impl TextLookup for NoTranslations {
    fn lookup(&self, _skill_key: &str, _name: &str) -> Option<String> {
        None
    }
}

/// Menu presentation facility of the host.
pub trait MenuPresenter: Send + Sync {
    /// Render `page` on the player's screen.
    fn present(&self, userid: UserId, page: &crate::menus::MenuPage);

    /// Print a chat line to a single player.
    fn message(&self, userid: UserId, text: &str);
}
