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

//! Game events raised by the host

use crate::player::UserId;
use serde::{Deserialize, Serialize};

/// Game-world occurrences the progression engine reacts to.
///
/// Connecting is not an event here; the host hands over the player object and
/// its identity through a dedicated call instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostEvent {
    PlayerSpawn {
        userid: UserId,
    },
    PlayerJump {
        userid: UserId,
    },
    PlayerDisconnect {
        userid: UserId,
    },
    /// A player took damage. `attacker` is `None` for world damage.
    PlayerHurt {
        userid: UserId,
        attacker: Option<UserId>,
        damage: i32,
        weapon: String,
    },
    /// A player died. `attacker` is `None` for world kills.
    PlayerDeath {
        userid: UserId,
        attacker: Option<UserId>,
        weapon: String,
    },
}

impl HostEvent {
    /// Engine name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::PlayerSpawn { .. } => "player_spawn",
            HostEvent::PlayerJump { .. } => "player_jump",
            HostEvent::PlayerDisconnect { .. } => "player_disconnect",
            HostEvent::PlayerHurt { .. } => "player_hurt",
            HostEvent::PlayerDeath { .. } => "player_death",
        }
    }

    /// The player the event is about (the victim for two-subject events).
    pub fn userid(&self) -> UserId {
        match self {
            HostEvent::PlayerSpawn { userid }
            | HostEvent::PlayerJump { userid }
            | HostEvent::PlayerDisconnect { userid }
            | HostEvent::PlayerHurt { userid, .. }
            | HostEvent::PlayerDeath { userid, .. } => *userid,
        }
    }
}
