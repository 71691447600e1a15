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

//! Player session tracking
//!
//! A session exists from connect to disconnect and pairs the host's player
//! proxy with that player's progression. Sessions live only in memory; the
//! progression is written to the store on save.

use crate::host::HostPlayer;
use crate::progression::Progression;
use rpg_common::{PlayerIdentity, UserId};
use std::collections::HashMap;
use std::sync::Arc;

/// Connected sessions keyed by the host's user id.
pub type Sessions = HashMap<UserId, PlayerSession>;

/// State tracked for one connected player
pub struct PlayerSession {
    /// Host proxy for the player entity
    pub host: Arc<dyn HostPlayer>,

    /// Progression loaded at connect
    pub progression: Progression,
}

impl PlayerSession {
    pub fn new(host: Arc<dyn HostPlayer>, progression: Progression) -> Self {
        Self { host, progression }
    }

    pub fn userid(&self) -> UserId {
        self.host.userid()
    }

    pub fn identity(&self) -> &PlayerIdentity {
        self.progression.identity()
    }

    pub fn is_bot(&self) -> bool {
        self.host.is_bot()
    }
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("userid", &self.host.userid())
            .field("progression", &self.progression)
            .finish()
    }
}
