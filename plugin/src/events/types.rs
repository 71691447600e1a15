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

//! Notification type definitions

use crate::progression::ProgressEvent;
use rpg_common::{PlayerIdentity, UserId};

/// Progression change published to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The player gained one or more levels in a single grant.
    LevelUp {
        userid: UserId,
        identity: PlayerIdentity,
        levels: u32,
        credits: u64,
    },
    SkillUpgraded {
        userid: UserId,
        identity: PlayerIdentity,
        skill_key: String,
        level: u32,
    },
    SkillDowngraded {
        userid: UserId,
        identity: PlayerIdentity,
        skill_key: String,
        level: u32,
    },
}

impl Notification {
    /// Attach the player to a queued progression event.
    pub fn from_progress(userid: UserId, identity: PlayerIdentity, event: ProgressEvent) -> Self {
        match event {
            ProgressEvent::LevelUp { levels, credits } => Notification::LevelUp {
                userid,
                identity,
                levels,
                credits,
            },
            ProgressEvent::SkillUpgraded { skill_key, level } => Notification::SkillUpgraded {
                userid,
                identity,
                skill_key,
                level,
            },
            ProgressEvent::SkillDowngraded { skill_key, level } => Notification::SkillDowngraded {
                userid,
                identity,
                skill_key,
                level,
            },
        }
    }

    pub fn userid(&self) -> UserId {
        match self {
            Notification::LevelUp { userid, .. }
            | Notification::SkillUpgraded { userid, .. }
            | Notification::SkillDowngraded { userid, .. } => *userid,
        }
    }

    pub fn identity(&self) -> &PlayerIdentity {
        match self {
            Notification::LevelUp { identity, .. }
            | Notification::SkillUpgraded { identity, .. }
            | Notification::SkillDowngraded { identity, .. } => identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_progress() {
        let notification = Notification::from_progress(
            UserId(3),
            PlayerIdentity::from("STEAM_1:1:7"),
            ProgressEvent::SkillUpgraded {
                skill_key: "health".into(),
                level: 2,
            },
        );
        assert_eq!(notification.userid(), UserId(3));
        assert_eq!(notification.identity().as_str(), "STEAM_1:1:7");
        assert!(matches!(
            notification,
            Notification::SkillUpgraded { ref skill_key, level: 2, .. } if skill_key == "health"
        ));
    }
}
