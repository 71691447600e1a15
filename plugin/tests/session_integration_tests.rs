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

//! Session lifecycle integration tests

mod common;

use common::TestPlayer;
use rpg_common::{HostEvent, PlayerIdentity, PlayerRecord, SkillRecord, Team, UserId, Vector};
use rpg_plugin::config::GameplayConfig;
use rpg_plugin::context::RpgContext;
use rpg_plugin::events::Notification;
use rpg_plugin::host::HostPlayer;
use rpg_plugin::persistence::{MemoryProgressStore, ProgressStore};
use rpg_plugin::skills::{HandlerCatalog, SkillRegistry};
use std::sync::{Arc, Mutex};

fn registry() -> Arc<SkillRegistry> {
    Arc::new(SkillRegistry::load(common::skills_path(), &HandlerCatalog::builtin()).unwrap())
}

fn identity(userid: u32) -> PlayerIdentity {
    PlayerIdentity::new(format!("STEAM_1:1:{}", userid))
}

#[tokio::test]
async fn test_new_player_is_persisted_on_connect() {
    let store = Arc::new(MemoryProgressStore::new());
    let mut ctx = RpgContext::new(registry(), store.clone(), &GameplayConfig::default());

    ctx.connect_player(Arc::new(TestPlayer::new(1)), identity(1))
        .await
        .unwrap();

    let record = store.load(&identity(1)).await.unwrap().unwrap();
    assert_eq!(record.level, 0);
    assert_eq!(record.skills.len(), 7);
    assert!(record.skills.iter().all(|s| s.level == 0));
    ctx.shutdown().await;
}

#[tokio::test]
async fn test_skills_apply_after_purchase() {
    let store = Arc::new(MemoryProgressStore::new());
    let mut ctx = RpgContext::new(registry(), store.clone(), &GameplayConfig::default());
    let player = Arc::new(TestPlayer::new(1));
    ctx.connect_player(player.clone(), identity(1)).await.unwrap();

    ctx.grant_xp(UserId(1), 100).unwrap();
    ctx.upgrade_skill(UserId(1), "health").unwrap();
    // The upgrade itself reapplies the bonus.
    assert_eq!(player.max_health(), 125);

    player.set_health(10);
    ctx.handle_event(&HostEvent::PlayerSpawn { userid: UserId(1) });
    assert_eq!(player.health(), 125);

    player.set_velocity(Vector::new(100.0, 0.0, 50.0));
    ctx.handle_event(&HostEvent::PlayerJump { userid: UserId(1) });
    assert_eq!(player.base_velocity(), None);

    ctx.shutdown().await;
}

#[tokio::test]
async fn test_selling_health_does_not_heal() {
    let store = Arc::new(MemoryProgressStore::new());
    let mut ctx = RpgContext::new(registry(), store, &GameplayConfig::default());
    let player = Arc::new(TestPlayer::new(1));
    ctx.connect_player(player.clone(), identity(1)).await.unwrap();

    ctx.grant_xp(UserId(1), 100).unwrap();
    ctx.upgrade_skill(UserId(1), "health").unwrap();
    assert_eq!(player.health(), 125);

    player.set_health(40);
    ctx.downgrade_skill(UserId(1), "health").unwrap();
    assert_eq!(player.max_health(), 100);
    assert_eq!(player.health(), 40);

    ctx.shutdown().await;
}

#[tokio::test]
async fn test_spectators_are_not_affected() {
    let store = Arc::new(MemoryProgressStore::new());
    let mut ctx = RpgContext::new(registry(), store, &GameplayConfig::default());
    let player = Arc::new(TestPlayer::new(1));
    ctx.connect_player(player.clone(), identity(1)).await.unwrap();
    ctx.grant_xp(UserId(1), 100).unwrap();
    ctx.upgrade_skill(UserId(1), "stealth").unwrap();
    player.set_alpha(255);

    player.set_team(Team::Spectator);
    ctx.handle_event(&HostEvent::PlayerSpawn { userid: UserId(1) });
    assert_eq!(player.alpha(), 255);

    player.set_team(Team::Terrorist);
    ctx.handle_event(&HostEvent::PlayerSpawn { userid: UserId(1) });
    assert_eq!(player.alpha(), 204);

    ctx.shutdown().await;
}

#[tokio::test]
async fn test_kill_levels_up_attacker() {
    let store = Arc::new(MemoryProgressStore::new());
    let mut ctx = RpgContext::new(registry(), store, &GameplayConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    ctx.subscribe(move |notification| seen_clone.lock().unwrap().push(notification.clone()));

    ctx.connect_player(Arc::new(TestPlayer::new(1)), identity(1))
        .await
        .unwrap();
    ctx.connect_player(Arc::new(TestPlayer::new(2)), identity(2))
        .await
        .unwrap();
    ctx.set_level(UserId(2), 10).unwrap();

    ctx.handle_event(&HostEvent::PlayerDeath {
        userid: UserId(2),
        attacker: Some(UserId(1)),
        weapon: "awp".into(),
    });

    let attacker = ctx.progression(UserId(1)).unwrap();
    assert_eq!((attacker.level(), attacker.xp(), attacker.credits()), (1, 0, 5));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Notification::LevelUp {
            userid: UserId(1),
            identity: identity(1),
            levels: 1,
            credits: 5,
        }]
    );

    ctx.shutdown().await;
}

#[tokio::test]
async fn test_suicide_awards_nothing() {
    let store = Arc::new(MemoryProgressStore::new());
    let mut ctx = RpgContext::new(registry(), store, &GameplayConfig::default());
    ctx.connect_player(Arc::new(TestPlayer::new(1)), identity(1))
        .await
        .unwrap();

    ctx.handle_event(&HostEvent::PlayerHurt {
        userid: UserId(1),
        attacker: Some(UserId(1)),
        damage: 80,
        weapon: "hegrenade".into(),
    });
    ctx.handle_event(&HostEvent::PlayerDeath {
        userid: UserId(1),
        attacker: None,
        weapon: "world".into(),
    });

    assert_eq!(ctx.progression(UserId(1)).unwrap().xp(), 0);
    ctx.shutdown().await;
}

#[tokio::test]
async fn test_progress_survives_reconnect() {
    let store = Arc::new(MemoryProgressStore::new());
    let mut ctx = RpgContext::new(registry(), store.clone(), &GameplayConfig::default());
    ctx.connect_player(Arc::new(TestPlayer::new(1)), identity(1))
        .await
        .unwrap();
    ctx.grant_xp(UserId(1), 250).unwrap();
    ctx.upgrade_skill(UserId(1), "vampirism").unwrap();
    ctx.handle_event(&HostEvent::PlayerDisconnect { userid: UserId(1) });
    assert!(ctx.is_empty());
    ctx.shutdown().await;

    let mut ctx = RpgContext::new(registry(), store.clone(), &GameplayConfig::default());
    ctx.connect_player(Arc::new(TestPlayer::new(5)), identity(1))
        .await
        .unwrap();
    let progression = ctx.progression(UserId(5)).unwrap();
    assert_eq!(
        (progression.level(), progression.xp(), progression.credits()),
        (2, 30, 5)
    );
    assert_eq!(
        progression.skill("vampirism").map(|s| s.level()),
        Some(1)
    );
    ctx.shutdown().await;
}

#[tokio::test]
async fn test_rows_of_removed_skills_stay_inert() {
    let store = Arc::new(MemoryProgressStore::new());
    let mut record = PlayerRecord::new(identity(1));
    record.skills = vec![SkillRecord::new("teleport", 3), SkillRecord::new("health", 2)];
    store.create(&record).await.unwrap();

    let mut ctx = RpgContext::new(registry(), store.clone(), &GameplayConfig::default());
    ctx.connect_player(Arc::new(TestPlayer::new(1)), identity(1))
        .await
        .unwrap();
    assert!(ctx.progression(UserId(1)).unwrap().skill("teleport").is_none());
    ctx.shutdown().await;

    let saved = store.load(&identity(1)).await.unwrap().unwrap();
    assert_eq!(saved.skill_level("teleport"), Some(3));
    assert_eq!(saved.skill_level("health"), Some(2));
}

#[tokio::test]
async fn test_bots_upgrade_on_level_up() {
    let store = Arc::new(MemoryProgressStore::new());
    let mut ctx = RpgContext::new(registry(), store, &GameplayConfig::default());
    ctx.connect_player(Arc::new(TestPlayer::bot(3)), identity(3))
        .await
        .unwrap();

    ctx.grant_xp(UserId(3), 100).unwrap();

    let progression = ctx.progression(UserId(3)).unwrap();
    assert_eq!(progression.credits(), 0);
    assert_eq!(progression.skills().filter(|s| s.level() == 1).count(), 1);
    ctx.shutdown().await;
}
