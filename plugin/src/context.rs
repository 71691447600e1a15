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

use crate::autosave::AutoSaveTimer;
use crate::config::GameplayConfig;
use crate::events::{EventRouter, Notification, Subscribers};
use crate::host::{HostPlayer, MenuPresenter, NoTranslations, TextLookup};
use crate::menus::{self, MenuChoice, MenuKind};
use crate::persistence::{PersistenceError, ProgressStore};
use crate::progression::{Leveling, ProgressError, ProgressEvent, Progression};
use crate::session::{PlayerSession, Sessions};
use crate::skills::SkillRegistry;
use rand::seq::IteratorRandom;
use rpg_common::{HostEvent, PlayerIdentity, PlayerRecord, UserId};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Unknown player {0}")]
    UnknownPlayer(UserId),

    #[error("Player {0} is already connected")]
    AlreadyConnected(UserId),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Plugin context owning everything the progression engine needs
///
/// All player state is mutated from the host's callback thread through
/// `&mut self`, so nothing here is locked. Only saves leave that thread: they
/// run as spawned tasks on a snapshot of the player's progression.
///
/// # Operations
///
/// ## Session lifecycle
/// - `connect_player()` - Load or create a player and attach their skills
/// - `disconnect()` - Route the disconnect, save and drop the session
/// - `shutdown()` - Stop the timer and save everyone
///
/// ## Host callbacks
/// - `handle_event()` - Route a host game event
/// - `on_tick()` - Per-second tick; also runs due auto-saves
///
/// ## Progression entry points
/// - `grant_xp()` / `set_level()` / `reset_progress()`
/// - `upgrade_skill()` / `downgrade_skill()`
/// - `open_menu()` / `select_menu()`
///
/// ## Persistence
/// - `save_player()` / `save_all()` - Fire-and-forget saves
///
/// Every mutation is followed by a flush: queued progression events are
/// redispatched to skills, reacted to, and handed to subscribers.
pub struct RpgContext {
    registry: Arc<SkillRegistry>,
    store: Arc<dyn ProgressStore>,
    sessions: Sessions,
    router: EventRouter,
    subscribers: Subscribers,
    leveling: Leveling,
    presenter: Option<Arc<dyn MenuPresenter>>,
    text: Arc<dyn TextLookup>,
    timer: Option<AutoSaveTimer>,
    saves: JoinSet<()>,
}

impl RpgContext {
    /// Create a context and start its auto-save timer.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(
        registry: Arc<SkillRegistry>,
        store: Arc<dyn ProgressStore>,
        config: &GameplayConfig,
    ) -> Self {
        Self {
            registry,
            store,
            sessions: Sessions::new(),
            router: EventRouter::new(config.xp_gain),
            subscribers: Subscribers::new(),
            leveling: config.leveling,
            presenter: None,
            text: Arc::new(NoTranslations),
            timer: Some(AutoSaveTimer::start(config.auto_save_period())),
            saves: JoinSet::new(),
        }
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn MenuPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn with_text(mut self, text: Arc<dyn TextLookup>) -> Self {
        self.text = text;
        self
    }

    pub fn registry(&self) -> &Arc<SkillRegistry> {
        &self.registry
    }

    /// Subscribe to progression notifications
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.subscribers.subscribe(handler);
    }

    pub fn session(&self, userid: UserId) -> Option<&PlayerSession> {
        self.sessions.get(&userid)
    }

    pub fn progression(&self, userid: UserId) -> Option<&Progression> {
        self.sessions.get(&userid).map(|s| &s.progression)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn session_mut(&mut self, userid: UserId) -> Result<&mut PlayerSession, ContextError> {
        self.sessions
            .get_mut(&userid)
            .ok_or(ContextError::UnknownPlayer(userid))
    }

    // ========== Session Lifecycle ==========

    /// Start a session for a connecting player.
    ///
    /// A player the store has never seen is created with zeroed progression
    /// and persisted right away.
    pub async fn connect_player(
        &mut self,
        host: Arc<dyn HostPlayer>,
        identity: PlayerIdentity,
    ) -> Result<(), ContextError> {
        let userid = host.userid();
        if self.sessions.contains_key(&userid) {
            return Err(ContextError::AlreadyConnected(userid));
        }

        let record = self.store.load(&identity).await?;

        let mut progression =
            Progression::from_registry(identity.clone(), self.leveling, &self.registry);
        progression.init_skills(host.as_ref());

        match record {
            Some(record) => {
                progression.restore(&record);
                tracing::info!(
                    "Player {} ({}) connected at level {}",
                    identity,
                    userid,
                    progression.level()
                );
            }
            None => {
                if let Err(e) = self.store.create(&progression.to_record()).await {
                    tracing::error!("Failed to create player {}: {}", identity, e);
                }
                tracing::info!("New player {} ({}) connected", identity, userid);
            }
        }

        self.sessions
            .insert(userid, PlayerSession::new(host, progression));
        self.flush();
        Ok(())
    }

    /// End a session: skills see the disconnect, then the player is saved.
    pub fn disconnect(&mut self, userid: UserId) -> Result<(), ContextError> {
        if !self.sessions.contains_key(&userid) {
            return Err(ContextError::UnknownPlayer(userid));
        }
        self.router
            .route(&mut self.sessions, &HostEvent::PlayerDisconnect { userid });
        self.flush();
        self.save_player(userid)?;

        if let Some(session) = self.sessions.remove(&userid) {
            tracing::info!("Player {} ({}) disconnected", session.identity(), userid);
        }
        Ok(())
    }

    /// Stop the auto-save timer and save every connected player.
    ///
    /// Waits for saves still in flight as well as the final ones.
    pub async fn shutdown(mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.stop().await;
        }

        while let Some(result) = self.saves.join_next().await {
            if let Err(e) = result {
                tracing::error!("Save task failed: {}", e);
            }
        }

        let records: Vec<PlayerRecord> = self
            .sessions
            .values()
            .map(|s| s.progression.to_record())
            .collect();
        let store = Arc::clone(&self.store);
        let results =
            futures::future::join_all(records.iter().map(|record| store.save(record))).await;
        for (record, result) in records.iter().zip(results) {
            if let Err(e) = result {
                tracing::error!("Failed to save player {}: {}", record.identity, e);
            }
        }

        tracing::info!("Shut down after saving {} players", records.len());
        self.sessions.clear();
    }

    // ========== Host Callbacks ==========

    pub fn handle_event(&mut self, event: &HostEvent) {
        if let HostEvent::PlayerDisconnect { userid } = event {
            if let Err(e) = self.disconnect(*userid) {
                tracing::debug!("Ignoring disconnect: {}", e);
            }
            return;
        }
        self.router.route(&mut self.sessions, event);
        self.flush();
    }

    /// Once-per-second host callback.
    pub fn on_tick(&mut self) {
        self.router.tick(&mut self.sessions);
        self.flush();

        let due = self.timer.as_mut().is_some_and(AutoSaveTimer::take_due);
        if due {
            self.save_all();
        }
    }

    // ========== Progression Entry Points ==========

    /// Grant experience. Returns the number of levels gained.
    pub fn grant_xp(&mut self, userid: UserId, amount: i64) -> Result<u32, ContextError> {
        let levels = self.session_mut(userid)?.progression.grant_xp(amount)?;
        self.flush();
        Ok(levels)
    }

    pub fn set_level(&mut self, userid: UserId, level: i64) -> Result<(), ContextError> {
        self.session_mut(userid)?.progression.set_level(level)?;
        Ok(())
    }

    pub fn reset_progress(&mut self, userid: UserId) -> Result<(), ContextError> {
        self.session_mut(userid)?.progression.reset_progress();
        Ok(())
    }

    pub fn upgrade_skill(&mut self, userid: UserId, key: &str) -> Result<(), ContextError> {
        self.session_mut(userid)?.progression.upgrade_skill(key)?;
        self.flush();
        Ok(())
    }

    pub fn downgrade_skill(&mut self, userid: UserId, key: &str) -> Result<(), ContextError> {
        self.session_mut(userid)?.progression.downgrade_skill(key)?;
        self.flush();
        Ok(())
    }

    // ========== Menus ==========

    pub fn open_menu(&self, userid: UserId, kind: MenuKind) -> Result<(), ContextError> {
        let session = self
            .sessions
            .get(&userid)
            .ok_or(ContextError::UnknownPlayer(userid))?;
        if let Some(presenter) = &self.presenter {
            let page = menus::build_menu(kind, &session.progression, self.text.as_ref());
            presenter.present(userid, &page);
        }
        Ok(())
    }

    /// Apply a menu selection and show the next menu.
    ///
    /// A rejected transaction leaves the player on the same menu.
    pub fn select_menu(
        &mut self,
        userid: UserId,
        page: MenuKind,
        choice: &MenuChoice,
    ) -> Result<(), ContextError> {
        let session = self.session_mut(userid)?;
        let next = match menus::select_menu(page, choice, &mut session.progression) {
            Ok(next) => next,
            Err(e) => {
                tracing::debug!("Menu selection by {} rejected: {}", userid, e);
                page
            }
        };
        self.flush();
        self.open_menu(userid, next)
    }

    // ========== Persistence ==========

    /// Save one player in the background.
    pub fn save_player(&mut self, userid: UserId) -> Result<(), ContextError> {
        let record = self
            .sessions
            .get(&userid)
            .ok_or(ContextError::UnknownPlayer(userid))?
            .progression
            .to_record();
        self.spawn_save(record);
        Ok(())
    }

    /// Save every connected player in the background.
    pub fn save_all(&mut self) {
        let records: Vec<PlayerRecord> = self
            .sessions
            .values()
            .map(|s| s.progression.to_record())
            .collect();
        tracing::debug!("Saving {} players", records.len());
        for record in records {
            self.spawn_save(record);
        }
    }

    fn spawn_save(&mut self, record: PlayerRecord) {
        while let Some(result) = self.saves.try_join_next() {
            if let Err(e) = result {
                tracing::error!("Save task failed: {}", e);
            }
        }

        let store = Arc::clone(&self.store);
        self.saves.spawn(async move {
            if let Err(e) = store.save(&record).await {
                tracing::error!("Failed to save player {}: {}", record.identity, e);
            }
        });
    }

    // ========== Notifications ==========

    /// Drain queued progression events of every session until none are left,
    /// notifying subscribers of each one as it is handled.
    fn flush(&mut self) {
        let presenter = self.presenter.as_deref();
        let text = self.text.as_ref();
        for (userid, session) in self.sessions.iter_mut() {
            loop {
                let events = session.progression.drain_events();
                if events.is_empty() {
                    break;
                }
                for event in events {
                    self.router.redispatch(session, &event);
                    if let ProgressEvent::LevelUp { levels, credits } = event {
                        react_to_level_up(session, presenter, text, levels, credits);
                    }
                    self.subscribers.notify(&Notification::from_progress(
                        *userid,
                        session.identity().clone(),
                        event,
                    ));
                }
            }
        }
    }
}

/// Humans are told and shown the upgrade menu; bots buy a random affordable skill.
fn react_to_level_up(
    session: &mut PlayerSession,
    presenter: Option<&dyn MenuPresenter>,
    text: &dyn TextLookup,
    levels: u32,
    credits: u64,
) {
    let userid = session.userid();
    if session.is_bot() {
        let progression = &session.progression;
        let choice = progression
            .skills()
            .filter(|skill| progression.can_upgrade_skill(skill.key()))
            .map(|skill| skill.key().to_string())
            .choose(&mut rand::rng());
        if let Some(key) = choice {
            if let Err(e) = session.progression.upgrade_skill(&key) {
                tracing::debug!("Bot {} could not upgrade '{}': {}", userid, key, e);
            }
        }
        return;
    }

    let Some(presenter) = presenter else {
        return;
    };
    let progression = &session.progression;
    presenter.message(
        userid,
        &format!(
            "You are now level {} (+{} levels, +{} credits). You have {} credits to spend.",
            progression.level(),
            levels,
            credits,
            progression.credits()
        ),
    );
    let page = menus::build_menu(MenuKind::Upgrade, progression, text);
    presenter.present(userid, &page);
}

impl std::fmt::Debug for RpgContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpgContext")
            .field("skills", &self.registry.len())
            .field("sessions", &self.sessions.len())
            .field("subscribers", &self.subscribers.len())
            .field("timer", &self.timer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MockProgressStore;
    use crate::skills::{Skill, SkillType};
    use crate::test_utils::{FakePlayer, RecordingPresenter};
    use rpg_common::SkillRecord;
    use std::sync::Mutex;

    fn registry() -> Arc<SkillRegistry> {
        let mut registry = SkillRegistry::new();
        registry
            .register(SkillType::builder("health").max_level(Some(3)).build())
            .unwrap();
        registry
            .register(SkillType::builder("stealth").max_level(Some(5)).build())
            .unwrap();
        Arc::new(registry)
    }

    fn context(store: MockProgressStore) -> RpgContext {
        RpgContext::new(registry(), Arc::new(store), &GameplayConfig::default())
    }

    fn identity(userid: u32) -> PlayerIdentity {
        PlayerIdentity::new(format!("STEAM_1:0:{}", userid))
    }

    #[tokio::test]
    async fn test_connect_new_player_creates_record() {
        let mut store = MockProgressStore::new();
        store.expect_load().times(1).returning(|_| Ok(None));
        store
            .expect_create()
            .withf(|record| record.level == 0 && record.skills.len() == 2)
            .times(1)
            .returning(|_| Ok(()));

        let mut ctx = context(store);
        ctx.connect_player(Arc::new(FakePlayer::new(1)), identity(1))
            .await
            .unwrap();

        let progression = ctx.progression(UserId(1)).unwrap();
        assert_eq!(progression.level(), 0);
        assert_eq!(
            progression.skills().map(Skill::key).collect::<Vec<_>>(),
            vec!["health", "stealth"]
        );
    }

    #[tokio::test]
    async fn test_connect_restores_saved_levels() {
        let mut store = MockProgressStore::new();
        store.expect_load().returning(|identity| {
            let mut record = PlayerRecord::new(identity.clone());
            record.level = 4;
            record.credits = 12;
            record.skills = vec![
                SkillRecord::new("health", 9),
                SkillRecord::new("retired", 2),
                SkillRecord::new("stealth", 1),
            ];
            Ok(Some(record))
        });
        store.expect_create().never();

        let mut ctx = context(store);
        ctx.connect_player(Arc::new(FakePlayer::new(1)), identity(1))
            .await
            .unwrap();

        let progression = ctx.progression(UserId(1)).unwrap();
        assert_eq!(progression.level(), 4);
        assert_eq!(progression.credits(), 12);
        assert_eq!(progression.skill("health").map(Skill::level), Some(3));
        assert_eq!(progression.skill("stealth").map(Skill::level), Some(1));
    }

    #[tokio::test]
    async fn test_connect_fails_when_store_fails() {
        let mut store = MockProgressStore::new();
        store
            .expect_load()
            .returning(|_| Err(PersistenceError::Database(sqlx::Error::PoolTimedOut)));

        let mut ctx = context(store);
        let result = ctx
            .connect_player(Arc::new(FakePlayer::new(1)), identity(1))
            .await;
        assert!(matches!(result, Err(ContextError::Persistence(_))));
        assert!(ctx.is_empty());
    }

    #[tokio::test]
    async fn test_double_connect_is_rejected() {
        let mut store = MockProgressStore::new();
        store.expect_load().returning(|_| Ok(None));
        store.expect_create().returning(|_| Ok(()));

        let mut ctx = context(store);
        ctx.connect_player(Arc::new(FakePlayer::new(1)), identity(1))
            .await
            .unwrap();
        let result = ctx
            .connect_player(Arc::new(FakePlayer::new(1)), identity(1))
            .await;
        assert!(matches!(result, Err(ContextError::AlreadyConnected(UserId(1)))));
    }

    #[tokio::test]
    async fn test_level_up_shows_upgrade_menu_to_humans() {
        let mut store = MockProgressStore::new();
        store.expect_load().returning(|_| Ok(None));
        store.expect_create().returning(|_| Ok(()));
        let presenter = Arc::new(RecordingPresenter::default());

        let mut ctx = context(store).with_presenter(presenter.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        ctx.subscribe(move |notification| seen_clone.lock().unwrap().push(notification.clone()));

        ctx.connect_player(Arc::new(FakePlayer::new(1)), identity(1))
            .await
            .unwrap();
        assert_eq!(ctx.grant_xp(UserId(1), 250).unwrap(), 2);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Notification::LevelUp {
                userid: UserId(1),
                identity: identity(1),
                levels: 2,
                credits: 10,
            }]
        );
        assert_eq!(presenter.messages.lock().unwrap().len(), 1);
        let pages = presenter.pages.lock().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].1.kind, MenuKind::Upgrade);
    }

    #[tokio::test]
    async fn test_bot_spends_credits_on_level_up() {
        let mut store = MockProgressStore::new();
        store.expect_load().returning(|_| Ok(None));
        store.expect_create().returning(|_| Ok(()));
        let presenter = Arc::new(RecordingPresenter::default());

        let mut ctx = context(store).with_presenter(presenter.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        ctx.subscribe(move |notification| seen_clone.lock().unwrap().push(notification.clone()));

        ctx.connect_player(Arc::new(FakePlayer::bot(7)), identity(7))
            .await
            .unwrap();
        ctx.grant_xp(UserId(7), 100).unwrap();

        let progression = ctx.progression(UserId(7)).unwrap();
        assert_eq!(progression.credits(), 0);
        assert_eq!(progression.skills().map(Skill::level).sum::<u32>(), 1);
        assert!(presenter.pages.lock().unwrap().is_empty());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], Notification::LevelUp { levels: 1, .. }));
        assert!(matches!(seen[1], Notification::SkillUpgraded { level: 1, .. }));
    }

    #[tokio::test]
    async fn test_entry_points_reject_unknown_players() {
        let mut ctx = context(MockProgressStore::new());
        assert!(matches!(
            ctx.grant_xp(UserId(3), 10),
            Err(ContextError::UnknownPlayer(UserId(3)))
        ));
        assert!(matches!(
            ctx.upgrade_skill(UserId(3), "health"),
            Err(ContextError::UnknownPlayer(_))
        ));
        assert!(ctx.disconnect(UserId(3)).is_err());
    }

    #[tokio::test]
    async fn test_menu_selection_stays_on_failure() {
        let mut store = MockProgressStore::new();
        store.expect_load().returning(|_| Ok(None));
        store.expect_create().returning(|_| Ok(()));
        let presenter = Arc::new(RecordingPresenter::default());

        let mut ctx = context(store).with_presenter(presenter.clone());
        ctx.connect_player(Arc::new(FakePlayer::new(1)), identity(1))
            .await
            .unwrap();

        ctx.select_menu(
            UserId(1),
            MenuKind::Upgrade,
            &MenuChoice::Upgrade("health".into()),
        )
        .unwrap();
        ctx.select_menu(UserId(1), MenuKind::Main, &MenuChoice::Open(MenuKind::Stats))
            .unwrap();

        let pages = presenter.pages.lock().unwrap();
        assert_eq!(pages[0].1.kind, MenuKind::Upgrade);
        assert_eq!(pages[1].1.kind, MenuKind::Stats);
    }

    #[tokio::test]
    async fn test_disconnect_saves_and_drops() {
        let mut store = MockProgressStore::new();
        store.expect_load().returning(|_| Ok(None));
        store.expect_create().returning(|_| Ok(()));
        store
            .expect_save()
            .withf(|record| record.level == 1 && record.xp == 10)
            .times(1)
            .returning(|_| Ok(()));

        let mut ctx = context(store);
        ctx.connect_player(Arc::new(FakePlayer::new(1)), identity(1))
            .await
            .unwrap();
        ctx.grant_xp(UserId(1), 110).unwrap();
        ctx.handle_event(&HostEvent::PlayerDisconnect { userid: UserId(1) });
        assert!(ctx.is_empty());

        // Waits for the spawned save.
        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_saves_everyone() {
        let mut store = MockProgressStore::new();
        store.expect_load().returning(|_| Ok(None));
        store.expect_create().returning(|_| Ok(()));
        store.expect_save().times(2).returning(|_| Ok(()));

        let mut ctx = context(store);
        ctx.connect_player(Arc::new(FakePlayer::new(1)), identity(1))
            .await
            .unwrap();
        ctx.connect_player(Arc::new(FakePlayer::new(2)), identity(2))
            .await
            .unwrap();
        ctx.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_save_runs_from_tick() {
        let mut store = MockProgressStore::new();
        store.expect_load().returning(|_| Ok(None));
        store.expect_create().returning(|_| Ok(()));
        // One from the timer, one at shutdown.
        store.expect_save().times(2).returning(|_| Ok(()));

        let mut ctx = context(store);
        ctx.connect_player(Arc::new(FakePlayer::new(1)), identity(1))
            .await
            .unwrap();

        ctx.on_tick();
        tokio::time::sleep(std::time::Duration::from_secs(241)).await;
        ctx.on_tick();
        ctx.on_tick();
        ctx.shutdown().await;
    }
}
