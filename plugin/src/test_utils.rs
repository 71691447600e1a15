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

//! Test doubles for host collaborators

use crate::host::{HostPlayer, MenuPresenter, TimedEffect};
use crate::menus::MenuPage;
use rpg_common::{Button, Buttons, Team, UserId, Vector};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
struct FakeState {
    name: String,
    bot: bool,
    team: Team,
    health: i32,
    max_health: i32,
    velocity: Vector,
    base_velocity: Option<Vector>,
    buttons: Buttons,
    alpha: u8,
    frozen_for: Option<Duration>,
    speed_boosts: usize,
}

/// In-memory host player that records every effect applied to it.
#[derive(Debug)]
pub struct FakePlayer {
    userid: UserId,
    state: Mutex<FakeState>,
    active_boosts: Arc<AtomicUsize>,
}

impl FakePlayer {
    pub fn new(userid: u32) -> Self {
        Self {
            userid: UserId(userid),
            state: Mutex::new(FakeState {
                name: format!("Player {}", userid),
                bot: false,
                team: Team::Terrorist,
                health: 100,
                max_health: 100,
                velocity: Vector::default(),
                base_velocity: None,
                buttons: Buttons::default(),
                alpha: 255,
                frozen_for: None,
                speed_boosts: 0,
            }),
            active_boosts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn bot(userid: u32) -> Self {
        let player = Self::new(userid);
        player.state.lock().unwrap().bot = true;
        player
    }

    pub fn set_team(&self, team: Team) {
        self.state.lock().unwrap().team = team;
    }

    pub fn press(&self, button: Button) {
        self.state.lock().unwrap().buttons |= button;
    }

    pub fn set_velocity(&self, velocity: Vector) {
        self.state.lock().unwrap().velocity = velocity;
    }

    pub fn base_velocity(&self) -> Option<Vector> {
        self.state.lock().unwrap().base_velocity
    }

    pub fn alpha(&self) -> u8 {
        self.state.lock().unwrap().alpha
    }

    pub fn frozen_for(&self) -> Option<Duration> {
        self.state.lock().unwrap().frozen_for
    }

    /// Number of speed boosts ever started.
    pub fn speed_boosts(&self) -> usize {
        self.state.lock().unwrap().speed_boosts
    }

    /// Number of speed boosts not yet cancelled.
    pub fn active_boosts(&self) -> usize {
        self.active_boosts.load(Ordering::SeqCst)
    }
}

impl HostPlayer for FakePlayer {
    fn userid(&self) -> UserId {
        self.userid
    }

    fn name(&self) -> String {
        self.state.lock().unwrap().name.clone()
    }

    fn is_bot(&self) -> bool {
        self.state.lock().unwrap().bot
    }

    fn team(&self) -> Team {
        self.state.lock().unwrap().team
    }

    fn health(&self) -> i32 {
        self.state.lock().unwrap().health
    }

    fn set_health(&self, value: i32) {
        self.state.lock().unwrap().health = value;
    }

    fn max_health(&self) -> i32 {
        self.state.lock().unwrap().max_health
    }

    fn set_max_health(&self, value: i32) {
        self.state.lock().unwrap().max_health = value;
    }

    fn velocity(&self) -> Vector {
        self.state.lock().unwrap().velocity
    }

    fn set_base_velocity(&self, value: Vector) {
        self.state.lock().unwrap().base_velocity = Some(value);
    }

    fn buttons(&self) -> Buttons {
        self.state.lock().unwrap().buttons
    }

    fn set_alpha(&self, alpha: u8) {
        self.state.lock().unwrap().alpha = alpha;
    }

    fn freeze(&self, duration: Duration) {
        self.state.lock().unwrap().frozen_for = Some(duration);
    }

    fn shift_speed(&self, _amount: f32, _duration: Duration) -> Box<dyn TimedEffect> {
        self.state.lock().unwrap().speed_boosts += 1;
        self.active_boosts.fetch_add(1, Ordering::SeqCst);
        Box::new(FakeEffect {
            running: AtomicBool::new(true),
            active: Arc::clone(&self.active_boosts),
        })
    }
}

/// Effect that stays running until cancelled.
pub struct FakeEffect {
    running: AtomicBool,
    active: Arc<AtomicUsize>,
}

impl TimedEffect for FakeEffect {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn cancel(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Presenter that records what it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub pages: Mutex<Vec<(UserId, MenuPage)>>,
    pub messages: Mutex<Vec<(UserId, String)>>,
}

impl MenuPresenter for RecordingPresenter {
    fn present(&self, userid: UserId, page: &MenuPage) {
        self.pages.lock().unwrap().push((userid, page.clone()));
    }

    fn message(&self, userid: UserId, text: &str) {
        self.messages.lock().unwrap().push((userid, text.to_string()));
    }
}
