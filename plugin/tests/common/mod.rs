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

//! Shared fakes for integration tests

#![allow(dead_code)]

use rpg_common::{Buttons, Team, UserId, Vector};
use rpg_plugin::host::{HostPlayer, TimedEffect};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug)]
struct State {
    bot: bool,
    team: Team,
    health: i32,
    max_health: i32,
    velocity: Vector,
    base_velocity: Option<Vector>,
    alpha: u8,
}

/// Host player keeping its state in memory.
#[derive(Debug)]
pub struct TestPlayer {
    userid: UserId,
    state: Mutex<State>,
}

impl TestPlayer {
    pub fn new(userid: u32) -> Self {
        Self {
            userid: UserId(userid),
            state: Mutex::new(State {
                bot: false,
                team: Team::CounterTerrorist,
                health: 100,
                max_health: 100,
                velocity: Vector::default(),
                base_velocity: None,
                alpha: 255,
            }),
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

    pub fn set_velocity(&self, velocity: Vector) {
        self.state.lock().unwrap().velocity = velocity;
    }

    pub fn base_velocity(&self) -> Option<Vector> {
        self.state.lock().unwrap().base_velocity
    }

    pub fn alpha(&self) -> u8 {
        self.state.lock().unwrap().alpha
    }
}

struct NoEffect;

impl TimedEffect for NoEffect {
    fn is_running(&self) -> bool {
        false
    }

    fn cancel(&mut self) {}
}

impl HostPlayer for TestPlayer {
    fn userid(&self) -> UserId {
        self.userid
    }

    fn name(&self) -> String {
        format!("Player {}", self.userid.0)
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
        Buttons::default()
    }

    fn set_alpha(&self, alpha: u8) {
        self.state.lock().unwrap().alpha = alpha;
    }

    fn freeze(&self, _duration: Duration) {}

    fn shift_speed(&self, _amount: f32, _duration: Duration) -> Box<dyn TimedEffect> {
        Box::new(NoEffect)
    }
}

/// Directory of the skills shipped with the plugin.
pub fn skills_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("skills")
}
