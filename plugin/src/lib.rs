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

//! RPG progression engine
//!
//! Adds experience, levels and credits to a Source-engine game server, along
//! with skills players buy with those credits. The host owns the simulation;
//! this crate reacts to its events and acts on its players through the
//! collaborator traits in [`host`].
//!
//! Start from [`context::RpgContext`], which owns the skill registry, the
//! progression store and every connected player's session.

pub mod autosave;
pub mod config;
pub mod context;
pub mod events;
pub mod host;
pub mod menus;
pub mod persistence;
pub mod progression;
pub mod session;
pub mod skills;

#[cfg(test)]
pub mod test_utils;
