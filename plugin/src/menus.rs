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

//! Menu models
//!
//! Pages are plain data built from a player's progression. How they are drawn
//! is up to the host's [`MenuPresenter`](crate::host::MenuPresenter); the plugin
//! only decides what they contain and what a selection does.

use crate::host::TextLookup;
use crate::progression::{ProgressError, Progression};
use crate::skills::Skill;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKind {
    Main,
    Upgrade,
    Downgrade,
    Descriptions,
    Stats,
}

impl MenuKind {
    pub fn title(&self) -> &'static str {
        match self {
            MenuKind::Main => "Main Menu",
            MenuKind::Upgrade => "Upgrade Skills",
            MenuKind::Downgrade => "Downgrade Skills",
            MenuKind::Descriptions => "Skill Descriptions",
            MenuKind::Stats => "Stats",
        }
    }
}

/// What selecting an option does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Open(MenuKind),
    Upgrade(String),
    Downgrade(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub text: String,
    /// `None` for informational lines.
    pub choice: Option<MenuChoice>,
    pub selectable: bool,
    pub highlight: bool,
}

impl MenuOption {
    fn action(text: impl Into<String>, choice: MenuChoice, enabled: bool) -> Self {
        Self {
            text: text.into(),
            choice: Some(choice),
            selectable: enabled,
            highlight: enabled,
        }
    }

    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choice: None,
            selectable: false,
            highlight: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuPage {
    pub kind: MenuKind,
    pub title: String,
    pub description: Option<String>,
    pub options: Vec<MenuOption>,
}

fn credits_line(progression: &Progression) -> String {
    format!("Credits: {}", progression.credits())
}

fn level_span(skill: &Skill) -> String {
    match skill.max_level() {
        Some(max) => format!("{}/{}", skill.level(), max),
        None => skill.level().to_string(),
    }
}

/// Build `kind` for the given progression.
pub fn build_menu(kind: MenuKind, progression: &Progression, text: &dyn TextLookup) -> MenuPage {
    let options = match kind {
        MenuKind::Main => vec![
            MenuOption::action(MenuKind::Upgrade.title(), MenuChoice::Open(MenuKind::Upgrade), true),
            MenuOption::action(MenuKind::Downgrade.title(), MenuChoice::Open(MenuKind::Downgrade), true),
            MenuOption::action(
                MenuKind::Descriptions.title(),
                MenuChoice::Open(MenuKind::Descriptions),
                true,
            ),
            MenuOption::action(MenuKind::Stats.title(), MenuChoice::Open(MenuKind::Stats), true),
        ],
        MenuKind::Upgrade => progression
            .skills()
            .map(|skill| {
                let label = format!(
                    "{} [{}] ({} credits)",
                    skill.skill_type().strings().name(text),
                    level_span(skill),
                    skill.upgrade_cost()
                );
                MenuOption::action(
                    label,
                    MenuChoice::Upgrade(skill.key().to_string()),
                    progression.can_upgrade_skill(skill.key()),
                )
            })
            .collect(),
        MenuKind::Downgrade => progression
            .skills()
            .map(|skill| {
                let label = format!(
                    "{} [{}] (+{} credits)",
                    skill.skill_type().strings().name(text),
                    level_span(skill),
                    skill.downgrade_refund()
                );
                MenuOption::action(
                    label,
                    MenuChoice::Downgrade(skill.key().to_string()),
                    progression.can_downgrade_skill(skill.key()),
                )
            })
            .collect(),
        MenuKind::Descriptions => progression
            .skills()
            .map(|skill| {
                let strings = skill.skill_type().strings();
                MenuOption::text(format!("{}\n{}", strings.name(text), strings.description(text)))
            })
            .collect(),
        MenuKind::Stats => vec![
            MenuOption::text(format!("Level: {}", progression.level())),
            MenuOption::text(format!("XP: {}/{}", progression.xp(), progression.required_xp())),
        ],
    };

    MenuPage {
        kind,
        title: kind.title().to_string(),
        description: Some(credits_line(progression)),
        options,
    }
}

/// Apply a selection made on `page` and return the menu to show next.
///
/// Skill menus stay open after a transaction so the player can keep buying.
pub fn select_menu(
    page: MenuKind,
    choice: &MenuChoice,
    progression: &mut Progression,
) -> Result<MenuKind, ProgressError> {
    match choice {
        MenuChoice::Open(kind) => Ok(*kind),
        MenuChoice::Upgrade(key) => {
            progression.upgrade_skill(key)?;
            Ok(page)
        }
        MenuChoice::Downgrade(key) => {
            progression.downgrade_skill(key)?;
            Ok(page)
        }
    }
}
