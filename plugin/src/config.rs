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

use crate::progression::Leveling;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "plugin/config.yaml";
pub const DEFAULT_ENV_FILE: &str = "plugin/.env";

#[derive(Debug, Parser)]
#[command(version, about = "Administer RPG progression data", long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = DEFAULT_ENV_FILE
    )]
    pub env_file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            env_file: Some(DEFAULT_ENV_FILE.to_string()),
            command: Command::Skills,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List the loaded skills in registry order
    Skills,
    /// Print a player's stored progression
    Show { identity: String },
    /// Grant experience to a stored player
    GrantXp {
        identity: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Set a stored player's level
    SetLevel {
        identity: String,
        #[arg(allow_negative_numbers = true)]
        level: i64,
    },
    /// Reset a stored player's progression
    Reset { identity: String },
    /// Create the progression tables if they are missing
    InitSchema,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gameplay: GameplayConfig,
}

impl Configuration {
    pub fn load(path: &str) -> Result<Configuration, String> {
        let conf: Configuration = serde_yaml::from_reader(
            std::fs::File::open(path).map_err(|e| format!("Failed to open config file: {}", e))?,
        )
        .map_err(|e| format!("Failed to parse config file: {}", e))?;

        conf.gameplay.validate()?;
        Ok(conf)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: EnvField<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Directory holding one subdirectory per skill
    pub skills_path: String,
    pub leveling: Leveling,
    pub xp_gain: XpGainConfig,
    /// Seconds between saves of every connected player
    pub auto_save_interval: u64,
}

impl GameplayConfig {
    pub fn auto_save_period(&self) -> Duration {
        Duration::from_secs(self.auto_save_interval)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.leveling.validate().map_err(|e| e.to_string())?;
        if self.auto_save_interval == 0 {
            return Err("auto_save_interval must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            skills_path: "plugin/skills".to_string(),
            leveling: Leveling::default(),
            xp_gain: XpGainConfig::default(),
            auto_save_interval: 240,
        }
    }
}

/// Experience awarded for combat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpGainConfig {
    pub kill_base: u64,
    pub kill_per_victim_level: u64,
    pub damage_multiplier: f64,
}

impl XpGainConfig {
    pub fn kill_xp(&self, victim_level: u32) -> u64 {
        self.kill_per_victim_level
            .saturating_mul(u64::from(victim_level))
            .saturating_add(self.kill_base)
    }

    /// Rounded down, never negative.
    pub fn damage_xp(&self, damage: i32) -> u64 {
        (f64::from(damage) * self.damage_multiplier).floor().max(0.0) as u64
    }
}

impl Default for XpGainConfig {
    fn default() -> Self {
        Self {
            kill_base: 80,
            kill_per_victim_level: 2,
            damage_multiplier: 0.5,
        }
    }
}
