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

use clap::Parser;
use rpg_common::PlayerIdentity;
use rpg_plugin::config::{Arguments, Command, Configuration};
use rpg_plugin::persistence::{PersistenceError, PgProgressStore, ProgressStore};
use rpg_plugin::progression::Progression;
use rpg_plugin::skills::{HandlerCatalog, SkillRegistry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_level(true)
        .with_ansi(true)
        .init();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            tracing::debug!("Loading environment variables from file: {}", env_file);
            dotenv::from_filename(env_file).ok();
        }
    } else {
        tracing::debug!("Loading environment variables from default file");
        dotenv::dotenv().ok();
    }

    let config = Configuration::load(&arguments.config_file)?;
    tracing::debug!("Configuration loaded: {:?}", config);

    let registry = SkillRegistry::load(&config.gameplay.skills_path, &HandlerCatalog::builtin())?;

    if arguments.command == Command::Skills {
        for skill_type in registry.iter() {
            let max_level = skill_type
                .max_level()
                .map_or_else(|| "unbounded".to_string(), |max| max.to_string());
            let events: Vec<_> = skill_type.events().iter().map(|e| e.name()).collect();
            println!(
                "{:<16} max {:<10} {}",
                skill_type.key(),
                max_level,
                events.join(", ")
            );
        }
        return Ok(());
    }

    tracing::info!("Connecting to Database at {}", &config.database.url);
    let database = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await?;
    let store = PgProgressStore::new(database);

    let load = |identity: String| {
        let store = &store;
        let registry = &registry;
        let leveling = config.gameplay.leveling;
        async move {
            let identity = PlayerIdentity::new(identity);
            let record = store
                .load(&identity)
                .await?
                .ok_or_else(|| PersistenceError::NotFound(identity.clone()))?;
            let mut progression = Progression::from_registry(identity, leveling, registry);
            progression.restore(&record);
            progression.drain_events();
            Ok::<_, PersistenceError>(progression)
        }
    };

    match arguments.command {
        Command::Skills => {}
        Command::InitSchema => {
            store.ensure_schema().await?;
            println!("Schema ready");
        }
        Command::Show { identity } => {
            let progression = load(identity).await?;
            print_progression(&progression);
        }
        Command::GrantXp { identity, amount } => {
            let mut progression = load(identity).await?;
            let levels = progression.grant_xp(amount)?;
            store.save(&progression.to_record()).await?;
            println!("Granted {} XP (+{} levels)", amount, levels);
            print_progression(&progression);
        }
        Command::SetLevel { identity, level } => {
            let mut progression = load(identity).await?;
            progression.set_level(level)?;
            store.save(&progression.to_record()).await?;
            print_progression(&progression);
        }
        Command::Reset { identity } => {
            let mut progression = load(identity).await?;
            progression.reset_progress();
            store.save(&progression.to_record()).await?;
            print_progression(&progression);
        }
    }

    Ok(())
}

fn print_progression(progression: &Progression) {
    println!("Player:  {}", progression.identity());
    println!("Level:   {}", progression.level());
    println!("XP:      {}/{}", progression.xp(), progression.required_xp());
    println!("Credits: {}", progression.credits());
    for skill in progression.skills() {
        println!("  {:<16} {}", skill.key(), skill.level());
    }
}
