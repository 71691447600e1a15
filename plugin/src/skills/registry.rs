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

//! Skill type registry
//!
//! ## Layout
//! ```text
//! skills/
//!   order.txt          optional, one skill key per line
//!   health/
//!     data.yml         skill manifest
//!   longjump/
//!     data.yml
//! ```
//!
//! Every immediate subdirectory becomes one [`SkillType`]. A subdirectory that
//! fails to build is logged and left out; the rest still load.
//!
//! ## Ordering
//! Without `order.txt` skills are ordered by directory name. With it, the
//! registry holds exactly the listed keys in the listed order: listed keys that
//! did not build are logged and ignored, and built keys that are not listed are
//! logged and dropped.

use super::catalog::HandlerCatalog;
use super::event::{EventShape, SkillEvent};
use super::skill_type::{SkillType, Variables};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const MANIFEST_FILE: &str = "data.yml";
pub const ORDER_FILE: &str = "order.txt";

/// Why a single skill directory could not be turned into a [`SkillType`].
#[derive(Debug, Error)]
pub enum SkillBuildError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unknown event '{0}'")]
    UnknownEvent(String),

    #[error("Unknown handler '{0}'")]
    UnknownHandler(String),

    #[error("Unknown init handler '{0}'")]
    UnknownInit(String),

    #[error("Handler '{handler}' does not accept {shape:?} arguments of event {event}")]
    ShapeMismatch {
        handler: String,
        event: SkillEvent,
        shape: EventShape,
    },

    #[error("Handler '{handler}' requires variable '{variable}'")]
    MissingVariable { handler: String, variable: String },
}

/// Registry level failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read skill directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Skill '{0}' is already registered")]
    Duplicate(String),
}

/// On-disk skill manifest (`data.yml`).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SkillManifest {
    key: Option<String>,
    name: Option<String>,
    description: Option<String>,
    max_level: Option<u32>,
    #[serde(default)]
    variables: Variables,
    init: Option<String>,
    #[serde(default)]
    events: BTreeMap<String, String>,
}

/// Ordered, read-only collection of every known [`SkillType`].
#[derive(Debug, Default)]
pub struct SkillRegistry {
    types: Vec<Arc<SkillType>>,
    index: HashMap<String, usize>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a skill type. Keys must be unique.
    pub fn register(&mut self, skill_type: SkillType) -> Result<Arc<SkillType>, RegistryError> {
        if self.index.contains_key(skill_type.key()) {
            return Err(RegistryError::Duplicate(skill_type.key().to_string()));
        }
        let skill_type = Arc::new(skill_type);
        self.index
            .insert(skill_type.key().to_string(), self.types.len());
        self.types.push(Arc::clone(&skill_type));
        Ok(skill_type)
    }

    /// Build a registry from a directory of skill manifests.
    ///
    /// Only an unreadable `root` fails the whole load.
    pub fn load(root: impl AsRef<Path>, catalog: &HandlerCatalog) -> Result<Self, RegistryError> {
        let root = root.as_ref();
        let entries = std::fs::read_dir(root).map_err(|source| RegistryError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let mut dirs: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        let mut built = Self::new();
        for dir in dirs {
            match build_skill_type(&dir, catalog) {
                Ok(skill_type) => {
                    let key = skill_type.key().to_string();
                    match built.register(skill_type) {
                        Ok(_) => tracing::debug!("Built skill '{}' from {}", key, dir.display()),
                        Err(e) => tracing::warn!("Skipping skill at {}: {}", dir.display(), e),
                    }
                }
                Err(e) => {
                    tracing::warn!("Unable to build skill for path {}: {}", dir.display(), e);
                }
            }
        }

        let order_path = root.join(ORDER_FILE);
        let registry = match std::fs::read_to_string(&order_path) {
            Ok(contents) => {
                let order: Vec<&str> = contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .collect();
                built.reordered(&order)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => built,
            Err(source) => {
                return Err(RegistryError::Io {
                    path: order_path,
                    source,
                });
            }
        };

        tracing::info!(
            "Loaded {} skills from {}: [{}]",
            registry.len(),
            root.display(),
            registry.keys().collect::<Vec<_>>().join(", ")
        );
        Ok(registry)
    }

    /// Keep exactly the keys in `order`, in that order.
    fn reordered(self, order: &[&str]) -> Self {
        let mut remaining: HashMap<String, Arc<SkillType>> = self
            .types
            .into_iter()
            .map(|t| (t.key().to_string(), t))
            .collect();

        let mut ordered = Self::new();
        for key in order {
            match remaining.remove(*key) {
                Some(skill_type) => {
                    ordered.index.insert(key.to_string(), ordered.types.len());
                    ordered.types.push(skill_type);
                }
                None => tracing::warn!("Unable to find skill for key '{}'", key),
            }
        }

        let mut dropped: Vec<_> = remaining.into_keys().collect();
        dropped.sort();
        for key in dropped {
            tracing::warn!("Skill '{}' is not listed in {} and was dropped", key, ORDER_FILE);
        }
        ordered
    }

    pub fn get(&self, key: &str) -> Option<&Arc<SkillType>> {
        self.index.get(key).map(|&i| &self.types[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Skill types in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SkillType>> + '_ {
        self.types.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.iter().map(|t| t.key())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Build one skill type from its directory.
pub fn build_skill_type(dir: &Path, catalog: &HandlerCatalog) -> Result<SkillType, SkillBuildError> {
    let path = dir.join(MANIFEST_FILE);
    let contents = std::fs::read_to_string(&path).map_err(|source| SkillBuildError::Io {
        path: path.clone(),
        source,
    })?;
    let manifest: SkillManifest =
        serde_yaml::from_str(&contents).map_err(|source| SkillBuildError::Manifest {
            path: path.clone(),
            source,
        })?;

    let key = manifest.key.unwrap_or_else(|| {
        dir.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut builder = SkillType::builder(key).max_level(manifest.max_level);
    if let Some(name) = manifest.name {
        builder = builder.name(name);
    }
    if let Some(description) = manifest.description {
        builder = builder.description(description);
    }
    if let Some(init) = &manifest.init {
        builder = builder.on_init(catalog.resolve_init(init, &manifest.variables)?);
    }
    for (event_name, handler_name) in &manifest.events {
        let event: SkillEvent = event_name
            .parse()
            .map_err(|_| SkillBuildError::UnknownEvent(event_name.clone()))?;
        builder = builder.on(
            event,
            catalog.resolve_handler(handler_name, event, &manifest.variables)?,
        );
    }

    Ok(builder.variables(manifest.variables).build())
}
