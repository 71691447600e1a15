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

//! Shared, immutable skill definitions

use super::event::{EventContext, SkillEvent};
use super::skill::Skill;
use crate::host::{HostPlayer, TextLookup};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handler bound to one event of a skill type.
///
/// Receives the dispatched skill instance, the type's tunable variables, the
/// type's text handles and the event itself.
pub type EventCallback =
    Arc<dyn Fn(&mut Skill, &Variables, &SkillStrings, &EventContext<'_>) + Send + Sync>;

/// Handler run once when a skill instance is attached to a player.
pub type InitCallback = Arc<dyn Fn(&mut Skill, &dyn HostPlayer) + Send + Sync>;

/// Wrap a closure or function as an [`EventCallback`].
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(&mut Skill, &Variables, &SkillStrings, &EventContext<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure or function as an [`InitCallback`].
pub fn init_callback<F>(f: F) -> InitCallback
where
    F: Fn(&mut Skill, &dyn HostPlayer) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Tunable parameters of a skill type, as written in its manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(Map<String, Value>);

impl Variables {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// Look up a value by dotted path, e.g. `boost.per_level`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut value = self.0.get(parts.next()?)?;
        for part in parts {
            value = value.as_object()?.get(part)?;
        }
        Some(value)
    }

    /// Numeric value at `path`, if present and numeric.
    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Value::as_f64)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for Variables {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Text handles of a skill type.
///
/// Resolved through the host's [`TextLookup`]; the manifest's own strings are
/// used when the lookup has nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillStrings {
    skill_key: String,
    name: Option<String>,
    description: Option<String>,
}

impl SkillStrings {
    pub fn new(
        skill_key: impl Into<String>,
        name: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            skill_key: skill_key.into(),
            name,
            description,
        }
    }

    /// Resolve an arbitrary string of this skill.
    pub fn get(&self, text: &dyn TextLookup, name: &str) -> Option<String> {
        text.lookup(&self.skill_key, name)
    }

    /// Display name, falling back to the manifest name and then the key.
    pub fn name(&self, text: &dyn TextLookup) -> String {
        self.get(text, "name")
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| self.skill_key.clone())
    }

    pub fn description(&self, text: &dyn TextLookup) -> String {
        self.get(text, "description")
            .or_else(|| self.description.clone())
            .unwrap_or_default()
    }
}

/// Definition shared by every instance of one skill.
pub struct SkillType {
    key: String,
    /// `None` means the skill can be leveled without bound.
    max_level: Option<u32>,
    strings: SkillStrings,
    variables: Variables,
    on_init: Option<InitCallback>,
    event_handlers: HashMap<SkillEvent, EventCallback>,
}

impl SkillType {
    pub fn builder(key: impl Into<String>) -> SkillTypeBuilder {
        SkillTypeBuilder::new(key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn max_level(&self) -> Option<u32> {
        self.max_level
    }

    pub fn strings(&self) -> &SkillStrings {
        &self.strings
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn on_init(&self) -> Option<&InitCallback> {
        self.on_init.as_ref()
    }

    pub fn handler(&self, event: SkillEvent) -> Option<&EventCallback> {
        self.event_handlers.get(&event)
    }

    /// Events this type reacts to, in a stable order.
    pub fn events(&self) -> Vec<SkillEvent> {
        SkillEvent::iter()
            .filter(|event| self.event_handlers.contains_key(event))
            .collect()
    }

    /// Whether `level` is below the cap.
    pub fn below_cap(&self, level: u32) -> bool {
        self.max_level.is_none_or(|max| level < max)
    }
}

impl fmt::Debug for SkillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillType")
            .field("key", &self.key)
            .field("max_level", &self.max_level)
            .field("variables", &self.variables)
            .field("has_init", &self.on_init.is_some())
            .field("events", &self.events())
            .finish()
    }
}

/// Builder for [`SkillType`].
pub struct SkillTypeBuilder {
    key: String,
    max_level: Option<u32>,
    name: Option<String>,
    description: Option<String>,
    variables: Variables,
    on_init: Option<InitCallback>,
    event_handlers: HashMap<SkillEvent, EventCallback>,
}

impl SkillTypeBuilder {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            max_level: None,
            name: None,
            description: None,
            variables: Variables::default(),
            on_init: None,
            event_handlers: HashMap::new(),
        }
    }

    pub fn max_level(mut self, max_level: Option<u32>) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn on_init(mut self, callback: InitCallback) -> Self {
        self.on_init = Some(callback);
        self
    }

    /// Bind `callback` to `event`, replacing any previous binding.
    pub fn on(mut self, event: SkillEvent, callback: EventCallback) -> Self {
        self.event_handlers.insert(event, callback);
        self
    }

    pub fn build(self) -> SkillType {
        let strings = SkillStrings::new(self.key.clone(), self.name, self.description);
        SkillType {
            key: self.key,
            max_level: self.max_level,
            strings,
            variables: self.variables,
            on_init: self.on_init,
            event_handlers: self.event_handlers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoTranslations;
    use serde_json::json;

    #[test]
    fn test_variables_dotted_path() {
        let variables = Variables::from(json!({
            "boost": { "base": 0.4, "per_level": 0.2 },
            "flat": 3,
        }));
        assert_eq!(variables.get_f64("boost.base"), Some(0.4));
        assert_eq!(variables.get_f64("boost.per_level"), Some(0.2));
        assert_eq!(variables.get_f64("flat"), Some(3.0));
        assert!(!variables.contains("boost.missing"));
        assert!(!variables.contains("flat.nested"));
    }

    #[test]
    fn test_strings_fallbacks() {
        let named = SkillStrings::new("health", Some("Health+".into()), None);
        assert_eq!(named.name(&NoTranslations), "Health+");
        assert_eq!(named.description(&NoTranslations), "");

        let bare = SkillStrings::new("stealth", None, None);
        assert_eq!(bare.name(&NoTranslations), "stealth");
    }

    #[test]
    fn test_cap() {
        let capped = SkillType::builder("capped").max_level(Some(2)).build();
        assert!(capped.below_cap(1));
        assert!(!capped.below_cap(2));

        let unbounded = SkillType::builder("unbounded").build();
        assert!(unbounded.below_cap(u32::MAX - 1));
        assert_eq!(unbounded.max_level(), None);
    }
}
