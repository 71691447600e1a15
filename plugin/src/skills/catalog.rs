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

//! Named, typed skill handlers
//!
//! Skill manifests never contain code. They bind events to handler names, and
//! the catalog turns those names into callbacks while checking that the handler
//! understands the event's argument shape and that every variable it reads is
//! present in the manifest.

use super::event::{EventShape, EventShapes, SkillEvent};
use super::registry::SkillBuildError;
use super::skill_type::{EventCallback, InitCallback, Variables};
use std::collections::HashMap;

/// A catalog entry for an event handler.
#[derive(Clone)]
struct HandlerSpec {
    accepts: EventShapes,
    required_variables: Vec<String>,
    callback: EventCallback,
}

impl HandlerSpec {
    fn accepts(&self, shape: EventShape) -> bool {
        self.accepts.contains(shape)
    }
}

/// A catalog entry for an init handler.
#[derive(Clone)]
struct InitSpec {
    required_variables: Vec<String>,
    callback: InitCallback,
}

/// Handlers skill manifests may refer to by name.
#[derive(Clone, Default)]
pub struct HandlerCatalog {
    handlers: HashMap<String, HandlerSpec>,
    inits: HashMap<String, InitSpec>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event handler under `name`, replacing any previous one.
    pub fn register_handler(
        &mut self,
        name: impl Into<String>,
        accepts: impl Into<EventShapes>,
        required_variables: &[&str],
        callback: EventCallback,
    ) -> &mut Self {
        self.handlers.insert(
            name.into(),
            HandlerSpec {
                accepts: accepts.into(),
                required_variables: required_variables.iter().map(|v| v.to_string()).collect(),
                callback,
            },
        );
        self
    }

    /// Register an init handler under `name`, replacing any previous one.
    pub fn register_init(
        &mut self,
        name: impl Into<String>,
        required_variables: &[&str],
        callback: InitCallback,
    ) -> &mut Self {
        self.inits.insert(
            name.into(),
            InitSpec {
                required_variables: required_variables.iter().map(|v| v.to_string()).collect(),
                callback,
            },
        );
        self
    }

    /// Resolve the handler bound to `event` in a manifest.
    pub fn resolve_handler(
        &self,
        name: &str,
        event: SkillEvent,
        variables: &Variables,
    ) -> Result<EventCallback, SkillBuildError> {
        let spec = self
            .handlers
            .get(name)
            .ok_or_else(|| SkillBuildError::UnknownHandler(name.to_string()))?;

        if !spec.accepts(event.shape()) {
            return Err(SkillBuildError::ShapeMismatch {
                handler: name.to_string(),
                event,
                shape: event.shape(),
            });
        }
        check_variables(name, &spec.required_variables, variables)?;

        Ok(spec.callback.clone())
    }

    /// Resolve a manifest's init handler.
    pub fn resolve_init(
        &self,
        name: &str,
        variables: &Variables,
    ) -> Result<InitCallback, SkillBuildError> {
        let spec = self
            .inits
            .get(name)
            .ok_or_else(|| SkillBuildError::UnknownInit(name.to_string()))?;
        check_variables(name, &spec.required_variables, variables)?;
        Ok(spec.callback.clone())
    }
}

fn check_variables(
    handler: &str,
    required: &[String],
    variables: &Variables,
) -> Result<(), SkillBuildError> {
    match required.iter().find(|v| !variables.contains(v)) {
        Some(missing) => Err(SkillBuildError::MissingVariable {
            handler: handler.to_string(),
            variable: missing.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::skill_type::event_callback;
    use serde_json::json;

    fn catalog() -> HandlerCatalog {
        let mut catalog = HandlerCatalog::new();
        catalog.register_handler(
            "test.combat",
            EventShape::Combat,
            &["ratio"],
            event_callback(|_skill, _variables, _strings, _ctx| {}),
        );
        catalog
    }

    #[test]
    fn test_resolve_matching_handler() {
        let variables = Variables::from(json!({ "ratio": 0.5 }));
        assert!(
            catalog()
                .resolve_handler("test.combat", SkillEvent::PlayerAttack, &variables)
                .is_ok()
        );
    }

    #[test]
    fn test_reject_unknown_handler() {
        let result =
            catalog().resolve_handler("test.missing", SkillEvent::PlayerAttack, &Variables::default());
        assert!(matches!(result, Err(SkillBuildError::UnknownHandler(name)) if name == "test.missing"));
    }

    #[test]
    fn test_reject_shape_mismatch() {
        let variables = Variables::from(json!({ "ratio": 0.5 }));
        let result = catalog().resolve_handler("test.combat", SkillEvent::PlayerJump, &variables);
        assert!(matches!(
            result,
            Err(SkillBuildError::ShapeMismatch {
                event: SkillEvent::PlayerJump,
                ..
            })
        ));
    }

    #[test]
    fn test_reject_missing_variable() {
        let result =
            catalog().resolve_handler("test.combat", SkillEvent::PlayerVictim, &Variables::default());
        assert!(matches!(
            result,
            Err(SkillBuildError::MissingVariable { variable, .. }) if variable == "ratio"
        ));
    }

    #[test]
    fn test_reject_unknown_init() {
        let result = catalog().resolve_init("test.init", &Variables::default());
        assert!(matches!(result, Err(SkillBuildError::UnknownInit(_))));
    }
}
