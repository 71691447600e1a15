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


//! Notification subscribers

use super::types::Notification;

pub type NotificationHandler = Box<dyn FnMut(&Notification) + Send>;

/// Handlers interested in progression notifications.
///
/// Owned by the plugin context and driven from the host's callback thread, so
/// delivery is a direct call into each handler in subscription order.
#[derive(Default)]
pub struct Subscribers {
    handlers: Vec<NotificationHandler>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Hand a notification to every subscriber.
    pub fn notify(&mut self, notification: &Notification) {
        for handler in &mut self.handlers {
            handler(notification);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
