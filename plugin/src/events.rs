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

//! Event routing and notifications
//!
//! Host events enter through the [`EventRouter`], which turns them into skill
//! dispatches and XP awards. Progression changes leave as [`Notification`]s
//! handed to the context's [`Subscribers`].

pub mod router;
pub mod subscribers;
pub mod types;

pub use router::EventRouter;
pub use subscribers::{NotificationHandler, Subscribers};
pub use types::Notification;
