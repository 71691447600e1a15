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

//! Periodic save timer
//!
//! The timer runs on the tokio runtime but never touches player state itself.
//! Each period it leaves a signal on a channel; the owner of the sessions polls
//! it from its own callback and performs the save there.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub struct AutoSaveTimer {
    period: Duration,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
    due: mpsc::Receiver<()>,
}

impl AutoSaveTimer {
    /// Start ticking every `period`. Must be called inside a tokio runtime.
    pub fn start(period: Duration) -> Self {
        let token = CancellationToken::new();
        // Capacity one: signals coalesce while the owner is busy.
        let (tx, due) = mpsc::channel(1);

        let task_token = token.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {
                        let _ = tx.try_send(());
                    }
                }
            }
            tracing::debug!("Auto-save timer stopped");
        });

        tracing::info!("Auto-save timer started (interval: {}s)", period.as_secs());
        Self {
            period,
            token,
            task: Some(task),
            due,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Whether a save came due since the last call.
    pub fn take_due(&mut self) -> bool {
        let mut due = false;
        while self.due.try_recv().is_ok() {
            due = true;
        }
        due
    }

    /// Stop the timer and wait for its task to finish.
    pub async fn stop(&mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Auto-save timer task failed: {}", e);
            }
        }
    }
}

impl Drop for AutoSaveTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl std::fmt::Debug for AutoSaveTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaveTimer")
            .field("period", &self.period)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_signals_once_per_period() {
        let mut timer = AutoSaveTimer::start(Duration::from_secs(240));
        assert!(timer.is_running());
        assert!(!timer.take_due());

        tokio::time::sleep(Duration::from_secs(239)).await;
        assert!(!timer.take_due());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(timer.take_due());
        assert!(!timer.take_due());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missed_periods_coalesce() {
        let mut timer = AutoSaveTimer::start(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert!(timer.take_due());
        assert!(!timer.take_due());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop() {
        let mut timer = AutoSaveTimer::start(Duration::from_secs(10));
        timer.stop().await;
        assert!(!timer.is_running());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!timer.take_due());
    }
}
