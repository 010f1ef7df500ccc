// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic triggers driving the [`Controller`].
//!
//! Two independent tasks: routine reauth and health probe. Each ticks on its
//! own interval and calls the matching controller hook; the controller's
//! session lock does the serializing. Both tasks exit on the controller's
//! cancellation token.

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::client::SessionClient;
use crate::controller::Controller;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    RoutineReauth,
    HealthProbe,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::RoutineReauth => write!(f, "routine-reauth"),
            Trigger::HealthProbe => write!(f, "health-probe"),
        }
    }
}

/// Running triggers. Dropping the handle leaves them running; call
/// [`shutdown`](Self::shutdown) to stop them.
pub struct Scheduler<C: SessionClient + 'static> {
    controller: Arc<Controller<C>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<C: SessionClient + 'static> Scheduler<C> {
    /// Enables the controller and starts both triggers.
    ///
    /// The first tick of each trigger fires one full interval after start.
    pub async fn start(controller: Arc<Controller<C>>) -> Self {
        controller.on_enable().await;

        let schedule = controller.schedule().clone();
        let tasks = vec![
            tokio::spawn(run_trigger(
                Arc::clone(&controller),
                Trigger::RoutineReauth,
                schedule.routine_reauth_interval(),
            )),
            tokio::spawn(run_trigger(
                Arc::clone(&controller),
                Trigger::HealthProbe,
                schedule.health_probe_interval(),
            )),
        ];

        Scheduler { controller, tasks }
    }

    pub fn controller(&self) -> &Arc<Controller<C>> {
        &self.controller
    }

    /// Cancels both triggers and any running episode, then waits for them.
    pub async fn shutdown(self) {
        self.controller.shutdown().await;
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!("trigger task failed: {}", e);
            }
        }
    }
}

async fn run_trigger<C: SessionClient + 'static>(
    controller: Arc<Controller<C>>,
    trigger: Trigger,
    period: Duration,
) {
    let cancel = controller.cancellation().clone();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!(%trigger, period_secs = period.as_secs(), "trigger started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let report = match trigger {
                    Trigger::RoutineReauth => controller.routine_reauth().await,
                    Trigger::HealthProbe => controller.health_probe().await,
                };
                tracing::debug!(%trigger, ?report, "trigger fired");
            }
        }
    }

    tracing::debug!(%trigger, "trigger stopped");
}
