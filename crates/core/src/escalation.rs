// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Escalation from lightweight reauth to full re-establishment.

#[cfg(test)]
#[path = "escalation_tests.rs"]
mod tests;

use crate::state::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationDecision {
    Continue,
    Escalate,
}

/// Counts consecutive reauth failures against a threshold.
#[derive(Debug, Clone, Copy)]
pub struct EscalationTracker {
    threshold: u32,
}

impl EscalationTracker {
    pub fn new(threshold: u32) -> Self {
        EscalationTracker { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Records one reauth outcome on `state`.
    ///
    /// Success resets the counter. Failure increments it and escalates once
    /// it reaches the threshold.
    pub fn record_outcome(&self, state: &mut SessionState, success: bool) -> EscalationDecision {
        if success {
            state.consecutive_failures = 0;
            return EscalationDecision::Continue;
        }

        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        if state.consecutive_failures >= self.threshold {
            EscalationDecision::Escalate
        } else {
            EscalationDecision::Continue
        }
    }

    pub fn reset(&self, state: &mut SessionState) {
        state.consecutive_failures = 0;
    }
}
