// src/submit.rs

use std::time::Duration;

use tokio::time::Instant;

pub const LABEL_READY: &str = "Generate Schedule";
pub const LABEL_SUBMITTING: &str = "Generating...";
pub const LABEL_DONE: &str = "Schedule Generated!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPhase {
    Ready,
    Submitting,
    /// Succeeded; the control stays disabled until `until`.
    CoolingDown { until: Instant },
    /// Failed; the control is usable again.
    Failed { message: String },
}

/// Submit control state machine.
///
/// The re-enable delay after a success is a scheduled transition applied by
/// `tick`, so callers decide when time passes.
#[derive(Debug, Clone)]
pub struct SubmitMachine {
    phase: SubmitPhase,
    reenable_delay: Duration,
}

impl SubmitMachine {
    pub fn new(reenable_delay: Duration) -> Self {
        Self {
            phase: SubmitPhase::Ready,
            reenable_delay,
        }
    }

    pub fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    pub fn control_enabled(&self) -> bool {
        matches!(self.phase, SubmitPhase::Ready | SubmitPhase::Failed { .. })
    }

    pub fn control_label(&self) -> &'static str {
        match self.phase {
            SubmitPhase::Ready | SubmitPhase::Failed { .. } => LABEL_READY,
            SubmitPhase::Submitting => LABEL_SUBMITTING,
            SubmitPhase::CoolingDown { .. } => LABEL_DONE,
        }
    }

    /// Ready (or ready-with-error) -> Submitting. Refused while the control is disabled.
    pub fn begin(&mut self) -> bool {
        if !self.control_enabled() {
            return false;
        }
        self.phase = SubmitPhase::Submitting;
        true
    }

    /// Submitting -> CoolingDown, re-enabling at `now + delay`.
    pub fn succeed(&mut self, now: Instant) {
        if self.phase == SubmitPhase::Submitting {
            self.phase = SubmitPhase::CoolingDown {
                until: now + self.reenable_delay,
            };
        }
    }

    /// Submitting -> Failed, effective immediately.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.phase == SubmitPhase::Submitting {
            self.phase = SubmitPhase::Failed {
                message: message.into(),
            };
        }
    }

    /// Applies a due scheduled transition. Returns `true` if the phase changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            SubmitPhase::CoolingDown { until } if now >= until => {
                self.phase = SubmitPhase::Ready;
                true
            }
            _ => false,
        }
    }

    /// When the pending re-enable is due, if any.
    pub fn pending_until(&self) -> Option<Instant> {
        match self.phase {
            SubmitPhase::CoolingDown { until } => Some(until),
            _ => None,
        }
    }
}
