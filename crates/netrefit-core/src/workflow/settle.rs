// ── Consistency-wait strategy ──
//
// The control plane offers no synchronous consistency guarantee: a write
// may not be visible to the next read. Mutating phases therefore pause
// before the next phase reads state. The pause is a strategy so tests can
// run with an instantaneous stand-in.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::model::Phase;

/// Pluggable wait inserted after a mutating phase.
#[async_trait]
pub trait ConsistencyWait: Send + Sync {
    async fn settle(&self, phase: Phase);
}

/// Fixed wall-clock delays, tiered by how much state a phase churns.
#[derive(Debug, Clone)]
pub struct SettleDelays {
    /// After ordinary mutating phases.
    pub standard: Duration,
    /// After light-touch phases (renames, switch assignment updates).
    pub brief: Duration,
    /// After template unbind/bind, which the dashboard takes longest to
    /// finalize.
    pub rebind: Duration,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            standard: Duration::from_secs(10),
            brief: Duration::from_secs(5),
            rebind: Duration::from_secs(20),
        }
    }
}

impl SettleDelays {
    fn delay_for(&self, phase: Phase) -> Duration {
        match phase {
            Phase::UnbindNetwork | Phase::BindNetwork => self.rebind,
            Phase::RenameSensors | Phase::EnsureSwitchAssignments => self.brief,
            _ => self.standard,
        }
    }
}

#[async_trait]
impl ConsistencyWait for SettleDelays {
    async fn settle(&self, phase: Phase) {
        let delay = self.delay_for(phase);
        debug!(%phase, ?delay, "settling after mutating phase");
        tokio::time::sleep(delay).await;
    }
}

/// No-op wait for tests.
#[derive(Debug, Clone, Copy)]
pub struct NoWait;

#[async_trait]
impl ConsistencyWait for NoWait {
    async fn settle(&self, _phase: Phase) {}
}
