// ── Workflow engines ──
//
// One orchestrator drives all three workflows: device-generation refresh,
// template migration, and staging batch distribution. Control-plane calls
// are strictly sequential; every failure short of a template unbind/bind
// error is recorded in the result and the run keeps going.

pub mod confirm;
pub mod context;
pub mod migrate;
pub mod refresh;
pub mod settle;
pub mod staging;

use crate::classify::ModelRules;
use crate::controlplane::ControlPlane;
use confirm::{AutoApprove, ConfirmationGate};
use settle::{ConsistencyWait, SettleDelays};

pub use staging::{BatchDistribution, BucketStatus, RemovalReport, StagingBucket};

/// Drives workflow runs against one control plane.
///
/// Holds no per-run state: everything a run accumulates lives in an
/// explicit `WorkflowContext` created inside the run and returned as a
/// `WorkflowResult`, so concurrent test runs can't bleed into each other.
pub struct Orchestrator<C: ControlPlane> {
    pub(crate) plane: C,
    pub(crate) rules: ModelRules,
    pub(crate) settle: Box<dyn ConsistencyWait>,
    pub(crate) confirm: Box<dyn ConfirmationGate>,
}

impl<C: ControlPlane> Orchestrator<C> {
    /// Create an orchestrator with production settle delays and
    /// auto-approved confirmations. Interactive callers replace the gate
    /// via [`with_confirmation`](Self::with_confirmation).
    pub fn new(plane: C, rules: ModelRules) -> Self {
        Self {
            plane,
            rules,
            settle: Box::new(SettleDelays::default()),
            confirm: Box::new(AutoApprove),
        }
    }

    /// Replace the consistency-wait strategy (tests use [`settle::NoWait`]).
    pub fn with_settle(mut self, settle: impl ConsistencyWait + 'static) -> Self {
        self.settle = Box::new(settle);
        self
    }

    /// Replace the confirmation gate for destructive decision points.
    pub fn with_confirmation(mut self, gate: impl ConfirmationGate + 'static) -> Self {
        self.confirm = Box::new(gate);
        self
    }

    /// The classification rules in effect.
    pub fn rules(&self) -> &ModelRules {
        &self.rules
    }

    /// The underlying control plane.
    pub fn plane(&self) -> &C {
        &self.plane
    }
}
