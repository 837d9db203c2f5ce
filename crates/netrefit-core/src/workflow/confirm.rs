// ── Confirmation gate ──
//
// The cancellation points of a run are all pre-phase human decisions:
// proceed despite occupied staging buckets, wipe every staged device,
// rebind a network. They are modeled as an injectable port so the
// orchestrator is testable without simulated input streams.

/// Answers yes/no questions before destructive or surprising steps.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves everything. Default for non-interactive callers that gate
/// upstream (e.g. a `--yes` flag already checked).
#[derive(Debug, Clone, Copy)]
pub struct AutoApprove;

impl ConfirmationGate for AutoApprove {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy)]
pub struct DeclineAll;

impl ConfirmationGate for DeclineAll {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}
