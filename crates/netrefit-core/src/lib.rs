// netrefit-core: workflow engine for device-generation refresh and
// template migration of managed site networks.

pub mod binpack;
pub mod classify;
pub mod controlplane;
pub mod error;
pub mod model;
pub mod preserve;
pub mod subnet;
pub mod switches;
pub mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use controlplane::{ControlPlane, DeviceUpdate, ManagementPorts, VlanUpdate, WanLink};
pub use error::CoreError;
pub use workflow::Orchestrator;
pub use workflow::confirm::ConfirmationGate;
pub use workflow::migrate::DEFAULT_VLAN_IDS;
pub use workflow::settle::{ConsistencyWait, NoWait, SettleDelays};
pub use workflow::{BatchDistribution, BucketStatus, RemovalReport, StagingBucket};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Identity
    MacAddress,
    // Devices
    DeviceCategory, DeviceRecord,
    // VLANs
    FixedIpAssignment, ReservedRange, VlanConfig,
    // Plans
    ApAssignment, DeviceIntent, MigrationPlan, RefreshPlan, SiteAddress,
    // Results
    AddedDevice, Phase, PhaseResult, WorkflowResult,
};

pub use classify::{Classification, ModelRules, classify};
pub use preserve::StaticWanConfig;
