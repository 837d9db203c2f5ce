// ── Staging batch distribution ──
//
// New appliances are parked on staging networks to sync firmware before
// installation. Each staging bucket holds at most two devices; a batch of
// up to twenty is spread greedily across whatever slack exists, and an
// oversized batch is rejected before anything is claimed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::binpack::{BUCKET_CAPACITY, BucketPool, MAX_BATCH_SIZE};
use crate::controlplane::ControlPlane;
use crate::error::CoreError;
use crate::model::DeviceRecord;
use crate::workflow::Orchestrator;

/// A configured staging network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingBucket {
    pub name: String,
    pub network_id: String,
}

/// Live occupancy of one staging bucket.
#[derive(Debug, Clone, Serialize)]
pub struct BucketStatus {
    pub bucket: StagingBucket,
    /// Matching devices currently parked here.
    pub occupants: Vec<DeviceRecord>,
    /// Free slots, zero when the occupancy read failed.
    pub available: usize,
    /// Why the bucket is unusable, if its read failed.
    pub error: Option<String>,
}

/// Outcome of one batch distribution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchDistribution {
    /// Bucket name -> serials claimed into it.
    pub assignments: BTreeMap<String, Vec<String>>,
    /// Serials that were not placed (infeasible batch, failed claims, or
    /// a declined confirmation).
    pub unassigned: Vec<String>,
    /// Slots missing when the batch exceeded aggregate capacity.
    pub shortfall: Option<usize>,
    /// True when the operator declined to proceed past occupied buckets.
    pub cancelled: bool,
}

/// Outcome of a staging removal sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalReport {
    /// Bucket name -> (removed serials, failed serials).
    pub buckets: BTreeMap<String, (Vec<String>, Vec<String>)>,
    pub total_removed: usize,
    pub total_failed: usize,
    pub cancelled: bool,
}

impl<C: ControlPlane> Orchestrator<C> {
    /// Read the occupancy of every staging bucket.
    ///
    /// `model_prefix` scopes the count to the device family being staged;
    /// a bucket whose read fails is reported with zero availability.
    pub async fn survey_staging(
        &self,
        buckets: &[StagingBucket],
        model_prefix: &str,
    ) -> Vec<BucketStatus> {
        let prefixes = [model_prefix.to_owned()];
        let mut out = Vec::with_capacity(buckets.len());

        for bucket in buckets {
            match self.plane.list_devices(&bucket.network_id).await {
                Ok(devices) => {
                    let occupants: Vec<_> = devices
                        .into_iter()
                        .filter(|d| d.model_matches(&prefixes))
                        .collect();
                    out.push(BucketStatus {
                        available: BUCKET_CAPACITY.saturating_sub(occupants.len()),
                        bucket: bucket.clone(),
                        occupants,
                        error: None,
                    });
                }
                Err(e) => out.push(BucketStatus {
                    bucket: bucket.clone(),
                    occupants: Vec::new(),
                    available: 0,
                    error: Some(e.to_string()),
                }),
            }
        }

        out
    }

    /// Distribute a batch of serials across the staging buckets.
    ///
    /// Feasibility is checked against aggregate slack before any claim is
    /// issued; an oversized batch comes back fully unassigned with its
    /// shortfall. Occupied buckets trigger a confirmation gate first.
    /// A failed claim marks that serial unassigned without consuming the
    /// bucket's slot, so a later serial may still land there.
    pub async fn distribute_batch(
        &self,
        serials: &[String],
        buckets: &[StagingBucket],
        model_prefix: &str,
    ) -> Result<BatchDistribution, CoreError> {
        if serials.len() > MAX_BATCH_SIZE {
            return Err(CoreError::ValidationFailed {
                message: format!(
                    "batch of {} exceeds the maximum of {MAX_BATCH_SIZE} devices",
                    serials.len()
                ),
            });
        }

        let mut distribution = BatchDistribution::default();
        let statuses = self.survey_staging(buckets, model_prefix).await;

        // Buckets with leftover occupants usually mean a previous batch
        // was never cleaned up; make the operator say so before stacking
        // more devices around them.
        let occupied: Vec<_> = statuses.iter().filter(|s| !s.occupants.is_empty()).collect();
        if !occupied.is_empty() {
            let mut prompt = String::from("Staging buckets already hold devices:\n");
            for status in &occupied {
                prompt.push_str(&format!(
                    "  {}: {}/{BUCKET_CAPACITY} slots used\n",
                    status.bucket.name,
                    status.occupants.len()
                ));
            }
            prompt.push_str("Existing devices should be removed first. Continue anyway?");
            warn!(occupied = occupied.len(), "staging buckets have pre-existing occupants");

            if !self.confirm.confirm(&prompt) {
                distribution.cancelled = true;
                distribution.unassigned = serials.to_vec();
                return Ok(distribution);
            }
        }

        let mut pool = BucketPool::from_occupied(statuses.iter().map(|s| {
            if s.error.is_some() {
                BUCKET_CAPACITY
            } else {
                s.occupants.len()
            }
        }));

        if let Some(missing) = pool.shortfall(serials.len()) {
            warn!(
                batch = serials.len(),
                available = pool.total_available(),
                missing,
                "batch exceeds staging capacity; rejecting whole batch"
            );
            distribution.shortfall = Some(missing);
            distribution.unassigned = serials.to_vec();
            return Ok(distribution);
        }

        for serial in serials {
            let Some(index) = pool.best() else {
                distribution.unassigned.push(serial.clone());
                continue;
            };
            let bucket = &statuses[index].bucket;
            match self.plane.claim_device(&bucket.network_id, serial).await {
                Ok(()) => {
                    pool.commit(index);
                    info!(serial, bucket = bucket.name, "staged device");
                    distribution
                        .assignments
                        .entry(bucket.name.clone())
                        .or_default()
                        .push(serial.clone());
                }
                Err(e) => {
                    // Slot not consumed: the claim never landed.
                    warn!(serial, bucket = bucket.name, error = %e, "claim failed");
                    distribution.unassigned.push(serial.clone());
                }
            }
        }

        Ok(distribution)
    }

    /// Remove a list of staged devices from one staging network.
    pub async fn remove_staged(
        &self,
        network_id: &str,
        serials: &[String],
    ) -> (Vec<String>, Vec<String>) {
        let mut removed = Vec::new();
        let mut failed = Vec::new();

        for serial in serials {
            match self.plane.remove_device(network_id, serial).await {
                Ok(()) => {
                    info!(serial, network_id, "removed staged device");
                    removed.push(serial.clone());
                }
                Err(e) => {
                    warn!(serial, network_id, error = %e, "failed to remove staged device");
                    failed.push(serial.clone());
                }
            }
        }

        (removed, failed)
    }

    /// Remove every matching device from every staging bucket.
    ///
    /// Destructive: gated on confirmation unless the caller's gate
    /// auto-approves.
    pub async fn remove_all_staged(
        &self,
        buckets: &[StagingBucket],
        model_prefix: &str,
    ) -> RemovalReport {
        let mut report = RemovalReport::default();
        let statuses = self.survey_staging(buckets, model_prefix).await;

        let with_devices: Vec<_> = statuses.iter().filter(|s| !s.occupants.is_empty()).collect();
        if with_devices.is_empty() {
            info!("no staged devices found in any bucket");
            return report;
        }

        let total: usize = with_devices.iter().map(|s| s.occupants.len()).sum();
        let prompt = format!(
            "Remove ALL {total} staged devices from {} staging networks? \
             This cannot be undone.",
            with_devices.len()
        );
        if !self.confirm.confirm(&prompt) {
            report.cancelled = true;
            return report;
        }

        for status in with_devices {
            let serials: Vec<String> =
                status.occupants.iter().map(|d| d.serial.clone()).collect();
            let (removed, failed) = self
                .remove_staged(&status.bucket.network_id, &serials)
                .await;
            report.total_removed += removed.len();
            report.total_failed += failed.len();
            report
                .buckets
                .insert(status.bucket.name.clone(), (removed, failed));
        }

        report
    }
}
