// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The asynchronous half of the geo pipeline.
//!
//! A check task settles for the phase's delay, asks the policy for a verdict
//! and reports back to the owning session. It never touches the draft. The
//! session keeps the task's handle and aborts it when the run is superseded.

use crate::config::GeoTimings;
use eudr_declare_domain::{
    DeclarationType, FileRef, GeoFailure, GeoPhase, GeoPolicy, GeoRunId, GeoVerdict,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// The verdict of one phase, addressed to the run it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoOutcome {
    pub run: GeoRunId,
    pub phase: GeoPhase,
    pub verdict: GeoVerdict,
}

/// One phase to check.
#[derive(Debug, Clone)]
pub struct GeoCheck {
    pub run: GeoRunId,
    pub phase: GeoPhase,
    pub declaration_type: DeclarationType,
    pub file: FileRef,
}

const fn settle_delay(timings: GeoTimings, phase: GeoPhase) -> Duration {
    match phase {
        GeoPhase::Geometry => timings.geometry_delay,
        GeoPhase::Satellite => timings.satellite_delay,
    }
}

/// Runs one phase to completion, bounded by the maximum wait.
pub async fn run_check(
    policy: &dyn GeoPolicy,
    timings: GeoTimings,
    check: &GeoCheck,
) -> GeoVerdict {
    let decide = async {
        tokio::time::sleep(settle_delay(timings, check.phase)).await;
        match check.phase {
            GeoPhase::Geometry => policy.geometry_valid(check.declaration_type, &check.file),
            GeoPhase::Satellite => policy.satellite_valid(check.declaration_type, &check.file),
        }
    };

    match tokio::time::timeout(timings.max_wait, decide).await {
        Ok(valid) => GeoVerdict::from_valid(valid),
        Err(_) => GeoVerdict::Failed(GeoFailure::TimedOut),
    }
}

/// Spawns a check task that reports its outcome on `outcomes`.
///
/// The returned handle is the only way to stop the task early.
pub fn spawn_check(
    policy: Arc<dyn GeoPolicy>,
    timings: GeoTimings,
    check: GeoCheck,
    outcomes: mpsc::UnboundedSender<GeoOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let verdict: GeoVerdict = run_check(policy.as_ref(), timings, &check).await;
        let outcome: GeoOutcome = GeoOutcome {
            run: check.run,
            phase: check.phase,
            verdict,
        };
        if outcomes.send(outcome).is_err() {
            debug!(run = %check.run, phase = %check.phase, "Session gone, dropping geo outcome");
        }
    })
}
