// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Geo-compliance pipeline state.
//!
//! An uploaded geospatial file is checked in two phases: geometry, then
//! satellite. The satellite phase is only ever entered from a passed geometry
//! phase, so states such as "satellite compliant but geometry never checked"
//! cannot be expressed.
//!
//! Every upload starts a new run. Resolutions carry the run they belong to and
//! are refused unless that run is the one in flight.

use crate::error::DomainError;
use crate::types::DeclarationType;
use crate::upload::FileRef;
use serde::{Deserialize, Serialize};

/// Identifier of one pass through the pipeline, minted per upload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GeoRunId(u64);

impl GeoRunId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the identifier following this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for GeoRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two check phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoPhase {
    Geometry,
    Satellite,
}

impl std::fmt::Display for GeoPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geometry => write!(f, "geometry"),
            Self::Satellite => write!(f, "satellite"),
        }
    }
}

/// Why a phase failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoFailure {
    /// The checker concluded the file is not compliant.
    Rejected,
    /// The checker did not answer within the maximum wait.
    TimedOut,
}

/// The conclusion of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoVerdict {
    Passed,
    Failed(GeoFailure),
}

impl GeoVerdict {
    /// Maps a checker answer to a verdict.
    #[must_use]
    pub const fn from_valid(valid: bool) -> Self {
        if valid {
            Self::Passed
        } else {
            Self::Failed(GeoFailure::Rejected)
        }
    }
}

/// Flags reported on the submission payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFlags {
    #[serde(rename = "hasGeoJSON")]
    pub has_geo_json: bool,
    pub geometry_valid: bool,
    pub satellite_valid: bool,
}

/// The pipeline state held on the draft.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeoValidationState {
    /// No file selected.
    #[default]
    Idle,
    /// A file passed the pre-checks; geometry check not started yet.
    Uploaded { file: FileRef, run: GeoRunId },
    /// Geometry check in flight.
    CheckingGeometry { file: FileRef, run: GeoRunId },
    /// Geometry check failed. Satellite check was never attempted.
    GeometryFailed { file: FileRef, reason: GeoFailure },
    /// Geometry passed; satellite check in flight.
    CheckingSatellite { file: FileRef, run: GeoRunId },
    /// Geometry passed; satellite check failed.
    SatelliteFailed { file: FileRef, reason: GeoFailure },
    /// Both phases passed.
    Compliant { file: FileRef },
}

impl GeoValidationState {
    /// Returns the state name used in views and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploaded { .. } => "uploaded",
            Self::CheckingGeometry { .. } => "checking_geometry",
            Self::GeometryFailed { .. } => "geometry_failed",
            Self::CheckingSatellite { .. } => "checking_satellite",
            Self::SatelliteFailed { .. } => "satellite_failed",
            Self::Compliant { .. } => "compliant",
        }
    }

    /// The selected file, if any.
    #[must_use]
    pub const fn file(&self) -> Option<&FileRef> {
        match self {
            Self::Idle => None,
            Self::Uploaded { file, .. }
            | Self::CheckingGeometry { file, .. }
            | Self::GeometryFailed { file, .. }
            | Self::CheckingSatellite { file, .. }
            | Self::SatelliteFailed { file, .. }
            | Self::Compliant { file } => Some(file),
        }
    }

    /// The run in flight, if the pipeline has not reached a terminal state.
    #[must_use]
    pub const fn current_run(&self) -> Option<GeoRunId> {
        match self {
            Self::Uploaded { run, .. }
            | Self::CheckingGeometry { run, .. }
            | Self::CheckingSatellite { run, .. } => Some(*run),
            Self::Idle
            | Self::GeometryFailed { .. }
            | Self::SatelliteFailed { .. }
            | Self::Compliant { .. } => None,
        }
    }

    /// Returns true while a check phase is running.
    #[must_use]
    pub const fn is_checking(&self) -> bool {
        matches!(
            self,
            Self::CheckingGeometry { .. } | Self::CheckingSatellite { .. }
        )
    }

    /// Returns true once a file has been selected (`uploaded` or any later state).
    #[must_use]
    pub const fn has_file(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Returns true in either failure state.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(
            self,
            Self::GeometryFailed { .. } | Self::SatelliteFailed { .. }
        )
    }

    /// The flags carried on the submission payload.
    #[must_use]
    pub const fn flags(&self) -> GeoFlags {
        GeoFlags {
            has_geo_json: self.has_file(),
            geometry_valid: matches!(
                self,
                Self::CheckingSatellite { .. } | Self::SatelliteFailed { .. } | Self::Compliant { .. }
            ),
            satellite_valid: matches!(self, Self::Compliant { .. }),
        }
    }

    /// Starts a new run for a freshly selected file.
    ///
    /// Any run in flight is superseded: its resolutions will be refused.
    #[must_use]
    pub const fn select_file(file: FileRef, run: GeoRunId) -> Self {
        Self::Uploaded { file, run }
    }

    fn ensure_current(&self, run: GeoRunId) -> Result<(), DomainError> {
        match self.current_run() {
            Some(current) if current == run => Ok(()),
            current => Err(DomainError::StaleGeoResult {
                current,
                received: run,
            }),
        }
    }

    /// Moves `uploaded` to `checking_geometry`.
    ///
    /// # Errors
    ///
    /// Returns an error if `run` is not the run in flight or the pipeline is
    /// not in `uploaded`.
    pub fn begin_geometry(&self, run: GeoRunId) -> Result<Self, DomainError> {
        self.ensure_current(run)?;
        match self {
            Self::Uploaded { file, run } => Ok(Self::CheckingGeometry {
                file: file.clone(),
                run: *run,
            }),
            other => Err(DomainError::UnexpectedGeoPhase {
                phase: GeoPhase::Geometry,
                state: other.name(),
            }),
        }
    }

    /// Applies the verdict of a phase.
    ///
    /// A passed geometry phase moves on to `checking_satellite`; a failed one
    /// stops in `geometry_failed`. The satellite verdict ends the run.
    ///
    /// # Errors
    ///
    /// Returns an error if `run` is not the run in flight or `phase` is not
    /// the phase currently checking.
    pub fn resolve(
        &self,
        run: GeoRunId,
        phase: GeoPhase,
        verdict: GeoVerdict,
    ) -> Result<Self, DomainError> {
        self.ensure_current(run)?;
        match (self, phase, verdict) {
            (Self::CheckingGeometry { file, run }, GeoPhase::Geometry, GeoVerdict::Passed) => {
                Ok(Self::CheckingSatellite {
                    file: file.clone(),
                    run: *run,
                })
            }
            (
                Self::CheckingGeometry { file, .. },
                GeoPhase::Geometry,
                GeoVerdict::Failed(reason),
            ) => Ok(Self::GeometryFailed {
                file: file.clone(),
                reason,
            }),
            (Self::CheckingSatellite { file, .. }, GeoPhase::Satellite, GeoVerdict::Passed) => {
                Ok(Self::Compliant { file: file.clone() })
            }
            (
                Self::CheckingSatellite { file, .. },
                GeoPhase::Satellite,
                GeoVerdict::Failed(reason),
            ) => Ok(Self::SatelliteFailed {
                file: file.clone(),
                reason,
            }),
            (other, phase, _) => Err(DomainError::UnexpectedGeoPhase {
                phase,
                state: other.name(),
            }),
        }
    }
}

/// Decides the outcome of each check phase.
///
/// Whether the type-based outcome is a business rule or a placeholder for a
/// real geometry/satellite service is unconfirmed, so it is injected.
pub trait GeoPolicy: Send + Sync {
    /// Decides the geometry phase.
    fn geometry_valid(&self, declaration_type: DeclarationType, file: &FileRef) -> bool;

    /// Decides the satellite phase. Only consulted after geometry passed.
    fn satellite_valid(&self, declaration_type: DeclarationType, file: &FileRef) -> bool;
}

/// Outbound files always pass both phases; inbound files always fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeBasedGeoPolicy;

impl GeoPolicy for TypeBasedGeoPolicy {
    fn geometry_valid(&self, declaration_type: DeclarationType, _file: &FileRef) -> bool {
        matches!(declaration_type, DeclarationType::Outbound)
    }

    fn satellite_valid(&self, declaration_type: DeclarationType, _file: &FileRef) -> bool {
        matches!(declaration_type, DeclarationType::Outbound)
    }
}
