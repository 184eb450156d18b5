// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persisted declaration lifecycle status.
//!
//! The string forms are shared with existing consumers and must not change.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status stored with a submitted declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclarationStatus {
    /// Awaiting downstream regulatory filing.
    Pending,
    /// Persisted but not eligible for filing.
    Draft,
    /// Rejected by the geometry check.
    NonCompliantGeometry,
    /// Rejected by the satellite check.
    NonCompliantSatellite,
    /// Inbound declaration awaiting external confirmation.
    Validating,
}

impl DeclarationStatus {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Draft => "draft",
            Self::NonCompliantGeometry => "non-compliant-geometry",
            Self::NonCompliantSatellite => "non-compliant-satellite",
            Self::Validating => "validating",
        }
    }

    /// Returns true if a record in this status may be filed downstream.
    #[must_use]
    pub const fn is_filing_eligible(&self) -> bool {
        matches!(self, Self::Pending | Self::Validating)
    }
}

impl FromStr for DeclarationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "draft" => Ok(Self::Draft),
            "non-compliant-geometry" => Ok(Self::NonCompliantGeometry),
            "non-compliant-satellite" => Ok(Self::NonCompliantSatellite),
            "validating" => Ok(Self::Validating),
            _ => Err(DomainError::InvalidDeclarationStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for DeclarationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
