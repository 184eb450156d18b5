// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runtime settings shared by every wizard session.

use eudr_declare_domain::UploadLimits;
use std::time::Duration;

/// Default settle delay of the geometry phase.
pub const DEFAULT_GEOMETRY_DELAY_MS: u64 = 2000;

/// Default settle delay of the satellite phase.
pub const DEFAULT_SATELLITE_DELAY_MS: u64 = 3000;

/// Default maximum wait for a single phase before it is treated as failed.
pub const DEFAULT_MAX_GEO_WAIT_MS: u64 = 30_000;

/// Default time a session may go without client requests before it ends.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 1800;

/// Timing of the two geo check phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoTimings {
    /// Settle delay before the geometry verdict is reported.
    pub geometry_delay: Duration,
    /// Settle delay before the satellite verdict is reported.
    pub satellite_delay: Duration,
    /// A phase still unresolved after this long fails as `timed_out`.
    pub max_wait: Duration,
}

impl GeoTimings {
    /// Builds timings from millisecond values.
    #[must_use]
    pub const fn from_millis(geometry_delay: u64, satellite_delay: u64, max_wait: u64) -> Self {
        Self {
            geometry_delay: Duration::from_millis(geometry_delay),
            satellite_delay: Duration::from_millis(satellite_delay),
            max_wait: Duration::from_millis(max_wait),
        }
    }
}

impl Default for GeoTimings {
    fn default() -> Self {
        Self::from_millis(
            DEFAULT_GEOMETRY_DELAY_MS,
            DEFAULT_SATELLITE_DELAY_MS,
            DEFAULT_MAX_GEO_WAIT_MS,
        )
    }
}

/// Settings handed to each new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Geo check timing.
    pub timings: GeoTimings,
    /// File size cap applied at selection.
    pub limits: UploadLimits,
    /// A session with no client request for this long is closed.
    pub idle_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timings: GeoTimings::default(),
            limits: UploadLimits::default(),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}
