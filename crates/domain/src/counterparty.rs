// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Counterparties and the reference numbers that travel with them.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Countries whose counterparties must quote upstream EUDR reference and
/// verification numbers (the EU member states).
pub const UPSTREAM_REFERENCE_COUNTRIES: &[&str] = &[
    "Austria",
    "Belgium",
    "Bulgaria",
    "Croatia",
    "Cyprus",
    "Czech Republic",
    "Denmark",
    "Estonia",
    "Finland",
    "France",
    "Germany",
    "Greece",
    "Hungary",
    "Ireland",
    "Italy",
    "Latvia",
    "Lithuania",
    "Luxembourg",
    "Malta",
    "Netherlands",
    "Poland",
    "Portugal",
    "Romania",
    "Slovakia",
    "Slovenia",
    "Spain",
    "Sweden",
];

/// Returns true if a counterparty located in `country` requires upstream
/// EUDR reference numbers. Comparison ignores case and surrounding whitespace.
#[must_use]
pub fn requires_upstream_references(country: &str) -> bool {
    let country: &str = country.trim();
    UPSTREAM_REFERENCE_COUNTRIES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(country))
}

/// Which side of the shipment a counterparty is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyRole {
    /// Receives outbound shipments.
    Customer,
    /// Sends inbound shipments.
    Supplier,
}

impl CounterpartyRole {
    /// Returns the wire representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Supplier => "supplier",
        }
    }
}

impl FromStr for CounterpartyRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" | "customers" => Ok(Self::Customer),
            "supplier" | "suppliers" => Ok(Self::Supplier),
            _ => Err(DomainError::InvalidCounterpartyRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for CounterpartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer or supplier chosen from the counterparty directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counterparty {
    /// Identifier assigned by the directory.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Country of registration, as a display name.
    pub country: String,
    /// Customer or supplier.
    pub role: CounterpartyRole,
}

impl Counterparty {
    /// Returns true if this counterparty must quote upstream reference numbers.
    #[must_use]
    pub fn requires_upstream_references(&self) -> bool {
        requires_upstream_references(&self.country)
    }
}

/// One upstream EUDR reference/verification number pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EudrReference {
    /// EUDR due-diligence statement reference number.
    pub reference_number: String,
    /// EUDR verification number issued with the reference.
    pub verification_number: String,
}

impl EudrReference {
    /// Returns true when both numbers are filled in.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.reference_number.trim().is_empty() && !self.verification_number.trim().is_empty()
    }
}

/// Order and shipment references captured on the additional-data step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceNumbers {
    /// Purchase order number.
    pub po_number: String,
    /// Sales order number.
    #[serde(default)]
    pub so_number: Option<String>,
    /// Shipment number.
    #[serde(default)]
    pub shipment_number: Option<String>,
    /// Upstream EUDR references. Only kept when the counterparty requires them.
    #[serde(default)]
    pub eudr_references: Vec<EudrReference>,
}
