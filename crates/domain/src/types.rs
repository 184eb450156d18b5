// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::counterparty::CounterpartyRole;
use crate::error::DomainError;
use crate::items::SourceItem;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Direction of the shipment a declaration covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationType {
    /// Goods received from a supplier.
    Inbound,
    /// Goods shipped to a customer.
    Outbound,
}

impl DeclarationType {
    /// Returns the wire representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

impl FromStr for DeclarationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Self::Inbound),
            "outbound" => Ok(Self::Outbound),
            _ => Err(DomainError::InvalidDeclarationType(s.to_string())),
        }
    }
}

impl std::fmt::Display for DeclarationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the items of an outbound declaration come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationSource {
    /// Derived from previously approved inbound declarations.
    Existing,
    /// Authored from scratch.
    Fresh,
}

impl DeclarationSource {
    /// Returns the wire representation of the source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Existing => "existing",
            Self::Fresh => "fresh",
        }
    }
}

impl FromStr for DeclarationSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "existing" => Ok(Self::Existing),
            "fresh" => Ok(Self::Fresh),
            _ => Err(DomainError::InvalidDeclarationSource(s.to_string())),
        }
    }
}

/// A previously approved inbound declaration offered as a seed for an outbound one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDeclaration {
    /// Identifier assigned by the persistence service.
    pub id: String,
    /// The declared items of the source record.
    pub items: Vec<SourceItem>,
}

/// The item origin of an outbound declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundSource {
    /// Items are entered by hand.
    Fresh,
    /// Items are seeded from the selected source declarations.
    Existing {
        /// The selected source declarations, in selection order.
        selected: Vec<SourceDeclaration>,
    },
}

/// The closed set of declaration shapes a wizard session can produce.
///
/// Type and source are folded into one variant so every consumer has to
/// handle each combination explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeclarationKind {
    /// Inbound declaration. Always authored fresh.
    #[default]
    Inbound,
    /// Outbound declaration with its item origin.
    Outbound(OutboundSource),
}

impl DeclarationKind {
    /// Builds the kind for a type/source pair with nothing selected yet.
    #[must_use]
    pub const fn new(declaration_type: DeclarationType, source: DeclarationSource) -> Self {
        match (declaration_type, source) {
            (DeclarationType::Inbound, _) => Self::Inbound,
            (DeclarationType::Outbound, DeclarationSource::Fresh) => {
                Self::Outbound(OutboundSource::Fresh)
            }
            (DeclarationType::Outbound, DeclarationSource::Existing) => {
                Self::Outbound(OutboundSource::Existing {
                    selected: Vec::new(),
                })
            }
        }
    }

    /// Returns the declaration type.
    #[must_use]
    pub const fn declaration_type(&self) -> DeclarationType {
        match self {
            Self::Inbound => DeclarationType::Inbound,
            Self::Outbound(_) => DeclarationType::Outbound,
        }
    }

    /// Returns the declaration source.
    ///
    /// Inbound declarations are always authored fresh.
    #[must_use]
    pub const fn source(&self) -> DeclarationSource {
        match self {
            Self::Inbound | Self::Outbound(OutboundSource::Fresh) => DeclarationSource::Fresh,
            Self::Outbound(OutboundSource::Existing { .. }) => DeclarationSource::Existing,
        }
    }

    /// Returns the selected source declarations (empty unless source is existing).
    #[must_use]
    pub fn selected_sources(&self) -> &[SourceDeclaration] {
        match self {
            Self::Outbound(OutboundSource::Existing { selected }) => selected,
            Self::Inbound | Self::Outbound(OutboundSource::Fresh) => &[],
        }
    }

    /// Returns whether this kind runs the geo-compliance pipeline.
    #[must_use]
    pub const fn requires_geo(&self) -> bool {
        match self {
            Self::Inbound | Self::Outbound(OutboundSource::Fresh) => true,
            Self::Outbound(OutboundSource::Existing { .. }) => false,
        }
    }

    /// Returns the counterparty role this kind must name.
    #[must_use]
    pub const fn counterparty_role(&self) -> CounterpartyRole {
        match self {
            Self::Inbound => CounterpartyRole::Supplier,
            Self::Outbound(_) => CounterpartyRole::Customer,
        }
    }
}

/// The period during which a declaration is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidityPeriod {
    /// Nothing chosen yet.
    #[default]
    Unset,
    /// Explicit start and end dates (inclusive).
    Range {
        /// First valid day.
        start: Date,
        /// Last valid day.
        end: Date,
    },
    /// Explicitly marked as not applicable.
    NotApplicable,
}

impl ValidityPeriod {
    /// Builds a concrete range, rejecting ranges that end before they start.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValidityPeriod` if `end < start`.
    pub fn range(start: Date, end: Date) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidValidityPeriod { start, end });
        }
        Ok(Self::Range { start, end })
    }

    /// Returns true once a range or the not-applicable sentinel was chosen.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }
}

/// A product from the canonical product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    /// Product display name.
    pub product_name: String,
    /// Harmonized System code of the product.
    pub hsn_code: String,
    /// Raw material identifier, if the catalogue tracks one.
    #[serde(default)]
    pub rm_id: Option<String>,
}
