// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod counterparty;
mod documents;
mod error;
mod geo;
mod items;
mod status;
mod types;
mod upload;

#[cfg(test)]
mod tests;

pub use counterparty::{
    Counterparty, CounterpartyRole, EudrReference, ReferenceNumbers, UPSTREAM_REFERENCE_COUNTRIES,
    requires_upstream_references,
};
pub use documents::{DocumentId, DocumentKind, EvidenceDocument, EvidenceDocuments};
pub use error::DomainError;
pub use geo::{
    GeoFailure, GeoFlags, GeoPhase, GeoPolicy, GeoRunId, GeoValidationState, GeoVerdict,
    TypeBasedGeoPolicy,
};
pub use items::{ItemList, ItemPatch, LineItem, LineItemId, SourceItem, parse_quantity};
pub use status::DeclarationStatus;
pub use types::{
    CatalogProduct, DeclarationKind, DeclarationSource, DeclarationType, OutboundSource,
    SourceDeclaration, ValidityPeriod,
};
pub use upload::{
    DEFAULT_MAX_UPLOAD_BYTES, EVIDENCE_FILE_EXTENSIONS, FileRef, GEO_FILE_EXTENSIONS,
    UploadLimits, check_evidence_file, check_geo_file,
};
