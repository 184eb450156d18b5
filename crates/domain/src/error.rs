// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::documents::DocumentId;
use crate::geo::{GeoPhase, GeoRunId};
use crate::items::LineItemId;

/// Errors that can occur while mutating or validating declaration data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The last remaining line item cannot be removed.
    LastLineItem,
    /// No line item exists with the given identifier.
    LineItemNotFound(LineItemId),
    /// The HSN code of a catalogue product is read-only.
    HsnCodeLocked(LineItemId),
    /// No evidence document exists with the given identifier.
    DocumentNotFound(DocumentId),
    /// An "other" document needs a confirmed custom name before a file may be attached.
    CustomNameRequired(DocumentId),
    /// Custom names only apply to "other" documents.
    CustomNameNotApplicable(DocumentId),
    /// A custom document name is empty after trimming.
    InvalidCustomName,
    /// The file name carries no extension.
    MissingFileExtension {
        /// The rejected file name.
        file_name: String,
    },
    /// The file extension is not on the allow-list.
    UnsupportedFileExtension {
        /// The rejected file name.
        file_name: String,
        /// The extensions that would have been accepted.
        allowed: String,
    },
    /// The file exceeds the configured size cap.
    FileTooLarge {
        /// The rejected file name.
        file_name: String,
        /// The size of the file in bytes.
        size_bytes: u64,
        /// The configured cap in bytes.
        max_bytes: u64,
    },
    /// A validity period ends before it starts.
    InvalidValidityPeriod {
        /// The start date.
        start: time::Date,
        /// The end date.
        end: time::Date,
    },
    /// The declaration kind has no geo-compliance step.
    GeoNotApplicable,
    /// A geo result arrived for a run that is not the current one.
    StaleGeoResult {
        /// The run currently in flight, if any.
        current: Option<GeoRunId>,
        /// The run the result belongs to.
        received: GeoRunId,
    },
    /// A geo event does not fit the pipeline's current state.
    UnexpectedGeoPhase {
        /// The phase the event tried to act on.
        phase: GeoPhase,
        /// The pipeline state at the time.
        state: &'static str,
    },
    /// A persisted status string is not recognized.
    InvalidDeclarationStatus(String),
    /// A declaration type string is not recognized.
    InvalidDeclarationType(String),
    /// A declaration source string is not recognized.
    InvalidDeclarationSource(String),
    /// A document type string is not recognized.
    InvalidDocumentKind(String),
    /// A counterparty role string is not recognized.
    InvalidCounterpartyRole(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastLineItem => write!(f, "At least one line item must remain"),
            Self::LineItemNotFound(id) => write!(f, "Line item {id} not found"),
            Self::HsnCodeLocked(id) => {
                write!(f, "HSN code of line item {id} is fixed by the product catalogue")
            }
            Self::DocumentNotFound(id) => write!(f, "Evidence document {id} not found"),
            Self::CustomNameRequired(id) => write!(
                f,
                "Evidence document {id} needs a confirmed name before a file can be attached"
            ),
            Self::CustomNameNotApplicable(id) => {
                write!(f, "Evidence document {id} does not take a custom name")
            }
            Self::InvalidCustomName => write!(f, "Document name cannot be empty"),
            Self::MissingFileExtension { file_name } => {
                write!(f, "File '{file_name}' has no extension")
            }
            Self::UnsupportedFileExtension { file_name, allowed } => write!(
                f,
                "File '{file_name}' has an unsupported extension. Allowed extensions: {allowed}"
            ),
            Self::FileTooLarge {
                file_name,
                size_bytes,
                max_bytes,
            } => write!(
                f,
                "File '{file_name}' is {size_bytes} bytes, larger than the {max_bytes} byte limit"
            ),
            Self::InvalidValidityPeriod { start, end } => {
                write!(f, "Validity period ends ({end}) before it starts ({start})")
            }
            Self::GeoNotApplicable => write!(
                f,
                "Declarations derived from existing declarations have no geo-compliance step"
            ),
            Self::StaleGeoResult { current, received } => match current {
                Some(current) => write!(
                    f,
                    "Discarded geo result for run {received}; run {current} is current"
                ),
                None => write!(
                    f,
                    "Discarded geo result for run {received}; no check is in flight"
                ),
            },
            Self::UnexpectedGeoPhase { phase, state } => {
                write!(f, "Cannot resolve {phase} check while pipeline is {state}")
            }
            Self::InvalidDeclarationStatus(s) => write!(f, "Invalid declaration status: {s}"),
            Self::InvalidDeclarationType(s) => write!(f, "Invalid declaration type: {s}"),
            Self::InvalidDeclarationSource(s) => write!(f, "Invalid declaration source: {s}"),
            Self::InvalidDocumentKind(s) => write!(f, "Invalid document type: {s}"),
            Self::InvalidCounterpartyRole(s) => write!(f, "Invalid counterparty role: {s}"),
        }
    }
}

impl std::error::Error for DomainError {}
