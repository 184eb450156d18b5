// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Step gates.
//!
//! A gate decides whether the current step may be left forward. Gates only
//! look at the draft; they never mutate it and are never consulted when
//! moving backward.

use crate::state::DeclarationDraft;
use crate::steps::{WizardStep, step_at};
use eudr_declare_domain::{CounterpartyRole, DeclarationKind, EudrReference, OutboundSource};

/// Machine-readable reason a step cannot be left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    /// No validity period and not marked not-applicable.
    ValidityPeriodMissing,
    /// Existing source chosen but no source declaration selected.
    NoSourceSelected,
    /// No item has a name, an HSN code and a positive quantity.
    NoCompleteItem,
    /// No geospatial file selected.
    GeoFileMissing,
    /// No evidence document has a file attached.
    NoEvidenceUploaded,
    /// No customer or supplier chosen.
    CounterpartyMissing,
    /// The counterparty requires upstream EUDR references and none is complete.
    EudrReferencesMissing,
    /// The step index does not exist for this declaration type.
    UnknownStep,
}

impl ReasonCode {
    /// Returns the wire representation of the reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidityPeriodMissing => "validity_period_missing",
            Self::NoSourceSelected => "no_source_selected",
            Self::NoCompleteItem => "no_complete_item",
            Self::GeoFileMissing => "geo_file_missing",
            Self::NoEvidenceUploaded => "no_evidence_uploaded",
            Self::CounterpartyMissing => "counterparty_missing",
            Self::EudrReferencesMissing => "eudr_references_missing",
            Self::UnknownStep => "unknown_step",
        }
    }
}

/// Why a step may not be left yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRejection {
    /// The 1-based index of the rejecting step.
    pub step_index: u8,
    /// The machine-readable reason.
    pub reason: ReasonCode,
    /// A message suitable for display.
    pub message: String,
}

impl StepRejection {
    fn new(step_index: u8, reason: ReasonCode, message: &str) -> Self {
        Self {
            step_index,
            reason,
            message: message.to_string(),
        }
    }
}

/// Decides whether the step at `step_index` may be left forward.
///
/// # Arguments
///
/// * `step_index` - The 1-based index of the step being left
/// * `draft` - The draft to inspect
///
/// # Errors
///
/// Returns a `StepRejection` describing the first unmet requirement.
pub fn can_leave(step_index: u8, draft: &DeclarationDraft) -> Result<(), StepRejection> {
    let Some(step) = step_at(draft.declaration_type(), step_index) else {
        return Err(StepRejection::new(
            step_index,
            ReasonCode::UnknownStep,
            "This step does not exist for the chosen declaration type",
        ));
    };

    let reject = |reason: ReasonCode, message: &str| -> Result<(), StepRejection> {
        Err(StepRejection::new(step_index, reason, message))
    };

    match step {
        WizardStep::TypeSelection => Ok(()),
        WizardStep::Details => {
            if !draft.validity_period.is_set() {
                return reject(
                    ReasonCode::ValidityPeriodMissing,
                    "Choose a validity period or mark it as not applicable",
                );
            }
            match &draft.kind {
                DeclarationKind::Inbound | DeclarationKind::Outbound(OutboundSource::Fresh) => {
                    if draft.items.iter().any(|item| item.is_complete()) {
                        Ok(())
                    } else {
                        reject(
                            ReasonCode::NoCompleteItem,
                            "At least one item needs a product name, an HSN code and a positive quantity",
                        )
                    }
                }
                DeclarationKind::Outbound(OutboundSource::Existing { selected }) => {
                    if selected.is_empty() {
                        reject(
                            ReasonCode::NoSourceSelected,
                            "Select at least one source declaration",
                        )
                    } else {
                        Ok(())
                    }
                }
            }
        }
        WizardStep::UploadData => {
            if draft.kind.requires_geo() && !draft.geo.has_file() {
                return reject(ReasonCode::GeoFileMissing, "Upload a geospatial file");
            }
            if !draft.evidence_documents.any_uploaded() {
                return reject(
                    ReasonCode::NoEvidenceUploaded,
                    "Upload at least one evidence document",
                );
            }
            Ok(())
        }
        WizardStep::Counterparty => {
            if draft.counterparty.is_none() {
                return reject(ReasonCode::CounterpartyMissing, "Select a customer");
            }
            Ok(())
        }
        WizardStep::AdditionalData => {
            let Some(counterparty) = draft.counterparty.as_ref() else {
                let message: &str = match draft.kind.counterparty_role() {
                    CounterpartyRole::Supplier => "Select a supplier",
                    CounterpartyRole::Customer => "Select a customer",
                };
                return reject(ReasonCode::CounterpartyMissing, message);
            };
            if counterparty.requires_upstream_references()
                && !draft
                    .reference_numbers
                    .eudr_references
                    .iter()
                    .any(EudrReference::is_complete)
            {
                return reject(
                    ReasonCode::EudrReferencesMissing,
                    "Enter at least one EUDR reference and verification number",
                );
            }
            Ok(())
        }
    }
}
