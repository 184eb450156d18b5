// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Submission assembly.
//!
//! The draft is read once and the status is derived once. The payload keeps
//! both the item list and the first item's fields flattened onto the top
//! level, since existing consumers read either shape.

use crate::error::CoreError;
use crate::gate::can_leave;
use crate::state::{DeclarationDraft, Wizard};
use eudr_declare_domain::{
    Counterparty, DeclarationKind, DeclarationSource, DeclarationStatus, DeclarationType,
    DocumentKind, EudrReference, EvidenceDocument, FileRef, GeoFlags, GeoValidationState, LineItem,
    OutboundSource, ValidityPeriod,
};
use serde::Serialize;

/// One item as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadItem {
    pub product_name: String,
    pub hsn_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rm_id: Option<String>,
    pub quantity: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound_batch_id: Option<String>,
}

impl From<&LineItem> for PayloadItem {
    fn from(item: &LineItem) -> Self {
        Self {
            product_name: item.product_name.trim().to_string(),
            hsn_code: item.hsn_code.trim().to_string(),
            rm_id: item.rm_id.clone(),
            quantity: item.quantity.trim().to_string(),
            unit: item.unit.trim().to_string(),
            sku_code: item.sku_code.clone(),
            outbound_batch_id: item.outbound_batch_id.clone(),
        }
    }
}

/// The validity period as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadValidity {
    pub not_applicable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl From<ValidityPeriod> for PayloadValidity {
    fn from(period: ValidityPeriod) -> Self {
        match period {
            ValidityPeriod::Unset => Self {
                not_applicable: false,
                start_date: None,
                end_date: None,
            },
            ValidityPeriod::NotApplicable => Self {
                not_applicable: true,
                start_date: None,
                end_date: None,
            },
            ValidityPeriod::Range { start, end } => Self {
                not_applicable: false,
                start_date: Some(start.to_string()),
                end_date: Some(end.to_string()),
            },
        }
    }
}

/// An uploaded evidence document as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadDocument {
    pub declared_type: DocumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    pub file_name: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}

impl PayloadDocument {
    fn from_uploaded(document: &EvidenceDocument) -> Option<Self> {
        let file: &FileRef = document.file.as_ref()?;
        Some(Self {
            declared_type: document.declared_type,
            custom_name: document.custom_name.clone(),
            file_name: file.name.clone(),
            size_bytes: file.size_bytes,
            storage_key: file.storage_key.clone(),
        })
    }
}

/// The customer or supplier as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadCounterparty {
    pub id: String,
    pub name: String,
    pub country: String,
}

impl From<&Counterparty> for PayloadCounterparty {
    fn from(counterparty: &Counterparty) -> Self {
        Self {
            id: counterparty.id.clone(),
            name: counterparty.name.clone(),
            country: counterparty.country.clone(),
        }
    }
}

/// The normalized submission record sent to the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub declaration_type: DeclarationType,
    /// Only present for outbound declarations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration_source: Option<DeclarationSource>,
    pub status: DeclarationStatus,
    /// Items with a product name, in draft order.
    pub items: Vec<PayloadItem>,
    /// Copy of the first item's product name.
    pub product_name: String,
    /// Copy of the first item's HSN code.
    pub hsn_code: String,
    /// Copy of the first item's quantity.
    pub quantity: String,
    /// Copy of the first item's unit.
    pub unit: String,
    pub validity: PayloadValidity,
    pub evidence_documents: Vec<PayloadDocument>,
    pub po_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub so_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_number: Option<String>,
    /// Only present when the counterparty's country requires upstream references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eudr_references: Option<Vec<EudrReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Only present for declarations derived from existing ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_declaration_ids: Option<Vec<String>>,
    /// Only present for outbound declarations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<PayloadCounterparty>,
    /// Only present for inbound declarations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<PayloadCounterparty>,
    /// Only present for declarations that went through the geo check.
    #[serde(flatten)]
    pub geo: Option<GeoFlags>,
}

/// Derives the lifecycle status from the geo pipeline.
///
/// `validating` and the `non-compliant-*` statuses are accepted when read
/// back but never produced here.
///
/// # Errors
///
/// Returns `CoreError::GeoCheckInProgress` while a check has not resolved.
pub fn derive_status(draft: &DeclarationDraft) -> Result<DeclarationStatus, CoreError> {
    match &draft.kind {
        DeclarationKind::Inbound | DeclarationKind::Outbound(OutboundSource::Fresh) => {
            match &draft.geo {
                GeoValidationState::Uploaded { .. }
                | GeoValidationState::CheckingGeometry { .. }
                | GeoValidationState::CheckingSatellite { .. } => {
                    Err(CoreError::GeoCheckInProgress {
                        state: draft.geo.name(),
                    })
                }
                GeoValidationState::GeometryFailed { .. }
                | GeoValidationState::SatelliteFailed { .. } => Ok(DeclarationStatus::Draft),
                GeoValidationState::Idle | GeoValidationState::Compliant { .. } => {
                    Ok(DeclarationStatus::Pending)
                }
            }
        }
        DeclarationKind::Outbound(OutboundSource::Existing { .. }) => Ok(DeclarationStatus::Pending),
    }
}

/// Assembles the submission payload from a draft.
///
/// Does not run the step gates; see `prepare_submission`.
///
/// # Errors
///
/// Returns `CoreError::GeoCheckInProgress` while a check has not resolved.
pub fn assemble(draft: &DeclarationDraft) -> Result<SubmissionPayload, CoreError> {
    let status: DeclarationStatus = derive_status(draft)?;

    let items: Vec<PayloadItem> = draft
        .items
        .iter()
        .filter(|item| item.has_product_name())
        .map(PayloadItem::from)
        .collect();
    let (product_name, hsn_code, quantity, unit) = items.first().map_or_else(
        || (String::new(), String::new(), String::new(), String::new()),
        |first| {
            (
                first.product_name.clone(),
                first.hsn_code.clone(),
                first.quantity.clone(),
                first.unit.clone(),
            )
        },
    );

    let counterparty: Option<PayloadCounterparty> =
        draft.counterparty.as_ref().map(PayloadCounterparty::from);
    let (declaration_source, source_declaration_ids, customer, supplier, geo) = match &draft.kind
    {
        DeclarationKind::Inbound => (None, None, None, counterparty, Some(draft.geo.flags())),
        DeclarationKind::Outbound(OutboundSource::Fresh) => (
            Some(DeclarationSource::Fresh),
            None,
            counterparty,
            None,
            Some(draft.geo.flags()),
        ),
        DeclarationKind::Outbound(OutboundSource::Existing { selected }) => (
            Some(DeclarationSource::Existing),
            Some(selected.iter().map(|source| source.id.clone()).collect()),
            counterparty,
            None,
            None,
        ),
    };

    let eudr_references: Option<Vec<EudrReference>> = if draft.requires_upstream_references() {
        Some(
            draft
                .reference_numbers
                .eudr_references
                .iter()
                .filter(|reference| reference.is_complete())
                .cloned()
                .collect(),
        )
    } else {
        None
    };

    let comments: Option<String> = Some(draft.comments.trim())
        .filter(|comments| !comments.is_empty())
        .map(str::to_string);

    Ok(SubmissionPayload {
        declaration_type: draft.declaration_type(),
        declaration_source,
        status,
        items,
        product_name,
        hsn_code,
        quantity,
        unit,
        validity: PayloadValidity::from(draft.validity_period),
        evidence_documents: draft
            .evidence_documents
            .as_slice()
            .iter()
            .filter_map(PayloadDocument::from_uploaded)
            .collect(),
        po_number: draft.reference_numbers.po_number.trim().to_string(),
        so_number: draft.reference_numbers.so_number.clone(),
        shipment_number: draft.reference_numbers.shipment_number.clone(),
        eudr_references,
        comments,
        source_declaration_ids,
        customer,
        supplier,
        geo,
    })
}

/// Checks that the wizard may be submitted and assembles its payload.
///
/// # Errors
///
/// Returns an error if:
/// - The wizard is not on its final step
/// - A geo check has not resolved
/// - Any step's gate refuses the draft as it stands now
///
/// Drafts stay editable after their step is left, so every gate is checked
/// again here and the lowest rejecting step is reported.
pub fn prepare_submission(wizard: &Wizard) -> Result<SubmissionPayload, CoreError> {
    if !wizard.is_final_step() {
        return Err(CoreError::NotAtFinalStep {
            step: wizard.step_index(),
            final_step: wizard.step_count(),
        });
    }
    derive_status(wizard.draft())?;
    for step_index in 1..=wizard.step_count() {
        can_leave(step_index, wizard.draft())?;
    }
    assemble(wizard.draft())
}
