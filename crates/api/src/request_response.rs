// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use eudr_declare::WizardStep;
use eudr_declare_domain::{
    CatalogProduct, Counterparty, DeclarationSource, DeclarationStatus, DeclarationType,
    DocumentId, DocumentKind, EvidenceDocument, FileRef, GeoFailure, GeoFlags, ItemPatch,
    LineItem, LineItemId, ReferenceNumbers, SourceDeclaration, SourceItem,
};
use serde::{Deserialize, Serialize};

/// A draft edit sent by the client.
///
/// Geo check progress is never accepted from clients; it only enters the
/// wizard from the session's own check tasks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CommandRequest {
    SetDeclarationType {
        declaration_type: DeclarationType,
    },
    SetDeclarationSource {
        declaration_source: DeclarationSource,
    },
    SelectSourceDeclarations {
        sources: Vec<SourceDeclaration>,
    },
    AddItem,
    RemoveItem {
        item_id: LineItemId,
    },
    UpdateItem {
        item_id: LineItemId,
        #[serde(flatten)]
        patch: ItemPatch,
    },
    ChooseProduct {
        item_id: LineItemId,
        product: CatalogProduct,
    },
    LoadFromDetail {
        items: Vec<SourceItem>,
    },
    /// Dates are ISO 8601 calendar dates (`YYYY-MM-DD`).
    SetValidityPeriod {
        #[serde(default)]
        not_applicable: bool,
        #[serde(default)]
        start_date: Option<String>,
        #[serde(default)]
        end_date: Option<String>,
    },
    AddEvidenceDocument {
        declared_type: DocumentKind,
    },
    ConfirmDocumentName {
        document_id: DocumentId,
        name: String,
    },
    AttachEvidenceFile {
        document_id: DocumentId,
        file: FileRef,
    },
    RemoveEvidenceDocument {
        document_id: DocumentId,
    },
    SelectCounterparty {
        counterparty: Counterparty,
    },
    SetReferenceNumbers {
        #[serde(flatten)]
        reference_numbers: ReferenceNumbers,
    },
    SetComments {
        comments: String,
    },
}

/// Request body for `POST /sessions/{id}/geo-file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFileRequest {
    /// The selected geospatial file.
    pub file: FileRef,
}

/// The geo pipeline as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoView {
    /// Pipeline state name, e.g. `checking_geometry`.
    pub state: &'static str,
    /// The selected file name, if any.
    pub file_name: Option<String>,
    /// Why the pipeline failed, in a failure state.
    pub failure: Option<GeoFailure>,
    /// The flags the payload would carry.
    #[serde(flatten)]
    pub flags: GeoFlags,
}

/// Validity period as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityView {
    pub is_set: bool,
    pub not_applicable: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Snapshot of a wizard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub session_id: String,
    /// 1-based index of the current step.
    pub step_index: u8,
    pub current_step: WizardStep,
    /// Navigable steps for the chosen type, in order.
    pub steps: Vec<WizardStep>,
    pub completed_steps: Vec<u8>,
    pub declaration_type: DeclarationType,
    pub declaration_source: DeclarationSource,
    pub selected_source_ids: Vec<String>,
    pub items: Vec<LineItem>,
    pub validity: ValidityView,
    /// Absent when the declaration has no geo step.
    pub geo: Option<GeoView>,
    pub evidence_documents: Vec<EvidenceDocument>,
    pub counterparty: Option<Counterparty>,
    /// True when the upstream EUDR reference fields must be shown and filled.
    pub requires_upstream_references: bool,
    pub reference_numbers: ReferenceNumbers,
    pub comments: String,
    /// True when `submit` would be accepted.
    pub can_submit: bool,
}

/// Response for a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// Identifier assigned by the persistence service.
    pub declaration_id: String,
    /// The derived status that was persisted.
    pub status: DeclarationStatus,
}

/// Response for `POST /sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    /// The new session id.
    pub session_id: String,
}
