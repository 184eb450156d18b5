// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use eudr_declare_domain::{
    CatalogProduct, Counterparty, DeclarationSource, DeclarationType, DocumentId, DocumentKind,
    FileRef, GeoPhase, GeoRunId, GeoVerdict, ItemPatch, LineItemId, ReferenceNumbers,
    SourceDeclaration, SourceItem, ValidityPeriod,
};

/// A command represents user intent, or a geo check completion, as data only.
///
/// Commands are the only way to change a wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Choose inbound or outbound. Only allowed while step 1 is open.
    SetDeclarationType(DeclarationType),
    /// Choose the item origin of an outbound declaration.
    SetDeclarationSource(DeclarationSource),
    /// Replace the selected source declarations. Items are recomputed from them.
    SelectSourceDeclarations(Vec<SourceDeclaration>),
    /// Append an empty line item.
    AddItem,
    /// Remove a line item. The last item cannot be removed.
    RemoveItem(LineItemId),
    /// Edit a line item.
    UpdateItem {
        /// The item to edit.
        id: LineItemId,
        /// The fields to change.
        patch: ItemPatch,
    },
    /// Set a line item's product from the catalogue.
    ChooseProduct {
        /// The item to edit.
        id: LineItemId,
        /// The catalogue product.
        product: CatalogProduct,
    },
    /// Replace the items with those of a fetched declaration (edit/copy).
    LoadFromDetail(Vec<SourceItem>),
    /// Set the validity period or mark it not applicable.
    SetValidityPeriod(ValidityPeriod),
    /// Select a geospatial file. Starts a new geo run.
    SelectGeoFile(FileRef),
    /// Start the geometry phase of a run.
    BeginGeometryCheck {
        /// The run to start.
        run: GeoRunId,
    },
    /// Report the verdict of a geo phase.
    ResolveGeoPhase {
        /// The run the verdict belongs to.
        run: GeoRunId,
        /// The phase that finished.
        phase: GeoPhase,
        /// Its verdict.
        verdict: GeoVerdict,
    },
    /// Add an evidence document slot.
    AddEvidenceDocument(DocumentKind),
    /// Confirm the free-text name of an "other" document.
    ConfirmDocumentName {
        /// The document.
        id: DocumentId,
        /// The name as typed.
        name: String,
    },
    /// Attach a file to an evidence document slot.
    AttachEvidenceFile {
        /// The document.
        id: DocumentId,
        /// The selected file.
        file: FileRef,
    },
    /// Remove an evidence document slot.
    RemoveEvidenceDocument(DocumentId),
    /// Choose the customer (outbound) or supplier (inbound).
    SelectCounterparty(Counterparty),
    /// Replace the order and shipment references.
    SetReferenceNumbers(ReferenceNumbers),
    /// Replace the free-text comments.
    SetComments(String),
    /// Leave the current step forward, subject to the step gate.
    Advance,
    /// Go back one step. Never validated.
    Retreat,
    /// Discard the draft and return to step 1.
    Reset,
}
