// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, GeoEffect, TransitionResult, Wizard, apply};
use eudr_declare_domain::{
    Counterparty, CounterpartyRole, DeclarationSource, DeclarationType, DocumentId, DocumentKind,
    EudrReference, FileRef, GeoPhase, GeoRunId, GeoVerdict, ItemPatch, LineItemId, ReferenceNumbers,
    SourceDeclaration, SourceItem, ValidityPeriod,
};
use time::{Date, Month};

/// Applies a command that is expected to succeed and returns the new wizard.
pub fn step(wizard: &Wizard, command: Command) -> Wizard {
    apply(wizard, command).unwrap().new_state
}

/// Applies a sequence of commands that are all expected to succeed.
pub fn run(wizard: &Wizard, commands: Vec<Command>) -> Wizard {
    commands
        .into_iter()
        .fold(wizard.clone(), |current, command| step(&current, command))
}

pub fn date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).unwrap()
}

pub fn validity_range() -> ValidityPeriod {
    ValidityPeriod::Range {
        start: date(2026, Month::January, 1),
        end: date(2026, Month::December, 31),
    }
}

pub fn file(name: &str) -> FileRef {
    FileRef {
        name: String::from(name),
        size_bytes: 2048,
        storage_key: Some(format!("uploads/{name}")),
    }
}

pub fn complete_patch(product_name: &str) -> ItemPatch {
    ItemPatch {
        product_name: Some(String::from(product_name)),
        hsn_code: Some(String::from("1801.00")),
        quantity: Some(String::from("250")),
        unit: Some(String::from("kg")),
        ..ItemPatch::default()
    }
}

pub fn counterparty(role: CounterpartyRole, country: &str) -> Counterparty {
    Counterparty {
        id: format!("{role}-{country}").to_lowercase(),
        name: format!("{country} Trading"),
        country: String::from(country),
        role,
    }
}

pub fn source_declaration(id: &str, product_name: &str) -> SourceDeclaration {
    SourceDeclaration {
        id: String::from(id),
        items: vec![SourceItem {
            product_name: String::from(product_name),
            hsn_code: String::from("1801.00"),
            quantity: String::from("1000"),
            unit: String::from("kg"),
            ..SourceItem::default()
        }],
    }
}

pub fn complete_reference() -> EudrReference {
    EudrReference {
        reference_number: String::from("25DEXXXX1234"),
        verification_number: String::from("VER-0001"),
    }
}

pub fn references(eudr_references: Vec<EudrReference>) -> ReferenceNumbers {
    ReferenceNumbers {
        po_number: String::from("PO-1001"),
        so_number: None,
        shipment_number: Some(String::from("SHIP-77")),
        eudr_references,
    }
}

/// Extracts the run of a `BeginGeometry` effect.
pub fn begun_run(result: &TransitionResult) -> GeoRunId {
    match result.effect {
        Some(GeoEffect::BeginGeometry { run }) => run,
        ref other => panic!("expected BeginGeometry, got {other:?}"),
    }
}

/// Selects a geo file and drives the pipeline to completion with the given verdicts.
pub fn finish_geo(
    wizard: &Wizard,
    name: &str,
    geometry: GeoVerdict,
    satellite: GeoVerdict,
) -> Wizard {
    let selected: TransitionResult = apply(wizard, Command::SelectGeoFile(file(name))).unwrap();
    let run: GeoRunId = begun_run(&selected);
    let checking: Wizard = step(&selected.new_state, Command::BeginGeometryCheck { run });
    let after_geometry: Wizard = step(
        &checking,
        Command::ResolveGeoPhase {
            run,
            phase: GeoPhase::Geometry,
            verdict: geometry,
        },
    );
    if geometry == GeoVerdict::Passed {
        step(
            &after_geometry,
            Command::ResolveGeoPhase {
                run,
                phase: GeoPhase::Satellite,
                verdict: satellite,
            },
        )
    } else {
        after_geometry
    }
}

/// Adds an invoice with an attached file.
pub fn with_invoice(wizard: &Wizard) -> Wizard {
    let added: Wizard = step(wizard, Command::AddEvidenceDocument(DocumentKind::Invoice));
    let id: DocumentId = added.draft().evidence_documents.as_slice()[0].id;
    step(
        &added,
        Command::AttachEvidenceFile {
            id,
            file: file("invoice.pdf"),
        },
    )
}

/// An inbound wizard on the final step with a complete draft and the given geo outcome.
pub fn inbound_on_final_step(supplier_country: &str, geometry: GeoVerdict) -> Wizard {
    let details: Wizard = run(
        &Wizard::default(),
        vec![
            Command::SetDeclarationType(DeclarationType::Inbound),
            Command::Advance,
            Command::UpdateItem {
                id: LineItemId::new(1),
                patch: complete_patch("Cocoa Beans"),
            },
            Command::SetValidityPeriod(validity_range()),
            Command::Advance,
        ],
    );
    let uploaded: Wizard = with_invoice(&finish_geo(
        &details,
        "plots.geojson",
        geometry,
        GeoVerdict::Passed,
    ));
    run(
        &uploaded,
        vec![
            Command::Advance,
            Command::SelectCounterparty(counterparty(CounterpartyRole::Supplier, supplier_country)),
            Command::SetReferenceNumbers(references(vec![complete_reference()])),
        ],
    )
}

/// An outbound wizard derived from existing declarations, on the final step.
pub fn outbound_existing_on_final_step(customer_country: &str) -> Wizard {
    let details: Wizard = run(
        &Wizard::default(),
        vec![
            Command::SetDeclarationType(DeclarationType::Outbound),
            Command::SetDeclarationSource(DeclarationSource::Existing),
            Command::Advance,
            Command::SelectSourceDeclarations(vec![source_declaration("decl-1", "Cocoa Beans")]),
            Command::SetValidityPeriod(ValidityPeriod::NotApplicable),
            Command::Advance,
        ],
    );
    run(
        &with_invoice(&details),
        vec![
            Command::Advance,
            Command::SelectCounterparty(counterparty(CounterpartyRole::Customer, customer_country)),
            Command::Advance,
            Command::SetReferenceNumbers(references(Vec::new())),
        ],
    )
}
