// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::collaborators::{
    CollaboratorError, DeclarationBackend, DeclarationDetail, StoredDeclaration,
};
use crate::config::{GeoTimings, SessionSettings};
use crate::live::LiveEventBroadcaster;
use crate::session::{SessionHandle, SessionRegistry};
use eudr_declare::{SubmissionPayload, Wizard};
use eudr_declare_api::{CommandRequest, GeoFileRequest};
use eudr_declare_domain::{
    Counterparty, CounterpartyRole, DeclarationStatus, DeclarationType, FileRef,
    SourceDeclaration, SourceItem, TypeBasedGeoPolicy,
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the persistence service.
#[derive(Default)]
pub struct FakeBackend {
    fail_submit: AtomicBool,
    submitted: Mutex<Vec<SubmissionPayload>>,
}

impl FakeBackend {
    pub fn set_failing(&self, failing: bool) {
        self.fail_submit.store(failing, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<SubmissionPayload> {
        self.submitted.lock().unwrap().clone()
    }
}

fn unavailable(path: &str) -> CollaboratorError {
    CollaboratorError::Status {
        url: format!("http://persistence.test{path}"),
        status: 503,
        body: String::from("unavailable"),
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

pub fn counterparty(role: CounterpartyRole, country: &str) -> Counterparty {
    Counterparty {
        id: format!("{role}-{country}").to_lowercase(),
        name: format!("{country} Trading"),
        country: String::from(country),
        role,
    }
}

impl DeclarationBackend for FakeBackend {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<StoredDeclaration, CollaboratorError> {
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(unavailable("/declarations"));
        }
        let count: usize = {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(payload.clone());
            submitted.len()
        };
        Ok(StoredDeclaration {
            id: format!("decl-{count}"),
        })
    }

    async fn list_source_candidates(&self) -> Result<Vec<SourceDeclaration>, CollaboratorError> {
        Ok(vec![source_declaration("in-1", "Cocoa Beans")])
    }

    async fn list_counterparties(
        &self,
        role: CounterpartyRole,
    ) -> Result<Vec<Counterparty>, CollaboratorError> {
        Ok(vec![
            counterparty(role, "Germany"),
            counterparty(role, "Singapore"),
        ])
    }

    async fn get_declaration(&self, id: &str) -> Result<DeclarationDetail, CollaboratorError> {
        if id == "missing" {
            return Err(CollaboratorError::Status {
                url: format!("http://persistence.test/declarations/{id}"),
                status: 404,
                body: String::new(),
            });
        }
        Ok(DeclarationDetail {
            id: id.to_string(),
            declaration_type: Some(DeclarationType::Inbound),
            status: Some(DeclarationStatus::Pending),
            items: source_declaration(id, "Coffee").items,
        })
    }
}

pub fn registry(backend: Arc<FakeBackend>, timings: GeoTimings) -> SessionRegistry<FakeBackend> {
    SessionRegistry::new(
        backend,
        Arc::new(TypeBasedGeoPolicy),
        SessionSettings {
            timings,
            ..SessionSettings::default()
        },
        LiveEventBroadcaster::new(),
    )
}

/// Decodes a client command the way the HTTP layer does.
pub fn request(value: Value) -> CommandRequest {
    serde_json::from_value(value).unwrap()
}

pub fn geo_file(name: &str) -> GeoFileRequest {
    GeoFileRequest {
        file: FileRef {
            name: String::from(name),
            size_bytes: 4096,
            storage_key: Some(format!("uploads/{name}")),
        },
    }
}

pub async fn edit(handle: &SessionHandle, value: Value) -> Wizard {
    handle.edit(request(value)).await.unwrap()
}

/// Fills in the details and evidence steps, which every declaration shares.
async fn details_and_evidence(handle: &SessionHandle) {
    edit(
        handle,
        json!({"type": "set_validity_period", "notApplicable": true}),
    )
    .await;
    edit(
        handle,
        json!({"type": "add_evidence_document", "declaredType": "invoice"}),
    )
    .await;
    edit(
        handle,
        json!({
            "type": "attach_evidence_file",
            "documentId": 1,
            "file": {"name": "invoice.pdf", "sizeBytes": 2048}
        }),
    )
    .await;
}

/// Drives a new session to the final step of an outbound declaration
/// derived from an existing inbound one.
pub async fn outbound_existing_on_final_step(handle: &SessionHandle, country: &str) {
    edit(
        handle,
        json!({"type": "set_declaration_type", "declarationType": "outbound"}),
    )
    .await;
    edit(
        handle,
        json!({"type": "set_declaration_source", "declarationSource": "existing"}),
    )
    .await;
    handle.advance().await.unwrap();

    let source: Value = serde_json::to_value(source_declaration("in-1", "Cocoa Beans")).unwrap();
    edit(
        handle,
        json!({"type": "select_source_declarations", "sources": [source]}),
    )
    .await;
    details_and_evidence(handle).await;
    handle.advance().await.unwrap();
    handle.advance().await.unwrap();

    let customer: Value =
        serde_json::to_value(counterparty(CounterpartyRole::Customer, country)).unwrap();
    edit(
        handle,
        json!({"type": "select_counterparty", "counterparty": customer}),
    )
    .await;
    handle.advance().await.unwrap();
}

/// Drives a new inbound session to the upload step with one complete item.
pub async fn inbound_on_upload_step(handle: &SessionHandle) {
    handle.advance().await.unwrap();
    edit(
        handle,
        json!({
            "type": "update_item",
            "itemId": 1,
            "productName": "Cocoa Beans",
            "hsnCode": "1801.00",
            "quantity": "250",
            "unit": "kg"
        }),
    )
    .await;
    details_and_evidence(handle).await;
    handle.advance().await.unwrap();
}
