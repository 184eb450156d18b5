// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    FakeBackend, edit, geo_file, inbound_on_upload_step, outbound_existing_on_final_step,
    registry,
};
use crate::config::{GeoTimings, SessionSettings};
use crate::live::{LiveEvent, LiveEventBroadcaster};
use crate::session::{SessionError, SessionHandle, SessionRegistry};
use eudr_declare::Wizard;
use eudr_declare_api::ApiError;
use eudr_declare_domain::{DeclarationStatus, GeoFailure, GeoValidationState, TypeBasedGeoPolicy};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Geometry settles after 2s, satellite after 3s more.
fn timings() -> GeoTimings {
    GeoTimings::from_millis(2000, 3000, 30_000)
}

async fn outbound_fresh(registry: &SessionRegistry<FakeBackend>) -> SessionHandle {
    let handle: SessionHandle = registry.create().await;
    edit(
        &handle,
        json!({"type": "set_declaration_type", "declarationType": "outbound"}),
    )
    .await;
    handle
}

async fn geo(handle: &SessionHandle) -> GeoValidationState {
    handle.snapshot().await.unwrap().draft().geo.clone()
}

// ============================================================================
// Geo pipeline
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_outbound_file_becomes_compliant() {
    let registry: SessionRegistry<FakeBackend> =
        registry(Arc::new(FakeBackend::default()), timings());
    let handle: SessionHandle = outbound_fresh(&registry).await;

    let wizard: Wizard = handle.select_geo_file(geo_file("plots.geojson")).await.unwrap();
    assert_eq!(wizard.draft().geo.name(), "checking_geometry");

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(geo(&handle).await.name(), "checking_satellite");

    tokio::time::sleep(Duration::from_secs(5)).await;
    let state: GeoValidationState = geo(&handle).await;
    assert_eq!(state.name(), "compliant");
    assert!(state.flags().satellite_valid);
}

#[tokio::test(start_paused = true)]
async fn test_inbound_file_fails_geometry_without_satellite() {
    let registry: SessionRegistry<FakeBackend> =
        registry(Arc::new(FakeBackend::default()), timings());
    let handle: SessionHandle = registry.create().await;
    inbound_on_upload_step(&handle).await;

    handle.select_geo_file(geo_file("farm.json")).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    let state: GeoValidationState = geo(&handle).await;
    assert!(matches!(
        state,
        GeoValidationState::GeometryFailed {
            reason: GeoFailure::Rejected,
            ..
        }
    ));
    assert!(!state.flags().geometry_valid);
}

#[tokio::test(start_paused = true)]
async fn test_reupload_discards_running_check() {
    let registry: SessionRegistry<FakeBackend> =
        registry(Arc::new(FakeBackend::default()), timings());
    let handle: SessionHandle = outbound_fresh(&registry).await;

    handle.select_geo_file(geo_file("first.geojson")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    handle.select_geo_file(geo_file("second.geojson")).await.unwrap();

    // The first run would have resolved here.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let state: GeoValidationState = geo(&handle).await;
    assert_eq!(state.name(), "checking_geometry");
    assert_eq!(state.file().unwrap().name, "second.geojson");

    tokio::time::sleep(Duration::from_secs(10)).await;
    let state: GeoValidationState = geo(&handle).await;
    assert_eq!(state.name(), "compliant");
    assert_eq!(state.file().unwrap().name, "second.geojson");
}

#[tokio::test(start_paused = true)]
async fn test_stuck_check_times_out() {
    let registry: SessionRegistry<FakeBackend> = registry(
        Arc::new(FakeBackend::default()),
        GeoTimings::from_millis(2000, 60_000, 10_000),
    );
    let handle: SessionHandle = outbound_fresh(&registry).await;

    handle.select_geo_file(geo_file("plots.geojson")).await.unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;

    assert!(matches!(
        geo(&handle).await,
        GeoValidationState::SatelliteFailed {
            reason: GeoFailure::TimedOut,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_switching_type_cancels_check() {
    let registry: SessionRegistry<FakeBackend> =
        registry(Arc::new(FakeBackend::default()), timings());
    let handle: SessionHandle = outbound_fresh(&registry).await;

    handle.select_geo_file(geo_file("plots.geojson")).await.unwrap();
    edit(
        &handle,
        json!({"type": "set_declaration_type", "declarationType": "inbound"}),
    )
    .await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(geo(&handle).await, GeoValidationState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_geo_changes_are_broadcast() {
    let registry: SessionRegistry<FakeBackend> =
        registry(Arc::new(FakeBackend::default()), timings());
    let mut events: broadcast::Receiver<LiveEvent> = registry.live().subscribe();
    let handle: SessionHandle = outbound_fresh(&registry).await;

    handle.select_geo_file(geo_file("plots.geojson")).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    let mut states: Vec<&'static str> = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let LiveEvent::GeoStateChanged {
            session_id, state, ..
        } = event
        {
            assert_eq!(session_id, handle.id());
            states.push(state);
        }
    }
    assert_eq!(
        states,
        vec![
            "uploaded",
            "checking_geometry",
            "checking_satellite",
            "compliant"
        ]
    );
}

// ============================================================================
// Navigation and submission
// ============================================================================

#[tokio::test]
async fn test_refused_advance_keeps_step() {
    let registry: SessionRegistry<FakeBackend> =
        registry(Arc::new(FakeBackend::default()), timings());
    let handle: SessionHandle = registry.create().await;
    handle.advance().await.unwrap();

    let err: SessionError = handle.advance().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Api(ApiError::StepRejected { step_index: 2, .. })
    ));
    assert_eq!(handle.snapshot().await.unwrap().step_index(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_submit_blocked_while_checking() {
    let registry: SessionRegistry<FakeBackend> =
        registry(Arc::new(FakeBackend::default()), timings());
    let handle: SessionHandle = registry.create().await;
    inbound_on_upload_step(&handle).await;
    handle.select_geo_file(geo_file("farm.json")).await.unwrap();
    handle.advance().await.unwrap();
    edit(
        &handle,
        json!({
            "type": "select_counterparty",
            "counterparty": {"id": "s-1", "name": "Accra Cocoa", "country": "Ghana", "role": "supplier"}
        }),
    )
    .await;

    let err: SessionError = handle.submit().await.unwrap_err();
    assert!(matches!(err, SessionError::Api(ApiError::Conflict { .. })));

    tokio::time::sleep(Duration::from_secs(10)).await;
    let response = handle.submit().await.unwrap();
    assert_eq!(response.status, DeclarationStatus::Draft);
}

#[tokio::test]
async fn test_edit_after_leaving_step_blocks_submit() {
    let backend: Arc<FakeBackend> = Arc::new(FakeBackend::default());
    let registry: SessionRegistry<FakeBackend> = registry(Arc::clone(&backend), timings());
    let handle: SessionHandle = registry.create().await;
    outbound_existing_on_final_step(&handle, "Singapore").await;
    edit(
        &handle,
        json!({"type": "select_source_declarations", "sources": []}),
    )
    .await;

    let err: SessionError = handle.submit().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Api(ApiError::StepRejected { step_index: 2, ref reason_code, .. })
            if reason_code == "no_source_selected"
    ));
    assert!(backend.submitted().is_empty());
}

#[tokio::test]
async fn test_successful_submit_resets_session() {
    let backend: Arc<FakeBackend> = Arc::new(FakeBackend::default());
    let registry: SessionRegistry<FakeBackend> = registry(Arc::clone(&backend), timings());
    let handle: SessionHandle = registry.create().await;
    outbound_existing_on_final_step(&handle, "Singapore").await;

    let response = handle.submit().await.unwrap();

    assert_eq!(response.declaration_id, "decl-1");
    assert_eq!(response.status, DeclarationStatus::Pending);
    assert_eq!(backend.submitted().len(), 1);
    assert_eq!(
        backend.submitted()[0].source_declaration_ids,
        Some(vec![String::from("in-1")])
    );
    assert_eq!(handle.snapshot().await.unwrap(), Wizard::default());
}

#[tokio::test]
async fn test_failed_submit_keeps_draft_for_retry() {
    let backend: Arc<FakeBackend> = Arc::new(FakeBackend::default());
    let registry: SessionRegistry<FakeBackend> = registry(Arc::clone(&backend), timings());
    let handle: SessionHandle = registry.create().await;
    outbound_existing_on_final_step(&handle, "Singapore").await;
    let before: Wizard = handle.snapshot().await.unwrap();

    backend.set_failing(true);
    let err: SessionError = handle.submit().await.unwrap_err();
    assert!(matches!(err, SessionError::Submission(ref source) if source.is_retryable()));
    assert_eq!(handle.snapshot().await.unwrap(), before);

    backend.set_failing(false);
    assert!(handle.submit().await.is_ok());
}

#[tokio::test]
async fn test_closed_session_refuses_requests() {
    let registry: SessionRegistry<FakeBackend> =
        registry(Arc::new(FakeBackend::default()), timings());
    let handle: SessionHandle = registry.create().await;
    let id: String = handle.id().to_string();

    assert!(registry.close(&id).await);
    assert!(!registry.close(&id).await);
    assert!(registry.get(&id).await.is_none());
    assert!(matches!(
        handle.snapshot().await,
        Err(SessionError::Closed(_))
    ));
}

// ============================================================================
// Idle sessions
// ============================================================================

fn registry_with_idle_timeout(idle_timeout: Duration) -> SessionRegistry<FakeBackend> {
    SessionRegistry::new(
        Arc::new(FakeBackend::default()),
        Arc::new(TypeBasedGeoPolicy),
        SessionSettings {
            timings: timings(),
            idle_timeout,
            ..SessionSettings::default()
        },
        LiveEventBroadcaster::new(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_is_closed_and_forgotten() {
    let registry: SessionRegistry<FakeBackend> =
        registry_with_idle_timeout(Duration::from_secs(60));
    let mut events: broadcast::Receiver<LiveEvent> = registry.live().subscribe();
    let handle: SessionHandle = registry.create().await;
    let id: String = handle.id().to_string();

    tokio::time::sleep(Duration::from_secs(61)).await;

    assert!(handle.is_closed());
    assert!(matches!(
        handle.snapshot().await,
        Err(SessionError::Closed(_))
    ));
    assert!(registry.get(&id).await.is_none());
    assert!(!registry.close(&id).await);

    let mut closed: bool = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, LiveEvent::SessionClosed { ref session_id } if *session_id == id) {
            closed = true;
        }
    }
    assert!(closed);
}

#[tokio::test(start_paused = true)]
async fn test_requests_keep_session_open() {
    let registry: SessionRegistry<FakeBackend> =
        registry_with_idle_timeout(Duration::from_secs(60));
    let handle: SessionHandle = registry.create().await;
    let id: String = handle.id().to_string();

    tokio::time::sleep(Duration::from_secs(40)).await;
    assert!(handle.snapshot().await.is_ok());
    tokio::time::sleep(Duration::from_secs(40)).await;
    assert!(handle.snapshot().await.is_ok());

    assert!(registry.get(&id).await.is_some());
}
