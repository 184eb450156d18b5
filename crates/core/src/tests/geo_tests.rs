// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the geo pipeline as driven through `apply`.

use super::helpers::{begun_run, file, finish_geo, step};
use crate::{Command, CoreError, GeoEffect, TransitionResult, Wizard, apply};
use eudr_declare_domain::{
    DeclarationSource, DeclarationType, DomainError, GeoFailure, GeoPhase, GeoRunId,
    GeoValidationState, GeoVerdict,
};

fn outbound_fresh() -> Wizard {
    step(
        &Wizard::default(),
        Command::SetDeclarationType(DeclarationType::Outbound),
    )
}

/// Selects a file and starts its geometry check.
fn checking(wizard: &Wizard, name: &str) -> (Wizard, GeoRunId) {
    let selected: TransitionResult = apply(wizard, Command::SelectGeoFile(file(name))).unwrap();
    let run: GeoRunId = begun_run(&selected);
    let started: TransitionResult =
        apply(&selected.new_state, Command::BeginGeometryCheck { run }).unwrap();
    (started.new_state, run)
}

#[test]
fn test_select_file_enters_uploaded_and_begins_geometry() {
    let result: TransitionResult = apply(
        &outbound_fresh(),
        Command::SelectGeoFile(file("plots.geojson")),
    )
    .unwrap();
    assert_eq!(result.new_state.draft().geo.name(), "uploaded");
    assert!(matches!(result.effect, Some(GeoEffect::BeginGeometry { .. })));
}

#[test]
fn test_begin_geometry_schedules_geometry_check() {
    let wizard: Wizard = outbound_fresh();
    let selected: TransitionResult =
        apply(&wizard, Command::SelectGeoFile(file("plots.geojson"))).unwrap();
    let run: GeoRunId = begun_run(&selected);

    let started: TransitionResult =
        apply(&selected.new_state, Command::BeginGeometryCheck { run }).unwrap();
    assert_eq!(started.new_state.draft().geo.name(), "checking_geometry");
    assert_eq!(
        started.effect,
        Some(GeoEffect::ScheduleCheck {
            run,
            phase: GeoPhase::Geometry,
            declaration_type: DeclarationType::Outbound,
            file: file("plots.geojson"),
        })
    );
}

#[test]
fn test_passed_geometry_schedules_satellite() {
    let (wizard, run) = checking(&outbound_fresh(), "plots.geojson");
    let result: TransitionResult = apply(
        &wizard,
        Command::ResolveGeoPhase {
            run,
            phase: GeoPhase::Geometry,
            verdict: GeoVerdict::Passed,
        },
    )
    .unwrap();
    assert_eq!(result.new_state.draft().geo.name(), "checking_satellite");
    assert!(matches!(
        result.effect,
        Some(GeoEffect::ScheduleCheck {
            phase: GeoPhase::Satellite,
            ..
        })
    ));
}

#[test]
fn test_failed_geometry_never_reaches_satellite() {
    let (wizard, run) = checking(&Wizard::default(), "plots.geojson");
    let result: TransitionResult = apply(
        &wizard,
        Command::ResolveGeoPhase {
            run,
            phase: GeoPhase::Geometry,
            verdict: GeoVerdict::Failed(GeoFailure::Rejected),
        },
    )
    .unwrap();
    assert_eq!(result.new_state.draft().geo.name(), "geometry_failed");
    assert!(result.effect.is_none());

    let satellite = apply(
        &result.new_state,
        Command::ResolveGeoPhase {
            run,
            phase: GeoPhase::Satellite,
            verdict: GeoVerdict::Passed,
        },
    );
    assert!(satellite.is_err());
}

#[test]
fn test_satellite_result_refused_while_checking_geometry() {
    let (wizard, run) = checking(&outbound_fresh(), "plots.geojson");
    let result = apply(
        &wizard,
        Command::ResolveGeoPhase {
            run,
            phase: GeoPhase::Satellite,
            verdict: GeoVerdict::Passed,
        },
    );
    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::UnexpectedGeoPhase {
            phase: GeoPhase::Satellite,
            state: "checking_geometry",
        }))
    );
}

#[test]
fn test_reupload_invalidates_previous_run() {
    let (first, run_a) = checking(&outbound_fresh(), "a.geojson");
    let (second, run_b) = checking(&first, "b.geojson");
    assert_ne!(run_a, run_b);

    let stale = apply(
        &second,
        Command::ResolveGeoPhase {
            run: run_a,
            phase: GeoPhase::Geometry,
            verdict: GeoVerdict::Passed,
        },
    );
    assert_eq!(
        stale,
        Err(CoreError::DomainViolation(DomainError::StaleGeoResult {
            current: Some(run_b),
            received: run_a,
        }))
    );

    let resolved: Wizard = step(
        &second,
        Command::ResolveGeoPhase {
            run: run_b,
            phase: GeoPhase::Geometry,
            verdict: GeoVerdict::Failed(GeoFailure::TimedOut),
        },
    );
    match &resolved.draft().geo {
        GeoValidationState::GeometryFailed { file, reason } => {
            assert_eq!(file.name, "b.geojson");
            assert_eq!(*reason, GeoFailure::TimedOut);
        }
        other => panic!("expected geometry_failed, got {other:?}"),
    }
}

#[test]
fn test_terminal_state_is_sticky_until_reupload() {
    let compliant: Wizard = finish_geo(
        &outbound_fresh(),
        "plots.geojson",
        GeoVerdict::Passed,
        GeoVerdict::Passed,
    );
    assert_eq!(compliant.draft().geo.name(), "compliant");
    assert!(compliant.draft().geo.flags().satellite_valid);

    let reuploaded: TransitionResult =
        apply(&compliant, Command::SelectGeoFile(file("plots-v2.json"))).unwrap();
    assert_eq!(reuploaded.new_state.draft().geo.name(), "uploaded");
}

#[test]
fn test_type_change_while_checking_cancels() {
    let (wizard, _) = checking(&outbound_fresh(), "plots.geojson");
    let result: TransitionResult = apply(
        &wizard,
        Command::SetDeclarationType(DeclarationType::Inbound),
    )
    .unwrap();
    assert_eq!(result.effect, Some(GeoEffect::Cancel));
    assert_eq!(result.new_state.draft().geo, GeoValidationState::Idle);
}

#[test]
fn test_switching_to_existing_source_cancels_check() {
    let (wizard, _) = checking(&outbound_fresh(), "plots.geojson");
    let result: TransitionResult = apply(
        &wizard,
        Command::SetDeclarationSource(DeclarationSource::Existing),
    )
    .unwrap();
    assert_eq!(result.effect, Some(GeoEffect::Cancel));
    assert_eq!(result.new_state.draft().geo, GeoValidationState::Idle);
}

#[test]
fn test_reset_while_checking_cancels() {
    let (wizard, _) = checking(&outbound_fresh(), "plots.geojson");
    let result: TransitionResult = apply(&wizard, Command::Reset).unwrap();
    assert_eq!(result.effect, Some(GeoEffect::Cancel));
}

#[test]
fn test_reset_when_idle_has_no_effect() {
    let result: TransitionResult = apply(&outbound_fresh(), Command::Reset).unwrap();
    assert!(result.effect.is_none());
}
