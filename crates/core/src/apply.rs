// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::gate::can_leave;
use crate::state::{DeclarationDraft, GeoEffect, TransitionResult, Wizard};
use eudr_declare_domain::{
    CounterpartyRole, DeclarationKind, DeclarationSource, DeclarationType, DomainError, FileRef,
    GeoPhase, GeoRunId, GeoValidationState, ItemList, OutboundSource, ValidityPeriod,
    check_evidence_file, check_geo_file,
};

/// Returns `Cancel` if the pipeline has a run in flight.
fn cancel_in_flight(geo: &GeoValidationState) -> Option<GeoEffect> {
    geo.current_run().map(|_| GeoEffect::Cancel)
}

/// Builds the check to schedule for a pipeline that has just entered a checking state.
fn schedule_for(draft: &DeclarationDraft) -> Option<GeoEffect> {
    let phase: GeoPhase = match &draft.geo {
        GeoValidationState::CheckingGeometry { .. } => GeoPhase::Geometry,
        GeoValidationState::CheckingSatellite { .. } => GeoPhase::Satellite,
        _ => return None,
    };
    let run: GeoRunId = draft.geo.current_run()?;
    let file: FileRef = draft.geo.file()?.clone();
    Some(GeoEffect::ScheduleCheck {
        run,
        phase,
        declaration_type: draft.declaration_type(),
        file,
    })
}

/// Discards the geo pipeline, returning the effect needed to stop a running check.
fn discard_geo(draft: &mut DeclarationDraft) -> Option<GeoEffect> {
    let effect: Option<GeoEffect> = cancel_in_flight(&draft.geo);
    draft.geo = GeoValidationState::Idle;
    effect
}

/// Applies a command to the wizard, producing a new wizard and any geo work to start or stop.
///
/// This function is pure: the input wizard is never modified, and a failed
/// command leaves no trace.
///
/// # Arguments
///
/// * `wizard` - The current wizard (immutable)
/// * `command` - The command to apply
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new wizard and an optional effect
/// * `Err(CoreError)` if the command is invalid in the current state
///
/// # Errors
///
/// Returns an error if:
/// - The command violates a domain rule
/// - A step gate refuses `Advance`
/// - A geo resolution belongs to a superseded run
/// - The declaration type is changed after step 1 was completed
#[allow(clippy::too_many_lines)]
pub fn apply(wizard: &Wizard, command: Command) -> Result<TransitionResult, CoreError> {
    let mut next: Wizard = wizard.clone();
    let mut effect: Option<GeoEffect> = None;

    match command {
        Command::SetDeclarationType(declaration_type) => {
            if next.step != 1 || next.completed.contains(&1) {
                return Err(CoreError::DeclarationTypeLocked);
            }
            if next.draft.declaration_type() != declaration_type {
                next.draft.kind = DeclarationKind::new(declaration_type, DeclarationSource::Fresh);
                next.draft.items = ItemList::new();
                next.draft.parked_sources.clear();
                next.draft.counterparty = None;
                effect = discard_geo(&mut next.draft);
            }
        }
        Command::SetDeclarationSource(source) => {
            if next.draft.declaration_type() != DeclarationType::Outbound {
                return Err(CoreError::SourceRequiresOutbound);
            }
            if next.draft.kind.source() != source {
                let previous: DeclarationKind = std::mem::take(&mut next.draft.kind);
                if let DeclarationKind::Outbound(OutboundSource::Existing { selected }) = previous {
                    next.draft.parked_sources = selected;
                }
                next.draft.kind = match source {
                    DeclarationSource::Fresh => DeclarationKind::Outbound(OutboundSource::Fresh),
                    DeclarationSource::Existing => {
                        DeclarationKind::Outbound(OutboundSource::Existing {
                            selected: std::mem::take(&mut next.draft.parked_sources),
                        })
                    }
                };
                // Items are derived from the source, so switching discards edits.
                next.draft.items = ItemList::from_sources(next.draft.kind.selected_sources());
                if !next.draft.kind.requires_geo() {
                    effect = discard_geo(&mut next.draft);
                }
            }
        }
        Command::SelectSourceDeclarations(selected) => {
            if !matches!(
                next.draft.kind,
                DeclarationKind::Outbound(OutboundSource::Existing { .. })
            ) {
                return Err(CoreError::SourceSelectionRequiresExisting);
            }
            next.draft.items = ItemList::from_sources(&selected);
            next.draft.kind = DeclarationKind::Outbound(OutboundSource::Existing { selected });
        }
        Command::AddItem => {
            next.draft.items.add();
        }
        Command::RemoveItem(id) => {
            next.draft.items.remove(id)?;
        }
        Command::UpdateItem { id, patch } => {
            next.draft.items.update(id, patch)?;
        }
        Command::ChooseProduct { id, product } => {
            next.draft.items.choose_product(id, product)?;
        }
        Command::LoadFromDetail(items) => {
            next.draft.items = ItemList::from_items(&items);
        }
        Command::SetValidityPeriod(period) => {
            next.draft.validity_period = match period {
                ValidityPeriod::Range { start, end } => ValidityPeriod::range(start, end)?,
                other => other,
            };
        }
        Command::SelectGeoFile(file) => {
            if !next.draft.kind.requires_geo() {
                return Err(CoreError::DomainViolation(DomainError::GeoNotApplicable));
            }
            check_geo_file(&file, next.limits)?;
            let run: GeoRunId = next.draft.mint_geo_run();
            next.draft.geo = GeoValidationState::select_file(file, run);
            effect = Some(GeoEffect::BeginGeometry { run });
        }
        Command::BeginGeometryCheck { run } => {
            next.draft.geo = next.draft.geo.begin_geometry(run)?;
            effect = schedule_for(&next.draft);
        }
        Command::ResolveGeoPhase {
            run,
            phase,
            verdict,
        } => {
            next.draft.geo = next.draft.geo.resolve(run, phase, verdict)?;
            effect = schedule_for(&next.draft);
        }
        Command::AddEvidenceDocument(kind) => {
            next.draft.evidence_documents.add(kind);
        }
        Command::ConfirmDocumentName { id, name } => {
            next.draft.evidence_documents.confirm_name(id, &name)?;
        }
        Command::AttachEvidenceFile { id, file } => {
            check_evidence_file(&file, next.limits)?;
            next.draft.evidence_documents.attach(id, file)?;
        }
        Command::RemoveEvidenceDocument(id) => {
            next.draft.evidence_documents.remove(id)?;
        }
        Command::SelectCounterparty(counterparty) => {
            let expected: CounterpartyRole = next.draft.kind.counterparty_role();
            if counterparty.role != expected {
                return Err(CoreError::CounterpartyRoleMismatch {
                    expected,
                    actual: counterparty.role,
                });
            }
            next.draft.counterparty = Some(counterparty);
        }
        Command::SetReferenceNumbers(reference_numbers) => {
            next.draft.reference_numbers = reference_numbers;
        }
        Command::SetComments(comments) => {
            next.draft.comments = comments;
        }
        Command::Advance => {
            if next.is_final_step() {
                return Err(CoreError::AlreadyAtFinalStep { step: next.step });
            }
            can_leave(next.step, &next.draft)?;
            next.completed.insert(next.step);
            next.step += 1;
        }
        Command::Retreat => {
            if next.step > 1 {
                next.step -= 1;
            }
        }
        Command::Reset => {
            effect = cancel_in_flight(&next.draft.geo);
            next = Wizard::new(wizard.limits);
        }
    }

    Ok(TransitionResult {
        new_state: next,
        effect,
    })
}
