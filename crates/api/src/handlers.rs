// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request handling between the HTTP boundary and the wizard core.
//!
//! Every function here is pure: it takes the current wizard and returns the
//! outcome. Owning the wizard and running geo checks is the server's job.

use crate::error::{ApiError, translate_core_error};
use crate::request_response::{CommandRequest, GeoFileRequest, GeoView, ValidityView, WizardView};
use eudr_declare::{
    Command, DeclarationDraft, SubmissionPayload, TransitionResult, Wizard, apply,
    prepare_submission, steps_for,
};
use eudr_declare_domain::{GeoFailure, GeoValidationState, ValidityPeriod};
use time::Date;
use tracing::debug;

fn parse_date(field: &str, value: &str) -> Result<Date, ApiError> {
    Date::parse(
        value.trim(),
        &time::format_description::well_known::Iso8601::DEFAULT,
    )
    .map_err(|_| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("Invalid date format: {value}"),
    })
}

fn validity_from_request(
    not_applicable: bool,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<ValidityPeriod, ApiError> {
    if not_applicable {
        return Ok(ValidityPeriod::NotApplicable);
    }
    match (start_date, end_date) {
        (None, None) => Ok(ValidityPeriod::Unset),
        (Some(start), Some(end)) => Ok(ValidityPeriod::Range {
            start: parse_date("start_date", start)?,
            end: parse_date("end_date", end)?,
        }),
        (None, Some(_)) => Err(ApiError::InvalidInput {
            field: String::from("start_date"),
            message: String::from("A start date is required when an end date is given"),
        }),
        (Some(_), None) => Err(ApiError::InvalidInput {
            field: String::from("end_date"),
            message: String::from("An end date is required when a start date is given"),
        }),
    }
}

/// Converts a client request into a core command.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if a date cannot be parsed or only one
/// end of a validity range is given.
pub fn to_command(request: CommandRequest) -> Result<Command, ApiError> {
    let command: Command = match request {
        CommandRequest::SetDeclarationType { declaration_type } => {
            Command::SetDeclarationType(declaration_type)
        }
        CommandRequest::SetDeclarationSource { declaration_source } => {
            Command::SetDeclarationSource(declaration_source)
        }
        CommandRequest::SelectSourceDeclarations { sources } => {
            Command::SelectSourceDeclarations(sources)
        }
        CommandRequest::AddItem => Command::AddItem,
        CommandRequest::RemoveItem { item_id } => Command::RemoveItem(item_id),
        CommandRequest::UpdateItem { item_id, patch } => Command::UpdateItem { id: item_id, patch },
        CommandRequest::ChooseProduct { item_id, product } => Command::ChooseProduct {
            id: item_id,
            product,
        },
        CommandRequest::LoadFromDetail { items } => Command::LoadFromDetail(items),
        CommandRequest::SetValidityPeriod {
            not_applicable,
            start_date,
            end_date,
        } => Command::SetValidityPeriod(validity_from_request(
            not_applicable,
            start_date.as_deref(),
            end_date.as_deref(),
        )?),
        CommandRequest::AddEvidenceDocument { declared_type } => {
            Command::AddEvidenceDocument(declared_type)
        }
        CommandRequest::ConfirmDocumentName { document_id, name } => {
            Command::ConfirmDocumentName {
                id: document_id,
                name,
            }
        }
        CommandRequest::AttachEvidenceFile { document_id, file } => Command::AttachEvidenceFile {
            id: document_id,
            file,
        },
        CommandRequest::RemoveEvidenceDocument { document_id } => {
            Command::RemoveEvidenceDocument(document_id)
        }
        CommandRequest::SelectCounterparty { counterparty } => {
            Command::SelectCounterparty(counterparty)
        }
        CommandRequest::SetReferenceNumbers { reference_numbers } => {
            Command::SetReferenceNumbers(reference_numbers)
        }
        CommandRequest::SetComments { comments } => Command::SetComments(comments),
    };
    Ok(command)
}

/// Applies a client edit to the wizard.
///
/// # Errors
///
/// Returns an error if the request is malformed or the core refuses the command.
pub fn apply_request(
    wizard: &Wizard,
    request: CommandRequest,
) -> Result<TransitionResult, ApiError> {
    let command: Command = to_command(request)?;
    debug!(?command, step = wizard.step_index(), "Applying command");
    apply(wizard, command).map_err(translate_core_error)
}

/// Selects the geospatial file, starting a new geo run.
///
/// # Errors
///
/// Returns an error if the file fails the pre-checks or the declaration has no geo step.
pub fn select_geo_file(
    wizard: &Wizard,
    request: GeoFileRequest,
) -> Result<TransitionResult, ApiError> {
    apply(wizard, Command::SelectGeoFile(request.file)).map_err(translate_core_error)
}

/// Leaves the current step forward.
///
/// # Errors
///
/// Returns `ApiError::StepRejected` if the step gate refuses, or a rule
/// violation on the final step.
pub fn advance(wizard: &Wizard) -> Result<TransitionResult, ApiError> {
    apply(wizard, Command::Advance).map_err(translate_core_error)
}

/// Goes back one step.
///
/// # Errors
///
/// Never fails in practice; the signature matches the other navigation calls.
pub fn retreat(wizard: &Wizard) -> Result<TransitionResult, ApiError> {
    apply(wizard, Command::Retreat).map_err(translate_core_error)
}

/// Builds the submission payload for the wizard.
///
/// # Errors
///
/// Returns an error if the wizard is not on its final step, a geo check is
/// still running, or the final step's gate refuses.
pub fn build_submission(wizard: &Wizard) -> Result<SubmissionPayload, ApiError> {
    prepare_submission(wizard).map_err(translate_core_error)
}

fn geo_view(geo: &GeoValidationState) -> GeoView {
    let failure: Option<GeoFailure> = match geo {
        GeoValidationState::GeometryFailed { reason, .. }
        | GeoValidationState::SatelliteFailed { reason, .. } => Some(*reason),
        _ => None,
    };
    GeoView {
        state: geo.name(),
        file_name: geo.file().map(|file| file.name.clone()),
        failure,
        flags: geo.flags(),
    }
}

fn validity_view(period: ValidityPeriod) -> ValidityView {
    match period {
        ValidityPeriod::Unset => ValidityView {
            is_set: false,
            not_applicable: false,
            start_date: None,
            end_date: None,
        },
        ValidityPeriod::NotApplicable => ValidityView {
            is_set: true,
            not_applicable: true,
            start_date: None,
            end_date: None,
        },
        ValidityPeriod::Range { start, end } => ValidityView {
            is_set: true,
            not_applicable: false,
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        },
    }
}

/// Builds the client snapshot of a wizard session.
#[must_use]
pub fn build_wizard_view(session_id: &str, wizard: &Wizard) -> WizardView {
    let draft: &DeclarationDraft = wizard.draft();
    WizardView {
        session_id: session_id.to_string(),
        step_index: wizard.step_index(),
        current_step: wizard.current_step(),
        steps: steps_for(draft.declaration_type()).to_vec(),
        completed_steps: wizard.completed_steps().iter().copied().collect(),
        declaration_type: draft.declaration_type(),
        declaration_source: draft.kind.source(),
        selected_source_ids: draft
            .kind
            .selected_sources()
            .iter()
            .map(|source| source.id.clone())
            .collect(),
        items: draft.items.iter().cloned().collect(),
        validity: validity_view(draft.validity_period),
        geo: draft.kind.requires_geo().then(|| geo_view(&draft.geo)),
        evidence_documents: draft.evidence_documents.as_slice().to_vec(),
        counterparty: draft.counterparty.clone(),
        requires_upstream_references: draft.requires_upstream_references(),
        reference_numbers: draft.reference_numbers.clone(),
        comments: draft.comments.clone(),
        can_submit: prepare_submission(wizard).is_ok(),
    }
}
