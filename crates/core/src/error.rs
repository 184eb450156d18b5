// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::gate::StepRejection;
use eudr_declare_domain::{CounterpartyRole, DomainError};

/// Errors that can occur during wizard transitions and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The current step may not be left yet.
    StepRejected(StepRejection),
    /// The declaration type can only change on the first step, before it is completed.
    DeclarationTypeLocked,
    /// Only outbound declarations have a source.
    SourceRequiresOutbound,
    /// Source declarations can only be selected when the source is existing.
    SourceSelectionRequiresExisting,
    /// The chosen counterparty has the wrong role for this declaration.
    CounterpartyRoleMismatch {
        /// The role this declaration needs.
        expected: CounterpartyRole,
        /// The role of the chosen counterparty.
        actual: CounterpartyRole,
    },
    /// `advance` was requested on the final step.
    AlreadyAtFinalStep {
        /// The final step index.
        step: u8,
    },
    /// Submission was requested before reaching the final step.
    NotAtFinalStep {
        /// The current step index.
        step: u8,
        /// The final step index.
        final_step: u8,
    },
    /// Submission is blocked while a geo check has not resolved.
    GeoCheckInProgress {
        /// The pipeline state name.
        state: &'static str,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::StepRejected(rejection) => write!(
                f,
                "Step {} cannot be left ({}): {}",
                rejection.step_index,
                rejection.reason.as_str(),
                rejection.message
            ),
            Self::DeclarationTypeLocked => write!(
                f,
                "The declaration type can no longer be changed in this session"
            ),
            Self::SourceRequiresOutbound => {
                write!(f, "Only outbound declarations have a declaration source")
            }
            Self::SourceSelectionRequiresExisting => write!(
                f,
                "Source declarations can only be selected for declarations derived from existing ones"
            ),
            Self::CounterpartyRoleMismatch { expected, actual } => {
                write!(f, "Expected a {expected}, got a {actual}")
            }
            Self::AlreadyAtFinalStep { step } => {
                write!(f, "Step {step} is the final step; submit instead of advancing")
            }
            Self::NotAtFinalStep { step, final_step } => write!(
                f,
                "Cannot submit from step {step}; the final step is {final_step}"
            ),
            Self::GeoCheckInProgress { state } => write!(
                f,
                "Submission is blocked until the geo check finishes (currently {state})"
            ),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<StepRejection> for CoreError {
    fn from(rejection: StepRejection) -> Self {
        Self::StepRejected(rejection)
    }
}
