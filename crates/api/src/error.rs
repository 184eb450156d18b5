// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use eudr_declare::CoreError;
use eudr_declare_domain::DomainError;

/// API-level errors, shaped for callers rather than for the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A business rule refused the operation.
    DomainRuleViolation {
        /// Stable rule identifier.
        rule: String,
        /// Human-readable description.
        message: String,
    },
    /// A request field is malformed.
    InvalidInput {
        /// The offending field.
        field: String,
        /// Human-readable description.
        message: String,
    },
    /// A step gate refused to let the wizard advance.
    StepRejected {
        /// The 1-based step index.
        step_index: u8,
        /// Machine-readable reason.
        reason_code: String,
        /// Human-readable description.
        message: String,
    },
    /// The operation is valid but not right now (e.g. a geo check is running).
    Conflict {
        /// Human-readable description.
        message: String,
    },
    /// A referenced record does not exist.
    ResourceNotFound {
        /// Kind of record.
        resource_type: String,
        /// Human-readable description.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::StepRejected {
                step_index,
                reason_code,
                message,
            } => {
                write!(f, "Step {step_index} cannot be left ({reason_code}): {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::LastLineItem => ApiError::DomainRuleViolation {
            rule: String::from("minimum_one_item"),
            message,
        },
        DomainError::LineItemNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Line item"),
            message,
        },
        DomainError::HsnCodeLocked(_) => ApiError::DomainRuleViolation {
            rule: String::from("catalogue_hsn_locked"),
            message,
        },
        DomainError::DocumentNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Evidence document"),
            message,
        },
        DomainError::CustomNameRequired(_) => ApiError::DomainRuleViolation {
            rule: String::from("custom_name_confirmed_first"),
            message,
        },
        DomainError::CustomNameNotApplicable(_) | DomainError::InvalidCustomName => {
            ApiError::InvalidInput {
                field: String::from("custom_name"),
                message,
            }
        }
        DomainError::MissingFileExtension { .. } | DomainError::UnsupportedFileExtension { .. } => {
            ApiError::InvalidInput {
                field: String::from("file_name"),
                message,
            }
        }
        DomainError::FileTooLarge { .. } => ApiError::InvalidInput {
            field: String::from("size_bytes"),
            message,
        },
        DomainError::InvalidValidityPeriod { .. } => ApiError::InvalidInput {
            field: String::from("end_date"),
            message,
        },
        DomainError::GeoNotApplicable => ApiError::DomainRuleViolation {
            rule: String::from("geo_not_applicable"),
            message,
        },
        DomainError::StaleGeoResult { .. } | DomainError::UnexpectedGeoPhase { .. } => {
            ApiError::Conflict { message }
        }
        DomainError::InvalidDeclarationStatus(_) => ApiError::InvalidInput {
            field: String::from("status"),
            message,
        },
        DomainError::InvalidDeclarationType(_) => ApiError::InvalidInput {
            field: String::from("declaration_type"),
            message,
        },
        DomainError::InvalidDeclarationSource(_) => ApiError::InvalidInput {
            field: String::from("declaration_source"),
            message,
        },
        DomainError::InvalidDocumentKind(_) => ApiError::InvalidInput {
            field: String::from("declared_type"),
            message,
        },
        DomainError::InvalidCounterpartyRole(_) => ApiError::InvalidInput {
            field: String::from("role"),
            message,
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    let message: String = err.to_string();
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::StepRejected(rejection) => ApiError::StepRejected {
            step_index: rejection.step_index,
            reason_code: rejection.reason.as_str().to_string(),
            message: rejection.message,
        },
        CoreError::DeclarationTypeLocked => ApiError::DomainRuleViolation {
            rule: String::from("declaration_type_locked"),
            message,
        },
        CoreError::SourceRequiresOutbound | CoreError::SourceSelectionRequiresExisting => {
            ApiError::DomainRuleViolation {
                rule: String::from("declaration_source"),
                message,
            }
        }
        CoreError::CounterpartyRoleMismatch { .. } => ApiError::InvalidInput {
            field: String::from("counterparty"),
            message,
        },
        CoreError::AlreadyAtFinalStep { .. } | CoreError::NotAtFinalStep { .. } => {
            ApiError::DomainRuleViolation {
                rule: String::from("step_sequence"),
                message,
            }
        }
        CoreError::GeoCheckInProgress { .. } => ApiError::Conflict { message },
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}
