// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The navigable steps of a wizard session.

use eudr_declare_domain::DeclarationType;
use serde::Serialize;

/// A wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Inbound/outbound and item source.
    TypeSelection,
    /// Items, validity period and source selection.
    Details,
    /// Geospatial file and evidence documents.
    UploadData,
    /// Customer selection. Outbound only.
    Counterparty,
    /// References, comments and, for inbound, the supplier.
    AdditionalData,
}

const INBOUND_STEPS: &[WizardStep] = &[
    WizardStep::TypeSelection,
    WizardStep::Details,
    WizardStep::UploadData,
    WizardStep::AdditionalData,
];

const OUTBOUND_STEPS: &[WizardStep] = &[
    WizardStep::TypeSelection,
    WizardStep::Details,
    WizardStep::UploadData,
    WizardStep::Counterparty,
    WizardStep::AdditionalData,
];

/// The ordered steps for a declaration type.
#[must_use]
pub const fn steps_for(declaration_type: DeclarationType) -> &'static [WizardStep] {
    match declaration_type {
        DeclarationType::Inbound => INBOUND_STEPS,
        DeclarationType::Outbound => OUTBOUND_STEPS,
    }
}

/// Looks up the step at a 1-based index.
#[must_use]
pub fn step_at(declaration_type: DeclarationType, index: u8) -> Option<WizardStep> {
    let position: usize = usize::from(index).checked_sub(1)?;
    steps_for(declaration_type).get(position).copied()
}

/// The number of steps, which is also the index of the final step.
#[must_use]
pub fn step_count(declaration_type: DeclarationType) -> u8 {
    u8::try_from(steps_for(declaration_type).len()).unwrap_or(u8::MAX)
}
