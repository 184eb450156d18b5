// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::steps::{WizardStep, step_at, step_count};
use eudr_declare_domain::{
    Counterparty, DeclarationKind, DeclarationType, EvidenceDocuments, FileRef, GeoPhase,
    GeoRunId, GeoValidationState, ItemList, ReferenceNumbers, SourceDeclaration, UploadLimits,
    ValidityPeriod,
};
use std::collections::BTreeSet;

/// The declaration being authored in one wizard session.
///
/// Only reachable mutably through `apply`, which returns a new wizard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeclarationDraft {
    /// Declaration type and source, with the selected source declarations.
    pub kind: DeclarationKind,
    /// The declared line items. Never empty.
    pub items: ItemList,
    /// Validity period or the not-applicable sentinel.
    pub validity_period: ValidityPeriod,
    /// Geo-compliance pipeline state.
    pub geo: GeoValidationState,
    /// Evidence documents.
    pub evidence_documents: EvidenceDocuments,
    /// The chosen customer or supplier.
    pub counterparty: Option<Counterparty>,
    /// Order, shipment and upstream EUDR references.
    pub reference_numbers: ReferenceNumbers,
    /// Free-text comments.
    pub comments: String,
    /// Source selection set aside while the outbound source is `fresh`.
    pub(crate) parked_sources: Vec<SourceDeclaration>,
    /// The most recently minted geo run.
    pub(crate) last_geo_run: GeoRunId,
}

impl DeclarationDraft {
    /// The declaration type.
    #[must_use]
    pub const fn declaration_type(&self) -> DeclarationType {
        self.kind.declaration_type()
    }

    /// Returns true if the chosen counterparty requires upstream EUDR references.
    #[must_use]
    pub fn requires_upstream_references(&self) -> bool {
        self.counterparty
            .as_ref()
            .is_some_and(Counterparty::requires_upstream_references)
    }

    pub(crate) const fn mint_geo_run(&mut self) -> GeoRunId {
        self.last_geo_run = self.last_geo_run.next();
        self.last_geo_run
    }
}

/// A wizard session: the current step, the steps already completed, and the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    pub(crate) step: u8,
    pub(crate) completed: BTreeSet<u8>,
    pub(crate) draft: DeclarationDraft,
    pub(crate) limits: UploadLimits,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(UploadLimits::default())
    }
}

impl Wizard {
    /// Creates a wizard on step 1 with an empty draft.
    ///
    /// # Arguments
    ///
    /// * `limits` - The size cap applied to selected files
    #[must_use]
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            step: 1,
            completed: BTreeSet::new(),
            draft: DeclarationDraft::default(),
            limits,
        }
    }

    /// The 1-based index of the current step.
    #[must_use]
    pub const fn step_index(&self) -> u8 {
        self.step
    }

    /// The current step.
    #[must_use]
    pub fn current_step(&self) -> WizardStep {
        step_at(self.draft.declaration_type(), self.step).unwrap_or(WizardStep::AdditionalData)
    }

    /// The number of navigable steps for the chosen declaration type.
    #[must_use]
    pub fn step_count(&self) -> u8 {
        step_count(self.draft.declaration_type())
    }

    /// Returns true on the final step, which is left only by submitting.
    #[must_use]
    pub fn is_final_step(&self) -> bool {
        self.step == self.step_count()
    }

    /// Indices of the steps that have been left forward at least once.
    #[must_use]
    pub const fn completed_steps(&self) -> &BTreeSet<u8> {
        &self.completed
    }

    /// The draft.
    #[must_use]
    pub const fn draft(&self) -> &DeclarationDraft {
        &self.draft
    }
}

/// Work the session runtime must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoEffect {
    /// A new run was created: abort any running check and begin geometry.
    BeginGeometry {
        /// The new run.
        run: GeoRunId,
    },
    /// Schedule the check for a phase of a run.
    ScheduleCheck {
        /// The run.
        run: GeoRunId,
        /// The phase to check.
        phase: GeoPhase,
        /// The declaration type the policy decides on.
        declaration_type: DeclarationType,
        /// The file under check.
        file: FileRef,
    },
    /// The geo pipeline was discarded: abort any running check.
    Cancel,
}

/// The result of a successful transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The wizard after the transition.
    pub new_state: Wizard,
    /// Geo work the runtime must start or stop.
    pub effect: Option<GeoEffect>,
}
