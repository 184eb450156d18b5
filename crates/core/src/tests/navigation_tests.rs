// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    complete_patch, counterparty, outbound_existing_on_final_step, run, step, validity_range,
};
use crate::{Command, CoreError, ReasonCode, Wizard, WizardStep, apply, step_at, steps_for};
use eudr_declare_domain::{CounterpartyRole, DeclarationType, LineItemId};

#[test]
fn test_inbound_has_four_steps_without_counterparty() {
    let steps: &[WizardStep] = steps_for(DeclarationType::Inbound);
    assert_eq!(steps.len(), 4);
    assert!(!steps.contains(&WizardStep::Counterparty));
    assert_eq!(step_at(DeclarationType::Inbound, 4), Some(WizardStep::AdditionalData));
    assert_eq!(step_at(DeclarationType::Inbound, 5), None);
    assert_eq!(step_at(DeclarationType::Inbound, 0), None);
}

#[test]
fn test_outbound_has_five_steps_with_counterparty_fourth() {
    let steps: &[WizardStep] = steps_for(DeclarationType::Outbound);
    assert_eq!(steps.len(), 5);
    assert_eq!(step_at(DeclarationType::Outbound, 4), Some(WizardStep::Counterparty));
}

#[test]
fn test_wizard_step_count_follows_type() {
    let wizard: Wizard = Wizard::default();
    assert_eq!(wizard.step_count(), 4);

    let outbound: Wizard = step(&wizard, Command::SetDeclarationType(DeclarationType::Outbound));
    assert_eq!(outbound.step_count(), 5);
}

#[test]
fn test_initial_state() {
    let wizard: Wizard = Wizard::default();
    assert_eq!(wizard.step_index(), 1);
    assert_eq!(wizard.current_step(), WizardStep::TypeSelection);
    assert!(wizard.completed_steps().is_empty());
    assert_eq!(wizard.draft().items.len(), 1);
}

#[test]
fn test_advance_marks_step_completed() {
    let wizard: Wizard = step(&Wizard::default(), Command::Advance);
    assert_eq!(wizard.step_index(), 2);
    assert!(wizard.completed_steps().contains(&1));
}

#[test]
fn test_advance_refused_by_gate_keeps_step() {
    let details: Wizard = step(&Wizard::default(), Command::Advance);
    let result = apply(&details, Command::Advance);

    match result {
        Err(CoreError::StepRejected(rejection)) => {
            assert_eq!(rejection.step_index, 2);
            assert_eq!(rejection.reason, ReasonCode::ValidityPeriodMissing);
        }
        other => panic!("expected step rejection, got {other:?}"),
    }
    assert_eq!(details.step_index(), 2);
    assert!(!details.completed_steps().contains(&2));
}

#[test]
fn test_retreat_keeps_completed_steps() {
    let details: Wizard = run(
        &Wizard::default(),
        vec![
            Command::Advance,
            Command::UpdateItem {
                id: LineItemId::new(1),
                patch: complete_patch("Cocoa Beans"),
            },
            Command::SetValidityPeriod(validity_range()),
            Command::Advance,
            Command::Retreat,
        ],
    );
    assert_eq!(details.step_index(), 2);
    assert!(details.completed_steps().contains(&1));
    assert!(details.completed_steps().contains(&2));
}

#[test]
fn test_retreat_on_first_step_is_a_no_op() {
    let wizard: Wizard = Wizard::default();
    let result = apply(&wizard, Command::Retreat).unwrap();
    assert_eq!(result.new_state, wizard);
    assert!(result.effect.is_none());
}

#[test]
fn test_retreat_skips_validation() {
    let details: Wizard = step(&Wizard::default(), Command::Advance);
    let back: Wizard = step(&details, Command::Retreat);
    assert_eq!(back.step_index(), 1);
}

#[test]
fn test_advance_on_final_step_is_refused() {
    let wizard: Wizard = outbound_existing_on_final_step("Singapore");
    assert!(wizard.is_final_step());
    let result = apply(&wizard, Command::Advance);
    assert_eq!(result, Err(CoreError::AlreadyAtFinalStep { step: 5 }));
}

#[test]
fn test_type_locked_after_leaving_first_step() {
    let details: Wizard = step(&Wizard::default(), Command::Advance);
    let result = apply(&details, Command::SetDeclarationType(DeclarationType::Outbound));
    assert_eq!(result, Err(CoreError::DeclarationTypeLocked));

    let back: Wizard = step(&details, Command::Retreat);
    let result = apply(&back, Command::SetDeclarationType(DeclarationType::Outbound));
    assert_eq!(result, Err(CoreError::DeclarationTypeLocked));
}

#[test]
fn test_type_change_clears_counterparty() {
    let outbound: Wizard = run(
        &Wizard::default(),
        vec![
            Command::SetDeclarationType(DeclarationType::Outbound),
            Command::SelectCounterparty(counterparty(CounterpartyRole::Customer, "Germany")),
            Command::SetDeclarationType(DeclarationType::Inbound),
        ],
    );
    assert!(outbound.draft().counterparty.is_none());
    assert_eq!(outbound.step_count(), 4);
}

#[test]
fn test_reset_returns_to_first_step() {
    let wizard: Wizard = outbound_existing_on_final_step("Singapore");
    let reset: Wizard = step(&wizard, Command::Reset);
    assert_eq!(reset, Wizard::new(wizard.limits));
}
