//! Unit tests for the error taxonomy.

use rstest::rstest;

use super::PluginError;
use crate::callbacks::CallbackKind;
use crate::capability::Hook;
use crate::lifecycle::{LifecycleState, Operation};

#[test]
fn not_implemented_names_the_hook_and_its_purpose() {
    let error = PluginError::NotImplemented { hook: Hook::OnKnit };
    let rendered = error.to_string();
    assert!(rendered.contains("on_knit"), "got: {rendered}");
    assert!(rendered.contains("knitting loop"), "got: {rendered}");
}

#[rstest]
#[case::knit_from_activated(Operation::Knit, LifecycleState::Activated)]
#[case::fail_from_finished(Operation::Fail, LifecycleState::Finished)]
fn invalid_transition_names_operation_and_state(
    #[case] operation: Operation,
    #[case] state: LifecycleState,
) {
    let error = PluginError::InvalidTransition { operation, state };
    let rendered = error.to_string();
    assert!(rendered.contains(operation.as_str()), "got: {rendered}");
    assert!(rendered.contains(state.as_str()), "got: {rendered}");
}

#[test]
fn missing_callback_names_the_kind() {
    let error = PluginError::MissingCallback {
        kind: CallbackKind::UserAction,
    };
    assert!(error.to_string().contains("user_action"));
}

#[test]
fn validation_carries_the_message() {
    let error = PluginError::Validation {
        message: "'rows' must be a positive integer".into(),
    };
    assert!(error.to_string().contains("'rows' must be a positive integer"));
}
