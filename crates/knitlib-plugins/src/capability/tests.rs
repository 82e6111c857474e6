//! Unit tests for the capability contract.

use rstest::rstest;

use super::{
    Hook, KnittingOptions, KnittingPlugin, OptionDescriptor, OptionDomain, UnimplementedPlugin,
};
use crate::callbacks::InteractiveCallbacks;
use crate::error::PluginError;

fn assert_not_implemented(result: Result<(), PluginError>, expected: Hook) {
    let error = result.expect_err("stub hooks must fail");
    assert!(
        matches!(error, PluginError::NotImplemented { hook } if hook == expected),
        "expected NotImplemented for {expected}, got: {error}"
    );
}

#[test]
fn every_stub_hook_fails_with_not_implemented() {
    let stub = UnimplementedPlugin;
    let options = KnittingOptions::new();
    let callbacks = InteractiveCallbacks::empty();

    assert_not_implemented(stub.on_configure(&options, &callbacks), Hook::OnConfigure);
    assert_not_implemented(stub.on_knit(&callbacks), Hook::OnKnit);
    assert_not_implemented(stub.on_finish(&callbacks), Hook::OnFinish);
    assert_not_implemented(
        stub.publish_options().map(|_| ()),
        Hook::PublishOptions,
    );
    assert_not_implemented(
        stub.validate_configuration(&options),
        Hook::ValidateConfiguration,
    );
}

#[rstest]
#[case::on_configure(Hook::OnConfigure, "on_configure")]
#[case::on_knit(Hook::OnKnit, "on_knit")]
#[case::on_finish(Hook::OnFinish, "on_finish")]
#[case::publish_options(Hook::PublishOptions, "publish_options")]
#[case::validate_configuration(Hook::ValidateConfiguration, "validate_configuration")]
fn hook_names_are_stable(#[case] hook: Hook, #[case] expected: &str) {
    assert_eq!(hook.as_str(), expected);
    assert_eq!(hook.to_string(), expected);
}

#[test]
fn every_hook_purpose_is_non_empty() {
    for hook in [
        Hook::OnConfigure,
        Hook::OnKnit,
        Hook::OnFinish,
        Hook::PublishOptions,
        Hook::ValidateConfiguration,
    ] {
        assert!(!hook.purpose().is_empty(), "{hook} has no purpose text");
    }
}

#[test]
fn option_descriptor_serialises_with_tagged_domain() {
    let descriptor = OptionDescriptor::new(
        "rows",
        "Number of rows to knit",
        OptionDomain::Integer { min: 1, max: 100 },
    );
    let json = serde_json::to_value(&descriptor).expect("serialise descriptor");
    assert_eq!(json["name"], "rows");
    assert_eq!(json["domain"]["type"], "integer");
    assert_eq!(json["domain"]["min"], 1);
}

#[test]
fn choice_domain_round_trips_through_json() {
    let domain = OptionDomain::Choice {
        values: vec!["single".into(), "double".into()],
    };
    let json = serde_json::to_string(&domain).expect("serialise domain");
    let back: OptionDomain = serde_json::from_str(&json).expect("deserialise domain");
    assert_eq!(back, domain);
}
