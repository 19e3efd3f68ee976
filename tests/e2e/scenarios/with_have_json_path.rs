use crate::harness::{Assertion, Scenario};
use jpmatch_core::{be_equivalent_to, equal, have_json_path};
use serde_json::json;
use std::time::Duration;

#[test]
fn test_replicas_and_conditions() {
    Scenario::new("replicas_and_conditions")
        .create_example_deployment("my-deployment")
        .eventually(
            "my-deployment",
            have_json_path("{.status.replicas}", be_equivalent_to(1)),
        )
        .assert_passed()
        // Status is first reported after one second, polled every 10ms
        .assert_attempts(101)
        .eventually(
            "my-deployment",
            have_json_path(
                r#"{.status.conditions[?(@.type=="Available")].reason}"#,
                equal("MinimumReplicasAvailable"),
            ),
        )
        .assert_passed()
        .assert(Assertion::PollElapsedAtLeast(Duration::from_secs(2)))
        .delete_deployment("my-deployment")
        .assert_no_deployment("my-deployment")
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_spec_fields_are_available_immediately() {
    Scenario::new("spec_fields")
        .create_example_deployment("my-deployment")
        .assert_matches(
            "my-deployment",
            have_json_path("{.spec.selector.matchLabels.app}", equal("my-deployment")),
        )
        .assert_matches(
            "my-deployment",
            have_json_path(
                "{.spec.template.spec.containers[*].name}",
                equal(json!(["test", "sidecar"])),
            ),
        )
        .assert_matches(
            "my-deployment",
            have_json_path(
                r#"{.spec.template.spec.containers[?(@.name=="sidecar")].image}"#,
                equal("busybox:latest"),
            ),
        )
        .assert_matches(
            "my-deployment",
            have_json_path("{.spec.template.spec.containers[0].args[-1]}", equal("sleep 60")),
        )
        .assert_does_not_match(
            "my-deployment",
            have_json_path(
                "{.spec.template.spec.containers[*].name}",
                equal(json!(["sidecar", "test"])),
            ),
        )
        .run()
        .unwrap();
}

#[test]
fn test_condition_progresses_while_polling() {
    Scenario::new("condition_progresses")
        .create_example_deployment("my-deployment")
        .wait_secs(2)
        .assert_matches(
            "my-deployment",
            have_json_path(
                r#"{.status.conditions[?(@.type=="Progressing")].reason}"#,
                equal("ReplicaSetUpdated"),
            ),
        )
        .eventually(
            "my-deployment",
            have_json_path(
                r#"{.status.conditions[?(@.type=="Progressing")].reason}"#,
                equal("NewReplicaSetAvailable"),
            ),
        )
        .assert_passed()
        .assert_attempts(101)
        .run()
        .unwrap();
}
