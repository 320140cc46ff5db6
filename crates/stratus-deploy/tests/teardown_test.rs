//! Teardown scenarios: empty account tolerance, full removal, re-run
//! safety, flag gating.

mod common;

use common::{deployer, scenario_pair, MockProvider, RecordingReporter};
use stratus_deploy::TeardownFlags;

const ALL: TeardownFlags = TeardownFlags {
    remove_roles: true,
    remove_logstore: true,
};

#[tokio::test]
async fn teardown_of_empty_account_only_logs_skips_and_deletes_nothing() {
    let provider = MockProvider::new();
    let reporter = RecordingReporter::new();
    let deployer = deployer(provider.clone(), reporter.clone());

    deployer.remove(&scenario_pair(), ALL).await.unwrap();

    let expected: Vec<String> = [
        "No apis to remove",
        "Skip removing api group my_service_dev_api",
        "No triggers to remove",
        "Skip removing role my-service-dev-invoke-role",
        "No functions to remove",
        "Skip removing service my-service-dev",
        "Skip removing role my-service-dev-exec-role",
        "No artifact objects to remove",
        "Skip removing bucket my-service-dev-artifacts",
        "Skip removing log index function-logs",
        "Skip removing log store function-logs",
        "Skip removing log project my-service-dev-logs",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(reporter.lines(), expected);
    assert_eq!(provider.delete_calls(), Vec::<String>::new());
}

#[tokio::test]
async fn full_teardown_removes_everything_in_reverse_order() {
    let provider = MockProvider::new();
    let reporter = RecordingReporter::new();
    let deployer = deployer(provider.clone(), reporter.clone());
    let pair = scenario_pair();

    deployer.deploy(&pair).await.unwrap();
    provider.clear_calls();
    reporter.clear();

    deployer.remove(&pair, ALL).await.unwrap();

    let lines = reporter.lines();
    assert!(lines.contains(&"Abolished api my_service_dev_postTest_post".to_string()));
    assert!(lines.contains(&"Removed api my_service_dev_postTest_post".to_string()));
    assert!(lines.contains(&"Removed api group my_service_dev_api".to_string()));
    assert!(lines.contains(&"No triggers to remove".to_string()));
    assert!(lines.contains(
        &"Detached policy ApiGatewayInvocationAccess from role my-service-dev-invoke-role"
            .to_string()
    ));
    assert!(lines.contains(&"Removed role my-service-dev-invoke-role".to_string()));
    assert!(lines.contains(&"Removed function postTest".to_string()));
    assert!(lines.contains(&"Removed service my-service-dev".to_string()));
    assert!(lines.contains(
        &"Detached policy my-service-dev-log-write from role my-service-dev-exec-role".to_string()
    ));
    assert!(lines.contains(&"Removed role my-service-dev-exec-role".to_string()));
    assert!(lines.contains(&"Removed 1 artifact objects".to_string()));
    assert!(lines.contains(&"Removed bucket my-service-dev-artifacts".to_string()));
    assert!(lines.contains(&"Removed log project my-service-dev-logs".to_string()));

    // Reverse dependency order: apis before functions, functions before
    // service, objects before bucket, index before store before project.
    let abolish = provider.call_index("abolish_api").unwrap();
    let del_function = provider.call_index("delete_function").unwrap();
    let del_service = provider.call_index("delete_service").unwrap();
    assert!(abolish < del_function && del_function < del_service);

    let del_objects = provider.call_index("delete_objects").unwrap();
    let del_bucket = provider.call_index("delete_bucket").unwrap();
    assert!(del_objects < del_bucket);

    let del_index = provider.call_index("delete_log_index").unwrap();
    let del_store = provider.call_index("delete_log_store").unwrap();
    let del_project = provider.call_index("delete_log_project").unwrap();
    assert!(del_index < del_store && del_store < del_project);

    // Teardown is itself idempotent: a second run only skips.
    provider.clear_calls();
    reporter.clear();
    deployer.remove(&pair, ALL).await.unwrap();
    assert_eq!(provider.delete_calls(), Vec::<String>::new());
    assert!(reporter
        .lines()
        .iter()
        .all(|l| l.starts_with("No ") || l.starts_with("Skip removing")));
}

#[tokio::test]
async fn default_flags_keep_roles_and_log_pipeline() {
    let provider = MockProvider::new();
    let reporter = RecordingReporter::new();
    let deployer = deployer(provider.clone(), reporter.clone());
    let pair = scenario_pair();

    deployer.deploy(&pair).await.unwrap();
    provider.clear_calls();
    reporter.clear();

    deployer.remove(&pair, TeardownFlags::default()).await.unwrap();

    let calls = provider.calls();
    assert!(!calls.iter().any(|c| c.starts_with("delete_role")));
    assert!(!calls.iter().any(|c| c.starts_with("detach_policy")));
    assert!(!calls.iter().any(|c| c.starts_with("delete_log")));
    // the service surface itself is gone
    assert!(calls.iter().any(|c| c.starts_with("delete_service")));
    assert!(calls.iter().any(|c| c.starts_with("delete_bucket")));
}
