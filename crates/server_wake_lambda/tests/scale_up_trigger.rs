use std::cell::RefCell;
use std::env::VarError;

use serde_json::{json, Value};
use server_wake_core::config::{ConfigError, ServiceIdentity};
use server_wake_core::contract::{InvocationOutcome, InvocationResponse};
use server_wake_lambda::adapters::orchestrator::ServiceOrchestrator;
use server_wake_lambda::handlers::scale_up::{handle_payload, ScaleUpError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Describe { cluster: String, service: String },
    Update { cluster: String, service: String, desired_count: u32 },
}

/// In-memory stand-in for ECS that records every call it receives.
struct FakeEcs {
    desired_count: RefCell<u32>,
    fail_describe: bool,
    calls: RefCell<Vec<Call>>,
}

impl FakeEcs {
    fn new(desired_count: u32) -> Self {
        Self {
            desired_count: RefCell::new(desired_count),
            fail_describe: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn updates(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Update { .. }))
            .cloned()
            .collect()
    }
}

impl ServiceOrchestrator for FakeEcs {
    fn desired_count(&self, identity: &ServiceIdentity) -> Result<u32, String> {
        self.calls.borrow_mut().push(Call::Describe {
            cluster: identity.cluster.clone(),
            service: identity.service.clone(),
        });
        if self.fail_describe {
            return Err("ClusterNotFoundException: Cluster not found.".to_string());
        }
        Ok(*self.desired_count.borrow())
    }

    fn set_desired_count(
        &self,
        identity: &ServiceIdentity,
        desired_count: u32,
    ) -> Result<(), String> {
        self.calls.borrow_mut().push(Call::Update {
            cluster: identity.cluster.clone(),
            service: identity.service.clone(),
            desired_count,
        });
        *self.desired_count.borrow_mut() = desired_count;
        Ok(())
    }
}

fn identity() -> ServiceIdentity {
    ServiceIdentity::from_lookup(|_| Err(VarError::NotPresent)).expect("defaults should load")
}

fn http_event() -> Value {
    json!({"requestContext": {"http": {"method": "GET"}}})
}

#[test]
fn function_url_start_returns_started_envelope() {
    let ecs = FakeEcs::new(0);

    let response = handle_payload(&identity(), &ecs, &http_event()).expect("invocation");

    assert_eq!(
        ecs.updates(),
        vec![Call::Update {
            cluster: "minecraft".to_string(),
            service: "minecraft-server".to_string(),
            desired_count: 1,
        }]
    );
    assert_eq!(
        serde_json::to_value(&response).expect("response should serialize"),
        json!({
            "statusCode": 200,
            "headers": {"Content-Type": "application/json"},
            "body": "{\"status\": \"started\", \"message\": \"Server start requested.\"}"
        })
    );
}

#[test]
fn direct_invocation_of_running_service_skips_update() {
    let ecs = FakeEcs::new(1);

    let response = handle_payload(&identity(), &ecs, &json!({})).expect("invocation");

    assert!(ecs.updates().is_empty());
    match response {
        InvocationResponse::Direct(direct) => {
            assert_eq!(direct.outcome, InvocationOutcome::AlreadyRunning);
        }
        InvocationResponse::Http(envelope) => panic!("unexpected envelope {envelope:?}"),
    }
}

#[test]
fn every_http_marker_yields_envelope_with_status() {
    let events = [
        http_event(),
        json!({"requestContext": {"httpMethod": "GET"}}),
        json!({"httpMethod": "POST", "resource": "/start"}),
        json!({"httpMethod": "GET", "requestContext": "x"}),
    ];

    for event in events {
        let ecs = FakeEcs::new(2);
        let response = handle_payload(&identity(), &ecs, &event).expect("invocation");
        let value = serde_json::to_value(&response).expect("response should serialize");

        assert_eq!(value["statusCode"], 200, "event {event}");
        let body: Value = serde_json::from_str(value["body"].as_str().expect("string body"))
            .expect("body should be json");
        assert_eq!(body["status"], "already_running");
        assert_eq!(body["message"], "Server is already running or starting.");
    }
}

#[test]
fn events_without_markers_get_no_envelope() {
    let events = [
        json!({}),
        json!({"source": "aws.events", "detail": {}}),
        json!({"requestContext": {"accountId": "123456789012"}}),
        json!({"requestContext": ["GET"]}),
        json!({"requestContext": [null, null]}),
        json!(null),
    ];

    for event in events {
        let ecs = FakeEcs::new(0);
        let response = handle_payload(&identity(), &ecs, &event).expect("invocation");
        let value = serde_json::to_value(&response).expect("response should serialize");

        for key in ["statusCode", "headers", "body"] {
            assert!(value.get(key).is_none(), "event {event} produced {key}");
        }
        assert_eq!(value["outcome"], "started");
    }
}

#[test]
fn repeated_invocations_converge_on_one_task() {
    let ecs = FakeEcs::new(0);

    let first = handle_payload(&identity(), &ecs, &json!({})).expect("first invocation");
    let second = handle_payload(&identity(), &ecs, &json!({})).expect("second invocation");

    assert_eq!(
        first,
        InvocationResponse::Direct(InvocationOutcome::Started.into())
    );
    assert_eq!(
        second,
        InvocationResponse::Direct(InvocationOutcome::AlreadyRunning.into())
    );
    assert_eq!(ecs.updates().len(), 1);
}

#[test]
fn upstream_failure_surfaces_as_invocation_error() {
    let ecs = FakeEcs {
        fail_describe: true,
        ..FakeEcs::new(0)
    };

    let error = handle_payload(&identity(), &ecs, &http_event()).expect_err("should fail");

    assert!(matches!(error, ScaleUpError::DescribeFailed { .. }));
    assert!(error.to_string().contains("ClusterNotFoundException"));
    assert!(ecs.updates().is_empty());
}

#[test]
fn missing_identity_prevents_handler_construction() {
    let error = ServiceIdentity::from_lookup(|key| match key {
        "SERVICE" => Ok(String::new()),
        _ => Err(VarError::NotPresent),
    })
    .expect_err("empty service should fail");

    assert_eq!(
        error,
        ConfigError::Missing {
            variables: vec!["SERVICE"]
        }
    );
}
