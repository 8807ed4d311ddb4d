//! HttpPolicyGate 对真实 HTTP 决策端点的行为：超时、未定义结果

mod common;

use std::time::{Duration, Instant};

use agentfabric::policy::{
    ActionPayload, DecisionSource, HttpPolicyGate, OnPolicyUnavailable, PolicyGate,
};
use common::{spawn_policy_replying, spawn_slow_policy};
use serde_json::json;

fn payload() -> ActionPayload {
    ActionPayload::new("charge_payment", json!({ "order_id": "ord-1", "amount": 10.0 }))
}

#[tokio::test]
async fn test_slow_endpoint_fail_open_within_timeout() {
    let url = spawn_slow_policy(Duration::from_secs(5)).await;
    let gate = HttpPolicyGate::new(&url, Duration::from_millis(200), OnPolicyUnavailable::Allow).unwrap();

    let start = Instant::now();
    let d = gate.evaluate(&payload()).await;
    let elapsed = start.elapsed();

    assert!(d.allow);
    assert_eq!(d.source, DecisionSource::Unavailable);
    assert!(elapsed >= Duration::from_millis(200), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "timeout not applied: {elapsed:?}");
}

#[tokio::test]
async fn test_slow_endpoint_fail_closed_within_timeout() {
    let url = spawn_slow_policy(Duration::from_secs(5)).await;
    let gate = HttpPolicyGate::new(&url, Duration::from_millis(200), OnPolicyUnavailable::Deny).unwrap();

    let start = Instant::now();
    let d = gate.evaluate(&payload()).await;

    assert!(!d.allow);
    assert_eq!(d.source, DecisionSource::Unavailable);
    assert!(d.reason.unwrap().contains("fail-closed"));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_fast_endpoint_is_evaluated() {
    let url = spawn_slow_policy(Duration::from_millis(10)).await;
    let gate = HttpPolicyGate::new(&url, Duration::from_secs(2), OnPolicyUnavailable::Deny).unwrap();
    let d = gate.evaluate(&payload()).await;
    assert!(d.allow);
    assert_eq!(d.source, DecisionSource::Evaluated);
}

#[tokio::test]
async fn test_undefined_result_denies_even_fail_open() {
    for body in [json!({}), json!({ "result": null })] {
        let url = spawn_policy_replying(body.clone()).await;
        let gate = HttpPolicyGate::new(&url, Duration::from_secs(2), OnPolicyUnavailable::Allow).unwrap();
        let d = gate.evaluate(&payload()).await;
        assert!(!d.allow, "{body} must deny");
        assert_eq!(d.source, DecisionSource::Evaluated);
        assert_eq!(d.reason.as_deref(), Some("policy result undefined"));
    }
}

#[tokio::test]
async fn test_malformed_result_follows_posture() {
    let url = spawn_policy_replying(json!({ "result": "yes" })).await;
    let gate = HttpPolicyGate::new(&url, Duration::from_secs(2), OnPolicyUnavailable::Allow).unwrap();
    let d = gate.evaluate(&payload()).await;
    assert!(d.allow);
    assert_eq!(d.source, DecisionSource::Unavailable);
}
