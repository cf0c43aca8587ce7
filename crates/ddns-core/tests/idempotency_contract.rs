//! Contract Test: Idempotence
//!
//! Constraints verified:
//! - An unchanged IP against an up-to-date zone is `NoChange`
//! - `NoChange` performs no snapshot, write, or delete call
//! - Repeating the run any number of times changes nothing
//! - After a successful update, the next run is `NoChange`

mod common;

use common::*;
use ddns_core::{Outcome, ReconciliationEngine};
use std::net::IpAddr;

#[tokio::test]
async fn unchanged_ip_is_no_change_on_every_run() {
    let ip = IpAddr::from([198, 51, 100, 9]);
    let client = MockDnsClient::new(vec![
        a_record("@", "198.51.100.9", 3600),
        a_record("www", "198.51.100.9", 3600),
    ]);
    let config = minimal_config(&["@", "www"]);

    for _ in 0..3 {
        let (engine, _events) = ReconciliationEngine::new(
            Box::new(StaticResolver::new(ip)),
            Box::new(MockDnsClient::sharing_counters_with(&client)),
            &config,
        )
        .expect("engine construction succeeds");

        assert_eq!(engine.run().await, Outcome::NoChange);
    }

    assert_eq!(client.snapshot_count(), 0);
    assert_eq!(client.write_count(), 0);
    assert_eq!(client.delete_count(), 0);
    assert_eq!(client.calls(), vec![Call::List, Call::List, Call::List]);
}

#[tokio::test]
async fn second_run_after_update_is_no_change() {
    let ip = IpAddr::from([203, 0, 113, 5]);
    let client = MockDnsClient::new(vec![a_record("@", "198.51.100.1", 3600)]);
    let config = minimal_config(&["@", "www"]);

    let (engine, _events) = ReconciliationEngine::new(
        Box::new(StaticResolver::new(ip)),
        Box::new(MockDnsClient::sharing_counters_with(&client)),
        &config,
    )
    .expect("engine construction succeeds");

    assert_eq!(
        engine.run().await,
        Outcome::Updated(vec!["@".to_string(), "www".to_string()])
    );
    assert_eq!(client.write_count(), 2);

    let resolver = StaticResolver::new(ip);
    let (engine, _events) = ReconciliationEngine::new(
        Box::new(StaticResolver::sharing_counters_with(&resolver)),
        Box::new(MockDnsClient::sharing_counters_with(&client)),
        &config,
    )
    .expect("engine construction succeeds");

    assert_eq!(engine.run().await, Outcome::NoChange);
    assert_eq!(resolver.resolve_call_count(), 1);
    assert_eq!(client.write_count(), 2, "No additional write on the second run");
    assert_eq!(client.snapshot_count(), 1, "No additional snapshot on the second run");
}

#[tokio::test]
async fn invalid_config_is_rejected_at_construction() {
    let mut config = minimal_config(&["@"]);
    config.dns.records.clear();

    let result = ReconciliationEngine::new(
        Box::new(StaticResolver::new(IpAddr::from([203, 0, 113, 5]))),
        Box::new(MockDnsClient::new(Vec::new())),
        &config,
    );

    assert!(result.is_err());
}
