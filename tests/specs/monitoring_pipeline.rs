//! Monitoring fan-out and criteria specs
//!
//! Datapoints flow from clients through the orchestrator to listeners;
//! a criteria evaluator tracks its subject across batches.

use crate::prelude::*;
use gust_core::config::{ClientConfig, MonitoringConfig};
use gust_core::module::Module;
use gust_core::FakeClock;
use gust_monitoring::{shared, Datapoint, Monitoring, MonitoringCriteria, SharedListener};
use std::sync::{Arc, Mutex};

/// Orchestrator with one queue-fed client under the "agent" protocol key
fn monitoring_with_queue(
    source: &str,
) -> (
    Monitoring<FakeClock>,
    Arc<Mutex<Vec<Vec<Datapoint>>>>,
) {
    let config = MonitoringConfig {
        clients: [(
            "agent".to_string(),
            vec![ClientConfig {
                address: Some(source.to_string()),
                ..ClientConfig::default()
            }],
        )]
        .into_iter()
        .collect(),
    };
    let mut monitoring = Monitoring::new(FakeClock::new(), config);

    let queues: Arc<Mutex<Vec<Arc<Mutex<Vec<Vec<Datapoint>>>>>>> = Arc::default();
    let registry = queues.clone();
    monitoring.set_client_factory(
        "agent",
        Box::new(move |config, _context| {
            let (client, queue) = QueuedClient::new(config.address.as_deref().unwrap_or("agent"));
            registry.lock().unwrap().push(queue);
            Ok(Box::new(client))
        }),
    );
    monitoring.prepare().unwrap();
    monitoring.startup().unwrap();

    let queue = queues.lock().unwrap()[0].clone();
    (monitoring, queue)
}

#[test]
fn criteria_follows_its_subject_across_the_run() {
    let (mut monitoring, queue) = monitoring_with_queue("10.0.0.1:4444");

    let criteria = shared(MonitoringCriteria::new("10.0.0.1:4444/cpu", 5.0));
    let handle = criteria.clone();
    monitoring.add_listener(criteria);

    // Above threshold
    queue
        .lock()
        .unwrap()
        .push(vec![Datapoint::new("10.0.0.1:4444", 1.0).with_metric("cpu", 7.5)]);
    monitoring.check().unwrap();
    assert!(handle.lock().unwrap().triggered());

    // Back below
    queue
        .lock()
        .unwrap()
        .push(vec![Datapoint::new("10.0.0.1:4444", 2.0).with_metric("cpu", 3.0)]);
    monitoring.check().unwrap();
    assert!(!handle.lock().unwrap().triggered());

    // No data at all: state untouched
    monitoring.check().unwrap();
    assert!(!handle.lock().unwrap().triggered());
}

#[test]
fn unrelated_sources_never_move_the_criteria() {
    let (mut monitoring, queue) = monitoring_with_queue("10.0.0.1:4444");

    let criteria = shared(MonitoringCriteria::new("10.0.0.1:4444/cpu", 5.0));
    let handle = criteria.clone();
    monitoring.add_listener(criteria);

    queue
        .lock()
        .unwrap()
        .push(vec![Datapoint::new("other:4444", 1.0).with_metric("cpu", 50.0)]);
    monitoring.check().unwrap();

    assert!(!handle.lock().unwrap().triggered());
}

#[test]
fn every_listener_sees_every_batch_in_order() {
    let (mut monitoring, queue) = monitoring_with_queue("a:1");

    let first = BatchJournal::default();
    let second = BatchJournal::default();
    monitoring.add_listener(shared(first.clone()));
    let second_handle: SharedListener = shared(second.clone());
    monitoring.add_listener(second_handle.clone());

    queue
        .lock()
        .unwrap()
        .push(vec![Datapoint::new("a:1", 1.0).with_metric("cpu", 1.0)]);
    monitoring.check().unwrap();

    assert_eq!(first.batches().len(), 1);
    assert_eq!(first.batches(), second.batches());

    // After removal only the remaining listener keeps receiving
    monitoring.remove_listener(&second_handle);
    queue
        .lock()
        .unwrap()
        .push(vec![Datapoint::new("a:1", 2.0).with_metric("cpu", 2.0)]);
    monitoring.check().unwrap();

    assert_eq!(first.batches().len(), 2);
    assert_eq!(second.batches().len(), 1);
}
