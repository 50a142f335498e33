//! Whole-engine run specs
//!
//! Provisioning and monitoring ride the same run loop: the scheduler ends
//! the run, the monitoring service samples and fans out until then.

use crate::prelude::*;
use gust_core::config::{ClientConfig, MonitoringConfig};
use gust_core::{Engine, FakeClock, SequentialIdGen};
use gust_monitoring::{shared, Monitoring, ENGINE_LOOP_METRIC};
use gust_provisioning::LocalProvisioning;
use std::time::Duration;

fn local_only_config(metrics: &[&str]) -> MonitoringConfig {
    let block = ClientConfig {
        metrics: metrics.iter().map(|m| m.to_string()).collect(),
        ..ClientConfig::default()
    };
    MonitoringConfig {
        clients: [("local".to_string(), vec![block])].into_iter().collect(),
    }
}

#[test]
fn monitoring_samples_for_as_long_as_the_scheduler_keeps_the_run_open() {
    let clock = FakeClock::new();
    let log = CallLog::default();
    let mut engine = Engine::new(clock.clone(), SequentialIdGen::new("mod"))
        .with_check_interval(Duration::ZERO);

    let mut scheduler = LocalProvisioning::new(
        clock.clone(),
        SequentialIdGen::new("exec"),
        engine.registry(),
    );
    scheduler.add_executor(Box::new(
        ScriptedExecutor::new("pacer", log.clone())
            .with_checks_until_done(3)
            .advancing(clock.clone(), Duration::from_secs(1)),
    ));

    let mut monitoring = Monitoring::new(clock.clone(), local_only_config(&["cpu", "mem"]))
        .with_engine_health(engine.health());
    let journal = BatchJournal::default();
    monitoring.add_listener(shared(journal.clone()));

    engine.add_module(Box::new(scheduler));
    engine.add_service(Box::new(monitoring));

    engine.run().unwrap();

    let batches = journal.batches();
    assert!(!batches.is_empty());
    for batch in &batches {
        for datapoint in batch {
            assert_eq!(datapoint.source, "local");
            assert!(datapoint.ts >= 0.0);
        }
    }
}

#[test]
fn engine_loop_gauge_flows_into_local_datapoints_when_attached() {
    let clock = FakeClock::new();
    let log = CallLog::default();
    let mut engine = Engine::new(clock.clone(), SequentialIdGen::new("mod"))
        .with_check_interval(Duration::ZERO);

    let mut scheduler = LocalProvisioning::new(
        clock.clone(),
        SequentialIdGen::new("exec"),
        engine.registry(),
    );
    scheduler.add_executor(Box::new(
        ScriptedExecutor::new("pacer", log)
            .with_checks_until_done(2)
            .advancing(clock.clone(), Duration::from_secs(1)),
    ));

    let mut monitoring = Monitoring::new(clock.clone(), local_only_config(&[ENGINE_LOOP_METRIC]))
        .with_engine_health(engine.health());
    let journal = BatchJournal::default();
    monitoring.add_listener(shared(journal.clone()));

    engine.add_module(Box::new(scheduler));
    engine.add_service(Box::new(monitoring));
    engine.run().unwrap();

    let batches = journal.batches();
    assert!(!batches.is_empty());
    for batch in &batches {
        for datapoint in batch {
            let gauge = datapoint.get(ENGINE_LOOP_METRIC).unwrap();
            assert!((0.0..=1.0).contains(&gauge));
        }
    }
}

#[test]
fn without_an_engine_handle_the_loop_gauge_is_absent() {
    let clock = FakeClock::new();
    let log = CallLog::default();
    let mut engine = Engine::new(clock.clone(), SequentialIdGen::new("mod"))
        .with_check_interval(Duration::ZERO);

    let mut scheduler = LocalProvisioning::new(
        clock.clone(),
        SequentialIdGen::new("exec"),
        engine.registry(),
    );
    scheduler.add_executor(Box::new(
        ScriptedExecutor::new("pacer", log)
            .with_checks_until_done(2)
            .advancing(clock.clone(), Duration::from_secs(1)),
    ));

    // No with_engine_health: the gauge has nowhere to come from
    let mut monitoring =
        Monitoring::new(clock.clone(), local_only_config(&["cpu", ENGINE_LOOP_METRIC]));
    let journal = BatchJournal::default();
    monitoring.add_listener(shared(journal.clone()));

    engine.add_module(Box::new(scheduler));
    engine.add_service(Box::new(monitoring));
    engine.run().unwrap();

    let batches = journal.batches();
    assert!(!batches.is_empty());
    for batch in &batches {
        for datapoint in batch {
            assert_eq!(datapoint.source, "local");
            assert!(datapoint.get(ENGINE_LOOP_METRIC).is_none());
            assert!(datapoint.get("cpu").is_some());
        }
    }
}
