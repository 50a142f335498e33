//! Config-to-modules specs
//!
//! A config file fans out into a working module set: monitoring client
//! blocks resolve against the protocol registry, criteria blocks become
//! evaluators, engine settings reach the run loop.

use gust_core::module::Module;
use gust_core::{config, FakeClock};
use gust_monitoring::{Monitoring, MonitoringCriteria};
use std::io::Write as _;
use std::time::Duration;

const CONFIG: &str = r#"
[engine]
check-interval = "2s"

[[execution]]
start-at = "13:31"
delay = "30s"

[monitoring]
[[monitoring.server-agent]]
address = "127.0.0.1:4444"
metrics = ["cpu", "disks"]

[[monitoring.graphite]]
address = "graphite.example:1066"
label = "edge"
metrics = ["body"]
interval = 5

[[monitoring.local]]
metrics = ["cpu", "mem"]

[[monitoring.telegraf]]
address = "nobody-speaks-this:1"

[[criteria]]
subject = "127.0.0.1:4444/cpu"
threshold = 90
"#;

fn load_config() -> config::Config {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    config::load(file.path()).unwrap()
}

#[test]
fn monitoring_blocks_build_their_clients_and_skip_unknown_protocols() {
    let config = load_config();
    let mut monitoring = Monitoring::new(FakeClock::new(), config.monitoring);

    // Construction only; no connection is attempted before startup()
    monitoring.prepare().unwrap();

    // server-agent + graphite + local; the telegraf block has no factory
    assert_eq!(monitoring.client_count(), 3);
}

#[test]
fn criteria_blocks_become_evaluators_with_default_condition() {
    let config = load_config();
    let criteria = MonitoringCriteria::from_config(&config.criteria[0]);

    assert_eq!(criteria.subject(), "127.0.0.1:4444/cpu");
    assert!(!criteria.triggered());
}

#[test]
fn engine_settings_reach_the_run_loop() {
    let config = load_config();
    assert_eq!(config.engine.check_interval, Some(Duration::from_secs(2)));

    let engine = gust_core::Engine::new(FakeClock::new(), gust_core::SequentialIdGen::default())
        .with_settings(&config.engine);
    assert_eq!(engine.check_interval(), Duration::from_secs(2));

    let execution = &config.execution[0];
    assert_eq!(execution.start_at.as_deref(), Some("13:31"));
    assert_eq!(execution.delay.as_deref(), Some("30s"));
}
