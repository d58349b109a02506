//! Runner cycles against a mocked SWPC and a temporary archive.
//!
//! Every default endpoint is overridden to point at the mock server, so no
//! test touches the network.

use std::path::Path;
use std::time::Duration;

use luft_archive::ArchiveStore;
use luft_cli::config::LuftConfig;
use luft_cli::runner::Runner;
use luft_collector::CollectorKind;
use luft_core::Telemetry;
use serde_json::json;
use tokio::sync::watch;
use url::Url;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_against(server: &MockServer, archive: &Path) -> LuftConfig {
    let mut config = LuftConfig::default();
    config.storage.archive_path = archive.to_path_buf();
    config.logging.file = None;
    for kind in CollectorKind::ALL {
        let settings = match kind {
            CollectorKind::SolarWind => &mut config.collectors.solar_wind,
            CollectorKind::Cosmic => &mut config.collectors.cosmic_data,
        };
        settings.timeout = 5;
        for (name, _) in kind.default_endpoints() {
            let url = Url::parse(&format!("{}/{name}.json", server.uri())).unwrap();
            settings.endpoints.insert(name.to_string(), url);
        }
    }
    config
}

async fn answering(status: u16) -> MockServer {
    let server = MockServer::start().await;
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!([{"time_tag": "2024-03-07 13:44:00.000", "value": 1.5}]))
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("GET")).respond_with(template).mount(&server).await;
    server
}

fn archived(archive: &Path, source: &str) -> usize {
    ArchiveStore::open(archive, Telemetry::disabled())
        .unwrap()
        .list_archives(source, None)
        .unwrap()
        .len()
}

#[tokio::test]
async fn run_once_archives_every_enabled_collector() {
    let server = answering(200).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_against(&server, dir.path());
    let runner = Runner::from_config(&config, Telemetry::disabled()).unwrap();

    let report = runner.run_once().await;

    assert_eq!(report.outcomes.len(), 2);
    assert!(!report.all_failed());
    let store = ArchiveStore::open(dir.path(), Telemetry::disabled()).unwrap();
    for outcome in &report.outcomes {
        assert_eq!((outcome.succeeded, outcome.failed), (3, 0));
        let id = outcome.archive.as_ref().unwrap();
        let envelope = store.retrieve(id).unwrap().unwrap();
        assert!(store.verify_integrity(&envelope));
        assert_eq!(envelope.source, outcome.kind.archive_source());
        assert_eq!(envelope.metadata["collector"], outcome.kind.name());
        assert_eq!(envelope.data["sources"].as_object().unwrap().len(), 3);
    }
}

#[tokio::test]
async fn disabled_collector_is_skipped() {
    let server = answering(200).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_against(&server, dir.path());
    config.collectors.cosmic_data.enabled = false;
    let runner = Runner::from_config(&config, Telemetry::disabled()).unwrap();

    let report = runner.run_once().await;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(archived(dir.path(), "solar_wind"), 1);
    assert_eq!(archived(dir.path(), "cosmic"), 0);
}

#[tokio::test]
async fn unreachable_upstream_is_archived_but_counts_as_failure() {
    let server = answering(503).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_against(&server, dir.path());
    let runner = Runner::from_config(&config, Telemetry::disabled()).unwrap();

    let report = runner.run_once().await;

    assert!(report.all_failed());
    assert_eq!(report.archived().count(), 2);
}

#[tokio::test]
async fn continuous_run_stops_on_shutdown_after_current_cycle() {
    let server = answering(200).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_against(&server, dir.path());
    config.collectors.solar_wind.interval = 3600;
    let runner = Runner::from_config(&config, Telemetry::disabled()).unwrap();
    assert_eq!(runner.interval(), Duration::from_secs(3600));

    let (tx, rx) = watch::channel(false);
    let stop = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(true).unwrap();
    };
    tokio::time::timeout(Duration::from_secs(10), async {
        tokio::join!(runner.run_continuous(rx), stop);
    })
    .await
    .expect("runner did not stop");

    assert_eq!(archived(dir.path(), "solar_wind"), 1);
    assert_eq!(archived(dir.path(), "cosmic"), 1);
}

#[tokio::test]
async fn total_failure_waits_retry_delay_not_interval() {
    let server = answering(500).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_against(&server, dir.path());
    config.collectors.solar_wind.interval = 3600;
    config.collectors.cosmic_data.enabled = false;
    let runner = Runner::from_config(&config, Telemetry::disabled())
        .unwrap()
        .with_retry_delay(Duration::from_millis(50));

    let (tx, rx) = watch::channel(false);
    let stop = async {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        tx.send(true).unwrap();
    };
    tokio::time::timeout(Duration::from_secs(10), async {
        tokio::join!(runner.run_continuous(rx), stop);
    })
    .await
    .expect("runner did not stop");

    assert!(archived(dir.path(), "solar_wind") >= 2);
}

#[tokio::test]
async fn shutdown_before_start_runs_no_cycle() {
    let server = answering(200).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_against(&server, dir.path());
    let runner = Runner::from_config(&config, Telemetry::disabled()).unwrap();

    let (_tx, rx) = watch::channel(true);
    runner.run_continuous(rx).await;

    assert_eq!(archived(dir.path(), "solar_wind"), 0);
}
