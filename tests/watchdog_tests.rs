// tests/watchdog_tests.rs
use async_trait::async_trait;
use mockito::Server;
use printer_watchdog::api::{
    ApiClient, ApiError, HostApi, PluginEntry, PluginList, ServerInfo, VersionInfo,
};
use printer_watchdog::command::{
    CommandError, CommandOutput, CommandRunner, RestartOutcome, Restarter,
};
use printer_watchdog::config::SupervisorConfig;
use printer_watchdog::health::{DegradedModeStatus, HealthEvaluator, HealthStatus};
use printer_watchdog::supervisor::Supervisor;
use proptest::prelude::*;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Unreachable,
    Normal,
    Degraded,
}

#[derive(Clone)]
struct ScriptedApi {
    verdict: Arc<Mutex<Verdict>>,
}

impl ScriptedApi {
    fn new() -> Self {
        Self {
            verdict: Arc::new(Mutex::new(Verdict::Normal)),
        }
    }

    fn set(&self, verdict: Verdict) {
        *self.verdict.lock().unwrap() = verdict;
    }

    fn current(&self) -> Verdict {
        *self.verdict.lock().unwrap()
    }
}

fn not_found(path: &'static str) -> ApiError {
    ApiError::Status {
        path,
        status: StatusCode::NOT_FOUND,
    }
}

#[async_trait]
impl HostApi for ScriptedApi {
    async fn version(&self) -> Result<VersionInfo, ApiError> {
        match self.current() {
            Verdict::Unreachable => Err(not_found("api/version")),
            _ => Ok(VersionInfo {
                text: "OctoPrint 1.4.2".into(),
                api: None,
                server: None,
            }),
        }
    }

    // Behaves like an older release without /api/server, so the
    // plugin manager decides.
    async fn server(&self) -> Result<ServerInfo, ApiError> {
        Err(not_found("api/server"))
    }

    async fn plugin_list(&self) -> Result<PluginList, ApiError> {
        Ok(PluginList {
            plugins: vec![PluginEntry {
                key: Some("cura".into()),
                name: "Cura".into(),
                safe_mode_victim: self.current() == Verdict::Degraded,
            }],
        })
    }
}

#[derive(Clone, Default)]
struct RecordingRunner {
    runs: Arc<AtomicUsize>,
}

impl RecordingRunner {
    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, _command: &str) -> Result<CommandOutput, CommandError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(CommandOutput {
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

fn scripted_supervisor() -> (
    Supervisor<ScriptedApi, RecordingRunner>,
    ScriptedApi,
    RecordingRunner,
) {
    let api = ScriptedApi::new();
    let runner = RecordingRunner::default();
    let (supervisor, _handle) = Supervisor::new(
        HealthEvaluator::new(api.clone()),
        Restarter::new(Some("sudo service octoprint restart".into()), runner.clone()),
        &SupervisorConfig::default(),
    );
    (supervisor, api, runner)
}

#[tokio::test]
async fn test_unreachable_restarts_without_touching_counter() {
    let (mut supervisor, api, runner) = scripted_supervisor();

    api.set(Verdict::Degraded);
    supervisor.run_cycle().await;
    supervisor.run_cycle().await;
    assert_eq!(supervisor.policy().consecutive_degraded_cycles(), 2);

    api.set(Verdict::Unreachable);
    let report = supervisor.run_cycle().await;

    assert_eq!(report.health, HealthStatus::Unreachable);
    assert_eq!(report.degraded, None);
    assert_eq!(report.restart, Some(RestartOutcome::Succeeded));
    assert_eq!(supervisor.policy().consecutive_degraded_cycles(), 2);
    assert_eq!(runner.runs(), 2);
}

#[tokio::test]
async fn test_degraded_restarts_at_first_cycle_and_after_threshold() {
    let (mut supervisor, api, runner) = scripted_supervisor();
    api.set(Verdict::Degraded);

    let mut restart_cycles = Vec::new();
    for cycle in 1..=23 {
        let report = supervisor.run_cycle().await;
        assert_eq!(report.degraded, Some(DegradedModeStatus::Degraded));
        if report.restart.is_some() {
            restart_cycles.push(cycle);
        }
    }

    assert_eq!(restart_cycles, vec![1, 12, 23]);
    assert_eq!(runner.runs(), 3);
}

#[tokio::test]
async fn test_recovery_makes_next_degraded_cycle_fresh() {
    let (mut supervisor, api, runner) = scripted_supervisor();

    api.set(Verdict::Degraded);
    supervisor.run_cycle().await;
    supervisor.run_cycle().await;
    assert_eq!(runner.runs(), 1);

    api.set(Verdict::Normal);
    let report = supervisor.run_cycle().await;
    assert_eq!(report.degraded, Some(DegradedModeStatus::Normal));
    assert_eq!(report.restart, None);
    assert_eq!(supervisor.policy().consecutive_degraded_cycles(), 0);

    api.set(Verdict::Degraded);
    let report = supervisor.run_cycle().await;
    assert_eq!(report.restart, Some(RestartOutcome::Succeeded));
    assert_eq!(runner.runs(), 2);
}

#[tokio::test]
async fn test_missing_restart_command_is_not_fatal() {
    let api = ScriptedApi::new();
    let runner = RecordingRunner::default();
    let (mut supervisor, _handle) = Supervisor::new(
        HealthEvaluator::new(api.clone()),
        Restarter::new(None, runner.clone()),
        &SupervisorConfig::default(),
    );

    api.set(Verdict::Unreachable);
    let report = supervisor.run_cycle().await;

    assert_eq!(report.restart, Some(RestartOutcome::NotConfigured));
    assert_eq!(runner.runs(), 0);
}

fn http_supervisor(
    server: &Server,
    runner: RecordingRunner,
) -> Supervisor<ApiClient, RecordingRunner> {
    let client = ApiClient::new(
        Url::parse(&server.url()).unwrap(),
        "api-key",
        Duration::from_secs(2),
    )
    .unwrap();
    let (supervisor, _handle) = Supervisor::new(
        HealthEvaluator::new(client),
        Restarter::new(Some("restart".into()), runner),
        &SupervisorConfig::default(),
    );
    supervisor
}

#[tokio::test]
async fn test_http_host_in_normal_mode() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/version")
        .match_header("x-api-key", "api-key")
        .with_status(200)
        .with_body(r#"{"text": "OctoPrint 1.9.3"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/server")
        .with_status(200)
        .with_body(r#"{"version": "1.9.3", "safemode": null}"#)
        .create_async()
        .await;
    let plugins = server
        .mock("GET", "/api/plugin/pluginmanager")
        .expect(0)
        .create_async()
        .await;

    let runner = RecordingRunner::default();
    let mut supervisor = http_supervisor(&server, runner.clone());
    let report = supervisor.run_cycle().await;

    assert_eq!(report.health, HealthStatus::Alive);
    assert_eq!(report.degraded, Some(DegradedModeStatus::Normal));
    assert_eq!(report.restart, None);
    assert_eq!(runner.runs(), 0);
    plugins.assert_async().await;
}

#[tokio::test]
async fn test_http_older_host_in_safe_mode() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/version")
        .with_status(200)
        .with_body(r#"{"text": "OctoPrint 1.4.2"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/server")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/plugin/pluginmanager")
        .with_status(200)
        .with_body(r#"{"plugins": [{"key": "x", "name": "X", "safe_mode_victim": true}]}"#)
        .create_async()
        .await;

    let runner = RecordingRunner::default();
    let mut supervisor = http_supervisor(&server, runner.clone());
    let report = supervisor.run_cycle().await;

    assert_eq!(report.degraded, Some(DegradedModeStatus::Degraded));
    assert_eq!(report.restart, Some(RestartOutcome::Succeeded));
    assert_eq!(runner.runs(), 1);
}

#[tokio::test]
async fn test_http_wrong_identity_is_unreachable() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/version")
        .with_status(200)
        .with_body(r#"{"text": "Some other server"}"#)
        .create_async()
        .await;

    let runner = RecordingRunner::default();
    let mut supervisor = http_supervisor(&server, runner.clone());
    let report = supervisor.run_cycle().await;

    assert_eq!(report.health, HealthStatus::Unreachable);
    assert_eq!(runner.runs(), 1);
}

fn verdict_strategy() -> impl Strategy<Value = Verdict> {
    prop_oneof![
        Just(Verdict::Unreachable),
        Just(Verdict::Normal),
        Just(Verdict::Degraded),
    ]
}

proptest! {
    #[test]
    fn counter_only_moves_on_alive_cycles(verdicts in proptest::collection::vec(verdict_strategy(), 1..80)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let (mut supervisor, api, runner) = scripted_supervisor();
            let mut expected_runs = 0;

            for verdict in verdicts {
                api.set(verdict);
                let before = supervisor.policy().consecutive_degraded_cycles();
                let report = supervisor.run_cycle().await;
                let after = supervisor.policy().consecutive_degraded_cycles();

                match verdict {
                    Verdict::Unreachable => {
                        prop_assert_eq!(after, before);
                        prop_assert!(report.restart.is_some());
                        expected_runs += 1;
                    }
                    Verdict::Normal => {
                        prop_assert_eq!(after, 0);
                        prop_assert!(report.restart.is_none());
                    }
                    Verdict::Degraded => {
                        let should_restart = before == 0 || before > 10;
                        prop_assert_eq!(report.restart.is_some(), should_restart);
                        if should_restart {
                            expected_runs += 1;
                        }
                    }
                }
            }

            prop_assert_eq!(runner.runs(), expected_runs);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
