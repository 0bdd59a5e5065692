// # dnsrec - A-record reconciliation CLI
//
// Thin integration layer over `dnsrec-core`: parse arguments, build the HTTP
// zone API client, run one reconciliation and print the outcome.
//
// ## Configuration
//
// Every flag has an environment fallback:
//
// - `--api-url` / `DNSREC_API_URL`: Base URL of the zone API
// - `--zone` / `DNSREC_ZONE`: Zone to operate on (all zones when omitted)
// - `--record` / `DNSREC_RECORD`: Record name (omit with `--state absent` to drop the zone)
// - `--value` / `DNSREC_VALUE`: IPv4 address(es), repeatable or comma separated
// - `--state` / `DNSREC_STATE`: `present` (default) or `absent`
// - `--check` / `DNSREC_CHECK_MODE`: Report changes without applying them
// - `--timeout-secs` / `DNSREC_TIMEOUT_SECS`: Per-request timeout
// - `--log-level` / `DNSREC_LOG_LEVEL`: trace, debug, info, warn, error
// - `--task` / `DNSREC_TASK`: YAML task file; flags given explicitly win
//
// ## Example
//
// ```bash
// dnsrec --api-url http://dns.lan:8080 --zone lan --record host1 --value 10.0.0.1
// dnsrec --api-url http://dns.lan:8080 --zone lan --state absent --check
// ```
//
// The outcome is printed as JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use dnsrec_api_http::HttpZoneApi;
use dnsrec_core::{ApiConfig, DesiredIntent, ReconcileOptions, Reconciler, TaskConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Reconciliation finished (changed or not)
/// - 1: Invalid arguments or configuration, nothing was sent
/// - 2: Runtime error while talking to the zone API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsrecExitCode {
    /// Reconciliation finished
    Success = 0,
    /// Configuration or argument error
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DnsrecExitCode> for ExitCode {
    fn from(code: DnsrecExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Reconcile A records on a DNS server's HTTP zone API
#[derive(Debug, Parser)]
#[command(name = "dnsrec", version, about)]
struct Args {
    /// YAML task file with api_url, zone, record, value, state, check_mode
    #[arg(long, env = "DNSREC_TASK", value_name = "FILE")]
    task: Option<PathBuf>,

    /// Base URL of the zone API
    #[arg(long, env = "DNSREC_API_URL")]
    api_url: Option<String>,

    /// Zone to operate on
    #[arg(long, env = "DNSREC_ZONE")]
    zone: Option<String>,

    /// Record name
    #[arg(long, env = "DNSREC_RECORD")]
    record: Option<String>,

    /// IPv4 address(es) for the record
    #[arg(long = "value", env = "DNSREC_VALUE", value_delimiter = ',')]
    values: Vec<String>,

    /// present or absent
    #[arg(long, env = "DNSREC_STATE")]
    state: Option<String>,

    /// Report what would change without changing it
    #[arg(long, env = "DNSREC_CHECK_MODE")]
    check: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "DNSREC_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Log level
    #[arg(long, env = "DNSREC_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    /// Read the task file, if any, and layer explicit flags on top
    fn into_task(self) -> Result<TaskConfig> {
        let task = match &self.task {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read task file {}", path.display()))?;
                TaskConfig::from_yaml(&text)
                    .with_context(|| format!("Invalid task file {}", path.display()))?
            }
            None => TaskConfig {
                api: ApiConfig::new(""),
                intent: DesiredIntent::default(),
                options: ReconcileOptions::default(),
            },
        };

        self.apply_overrides(task)
    }

    fn apply_overrides(self, mut task: TaskConfig) -> Result<TaskConfig> {
        if let Some(url) = self.api_url {
            task.api.url = url;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            task.api.timeout_secs = timeout_secs;
        }
        if let Some(zone) = self.zone {
            task.intent.zone = Some(zone);
        }
        if let Some(record) = self.record {
            task.intent.record = Some(record);
        }

        let values: Vec<String> = self
            .values
            .iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if !values.is_empty() {
            task.intent.values = values;
        }

        if let Some(state) = self.state {
            task.intent.state = state.trim().parse()?;
        }
        if self.check {
            task.options.check_mode = true;
        }

        Ok(task)
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DNSREC_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => DnsrecExitCode::Success,
                _ => DnsrecExitCode::ConfigError,
            }
            .into();
        }
    };

    let log_level = match parse_log_level(&args.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DnsrecExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsrecExitCode::ConfigError.into();
    }

    let task = match args.into_task() {
        Ok(task) => task,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return DnsrecExitCode::ConfigError.into();
        }
    };

    if let Err(e) = task.validate() {
        error!("Configuration validation error: {}", e);
        return DnsrecExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsrecExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(task)).into()
}

/// Run one reconciliation and print its outcome
async fn run(task: TaskConfig) -> DnsrecExitCode {
    let api = match HttpZoneApi::from_config(&task.api) {
        Ok(api) => api,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DnsrecExitCode::ConfigError;
        }
    };

    info!(
        "Reconciling against {} (check_mode: {})",
        api.base_url(),
        task.options.check_mode
    );

    let reconciler = Reconciler::new(Box::new(api), task.options);
    let outcome = match reconciler.reconcile(&task.intent).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_precondition() => {
            error!("Invalid arguments: {}", e);
            return DnsrecExitCode::ConfigError;
        }
        Err(e) => {
            error!("Reconciliation failed: {}", e);
            return DnsrecExitCode::RuntimeError;
        }
    };

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to render outcome: {}", e);
            return DnsrecExitCode::RuntimeError;
        }
    }

    info!(
        "Done: changed={} operations={}",
        outcome.changed,
        outcome.operations.len()
    );
    DnsrecExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use dnsrec_core::State;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["dnsrec"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags_build_task() {
        let task = args(&[
            "--api-url",
            "http://dns.lan:8080",
            "--zone",
            "lan",
            "--record",
            "host1",
            "--value",
            "10.0.0.2,10.0.0.1",
            "--value",
            "10.0.0.3",
            "--state",
            "absent",
            "--check",
            "--timeout-secs",
            "5",
        ])
        .into_task()
        .unwrap();

        assert_eq!(task.api.url, "http://dns.lan:8080");
        assert_eq!(task.api.timeout_secs, 5);
        assert_eq!(task.intent.zone.as_deref(), Some("lan"));
        assert_eq!(task.intent.record.as_deref(), Some("host1"));
        assert_eq!(task.intent.values, vec!["10.0.0.2", "10.0.0.1", "10.0.0.3"]);
        assert_eq!(task.intent.state, State::Absent);
        assert!(task.options.check_mode);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_flags_override_task_file_values() {
        let task = TaskConfig::from_yaml(
            "api_url: http://old.lan\n\
             zone: lan\n\
             record: host1\n\
             value: [10.0.0.1]\n",
        )
        .unwrap();

        let task = args(&["--api-url", "http://new.lan", "--value", "10.0.0.9"])
            .apply_overrides(task)
            .unwrap();

        assert_eq!(task.api.url, "http://new.lan");
        assert_eq!(task.intent.zone.as_deref(), Some("lan"));
        assert_eq!(task.intent.values, vec!["10.0.0.9"]);
        assert_eq!(task.intent.state, State::Present);
        assert!(!task.options.check_mode);
    }

    #[test]
    fn test_task_file_is_loaded_and_overridden() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"api_url: http://dns.lan:8080\n\
              zone: lan\n\
              record: host1\n\
              value: 10.0.0.1\n\
              state: absent\n",
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let task = args(&["--task", path, "--check"]).into_task().unwrap();

        assert_eq!(task.api.url, "http://dns.lan:8080");
        assert_eq!(task.intent.values, vec!["10.0.0.1"]);
        assert_eq!(task.intent.state, State::Absent);
        assert!(task.options.check_mode);
    }

    #[test]
    fn test_bad_state_is_rejected() {
        let err = args(&["--state", "gone"]).into_task().unwrap_err();
        assert!(err.to_string().contains("Unrecognized value in argument 'state'"));
    }

    #[test]
    fn test_missing_task_file() {
        let err = args(&["--task", "/nonexistent/dnsrec-task.yaml"])
            .into_task()
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read task file"));
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert!(parse_log_level("verbose").is_err());
    }
}
