//! `provider-monitor` command-line interface.
//!
//! One-shot commands (`status`, `history`, `alerts`, `check`, `ack`) work
//! directly against the health database. `monitor` runs the scheduler until
//! SIGINT/SIGTERM, optionally with the admin API and a metrics endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use provider_monitor::admin::{self, AdminState};
use provider_monitor::alerts::{HealthAlert, WebhookNotifier};
use provider_monitor::config::watcher::ConfigWatcher;
use provider_monitor::health::{HealthCheckResult, ProviderHealth};
use provider_monitor::lifecycle::startup::{bootstrap, Runtime};
use provider_monitor::lifecycle::{signals, Shutdown};
use provider_monitor::observability::{logging, metrics};

type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "provider-monitor")]
#[command(about = "Health monitoring and automatic failover for LLM providers", long_about = None)]
struct Cli {
    /// Configuration file (defaults apply when it does not exist)
    #[arg(short, long, global = true, default_value = "provider-monitor.toml")]
    config: PathBuf,

    /// Override the health database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show health of every configured provider
    Status {
        /// Aggregation window in hours
        #[arg(long)]
        window: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// List recent health checks for a provider, newest first
    History {
        provider: String,
        #[arg(long, default_value_t = 24)]
        hours: u32,
        #[arg(long)]
        json: bool,
    },
    /// List failover and recovery alerts
    Alerts {
        #[arg(long)]
        provider: Option<String>,
        /// Only alerts not yet acknowledged
        #[arg(long)]
        unacknowledged: bool,
        #[arg(long)]
        json: bool,
    },
    /// Probe one provider now and record the result
    Check {
        provider: String,
        #[arg(long)]
        json: bool,
    },
    /// Acknowledge an alert
    Ack { alert_id: String },
    /// Run the scheduler until interrupted
    Monitor {
        /// Seconds between check cycles
        #[arg(long)]
        interval: Option<u64>,
        /// Webhook receiving alerts (overrides the config file)
        #[arg(long)]
        webhook: Option<String>,
    },
}

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();
    let runtime = bootstrap(&cli.config, cli.db.as_deref())?;
    logging::init(
        &runtime.config.observability.log_level,
        runtime.config.observability.json_logs,
    );

    match cli.command {
        Commands::Status { window, json } => {
            let monitor = runtime.monitor_builder()?.build();
            let health = monitor.all_provider_health(window).await?;
            if json {
                print_json(&health)?;
            } else {
                print_status(&health);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::History { provider, hours, json } => {
            let monitor = runtime.monitor_builder()?.build();
            let history = monitor.history(&provider, hours).await?;
            if json {
                print_json(&history)?;
            } else {
                print_history(&provider, &history);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Alerts { provider, unacknowledged, json } => {
            let monitor = runtime.monitor_builder()?.build();
            let filter = if unacknowledged { Some(false) } else { None };
            let alerts = monitor.alerts().list_alerts(filter, provider.as_deref()).await?;
            if json {
                print_json(&alerts)?;
            } else {
                print_alerts(&alerts);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { provider, json } => {
            let monitor = runtime.monitor_builder()?.build();
            let outcome = monitor.check_provider(&provider).await?;
            if json {
                print_json(&outcome)?;
            } else {
                print_check(&outcome.result, &outcome.health);
                if let Some(transition) = outcome.transition {
                    println!("Failover state changed: {}", transition);
                }
            }
            Ok(exit_code(outcome.result.success))
        }
        Commands::Ack { alert_id } => {
            let monitor = runtime.monitor_builder()?.build();
            if monitor.alerts().acknowledge(&alert_id).await? {
                match monitor.alerts().get_alert(&alert_id).await? {
                    Some(alert) => println!(
                        "Acknowledged {} alert for {}: {}",
                        alert.alert_type, alert.provider, alert.alert_id
                    ),
                    None => println!("Acknowledged {}", alert_id),
                }
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("Error: no alert with id {}", alert_id);
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Monitor { interval, webhook } => run_monitor(runtime, interval, webhook).await,
    }
}

async fn run_monitor(runtime: Runtime, interval: Option<u64>, webhook: Option<String>) -> CliResult {
    let config = &runtime.config;

    let mut builder = runtime.monitor_builder()?;
    if let Some(secs) = interval {
        builder = builder.check_interval(Duration::from_secs(secs));
    }
    if let Some(url) = webhook {
        url::Url::parse(&url).map_err(|e| format!("invalid --webhook URL: {}", e))?;
        let timeout = Duration::from_secs(config.alerts.webhook_timeout_secs);
        builder = builder.webhook(Some(WebhookNotifier::new(url, timeout)?));
    }
    let monitor = Arc::new(builder.build());

    tracing::info!(
        providers = config.providers.len(),
        interval_secs = monitor.settings().interval.as_secs(),
        webhook = monitor.alerts().webhook().map(|w| w.url()).unwrap_or("none"),
        "provider-monitor v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let _watcher = if runtime.config_path.exists() {
        match ConfigWatcher::new(&runtime.config_path, runtime.shared.clone()).run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "Config hot reload unavailable");
                None
            }
        }
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let admin_task = if config.admin.enabled {
        let listener = tokio::net::TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState {
            monitor: monitor.clone(),
            api_key: config.admin.api_key.as_str().into(),
        };
        Some(tokio::spawn(admin::serve(listener, state, shutdown.subscribe())))
    } else {
        None
    };

    monitor.start();
    signals::wait_for_shutdown().await;

    tracing::info!("Shutting down");
    shutdown.trigger();
    monitor.stop().await;
    if let Some(task) = admin_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Admin API failed"),
            Err(e) => tracing::error!(error = %e, "Admin API task panicked"),
        }
    }

    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_status(health: &[ProviderHealth]) {
    if health.is_empty() {
        println!("No providers configured");
        return;
    }
    println!(
        "{:<16} {:<10} {:<8} {:>7} {:>8} {:>9} {:>9} {:>6}  LAST ERROR",
        "PROVIDER", "STATUS", "ENABLED", "CHECKS", "SUCCESS", "AVG MS", "P95 MS", "FAILS"
    );
    for h in health {
        println!(
            "{:<16} {:<10} {:<8} {:>7} {:>7.1}% {:>9.1} {:>9.1} {:>6}  {}",
            h.provider,
            h.status,
            if h.is_enabled { "yes" } else { "no" },
            h.total_checks,
            h.success_rate * 100.0,
            h.latency_avg_ms,
            h.latency_p95_ms,
            h.consecutive_failures,
            h.last_error.as_deref().unwrap_or("-"),
        );
    }
}

fn print_history(provider: &str, history: &[HealthCheckResult]) {
    if history.is_empty() {
        println!("No checks recorded for {}", provider);
        return;
    }
    for check in history {
        println!(
            "{}  {:<4} {:>9.1} ms  {}  {}",
            check.timestamp.format("%Y-%m-%d %H:%M:%S"),
            if check.success { "ok" } else { "FAIL" },
            check.latency_ms,
            check.status_code.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
            check.error_message.as_deref().unwrap_or(""),
        );
    }
}

fn print_alerts(alerts: &[HealthAlert]) {
    if alerts.is_empty() {
        println!("No alerts");
        return;
    }
    for alert in alerts {
        println!(
            "{}  {:<8} {:<14} {}  {}",
            alert.timestamp.format("%Y-%m-%d %H:%M:%S"),
            alert.alert_type,
            alert.provider,
            if alert.acknowledged { "acked" } else { "NEW  " },
            alert.alert_id,
        );
        println!("    {}", alert.message);
    }
}

fn print_check(result: &HealthCheckResult, health: &ProviderHealth) {
    if result.success {
        println!("{}: ok in {:.1} ms", result.provider, result.latency_ms);
    } else {
        println!(
            "{}: FAILED after {:.1} ms: {}",
            result.provider,
            result.latency_ms,
            result.error_message.as_deref().unwrap_or("unknown error"),
        );
    }
    println!(
        "status={} enabled={} success_rate={:.1}% consecutive_failures={}",
        health.status,
        health.is_enabled,
        health.success_rate * 100.0,
        health.consecutive_failures,
    );
}
