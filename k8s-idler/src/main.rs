use std::process::ExitCode;

use k8s_idler_engine::Idler;
use k8s_idler_kubeapi::KubeApi;
use tracing_subscriber::EnvFilter;

use settings::Environment;

mod settings;

const DEFAULT_LOG_LEVEL: &str = "info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let environment = Environment::load();
    init_tracing(
        environment
            .as_ref()
            .ok()
            .and_then(|environment| environment.log_level()),
    );
    tracing::info!("Starting k8s-idler");

    let environment = match environment {
        Ok(environment) => environment,
        Err(err) => {
            tracing::error!(%err, "Failed to read configuration");
            return ExitCode::FAILURE;
        }
    };
    let settings = environment.settings();
    tracing::debug!(?settings, "Loaded settings");

    let api = match KubeApi::new(&settings.credentials).await {
        Ok(api) => api,
        Err(err) => {
            tracing::error!(%err, "Failed to connect to the cluster");
            return ExitCode::FAILURE;
        }
    };

    match Idler::new(api, settings.idler).run().await {
        Ok(report) => ExitCode::from(report.exit_code()),
        Err(err) => {
            tracing::error!(%err, "Failed to build the index");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(log_level))
        .init();
}

/// `LOG_LEVEL` first, then `RUST_LOG`, then `info`
fn log_filter(log_level: Option<&str>) -> EnvFilter {
    log_level
        .and_then(|level| EnvFilter::try_new(directive(level)).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Severity names such as `WARNING` or `CRITICAL` map to a level, anything
/// else is used as an `EnvFilter` directive.
fn directive(log_level: &str) -> String {
    let log_level = log_level.trim();
    let level = match log_level.to_ascii_lowercase().as_str() {
        "critical" | "fatal" | "error" => "error",
        "warning" | "warn" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" | "notset" => "trace",
        "off" => "off",
        _ => log_level,
    };
    level.to_string()
}
