// SPDX-License-Identifier: MIT

//! `vanillad`: the reconciliation agent binary.
//!
//! Wires the `kube`-backed tree/cluster adapters and the placeholder
//! controller/oplet pair of `va-daemon` together behind [`Agent`], loads
//! configuration from a TOML file, and runs until `SIGTERM`/`SIGINT`.
//!
//! The controller plug-in's actual decision logic (spec preparation,
//! speclet parsing, what "inappropriate" means for a particular
//! application) is out of scope for this core — a production deployment
//! links its own `ControllerAdapter`/`Oplet`/`OpletFactory` in place of
//! [`StaticControllerAdapter`]/[`DefaultOplet`].

use std::path::PathBuf;
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use va_adapters::{KubeClusterClient, KubeTreeClient};
use va_core::{AgentConfig, RawConfig};
use va_daemon::{Agent, DefaultOplet, FnOpletFactory, StaticControllerAdapter};

const CONFIG_PATH_ENV: &str = "VA_AGENT_CONFIG";
const LOG_DIR_ENV: &str = "VA_LOG_DIR";
const LOG_FILE_NAME: &str = "vanillad.log";
const K8S_NAMESPACE_ENV: &str = "VA_K8S_NAMESPACE";
const DEFAULT_K8S_NAMESPACE: &str = "default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Held for the process lifetime: dropping it stops flushing the
    // non-blocking file writer.
    let _log_guard = init_logging();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            // Template parse/exec failure (and missing required fields) is
            // fatal at construction time per the error handling design.
            error!(error = %err, "failed to load configuration");
            return Err(err.into());
        }
    };

    let kube_client = kube::Client::try_default().await?;
    let k8s_namespace =
        std::env::var(K8S_NAMESPACE_ENV).unwrap_or_else(|_| DEFAULT_K8S_NAMESPACE.to_string());

    let tree = Arc::new(KubeTreeClient::new(kube_client.clone()));
    let cluster = Arc::new(KubeClusterClient::new(kube_client, k8s_namespace));
    let controller = Arc::new(StaticControllerAdapter::new(
        controller_family(),
        config.root.clone(),
    ));
    let oplet_factory = Arc::new(FnOpletFactory::new(|alias, agent_info| {
        Arc::new(DefaultOplet::new(alias, agent_info))
    }));

    let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
    let agent =
        Arc::new(Agent::new(config, hostname, tree, cluster, controller, oplet_factory));

    agent.start()?;
    info!("vanillad started");

    wait_for_shutdown_signal().await;

    info!("shutting down");
    agent.stop().await;
    info!("vanillad stopped");
    Ok(())
}

/// `family` is normally supplied by the linked controller plug-in; the
/// placeholder controller reads it from `$VA_FAMILY` since it has no
/// plug-in of its own to ask.
fn controller_family() -> String {
    std::env::var("VA_FAMILY").unwrap_or_else(|_| "vanilla".to_string())
}

fn load_config() -> Result<AgentConfig, Box<dyn std::error::Error>> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/etc/vanillad/config.toml"));
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| format!("reading config at {}: {e}", path.display()))?;
    let config = RawConfig::from_toml_str(&raw)?.resolve()?;
    Ok(config)
}

/// Structured logging via `tracing-subscriber`'s `EnvFilter` (respecting
/// `RUST_LOG`), with an optional rotating file appender when `$VA_LOG_DIR`
/// is set — otherwise logs go to stdout. Mirrors the teacher's daemon
/// entry point logging setup without adopting its specific sink
/// destinations.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match std::env::var(LOG_DIR_ENV) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(non_blocking))
                .init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
            None
        }
    }
}

async fn wait_for_shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(err) => {
            error!(error = %err, "failed to install SIGTERM handler");
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(err) => {
            error!(error = %err, "failed to install SIGINT handler");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }
}
