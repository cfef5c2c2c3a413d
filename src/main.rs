mod config;
mod demo;
mod dispatch;
mod network;
mod resource;
mod transport;

use config::RunnerConfig;
use demo::{BleEchoDemo, EchoDemo};
use dispatch::{DemoLauncher, DispatchOutcome, DispatchReport};
use network::{spawn_probes, LinkManager};
use std::sync::Arc;
use tokio::task::JoinError;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = RunnerConfig::default();

    info!("Demo runner starting: {}", config.identifier);
    info!("  Server: {}", config.server.address());

    let manager = Arc::new(LinkManager::from_config(&config.network));
    info!("[NET] Managing {}", manager.managed_networks());

    let probes = spawn_probes(
        manager.clone(),
        &config.network,
        config.server.clone(),
        config.credentials.clone(),
    );

    let launcher = DemoLauncher::new(
        manager.clone(),
        config.identifier.clone(),
        config.server.clone(),
        config.credentials.clone(),
    );

    let echo = |name: &str| EchoDemo::new(name).with_reply_timeout(config.demo_reply_timeout);
    let handles = vec![
        launcher.start_mqtt_demo(Arc::new(echo("mqtt"))),
        launcher.start_shadow_demo(Arc::new(echo("shadow"))),
        launcher.start_ble_mqtt_echo_demo(Arc::new(BleEchoDemo::new(echo("ble-mqtt-echo")))),
    ];

    tokio::select! {
        results = futures::future::join_all(handles) => {
            let total = results.len();
            let ran = results.iter().filter(|result| log_report(result)).count();
            info!("All demos finished ({} of {} ran)", ran, total);
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, shutting down");
        }
    }

    for probe in probes {
        probe.abort();
    }
}

/// Log one dispatch report; returns whether its demo ran
fn log_report(result: &Result<DispatchReport, JoinError>) -> bool {
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            error!("[DEMO] Dispatch task failed: {}", e);
            return false;
        }
    };

    match &report.outcome {
        DispatchOutcome::Completed {
            network,
            mqtt_mode,
            status,
        } => info!(
            "[DEMO] {} ran over {} (mqtt_mode={}) with status {}",
            report.demo, network, mqtt_mode, status
        ),
        DispatchOutcome::Skipped(reason) => {
            warn!("[DEMO] {} did not run: {}", report.demo, reason)
        }
    }
    info!("[DEMO] {} states: {:?}", report.demo, report.trace);
    report.outcome.demo_ran()
}
