//! Recording demo for dispatch tests

use crate::demo::{Demo, DemoConnection, DemoStatus, DEMO_SUCCESS};
use crate::transport::NetworkInterface;
use async_trait::async_trait;
use demo_runner_shared::NetworkType;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Demo that records every call and can be held inside `run`
pub struct RecordingDemo {
    status: DemoStatus,
    hold: bool,
    started: Notify,
    release: Notify,
    runs: Mutex<Vec<DemoConnection>>,
    connected: Mutex<Vec<DemoConnection>>,
    disconnected: Mutex<Vec<Option<NetworkType>>>,
}

impl RecordingDemo {
    pub fn new() -> Self {
        Self {
            status: DEMO_SUCCESS,
            hold: false,
            started: Notify::new(),
            release: Notify::new(),
            runs: Mutex::new(Vec::new()),
            connected: Mutex::new(Vec::new()),
            disconnected: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status(mut self, status: DemoStatus) -> Self {
        self.status = status;
        self
    }

    /// Keep `run` from returning until `release` is called
    pub fn holding(mut self) -> Self {
        self.hold = true;
        self
    }

    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn runs(&self) -> Vec<DemoConnection> {
        self.runs.lock().unwrap().clone()
    }

    pub fn connected(&self) -> Vec<DemoConnection> {
        self.connected.lock().unwrap().clone()
    }

    pub fn disconnected(&self) -> Vec<Option<NetworkType>> {
        self.disconnected.lock().unwrap().clone()
    }
}

#[async_trait]
impl Demo for RecordingDemo {
    async fn run(&self, connection: DemoConnection) -> DemoStatus {
        self.runs.lock().unwrap().push(connection);
        self.started.notify_one();
        if self.hold {
            self.release.notified().await;
        }
        self.status
    }

    fn on_network_connected(&self, connection: DemoConnection) {
        self.connected.lock().unwrap().push(connection);
    }

    fn on_network_disconnected(&self, interface: Option<Arc<dyn NetworkInterface>>) {
        self.disconnected
            .lock()
            .unwrap()
            .push(interface.map(|i| i.network_type()));
    }

    fn name(&self) -> &str {
        "recording"
    }
}
