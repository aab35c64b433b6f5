//! Service daemon
//!
//! Discovers controllers, starts one [`VirtualGamepadHandler`] per device
//! and keeps rescanning until a shutdown signal arrives. Each rescan also
//! releases the handlers of devices that are gone. Shutdown stops the
//! handlers first (each detaches its virtual controllers) and the backend
//! last.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use padbridge_controller_types::ControllerConfig;
use padbridge_controllers::{create_controller, driver_for_device};
use padbridge_usb::{UsbDeviceInfo, UsbHost};
use padbridge_virtual::{
    BackendKind, DeviceListBackend, HandlerOptions, HeadlessDeviceList, HeadlessRegionSource,
    SharedStateManager, VirtualBackend, VirtualGamepadHandler,
};
use tokio::sync::broadcast;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigStore, GlobalConfig};
use crate::discovery::DiscoveryFilter;

/// How often the host is enumerated for newly attached controllers.
pub const DEFAULT_RESCAN_PERIOD: Duration = Duration::from_secs(1);

/// The virtual-controller backend shared by every handler.
pub enum BackendRuntime {
    DeviceList(Arc<HeadlessDeviceList>),
    SharedState(Arc<SharedStateManager>),
}

impl BackendRuntime {
    pub fn start(kind: BackendKind) -> Result<Self> {
        let runtime = match kind {
            BackendKind::DeviceList => BackendRuntime::DeviceList(Arc::new(HeadlessDeviceList::new())),
            BackendKind::SharedState => {
                let manager = Arc::new(SharedStateManager::new(Arc::new(HeadlessRegionSource)));
                manager
                    .start()
                    .context("Failed to start shared state replication")?;
                BackendRuntime::SharedState(manager)
            }
        };
        info!(backend = %kind, "virtual controller backend ready");
        Ok(runtime)
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            BackendRuntime::DeviceList(_) => BackendKind::DeviceList,
            BackendRuntime::SharedState(_) => BackendKind::SharedState,
        }
    }

    /// A backend for one controller.
    pub fn backend_for(&self, config: &ControllerConfig) -> Box<dyn VirtualBackend> {
        match self {
            BackendRuntime::DeviceList(platform) => {
                Box::new(DeviceListBackend::new(platform.clone(), config))
            }
            BackendRuntime::SharedState(manager) => Box::new(manager.backend(config)),
        }
    }

    pub fn stop(&self) {
        if let BackendRuntime::SharedState(manager) = self {
            manager.stop();
        }
    }
}

/// Daemon state between startup and shutdown.
pub struct PadbridgeDaemon {
    global: GlobalConfig,
    store: ConfigStore,
    filter: DiscoveryFilter,
    host: Arc<dyn UsbHost>,
    runtime: BackendRuntime,
    /// Running handlers keyed by device path
    handlers: HashMap<String, VirtualGamepadHandler>,
    /// Device paths already handled, including skipped ones
    seen: HashSet<String>,
    rescan_period: Duration,
    shutdown_tx: broadcast::Sender<()>,
    is_running: Arc<AtomicBool>,
}

impl PadbridgeDaemon {
    /// Validates `global` and brings the backend up. `backend` overrides the
    /// configured one.
    pub fn new(
        store: ConfigStore,
        global: GlobalConfig,
        host: Arc<dyn UsbHost>,
        backend: Option<BackendKind>,
    ) -> Result<Self> {
        global.validate().context("Invalid [global] configuration")?;
        let filter = global.discovery_filter()?;
        let kind = match backend {
            Some(kind) => kind,
            None => global.backend_kind()?,
        };
        let runtime = BackendRuntime::start(kind)?;
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            global,
            store,
            filter,
            host,
            runtime,
            handlers: HashMap::new(),
            seen: HashSet::new(),
            rescan_period: DEFAULT_RESCAN_PERIOD,
            shutdown_tx,
            is_running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_rescan_period(mut self, period: Duration) -> Self {
        self.rescan_period = period;
        self
    }

    /// Sending on this channel stops [`PadbridgeDaemon::run`].
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn backend(&self) -> &BackendRuntime {
        &self.runtime
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            polling_timeout_ms: self.global.polling_timeout_ms,
            thread_niceness: self.global.polling_thread_priority,
        }
    }

    /// Runs until a signal or [`PadbridgeDaemon::shutdown_sender`] stops it.
    pub async fn run(mut self) -> Result<()> {
        info!(
            backend = %self.runtime.kind(),
            discovery = %self.filter.mode(),
            polling_timeout_ms = self.global.polling_timeout_ms,
            "starting padbridge daemon"
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let signals = {
            let shutdown_tx = self.shutdown_tx.clone();
            let is_running = self.is_running.clone();
            tokio::spawn(async move {
                Self::setup_signal_handlers(shutdown_tx, is_running).await;
            })
        };

        self.is_running.store(true, Ordering::SeqCst);
        let mut rescan = interval(self.rescan_period);
        rescan.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("received shutdown request");
                    break;
                }
                _ = rescan.tick() => {
                    let started = self.scan();
                    if started > 0 {
                        info!(started, running = self.handlers.len(), "controllers started");
                    }
                }
            }
        }

        signals.abort();
        self.shutdown().await;
        Ok(())
    }

    /// Releases handlers whose device is gone, then starts a handler for
    /// every newly discovered device. Returns how many were started.
    pub fn scan(&mut self) -> usize {
        let devices = match self.filter.discover(self.host.as_ref()) {
            Ok(devices) => devices,
            Err(e) => {
                warn!(error = %e, "usb discovery failed");
                return 0;
            }
        };
        let present: HashSet<&str> = devices.iter().map(|info| info.path.as_str()).collect();
        self.remove_unplugged(&present);

        let mut started = 0;
        for info in &devices {
            if !self.seen.insert(info.path.clone()) {
                continue;
            }
            match self.start_controller(info) {
                Ok(Some(handler)) => {
                    self.handlers.insert(info.path.clone(), handler);
                    started += 1;
                }
                Ok(None) => info!(device = %info.vid_pid(), "no driver for device, skipped"),
                Err(e) => error!(device = %info.vid_pid(), error = %e, "failed to start controller"),
            }
        }
        started
    }

    /// Stops handlers whose device left the listing or whose input thread
    /// gave up. Paths no longer listed are forgotten so a re-plug starts over.
    fn remove_unplugged(&mut self, present: &HashSet<&str>) {
        self.handlers.retain(|path, handler| {
            let listed = present.contains(path.as_str());
            if listed && handler.is_running() {
                return true;
            }
            info!(handler = handler.name(), device = %path, listed, "controller removed");
            handler.exit();
            false
        });
        self.seen.retain(|path| present.contains(path.as_str()));
    }

    fn start_controller(&mut self, info: &UsbDeviceInfo) -> Result<Option<VirtualGamepadHandler>> {
        debug!(device = %info.vid_pid(), name = %info.display_name(), "controller discovered");
        let config = self
            .store
            .controller_config(info, self.global.auto_add_controller);
        if driver_for_device(info, &config.driver).is_none() {
            if !config.driver.is_empty() {
                warn!(device = %info.vid_pid(), driver = %config.driver, "unknown driver configured");
            }
            return Ok(None);
        }

        let device = self
            .host
            .open_device(info)
            .with_context(|| format!("Failed to open {}", info.display_name()))?;
        let backend = self.runtime.backend_for(&config);
        let Some(controller) = create_controller(device, config) else {
            return Ok(None);
        };

        let mut handler = VirtualGamepadHandler::new(controller, backend, self.handler_options());
        handler
            .initialize()
            .with_context(|| format!("Failed to initialize {}", handler.name()))?;
        info!(handler = handler.name(), device = %info.display_name(), "controller started");
        Ok(Some(handler))
    }

    /// Stops every handler, then the backend.
    pub async fn shutdown(mut self) {
        info!(handlers = self.handlers.len(), "shutting down padbridge daemon");
        self.is_running.store(false, Ordering::SeqCst);

        let handlers = std::mem::take(&mut self.handlers);
        let stopped = tokio::task::spawn_blocking(move || {
            for mut handler in handlers.into_values() {
                handler.exit();
            }
        })
        .await;
        if let Err(e) = stopped {
            error!(error = %e, "handler shutdown task failed");
        }

        self.runtime.stop();
        info!("padbridge daemon stopped");
    }

    async fn setup_signal_handlers(shutdown_tx: broadcast::Sender<()>, is_running: Arc<AtomicBool>) {
        match wait_for_signal().await {
            Ok(name) => info!(signal = name, "received signal"),
            Err(e) => error!(error = %e, "signal handling failed, shutting down"),
        }

        is_running.store(false, Ordering::SeqCst);
        if shutdown_tx.send(()).is_err() {
            debug!("daemon already stopped");
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
        _ = sighup.recv() => "SIGHUP",
    };
    Ok(name)
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
