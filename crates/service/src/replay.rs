//! Replay captures
//!
//! A capture is a JSON file listing devices and the input reports they sent.
//! Replaying it plugs every device into a [`MemoryHost`] and feeds the
//! reports with their recorded delays, so the daemon can run end to end on
//! a machine without the controllers attached.
//!
//! ```json
//! {
//!   "devices": [{
//!     "device": { "vendor_id": 121, "product_id": 6, "path": "replay-0",
//!                 "interfaces": [{ "number": 0, "class": 3 }] },
//!     "repeat": true,
//!     "reports": [{ "delay_ms": 8, "data": "0180808080080000" }]
//!   }]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use padbridge_usb::UsbDeviceInfo;
use padbridge_usb::memory::{MemoryDeviceHandle, MemoryHost};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to read capture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid capture: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Invalid report {report} of {device}: {source}")]
    Report {
        device: String,
        report: usize,
        #[source]
        source: hex::FromHexError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayCapture {
    pub devices: Vec<CapturedDevice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedDevice {
    pub device: UsbDeviceInfo,
    /// Start over after the last report
    #[serde(default)]
    pub repeat: bool,
    pub reports: Vec<CapturedReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedReport {
    #[serde(default)]
    pub interface: usize,
    /// Pause before this report
    #[serde(default)]
    pub delay_ms: u64,
    /// Hex encoded report bytes
    pub data: String,
}

impl ReplayCapture {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decodes every report and plugs the devices into a fresh host.
    pub fn into_session(self) -> Result<ReplaySession, ReplayError> {
        let host = Arc::new(MemoryHost::new());
        let mut feeds = Vec::with_capacity(self.devices.len());

        for captured in self.devices {
            let name = captured.device.vid_pid();
            let mut reports = Vec::with_capacity(captured.reports.len());
            for (report, entry) in captured.reports.into_iter().enumerate() {
                let data = hex::decode(entry.data.trim()).map_err(|source| ReplayError::Report {
                    device: name.clone(),
                    report,
                    source,
                })?;
                reports.push(ReplayStep {
                    interface: entry.interface,
                    delay: Duration::from_millis(entry.delay_ms),
                    data,
                });
            }
            let handle = host.add_device(captured.device);
            feeds.push(DeviceFeed {
                name,
                handle,
                repeat: captured.repeat,
                reports,
            });
        }

        Ok(ReplaySession { host, feeds })
    }
}

struct ReplayStep {
    interface: usize,
    delay: Duration,
    data: Vec<u8>,
}

struct DeviceFeed {
    name: String,
    handle: MemoryDeviceHandle,
    repeat: bool,
    reports: Vec<ReplayStep>,
}

/// Devices of a capture, plugged in and ready to be fed.
pub struct ReplaySession {
    host: Arc<MemoryHost>,
    feeds: Vec<DeviceFeed>,
}

impl ReplaySession {
    pub fn host(&self) -> Arc<MemoryHost> {
        Arc::clone(&self.host)
    }

    pub fn device_count(&self) -> usize {
        self.feeds.len()
    }

    /// Starts one feeding task per device. Each task yields the number of
    /// reports it delivered once its capture ends, the device goes away or
    /// `shutdown` fires.
    pub fn spawn(self, shutdown: &broadcast::Sender<()>) -> Vec<JoinHandle<usize>> {
        self.feeds
            .into_iter()
            .map(|feed| tokio::spawn(feed_device(feed, shutdown.subscribe())))
            .collect()
    }
}

async fn feed_device(feed: DeviceFeed, mut shutdown: broadcast::Receiver<()>) -> usize {
    let mut sent = 0;
    info!(device = %feed.name, reports = feed.reports.len(), repeat = feed.repeat, "replay started");

    loop {
        for step in &feed.reports {
            tokio::select! {
                _ = shutdown.recv() => {
                    debug!(device = %feed.name, sent, "replay stopped");
                    return sent;
                }
                () = tokio::time::sleep(step.delay) => {}
            }
            if !feed.handle.push_report(step.interface, step.data.clone()) {
                debug!(device = %feed.name, sent, "replay device gone");
                return sent;
            }
            sent += 1;
        }
        if !feed.repeat || feed.reports.is_empty() {
            break;
        }
    }

    info!(device = %feed.name, sent, "replay finished");
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use padbridge_usb::UsbHost;

    const CAPTURE: &str = r#"{
        "devices": [{
            "device": {
                "vendor_id": 121,
                "product_id": 6,
                "path": "replay-0",
                "interfaces": [{ "number": 0, "class": 3 }]
            },
            "reports": [
                { "data": "0180808080080000" },
                { "delay_ms": 1, "data": "0180808080180000" }
            ]
        }]
    }"#;

    #[test]
    fn test_capture_plugs_devices() -> Result<(), Box<dyn std::error::Error>> {
        let session = ReplayCapture::from_json(CAPTURE)?.into_session()?;
        assert_eq!(session.device_count(), 1);
        let devices = session.host().list_devices()?;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].vid_pid(), "0079-0006");
        assert!(devices[0].has_hid_interface());
        Ok(())
    }

    #[test]
    fn test_bad_hex_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let mut capture = ReplayCapture::from_json(CAPTURE)?;
        capture.devices[0].reports[1].data = "01zz".to_string();
        let Err(e) = capture.into_session() else {
            return Err("bad report accepted".into());
        };
        assert!(matches!(e, ReplayError::Report { report: 1, .. }));
        assert!(e.to_string().starts_with("Invalid report 1 of 0079-0006"));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = ReplayCapture::load("/nonexistent/padbridge-capture.json");
        assert!(matches!(result, Err(ReplayError::Io { .. })));
    }

    #[tokio::test]
    async fn test_feed_delivers_every_report() -> Result<(), Box<dyn std::error::Error>> {
        let session = ReplayCapture::from_json(CAPTURE)?.into_session()?;
        let (shutdown, _rx) = broadcast::channel(1);
        let mut sent = 0;
        for task in session.spawn(&shutdown) {
            sent += task.await?;
        }
        assert_eq!(sent, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_repeating_feed_stops_on_shutdown() -> Result<(), Box<dyn std::error::Error>> {
        let mut capture = ReplayCapture::from_json(CAPTURE)?;
        capture.devices[0].repeat = true;
        let session = capture.into_session()?;
        let (shutdown, _rx) = broadcast::channel(1);
        let tasks = session.spawn(&shutdown);

        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.send(())?;
        for task in tasks {
            assert!(task.await? >= 2);
        }
        Ok(())
    }
}
