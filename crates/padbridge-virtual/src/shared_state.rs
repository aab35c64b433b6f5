//! Shared-state backend.
//!
//! Instead of registering devices, virtual pads are written straight into the
//! input state every consuming process reads. Each process gets a replica of
//! the platform's authoritative region; slots claimed by a virtual pad are
//! fed by [`SharedStateBackend`], every other slot is mirrored from the
//! authoritative region by a replication thread every
//! [`REPLICATION_PERIOD`].
//!
//! All region access goes through one process-wide re-entrant lock shared
//! with the replication thread. Callers may hold it across several region
//! calls; the inner calls lock again on the same thread.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use padbridge_controller_types::{ControllerConfig, DeviceType};
use padbridge_errors::BackendError;
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use tracing::{debug, error, info, warn};

use crate::backend::{BackendResult, MAX_INPUTS, VirtualBackend, check_index};
use crate::npad::{NpadButtons, StickState};

/// Samples kept per pad, matching the platform's LIFO depth.
pub const RING_CAPACITY: usize = 17;

/// Pad slots in one region.
pub const NPAD_SLOTS: usize = 10;

pub const REPLICATION_PERIOD: Duration = Duration::from_millis(10);

/// Identifies a consuming process.
pub type ProcessId = u64;

type OwnerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NpadSample {
    /// Monotonic per-ring counter, assigned on push.
    pub sampling_number: u64,
    pub buttons: NpadButtons,
    pub stick_l: StickState,
    pub stick_r: StickState,
    pub connected: bool,
}

/// Fixed-depth sample history. Pushing onto a full ring drops the oldest
/// sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRing {
    samples: [NpadSample; RING_CAPACITY],
    head: usize,
    tail: usize,
    count: usize,
    next_sampling: u64,
}

impl Default for SampleRing {
    fn default() -> Self {
        Self {
            samples: [NpadSample::default(); RING_CAPACITY],
            head: 0,
            tail: 0,
            count: 0,
            next_sampling: 0,
        }
    }
}

impl SampleRing {
    pub fn push(&mut self, mut sample: NpadSample) {
        sample.sampling_number = self.next_sampling;
        self.next_sampling = self.next_sampling.wrapping_add(1);

        self.samples[self.tail] = sample;
        self.tail = (self.tail + 1) % RING_CAPACITY;
        if self.count == RING_CAPACITY {
            self.head = (self.head + 1) % RING_CAPACITY;
        } else {
            self.count += 1;
        }
    }

    pub fn latest(&self) -> Option<&NpadSample> {
        if self.count == 0 {
            return None;
        }
        self.samples.get((self.tail + RING_CAPACITY - 1) % RING_CAPACITY)
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &NpadSample> + '_ {
        (0..self.count).filter_map(move |i| self.samples.get((self.head + i) % RING_CAPACITY))
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Index of the oldest sample.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Index the next sample is written to.
    pub fn tail(&self) -> usize {
        self.tail
    }
}

/// One pad slot. `device_type` is `None` while nothing occupies it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NpadEntry {
    pub device_type: Option<DeviceType>,
    pub ring: SampleRing,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NpadRegion {
    pub entries: [NpadEntry; NPAD_SLOTS],
}

/// Supplies the platform's own view of the input region.
pub trait RegionSource: Send + Sync {
    fn read_authoritative(&self, region: &mut NpadRegion);
}

#[derive(Debug, Default)]
struct RegionState {
    /// Authoritative slots plus the state of claimed slots.
    local: NpadRegion,
    owners: [Option<OwnerId>; NPAD_SLOTS],
    replicas: HashMap<ProcessId, NpadRegion>,
    scratch: NpadRegion,
}

/// Guard returned by [`SharedStateRegion::lock`].
pub struct RegionLock<'a> {
    _guard: ReentrantMutexGuard<'a, RefCell<RegionState>>,
}

/// Process-wide input region with its per-process replicas.
pub struct SharedStateRegion {
    state: ReentrantMutex<RefCell<RegionState>>,
    source: Arc<dyn RegionSource>,
    next_owner: AtomicU64,
}

impl SharedStateRegion {
    pub fn new(source: Arc<dyn RegionSource>) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(RegionState::default())),
            source,
            next_owner: AtomicU64::new(1),
        }
    }

    /// Holds the region lock across several calls. Calls made while holding
    /// the guard lock again on the same thread without blocking.
    pub fn lock(&self) -> RegionLock<'_> {
        RegionLock {
            _guard: self.state.lock(),
        }
    }

    pub fn add_process(&self, pid: ProcessId) {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        let replica = state.local.clone();
        if state.replicas.insert(pid, replica).is_some() {
            debug!(pid, "replica reset");
        } else {
            info!(pid, "replica added");
        }
    }

    pub fn remove_process(&self, pid: ProcessId) -> bool {
        let guard = self.state.lock();
        let removed = guard.borrow_mut().replicas.remove(&pid).is_some();
        if removed {
            info!(pid, "replica removed");
        }
        removed
    }

    pub fn process_count(&self) -> usize {
        self.state.lock().borrow().replicas.len()
    }

    /// Copy of one process's replica.
    pub fn replica(&self, pid: ProcessId) -> Option<NpadRegion> {
        self.state.lock().borrow().replicas.get(&pid).cloned()
    }

    /// Mirrors every unclaimed slot of the authoritative region into the
    /// replicas.
    pub fn replicate(&self) {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        let RegionState {
            local,
            owners,
            replicas,
            scratch,
        } = &mut *state;

        self.source.read_authoritative(scratch);
        for ((slot, fresh), owner) in local.entries.iter_mut().zip(&scratch.entries).zip(owners.iter()) {
            if owner.is_none() {
                slot.clone_from(fresh);
            }
        }
        for replica in replicas.values_mut() {
            for ((slot, source), owner) in replica.entries.iter_mut().zip(&local.entries).zip(owners.iter()) {
                if owner.is_none() {
                    slot.clone_from(source);
                }
            }
        }
    }

    fn new_owner(&self) -> OwnerId {
        self.next_owner.fetch_add(1, Ordering::Relaxed)
    }

    /// Claims the first slot that is neither claimed nor occupied by a
    /// physical pad.
    fn claim(&self, owner: OwnerId, device_type: DeviceType) -> Option<usize> {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        let slot = state
            .owners
            .iter()
            .zip(&state.local.entries)
            .position(|(owner, entry)| owner.is_none() && entry.device_type.is_none())?;
        state.owners[slot] = Some(owner);

        let entry = NpadEntry {
            device_type: Some(device_type),
            ring: SampleRing::default(),
        };
        for replica in state.replicas.values_mut() {
            replica.entries[slot] = entry.clone();
        }
        state.local.entries[slot] = entry;
        Some(slot)
    }

    /// Frees `slot` if `owner` holds it; the slot reads as empty until the
    /// next replication pass.
    fn release(&self, owner: OwnerId, slot: usize) {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        if state.owners.get(slot).copied().flatten() != Some(owner) {
            return;
        }
        state.owners[slot] = None;
        for replica in state.replicas.values_mut() {
            replica.entries[slot] = NpadEntry::default();
        }
        state.local.entries[slot] = NpadEntry::default();
    }

    /// Appends `sample` to the slot's ring in every replica. Returns `false`
    /// when `owner` no longer holds the slot.
    fn push(&self, owner: OwnerId, slot: usize, sample: NpadSample) -> bool {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        if state.owners.get(slot).copied().flatten() != Some(owner) {
            return false;
        }
        state.local.entries[slot].ring.push(sample);
        for replica in state.replicas.values_mut() {
            replica.entries[slot].ring.push(sample);
        }
        true
    }

    /// Releases every claimed slot, as when the platform's input service
    /// restarts.
    pub fn reset_claims(&self) {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        let RegionState {
            local,
            owners,
            replicas,
            ..
        } = &mut *state;
        for (slot, owner) in owners.iter_mut().enumerate() {
            if owner.take().is_some() {
                local.entries[slot] = NpadEntry::default();
                for replica in replicas.values_mut() {
                    replica.entries[slot] = NpadEntry::default();
                }
            }
        }
        info!("shared input claims reset");
    }
}

/// Publishes one controller's logical inputs into claimed region slots.
pub struct SharedStateBackend {
    region: Arc<SharedStateRegion>,
    owner: OwnerId,
    device_type: DeviceType,
    slots: [Option<usize>; MAX_INPUTS as usize],
}

impl SharedStateBackend {
    pub fn new(region: Arc<SharedStateRegion>, config: &ControllerConfig) -> Self {
        let owner = region.new_owner();
        Self {
            region,
            owner,
            device_type: config.controller_type.device_type(),
            slots: [None; MAX_INPUTS as usize],
        }
    }

    /// Region slot backing logical input `index`.
    pub fn slot(&self, index: u16) -> Option<usize> {
        self.slots.get(usize::from(index)).copied().flatten()
    }
}

impl VirtualBackend for SharedStateBackend {
    fn attach_controller(&mut self, index: u16) -> BackendResult<()> {
        let logical = check_index(index)?;
        if self.slots[logical].is_some() {
            return Ok(());
        }
        let slot = self
            .region
            .claim(self.owner, self.device_type)
            .ok_or(BackendError::NoFreeSlot { index })?;
        self.slots[logical] = Some(slot);
        info!(index, slot, device_type = ?self.device_type, "shared input slot claimed");
        Ok(())
    }

    fn detach_controller(&mut self, index: u16) -> BackendResult<()> {
        let logical = check_index(index)?;
        if let Some(slot) = self.slots[logical].take() {
            self.region.release(self.owner, slot);
            info!(index, slot, "shared input slot released");
        }
        Ok(())
    }

    fn update_controller_state(
        &mut self,
        buttons: NpadButtons,
        stick_l: StickState,
        stick_r: StickState,
        index: u16,
    ) -> BackendResult<()> {
        let logical = check_index(index)?;
        let slot = self.slots[logical].ok_or(BackendError::NotAttached { index })?;
        let _region = self.region.lock();
        let sample = NpadSample {
            sampling_number: 0,
            buttons,
            stick_l,
            stick_r,
            connected: true,
        };
        if self.region.push(self.owner, slot, sample) {
            Ok(())
        } else {
            self.slots[logical] = None;
            Err(BackendError::DeviceRemoved { index })
        }
    }

    fn is_controller_attached(&self, index: u16) -> bool {
        self.slot(index).is_some()
    }
}

struct Replication {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

/// Owns the region and its replication thread.
pub struct SharedStateManager {
    region: Arc<SharedStateRegion>,
    replication: Mutex<Option<Replication>>,
}

impl SharedStateManager {
    pub fn new(source: Arc<dyn RegionSource>) -> Self {
        Self {
            region: Arc::new(SharedStateRegion::new(source)),
            replication: Mutex::new(None),
        }
    }

    pub fn region(&self) -> &Arc<SharedStateRegion> {
        &self.region
    }

    pub fn backend(&self, config: &ControllerConfig) -> SharedStateBackend {
        SharedStateBackend::new(Arc::clone(&self.region), config)
    }

    pub fn add_process(&self, pid: ProcessId) {
        self.region.add_process(pid);
    }

    pub fn remove_process(&self, pid: ProcessId) -> bool {
        self.region.remove_process(pid)
    }

    pub fn is_running(&self) -> bool {
        self.replication.lock().is_some()
    }

    /// Starts the replication thread. Starting twice is a no-op.
    pub fn start(&self) -> io::Result<()> {
        let mut replication = self.replication.lock();
        if replication.is_some() {
            warn!("replication already running");
            return Ok(());
        }

        let (stop, stop_rx) = channel::bounded(0);
        let region = Arc::clone(&self.region);
        let thread = thread::Builder::new()
            .name("padbridge-replication".to_string())
            .spawn(move || replication_main(&region, &stop_rx))?;
        *replication = Some(Replication { stop, thread });
        info!(period_ms = REPLICATION_PERIOD.as_millis(), "replication started");
        Ok(())
    }

    /// Stops and joins the replication thread. Stopping twice is a no-op.
    pub fn stop(&self) {
        let Some(Replication { stop, thread }) = self.replication.lock().take() else {
            return;
        };
        drop(stop);
        match thread.join() {
            Ok(()) => info!("replication stopped cleanly"),
            Err(_) => error!("replication thread panicked"),
        }
    }
}

impl Drop for SharedStateManager {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("shared-state manager dropped while replicating - forcing stop");
            self.stop();
        }
    }
}

fn replication_main(region: &SharedStateRegion, stop: &Receiver<()>) {
    loop {
        let started = Instant::now();
        region.replicate();
        let remaining = REPLICATION_PERIOD.saturating_sub(started.elapsed());
        match stop.recv_timeout(remaining) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
