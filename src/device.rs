//! Device (object store) lookup for `GetDeviceInfo` (`§4.8`, `§6.2`).
//!
//! Grounded on `_pkc_pnfs_device_info` in
//! `original_source/fs/exofs/export_ioctl.c`, which resolves a
//! `(super_block_id, device_index)` pair to the object-store identity and
//! network address a client needs in order to talk to that device directly.

use std::collections::HashMap;

use crate::error::{Result, Status};
use crate::ids::DeviceId;

/// Everything a client needs to address an object-storage device directly,
/// bypassing the metadata server for I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub system_id: u64,
    pub osd_name: String,
    pub network_address: String,
    /// Whether the device currently accepts new layouts; a device that is
    /// draining or offline still resolves (so existing layouts can be
    /// returned against it) but should not be handed out for new ones.
    pub available: bool,
}

/// Resolves device ids to their connection info. A real deployment backs
/// this with whatever device/cluster-membership service it already runs;
/// the in-memory `DeviceTable` here is the reference implementation used by
/// tests and examples.
pub trait DeviceDirectory: Send + Sync {
    fn lookup(&self, id: DeviceId) -> Result<DeviceInfo>;
}

/// An in-memory `DeviceDirectory` backed by a fixed map, registered once at
/// startup.
#[derive(Debug, Default)]
pub struct DeviceTable {
    devices: HashMap<DeviceId, DeviceInfo>,
}

impl DeviceTable {
    pub fn new() -> Self {
        DeviceTable::default()
    }

    pub fn register(&mut self, id: DeviceId, info: DeviceInfo) {
        self.devices.insert(id, info);
    }
}

impl DeviceDirectory for DeviceTable {
    fn lookup(&self, id: DeviceId) -> Result<DeviceInfo> {
        self.devices.get(&id).cloned().ok_or(Status::NoEnt)
    }
}
