//! Layout lease bookkeeping and recall coordination core for a pNFS
//! object-layout data server.
//!
//! This crate owns the in-memory state a data server needs to answer the
//! six control operations a pNFS client drives against it -- `LayoutGet`,
//! `LayoutCommit`, `LayoutReturn`, `GetDeviceInfo`, `ReceiveRecalls`,
//! `CancelRecalls` -- and nothing else: no wire transport, no object-store
//! I/O, no on-disk persistence. [`ops`] is the entry point; [`file_node`]
//! and [`root`] expose the lower-level primitives `ops` is built from for
//! callers that need finer control.

pub mod arena;
pub mod conflict;
pub mod config;
pub mod device;
pub mod error;
pub mod file_handle;
pub mod file_node;
mod lock_order;
pub mod layout;
pub mod ids;
pub mod ops;
pub mod range;
pub mod recall;
pub mod root;
pub mod striping;
pub mod xdr;

pub use config::DataServerConfig;
pub use error::{Result, Status};
pub use file_handle::FileHandle;
pub use file_node::FileNode;
pub use ids::{Capability, DeviceId, IoMode};
pub use layout::{Layout, LayoutId, Segment};
pub use range::Range;
pub use recall::{RecallEvent, RecallId, RecallOutcome};
pub use root::RootNode;
