//! Status codes returned by the layout façade operations.
//!
//! Mirrors the subset of the NFSv4.1 pNFS status set the core can produce.
//! Three error kinds exist at the design level -- transient, protocol, and
//! consumer-cancelled -- but callers only ever see one flat [`Status`]; the
//! kind determines whether a failing path mutates state (none of them do).

use std::{error, fmt};

/// Result alias used throughout the façade.
pub type Result<T> = std::result::Result<T, Status>;

/// Subset of nfsstat4 codes this core can return.
///
/// `Ok` is included so callers can match the full NFS4 status space, even
/// though success is usually represented as `Result::Ok(..)` in Rust; the
/// six control operations (`§6.2`) report it explicitly for parity with the
/// wire protocol they front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Operation completed normally.
    Ok,
    /// Allocation failure; the caller should retry the request later.
    LayoutTryLater,
    /// A conflicting recall was just queued or was already pending.
    RecallConflict,
    /// The caller's buffer was too small to hold the encoded response.
    TooSmall,
    /// No layout matched the request.
    NoMatchingLayout,
    /// The layout handle or recall cookie referenced is unknown or stale.
    BadLayout,
    /// The requested device does not exist.
    NoEnt,
    /// A blocking wait in `ReceiveRecalls` was interrupted before any event
    /// arrived; the caller should retry.
    Interrupted,
    /// Reserved for wire-protocol parity with the status space `ReceiveRecalls`
    /// fronts. `CancelRecalls` (`I5`) is level-triggered and one-shot, not a
    /// permanent shutdown, so this core never constructs this variant itself:
    /// a cancellation just makes the next `ReceiveRecalls` return `Ok(vec![])`
    /// instead of blocking.
    Canceled,
    /// Anything else: decode errors, unknown commands, internal invariant
    /// slips. The design's "all others -> ServerFault" catch-all.
    ServerFault,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Status::Ok => "ok",
            Status::LayoutTryLater => "layout try later",
            Status::RecallConflict => "recall conflict",
            Status::TooSmall => "buffer too small",
            Status::NoMatchingLayout => "no matching layout",
            Status::BadLayout => "bad layout",
            Status::NoEnt => "no such device",
            Status::Interrupted => "interrupted",
            Status::Canceled => "canceled",
            Status::ServerFault => "server fault",
        };
        f.write_str(msg)
    }
}

impl error::Error for Status {}
