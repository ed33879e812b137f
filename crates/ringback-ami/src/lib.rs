//! # Telephony Manager Boundary for RINGBACK
//!
//! This crate defines the typed boundary between the ringback callback engine
//! and the PBX management interface it is driven by. It contains no transport
//! code: the wire protocol, login handshake, and reconnection logic live in the
//! embedding application. What crosses the boundary is represented here as
//! closed Rust types so the engine can dispatch exhaustively.
//!
//! ## What lives here
//!
//! - [`ManagerEvent`]: one variant per queue event the manager emits
//! - [`QueueSnapshotRecord`]: records of the full queue-status dump sent on
//!   (re)connect
//! - [`DeviceState`]: the nine device states a queue member can report
//! - [`Location`]: the `technology/agent` member interface identifier
//! - [`OriginateRequest`] / [`Originator`]: the outbound origination surface
//! - [`CallSession`]: the call-scripting surface a command drives
//! - [`ManagerLink`]: shared liveness flag for the manager connection

pub mod device;
pub mod events;
pub mod link;
pub mod location;
pub mod originate;
pub mod session;

pub use device::DeviceState;
pub use events::{ManagerEvent, QueueSnapshotRecord};
pub use link::ManagerLink;
pub use location::{InvalidLocation, Location};
pub use originate::{OriginateRequest, Originator};
pub use session::CallSession;
