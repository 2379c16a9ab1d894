//! Peer Locator
//!
//! Two GPS-equipped devices paired over a serial radio link. The master
//! streams its position; the client combines it with its own fix and shows
//! the distance (yards) and compass direction toward the master on a small
//! character display.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod hardware;
pub mod connection;
pub mod tracking;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{Coordinate, Fix, PeerAddress, Role, TrackerError, TrackerResult};
pub use algorithms::{bearing, compass_sector, distance, CompassSector};
pub use processing::{decode, encode, DecodeError};
pub use hardware::{
    Clock, GpsSource, NmeaGps, StatusIndicator, SystemClock, TextDisplay, Transport,
    TransportError, TransportResult,
};
pub use connection::{ConnectionLifecycle, LinkState, LinkStatus, RetryPolicy};
pub use tracking::{TickOutcome, TickReport, TrackingLoop};
pub use utils::{ConfigError, TrackerConfig};
