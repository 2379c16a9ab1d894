//! Hardware abstraction layer
//!
//! Interfaces for the collaborators the tracker drives (transport, GPS
//! receiver, display, indicator, clock) plus mock and log-backed
//! implementations for tests and simulation.

pub mod transport;
pub mod gps;
pub mod display;
pub mod clock;
pub mod mock;
pub mod error;

pub use transport::{Transport, LinkCallback, LinkEvent};
pub use gps::{GpsSource, NmeaGps};
pub use display::{TextDisplay, StatusIndicator, LogDisplay, LogIndicator};
pub use clock::{Clock, SystemClock, ManualClock};
pub use mock::{MockTransport, MockGps, MockDisplay, MockIndicator};
pub use error::{TransportError, TransportResult, RecoveryStrategy};
