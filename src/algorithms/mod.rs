//! Positioning algorithms

pub mod geodesy;

pub use geodesy::{bearing, compass_sector, distance, CompassSector, GeodesyError};
