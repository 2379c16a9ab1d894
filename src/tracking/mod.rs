//! The periodic tracking loop and its display policy

pub mod tracker;
pub mod display;

pub use tracker::{Readiness, TickOutcome, TickReport, TrackingLoop};
pub use display::{DisplayState, StatusDisplay};
