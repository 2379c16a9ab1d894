//! Periodic tracking loop
//!
//! One `tick()` keeps the link up, ingests the local GPS fix, exchanges
//! location messages with the peer, and refreshes the distance and
//! direction rows of the display.

use crate::algorithms::{bearing, compass_sector, distance, CompassSector};
use crate::connection::{ConnectionLifecycle, LinkStatus};
use crate::core::{
    Coordinate, Role, TrackerError, TrackerResult, LINE_TERMINATOR, READ_BUFFER_CAPACITY,
};
use crate::hardware::{Clock, GpsSource, StatusIndicator, TextDisplay, Transport, TransportError};
use crate::processing::codec;
use crate::tracking::display::{DisplayState, StatusDisplay};
use crate::utils::config::TrackerConfig;
use log::{debug, info, warn};
use std::time::Duration;

/// Why distance and direction were not computed this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NoLocalFix,
    NoPeerLocation,
    /// Both positions known but the bearing had no compass sector
    DirectionUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Distance and direction computed from both positions
    Located {
        distance_yards: f64,
        bearing_deg: f64,
        sector: CompassSector,
        distance_pushed: bool,
        bearing_pushed: bool,
    },
    NotReady(Readiness),
}

/// What one tick did
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub link: LinkStatus,
    pub outcome: TickOutcome,
    /// Recoverable errors raised during the tick
    pub diagnostics: Vec<TrackerError>,
}

impl TickReport {
    pub fn is_located(&self) -> bool {
        matches!(self.outcome, TickOutcome::Located { .. })
    }
}

pub struct TrackingLoop<T, G, D, I, C> {
    lifecycle: ConnectionLifecycle<T, I, C>,
    gps: G,
    display: StatusDisplay<D>,
    local: Option<Coordinate>,
    peer: Option<Coordinate>,
    local_fix_seen: bool,
    read_buffer: [u8; READ_BUFFER_CAPACITY],
    tick_interval: Duration,
}

impl<T, G, D, I, C> TrackingLoop<T, G, D, I, C>
where
    T: Transport,
    G: GpsSource,
    D: TextDisplay,
    I: StatusIndicator,
    C: Clock,
{
    pub fn new(
        config: &TrackerConfig,
        transport: T,
        gps: G,
        display: D,
        indicator: I,
        clock: C,
    ) -> Self {
        Self {
            lifecycle: ConnectionLifecycle::new(config, transport, indicator, clock),
            gps,
            display: StatusDisplay::new(display, config.display.columns),
            local: None,
            peer: None,
            local_fix_seen: false,
            read_buffer: [0; READ_BUFFER_CAPACITY],
            tick_interval: Duration::from_millis(config.tick_interval_ms),
        }
    }

    /// Bring the link up. `TrackerError::FatalInit` requires a restart.
    pub fn initialize(&mut self) -> TrackerResult<()> {
        self.lifecycle.initialize()
    }

    pub fn tick(&mut self) -> TickReport {
        let mut diagnostics = Vec::new();

        let link = self.lifecycle.maintain();
        match link {
            LinkStatus::Disconnected => diagnostics.push(self.link_failure().into()),
            LinkStatus::GaveUp { attempts } => {
                diagnostics.push(TransportError::RetriesExhausted { attempts }.into())
            }
            _ => {}
        }

        self.poll_gps(&mut diagnostics);

        match self.lifecycle.role() {
            Role::Initiator => self.send_location(&mut diagnostics),
            Role::Acceptor => self.receive_location(&mut diagnostics),
        }

        let outcome = match self.ready_pair() {
            Ok((local, peer)) => self.locate(&local, &peer, &mut diagnostics),
            Err(reason) => {
                self.report_not_ready(reason);
                TickOutcome::NotReady(reason)
            }
        };

        TickReport {
            link,
            outcome,
            diagnostics,
        }
    }

    pub fn role(&self) -> Role {
        self.lifecycle.role()
    }

    pub fn local(&self) -> Option<Coordinate> {
        self.local
    }

    pub fn peer(&self) -> Option<Coordinate> {
        self.peer
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn display_state(&self) -> DisplayState {
        self.display.state()
    }

    pub fn display(&self) -> &D {
        self.display.inner()
    }

    pub fn gps_mut(&mut self) -> &mut G {
        &mut self.gps
    }

    pub fn lifecycle(&self) -> &ConnectionLifecycle<T, I, C> {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut ConnectionLifecycle<T, I, C> {
        &mut self.lifecycle
    }

    fn link_failure(&self) -> TransportError {
        match self.lifecycle.role() {
            Role::Acceptor => TransportError::ListenFailed {
                attempts: self.lifecycle.max_attempts(),
            },
            Role::Initiator => TransportError::ConnectFailed {
                address: self.lifecycle.peer_address(),
            },
        }
    }

    fn poll_gps(&mut self, diagnostics: &mut Vec<TrackerError>) {
        match self.gps.poll_fix() {
            Some(fix) if fix.valid => {
                if !self.local_fix_seen {
                    info!("First valid GPS fix at {}", fix.coordinate);
                }
                self.local = Some(fix.coordinate);
                self.local_fix_seen = true;
            }
            Some(fix) => debug!("Ignoring invalid GPS fix at {}", fix.coordinate),
            None => {}
        }
        if !self.local_fix_seen {
            diagnostics.push(TrackerError::SensorUnavailable);
        }
    }

    fn send_location(&mut self, diagnostics: &mut Vec<TrackerError>) {
        if !self.lifecycle.is_connected() {
            return;
        }
        let Some(local) = self.local else {
            debug!("No local position to send yet");
            return;
        };

        let mut message = codec::encode(&local);
        message.push(LINE_TERMINATOR as char);
        match self.lifecycle.transport_mut().write(message.as_bytes()) {
            Ok(()) => debug!("Sent {}", message.trim_end()),
            Err(e) => {
                warn!("Failed to send location: {}", e);
                diagnostics.push(e.into());
            }
        }
    }

    fn receive_location(&mut self, diagnostics: &mut Vec<TrackerError>) {
        if !self.lifecycle.is_connected() {
            return;
        }
        let transport = self.lifecycle.transport_mut();
        let pending = transport.available();
        if pending == 0 {
            return;
        }

        // One byte of the buffer is reserved, as for a C string terminator
        let capacity = READ_BUFFER_CAPACITY - 1;
        if pending > capacity {
            warn!(
                "Receive buffer overflow ({} bytes pending), discarding input",
                pending
            );
            transport.flush_input();
            diagnostics.push(TransportError::BufferOverflow { pending, capacity }.into());
            return;
        }

        let length = transport.read_line_until(LINE_TERMINATOR, &mut self.read_buffer[..capacity]);
        let text = String::from_utf8_lossy(&self.read_buffer[..length]);
        let text = text.trim_end_matches('\r');
        debug!("Received: {}", text);

        match codec::decode(text) {
            Ok(peer) => self.peer = Some(peer),
            Err(e) => {
                warn!("Discarding location message: {}", e);
                diagnostics.push(e.into());
            }
        }
    }

    fn ready_pair(&self) -> Result<(Coordinate, Coordinate), Readiness> {
        let local = match self.local {
            Some(local) if self.local_fix_seen => local,
            _ => return Err(Readiness::NoLocalFix),
        };
        let peer = self.peer.ok_or(Readiness::NoPeerLocation)?;
        Ok((local, peer))
    }

    fn report_not_ready(&self, reason: Readiness) {
        let message = match reason {
            Readiness::NoLocalFix => "waiting for a valid local GPS fix",
            Readiness::NoPeerLocation => "waiting for the peer location",
            Readiness::DirectionUnavailable => "direction could not be resolved",
        };
        // The master never receives a peer location; that is its normal state
        match self.lifecycle.role() {
            Role::Acceptor => warn!("Invalid GPS data: {}", message),
            Role::Initiator => debug!("Not locating: {}", message),
        }
    }

    fn locate(
        &mut self,
        local: &Coordinate,
        peer: &Coordinate,
        diagnostics: &mut Vec<TrackerError>,
    ) -> TickOutcome {
        let distance_yards = distance(local, peer);
        let bearing_deg = bearing(local, peer);
        self.present(distance_yards, bearing_deg, diagnostics)
    }

    fn present(
        &mut self,
        distance_yards: f64,
        bearing_deg: f64,
        diagnostics: &mut Vec<TrackerError>,
    ) -> TickOutcome {
        let sector = match compass_sector(bearing_deg) {
            Ok(sector) => sector,
            Err(e) => {
                warn!("{}", e);
                diagnostics.push(e.into());
                return TickOutcome::NotReady(Readiness::DirectionUnavailable);
            }
        };

        let distance_pushed = self.display.show_distance(distance_yards);
        let bearing_pushed = self.display.show_bearing(bearing_deg, sector);
        if distance_pushed || bearing_pushed {
            info!(
                "Peer {:.2} yards away, bearing {:.1} ({})",
                distance_yards, bearing_deg, sector
            );
        }

        TickOutcome::Located {
            distance_yards,
            bearing_deg,
            sector,
            distance_pushed,
            bearing_pushed,
        }
    }
}
