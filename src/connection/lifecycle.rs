//! Link lifecycle for both ends of the pairing
//!
//! ```text
//! Disconnected --(attempt)--> Connecting --(success / Opened)--> Connected
//!      ^                                                            |
//!      +--------------------------(Closed)--------------------------+
//! ```
//!
//! The acceptor (client) retries in bounded bursts on every check tick,
//! forever. The initiator (master) makes one attempt per retry interval and
//! gives up after a fixed number of consecutive failures.

use crate::connection::retry::{RetryBudget, RetryMode, RetryOutcome};
use crate::core::{PeerAddress, Role, TrackerError, TrackerResult};
use crate::hardware::{Clock, LinkCallback, LinkEvent, StatusIndicator, Transport};
use crate::utils::config::TrackerConfig;
use log::{debug, error, info, warn};
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Connection state, written only by `ConnectionLifecycle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// Result of one maintenance pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Link is up
    Connected,
    /// A reconnection attempt succeeded during this pass
    Reconnected,
    /// Still down; retry pacing says not yet
    Waiting,
    /// Still down after this pass's attempt(s)
    Disconnected,
    /// Initiator stopped retrying; needs `reset`
    GaveUp { attempts: u32 },
}

impl LinkStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, LinkStatus::Connected | LinkStatus::Reconnected)
    }
}

pub struct ConnectionLifecycle<T, I, C> {
    role: Role,
    transport: T,
    indicator: I,
    clock: C,
    state: LinkState,
    callback: LinkCallback,
    events: Receiver<LinkEvent>,
    device_name: String,
    peer_address: PeerAddress,
    startup: RetryBudget,
    reconnect: RetryBudget,
    check_interval: Duration,
    last_check_at: Option<u64>,
    gave_up_reported: bool,
}

impl<T, I, C> ConnectionLifecycle<T, I, C>
where
    T: Transport,
    I: StatusIndicator,
    C: Clock,
{
    pub fn new(config: &TrackerConfig, transport: T, indicator: I, clock: C) -> Self {
        let (callback, events) = LinkCallback::channel();
        let reconnect = match config.role {
            Role::Acceptor => RetryBudget::new(config.acceptor_burst, RetryMode::PerpetualBursts),
            Role::Initiator => RetryBudget::new(config.initiator_retry, RetryMode::Ceiling),
        };

        Self {
            role: config.role,
            transport,
            indicator,
            clock,
            state: LinkState::Disconnected,
            callback,
            events,
            device_name: config.device_name.clone(),
            peer_address: config.peer_address,
            startup: RetryBudget::new(config.startup_retry, RetryMode::Ceiling),
            reconnect,
            check_interval: Duration::from_millis(config.acceptor_check_interval_ms),
            last_check_at: None,
            gave_up_reported: false,
        }
    }

    /// Bring the transport up and start the role's connection behavior.
    ///
    /// Failing to bring the transport up within the startup budget means
    /// the radio or its driver is broken; that is reported as
    /// `TrackerError::FatalInit` and the caller must restart the process.
    pub fn initialize(&mut self) -> TrackerResult<()> {
        let transport = &mut self.transport;
        let device_name = self.device_name.as_str();
        let max = self.startup.max_attempts();
        let outcome = self.startup.run_burst(&self.clock, |attempt| {
            if transport.begin(device_name) {
                true
            } else {
                warn!("Transport initialization failed. Retry {}/{}", attempt, max);
                false
            }
        });

        if let RetryOutcome::Exhausted { attempts } = outcome {
            error!("Transport initialization failed after {} attempts", attempts);
            return Err(TrackerError::FatalInit { attempts });
        }

        self.transport.register_callback(self.callback.clone());
        self.set_indicator(false);
        info!("Device \"{}\" started as {}", self.device_name, self.role);

        if self.role == Role::Initiator {
            info!("Connecting to peer {}", self.peer_address);
            self.attempt_connect();
        }
        Ok(())
    }

    /// Apply queued transport notifications; returns how many were applied
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Apply pending notifications and, if the link is down, drive the
    /// role's reconnection policy. Never blocks longer than one burst.
    pub fn maintain(&mut self) -> LinkStatus {
        self.poll_events();
        if self.state == LinkState::Connected {
            return LinkStatus::Connected;
        }
        match self.role {
            Role::Acceptor => self.maintain_acceptor(),
            Role::Initiator => self.maintain_initiator(),
        }
    }

    /// Clear the initiator's give-up condition and retry from scratch
    pub fn reset(&mut self) {
        info!("Connection retry budget reset");
        self.reconnect.reset();
        self.last_check_at = None;
        self.gave_up_reported = false;
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn has_given_up(&self) -> bool {
        self.reconnect.has_given_up() && self.state != LinkState::Connected
    }

    pub fn peer_address(&self) -> PeerAddress {
        self.peer_address
    }

    /// Attempt limit of one reconnection burst (acceptor) or of the whole
    /// sequence (initiator)
    pub fn max_attempts(&self) -> u32 {
        self.reconnect.max_attempts()
    }

    /// Consecutive reconnection attempts in the current sequence
    pub fn attempts(&self) -> u32 {
        self.reconnect.attempts()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Data-path access; link state stays owned by the lifecycle
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    fn maintain_acceptor(&mut self) -> LinkStatus {
        let now = self.clock.now_ms();
        if let Some(last) = self.last_check_at {
            if now.saturating_sub(last) < self.check_interval.as_millis() as u64 {
                return LinkStatus::Waiting;
            }
        }

        if self.transport.has_client() {
            debug!("Peer already attached, marking link up");
            self.mark_connected();
            self.last_check_at = Some(self.clock.now_ms());
            return LinkStatus::Reconnected;
        }

        info!("Attempting to reconnect...");
        self.state = LinkState::Connecting;
        let transport = &mut self.transport;
        let max = self.reconnect.max_attempts();
        let outcome = self.reconnect.run_burst(&self.clock, |attempt| {
            if transport.listen() {
                true
            } else {
                warn!("Failed to reconnect (Attempt {}/{})", attempt, max);
                false
            }
        });
        self.last_check_at = Some(self.clock.now_ms());

        match outcome {
            RetryOutcome::Succeeded { attempt } => {
                info!("Link reconnected on attempt {}", attempt);
                self.mark_connected();
                LinkStatus::Reconnected
            }
            RetryOutcome::Exhausted { attempts } => {
                warn!("Reconnect burst failed after {} attempts, waiting for next check", attempts);
                self.mark_disconnected();
                LinkStatus::Disconnected
            }
        }
    }

    fn maintain_initiator(&mut self) -> LinkStatus {
        if self.reconnect.has_given_up() {
            return self.report_give_up();
        }
        if !self.reconnect.is_due(self.clock.now_ms()) {
            return LinkStatus::Waiting;
        }
        if self.attempt_connect() {
            LinkStatus::Reconnected
        } else if self.reconnect.has_given_up() {
            self.report_give_up()
        } else {
            LinkStatus::Disconnected
        }
    }

    fn attempt_connect(&mut self) -> bool {
        let attempt = self.reconnect.record_attempt(self.clock.now_ms());
        info!(
            "Connection attempt {}/{} to {}",
            attempt,
            self.reconnect.max_attempts(),
            self.peer_address
        );
        self.state = LinkState::Connecting;

        if self.transport.connect(&self.peer_address) {
            self.mark_connected();
            true
        } else {
            warn!("Connection to {} failed", self.peer_address);
            self.mark_disconnected();
            false
        }
    }

    fn report_give_up(&mut self) -> LinkStatus {
        let attempts = self.reconnect.attempts();
        if !self.gave_up_reported {
            error!(
                "Max reconnection attempts reached ({}), not retrying until reset",
                attempts
            );
            self.gave_up_reported = true;
        }
        LinkStatus::GaveUp { attempts }
    }

    fn apply_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Opened => {
                info!("Peer connected");
                self.mark_connected();
            }
            LinkEvent::Closed => {
                info!("Peer disconnected");
                self.mark_disconnected();
            }
        }
    }

    fn mark_connected(&mut self) {
        self.state = LinkState::Connected;
        self.reconnect.clear_attempts();
        self.gave_up_reported = false;
        self.set_indicator(true);
    }

    fn mark_disconnected(&mut self) {
        self.state = LinkState::Disconnected;
        self.set_indicator(false);
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator.set(on);
    }
}
