//! Mock collaborators for testing and simulation

use crate::core::{Coordinate, Fix, PeerAddress, LINE_TERMINATOR};
use crate::hardware::{
    GpsSource, LinkCallback, LinkEvent, StatusIndicator, TextDisplay, Transport, TransportError,
    TransportResult,
};
use std::collections::VecDeque;

/// Scripted transport.
///
/// Each operation that can fail pops its next outcome from a script and
/// falls back to a default once the script runs dry. A successful
/// `connect` raises `LinkEvent::Opened` through the registered callback,
/// like the real radio stack does.
pub struct MockTransport {
    callback: Option<LinkCallback>,
    begin_script: VecDeque<bool>,
    connect_script: VecDeque<bool>,
    listen_script: VecDeque<bool>,
    default_outcome: bool,
    inbound: VecDeque<u8>,
    sent: Vec<u8>,
    client_attached: bool,
    fail_writes: bool,
    begin_calls: u32,
    connect_calls: u32,
    listen_calls: u32,
    flush_calls: u32,
    last_device_name: Option<String>,
    last_address: Option<PeerAddress>,
}

impl MockTransport {
    /// Create a transport whose operations all succeed
    pub fn new() -> Self {
        Self {
            callback: None,
            begin_script: VecDeque::new(),
            connect_script: VecDeque::new(),
            listen_script: VecDeque::new(),
            default_outcome: true,
            inbound: VecDeque::new(),
            sent: Vec::new(),
            client_attached: false,
            fail_writes: false,
            begin_calls: 0,
            connect_calls: 0,
            listen_calls: 0,
            flush_calls: 0,
            last_device_name: None,
            last_address: None,
        }
    }

    /// Create a transport whose operations all fail unless scripted
    pub fn failing() -> Self {
        Self {
            default_outcome: false,
            ..Self::new()
        }
    }

    pub fn script_begin(&mut self, outcomes: &[bool]) {
        self.begin_script.extend(outcomes);
    }

    pub fn script_connect(&mut self, outcomes: &[bool]) {
        self.connect_script.extend(outcomes);
    }

    pub fn script_listen(&mut self, outcomes: &[bool]) {
        self.listen_script.extend(outcomes);
    }

    pub fn set_default_outcome(&mut self, outcome: bool) {
        self.default_outcome = outcome;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Queue bytes as if they arrived from the peer
    pub fn push_inbound(&mut self, data: &[u8]) {
        self.inbound.extend(data);
    }

    /// Queue one framed line from the peer
    pub fn push_line(&mut self, line: &str) {
        self.push_inbound(line.as_bytes());
        self.inbound.push_back(LINE_TERMINATOR);
    }

    /// Peer attaches: raises `Opened`
    pub fn attach_client(&mut self) {
        self.client_attached = true;
        self.raise(LinkEvent::Opened);
    }

    /// Peer goes away: raises `Closed`
    pub fn drop_client(&mut self) {
        self.client_attached = false;
        self.raise(LinkEvent::Closed);
    }

    /// Deliver an arbitrary event through the registered callback
    pub fn raise(&self, event: LinkEvent) {
        if let Some(callback) = &self.callback {
            callback.notify(event);
        }
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Everything written so far
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// Take and clear everything written so far
    pub fn take_sent(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.sent)
    }

    pub fn sent_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.sent)
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn begin_calls(&self) -> u32 {
        self.begin_calls
    }

    pub fn connect_calls(&self) -> u32 {
        self.connect_calls
    }

    pub fn listen_calls(&self) -> u32 {
        self.listen_calls
    }

    pub fn flush_calls(&self) -> u32 {
        self.flush_calls
    }

    pub fn last_device_name(&self) -> Option<&str> {
        self.last_device_name.as_deref()
    }

    pub fn last_address(&self) -> Option<PeerAddress> {
        self.last_address
    }

    fn next(script: &mut VecDeque<bool>, default: bool) -> bool {
        script.pop_front().unwrap_or(default)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn begin(&mut self, device_name: &str) -> bool {
        self.begin_calls += 1;
        self.last_device_name = Some(device_name.to_string());
        Self::next(&mut self.begin_script, self.default_outcome)
    }

    fn register_callback(&mut self, callback: LinkCallback) {
        self.callback = Some(callback);
    }

    fn connect(&mut self, address: &PeerAddress) -> bool {
        self.connect_calls += 1;
        self.last_address = Some(*address);
        let ok = Self::next(&mut self.connect_script, self.default_outcome);
        if ok {
            self.client_attached = true;
            self.raise(LinkEvent::Opened);
        }
        ok
    }

    fn listen(&mut self) -> bool {
        self.listen_calls += 1;
        Self::next(&mut self.listen_script, self.default_outcome)
    }

    fn has_client(&self) -> bool {
        self.client_attached
    }

    fn available(&self) -> usize {
        self.inbound.len()
    }

    fn read_line_until(&mut self, terminator: u8, buffer: &mut [u8]) -> usize {
        let mut stored = 0;
        while stored < buffer.len() {
            match self.inbound.pop_front() {
                Some(byte) if byte == terminator => break,
                Some(byte) => {
                    buffer[stored] = byte;
                    stored += 1;
                }
                None => break,
            }
        }
        stored
    }

    fn write(&mut self, data: &[u8]) -> TransportResult<()> {
        if self.fail_writes {
            return Err(TransportError::WriteFailed {
                details: "simulated write failure".to_string(),
            });
        }
        if !self.client_attached {
            return Err(TransportError::NotConnected);
        }
        self.sent.extend_from_slice(data);
        Ok(())
    }

    fn flush_input(&mut self) {
        self.flush_calls += 1;
        self.inbound.clear();
    }
}

/// Scripted GPS receiver
#[derive(Debug, Default)]
pub struct MockGps {
    script: VecDeque<Option<Fix>>,
    repeat: Option<Fix>,
    polls: u32,
}

impl MockGps {
    /// Receiver that never produces data
    pub fn silent() -> Self {
        Self::default()
    }

    /// Receiver reporting the same valid fix on every poll
    pub fn fixed(coordinate: Coordinate) -> Self {
        Self {
            repeat: Some(Fix::valid(coordinate)),
            ..Self::default()
        }
    }

    /// Queue the result of one future poll (`None` = no update)
    pub fn push(&mut self, fix: Option<Fix>) {
        self.script.push_back(fix);
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }
}

impl GpsSource for MockGps {
    fn poll_fix(&mut self) -> Option<Fix> {
        self.polls += 1;
        match self.script.pop_front() {
            Some(scripted) => scripted,
            None => self.repeat,
        }
    }
}

/// Display that records every write
#[derive(Debug, Default)]
pub struct MockDisplay {
    cursor: (u8, u8),
    writes: Vec<(u8, u8, String)>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(col, row, text)` for every `print` call, oldest first
    pub fn writes(&self) -> &[(u8, u8, String)] {
        &self.writes
    }

    pub fn writes_to_row(&self, row: u8) -> Vec<&str> {
        self.writes
            .iter()
            .filter(|(_, r, _)| *r == row)
            .map(|(_, _, text)| text.as_str())
            .collect()
    }

    pub fn last_on_row(&self, row: u8) -> Option<&str> {
        self.writes_to_row(row).last().copied()
    }
}

impl TextDisplay for MockDisplay {
    fn set_cursor(&mut self, col: u8, row: u8) {
        self.cursor = (col, row);
    }

    fn print(&mut self, text: &str) {
        self.writes.push((self.cursor.0, self.cursor.1, text.to_string()));
    }
}

/// Indicator that records its transitions
#[derive(Debug, Default)]
pub struct MockIndicator {
    on: bool,
    changes: u32,
}

impl MockIndicator {
    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn changes(&self) -> u32 {
        self.changes
    }
}

impl StatusIndicator for MockIndicator {
    fn set(&mut self, on: bool) {
        if on != self.on {
            self.changes += 1;
        }
        self.on = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_outcomes_then_default() {
        let mut transport = MockTransport::failing();
        transport.script_listen(&[false, true]);
        assert!(!transport.listen());
        assert!(transport.listen());
        assert!(!transport.listen());
        assert_eq!(transport.listen_calls(), 3);
    }

    #[test]
    fn test_successful_connect_raises_opened() {
        let (callback, rx) = LinkCallback::channel();
        let mut transport = MockTransport::new();
        transport.register_callback(callback);

        let address = PeerAddress::new([1, 2, 3, 4, 5, 6]);
        assert!(transport.connect(&address));
        assert_eq!(rx.try_recv(), Ok(LinkEvent::Opened));
        assert_eq!(transport.last_address(), Some(address));
        assert!(transport.has_client());
    }

    #[test]
    fn test_read_line_until_terminator() {
        let mut transport = MockTransport::new();
        transport.push_line("first");
        transport.push_line("second");

        let mut buffer = [0u8; 16];
        let n = transport.read_line_until(b'\n', &mut buffer);
        assert_eq!(&buffer[..n], b"first");
        assert_eq!(transport.available(), 7);

        // Buffer limit stops the read early
        let mut small = [0u8; 3];
        let n = transport.read_line_until(b'\n', &mut small);
        assert_eq!(&small[..n], b"sec");
    }

    #[test]
    fn test_write_failure() {
        let mut transport = MockTransport::new();
        transport.set_fail_writes(true);
        assert!(matches!(
            transport.write(b"x"),
            Err(TransportError::WriteFailed { .. })
        ));
        assert!(transport.sent().is_empty());

        transport.set_fail_writes(false);
        assert_eq!(transport.write(b"x"), Err(TransportError::NotConnected));
        transport.attach_client();
        assert!(transport.write(b"x").is_ok());
        assert_eq!(transport.sent(), b"x");
    }

    #[test]
    fn test_mock_gps_script_then_repeat() {
        let here = Coordinate::new(1.0, 2.0).unwrap();
        let mut gps = MockGps::fixed(here);
        gps.push(None);
        assert_eq!(gps.poll_fix(), None);
        assert_eq!(gps.poll_fix(), Some(Fix::valid(here)));
        assert_eq!(gps.polls(), 2);
    }
}
