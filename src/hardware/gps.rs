//! GPS receiver interface and an NMEA-fed implementation

use crate::core::Fix;
use crate::processing::nmea::{self, SentenceBuffer};
use log::debug;

/// Source of position fixes, polled once per tick
pub trait GpsSource {
    /// Latest fix if one arrived since the previous poll, `None` otherwise.
    /// Must not block waiting for data.
    fn poll_fix(&mut self) -> Option<Fix>;
}

/// GPS receiver decoded from its raw NMEA byte stream.
///
/// Bytes are pushed in as the UART delivers them; the newest position
/// sentence wins.
#[derive(Debug, Default)]
pub struct NmeaGps {
    sentences: SentenceBuffer,
    latest: Option<Fix>,
    updated: bool,
    sentences_parsed: u32,
    sentences_rejected: u32,
}

impl NmeaGps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns true when it completed a position sentence
    pub fn encode(&mut self, byte: u8) -> bool {
        let Some(sentence) = self.sentences.push(byte) else {
            return false;
        };
        match nmea::parse_sentence(&sentence) {
            Ok(fix) => {
                self.latest = Some(fix);
                self.updated = true;
                self.sentences_parsed += 1;
                true
            }
            Err(e) => {
                self.sentences_rejected += 1;
                debug!("Ignoring NMEA sentence '{}': {}", sentence, e);
                false
            }
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.encode(*byte);
        }
    }

    /// Most recent fix regardless of whether it was already polled
    pub fn last_fix(&self) -> Option<Fix> {
        self.latest
    }

    pub fn sentences_parsed(&self) -> u32 {
        self.sentences_parsed
    }

    pub fn sentences_rejected(&self) -> u32 {
        self.sentences_rejected
    }
}

impl GpsSource for NmeaGps {
    fn poll_fix(&mut self) -> Option<Fix> {
        if !self.updated {
            return None;
        }
        self.updated = false;
        self.latest
    }
}
