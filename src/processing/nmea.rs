//! Minimal NMEA 0183 sentence parsing for position fixes
//!
//! Only the sentences that carry a position are understood: `GGA`, `RMC`
//! and `GLL`, from any talker (`GP`, `GN`, `GL`, ...).

use crate::core::{Coordinate, Fix};
use thiserror::Error;

/// Longest sentence accepted, including `$`, checksum and CR/LF.
/// The standard caps sentences at 82 characters.
pub const MAX_SENTENCE_LEN: usize = 96;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NmeaError {
    #[error("sentence is malformed: {details}")]
    InvalidFormat { details: String },
    #[error("checksum mismatch: expected {expected:02X}, computed {computed:02X}")]
    ChecksumMismatch { expected: u8, computed: u8 },
    #[error("unsupported sentence type '{kind}'")]
    Unsupported { kind: String },
    #[error("sentence carries no position")]
    NoPosition,
}

/// XOR of every byte between `$` and `*`
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Parse one complete sentence (`$...*hh`, trailing CR/LF allowed) into a fix
pub fn parse_sentence(sentence: &str) -> Result<Fix, NmeaError> {
    let sentence = sentence.trim_end_matches(['\r', '\n']);
    let body_and_sum = sentence
        .strip_prefix('$')
        .ok_or_else(|| invalid("missing '$'"))?;
    let (body, sum) = body_and_sum
        .rsplit_once('*')
        .ok_or_else(|| invalid("missing checksum"))?;

    let expected = u8::from_str_radix(sum, 16).map_err(|_| invalid("checksum is not hex"))?;
    let computed = checksum(body);
    if expected != computed {
        return Err(NmeaError::ChecksumMismatch { expected, computed });
    }

    let fields: Vec<&str> = body.split(',').collect();
    let kind = fields[0];
    if kind.len() != 5 || !kind.is_ascii() {
        return Err(invalid("bad address field"));
    }

    match &kind[2..] {
        // $GPGGA,time,lat,N,lon,W,quality,...
        "GGA" => {
            let coordinate = position(&fields, 2)?;
            let quality = field(&fields, 6)?;
            Ok(Fix {
                coordinate,
                valid: !quality.is_empty() && quality != "0",
            })
        }
        // $GPRMC,time,status,lat,N,lon,W,...
        "RMC" => {
            let coordinate = position(&fields, 3)?;
            Ok(Fix {
                coordinate,
                valid: field(&fields, 2)? == "A",
            })
        }
        // $GPGLL,lat,N,lon,W,time,status,...
        "GLL" => {
            let coordinate = position(&fields, 1)?;
            Ok(Fix {
                coordinate,
                valid: field(&fields, 6)? == "A",
            })
        }
        other => Err(NmeaError::Unsupported {
            kind: other.to_string(),
        }),
    }
}

fn invalid(details: &str) -> NmeaError {
    NmeaError::InvalidFormat {
        details: details.to_string(),
    }
}

fn field<'a>(fields: &[&'a str], index: usize) -> Result<&'a str, NmeaError> {
    fields
        .get(index)
        .copied()
        .ok_or_else(|| invalid("sentence too short"))
}

/// Read `lat,hemisphere,lon,hemisphere` starting at `index`
fn position(fields: &[&str], index: usize) -> Result<Coordinate, NmeaError> {
    let latitude = angle(field(fields, index)?, field(fields, index + 1)?, 'N', 'S')?;
    let longitude = angle(field(fields, index + 2)?, field(fields, index + 3)?, 'E', 'W')?;
    Coordinate::new(latitude, longitude).map_err(|e| invalid(&e.to_string()))
}

/// Convert `ddmm.mmmm` / `dddmm.mmmm` plus hemisphere into signed degrees
fn angle(value: &str, hemisphere: &str, positive: char, negative: char) -> Result<f64, NmeaError> {
    if value.is_empty() {
        return Err(NmeaError::NoPosition);
    }
    // Byte offsets below assume one byte per character
    if !value.is_ascii() {
        return Err(invalid("non-ASCII angle"));
    }
    // Minutes always have two integer digits before the decimal point
    let dot = value.find('.').unwrap_or(value.len());
    if dot < 3 {
        return Err(invalid("angle too short"));
    }
    let degrees: f64 = value[..dot - 2]
        .parse()
        .map_err(|_| invalid("bad degrees"))?;
    let minutes: f64 = value[dot - 2..]
        .parse()
        .map_err(|_| invalid("bad minutes"))?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(invalid("minutes out of range"));
    }

    let magnitude = degrees + minutes / 60.0;
    match hemisphere.chars().next() {
        Some(c) if c == positive => Ok(magnitude),
        Some(c) if c == negative => Ok(-magnitude),
        _ => Err(invalid("bad hemisphere")),
    }
}

/// Byte-at-a-time sentence assembler
#[derive(Debug, Default)]
pub struct SentenceBuffer {
    buffer: String,
    overflowed: bool,
}

impl SentenceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one byte; returns a complete sentence when a line ends
    pub fn push(&mut self, byte: u8) -> Option<String> {
        match byte {
            b'$' => {
                self.buffer.clear();
                self.buffer.push('$');
                self.overflowed = false;
                None
            }
            b'\n' | b'\r' => {
                let done = !self.overflowed && self.buffer.starts_with('$');
                let sentence = std::mem::take(&mut self.buffer);
                self.overflowed = false;
                if done && sentence.len() > 1 {
                    Some(sentence)
                } else {
                    None
                }
            }
            _ if self.buffer.is_empty() || self.overflowed => None,
            _ if !byte.is_ascii() || byte.is_ascii_control() => {
                self.overflowed = true;
                None
            }
            _ => {
                if self.buffer.len() >= MAX_SENTENCE_LEN {
                    self.overflowed = true;
                    self.buffer.clear();
                } else {
                    self.buffer.push(byte as char);
                }
                None
            }
        }
    }
}
