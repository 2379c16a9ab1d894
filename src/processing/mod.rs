//! Message processing: the location wire codec and NMEA input parsing

pub mod codec;
pub mod nmea;

pub use codec::{decode, encode, DecodeError};
pub use nmea::{parse_sentence, NmeaError};
