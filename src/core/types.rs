//! Core data types shared by every component

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which coordinate axis a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => write!(f, "latitude"),
            Axis::Longitude => write!(f, "longitude"),
        }
    }
}

/// Rejected coordinate component
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{axis} {value} is outside [{min}, {max}]")]
pub struct CoordinateError {
    pub axis: Axis,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Geographic position in decimal degrees.
///
/// Both components are range-checked on construction, so a `Coordinate`
/// that exists is always within `[-90, 90]` x `[-180, 180]`. An unset
/// position is modelled as `Option<Coordinate>::None` by its owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        check_axis(Axis::Latitude, latitude, 90.0)?;
        check_axis(Axis::Longitude, longitude, 180.0)?;
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.8}, {:.8})", self.latitude, self.longitude)
    }
}

fn check_axis(axis: Axis, value: f64, limit: f64) -> Result<(), CoordinateError> {
    // NaN fails `contains`, so it is rejected here too
    if (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(CoordinateError {
            axis,
            value,
            min: -limit,
            max: limit,
        })
    }
}

/// One position sample reported by the GPS receiver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub coordinate: Coordinate,
    pub valid: bool,
}

impl Fix {
    pub fn valid(coordinate: Coordinate) -> Self {
        Self { coordinate, valid: true }
    }

    pub fn invalid(coordinate: Coordinate) -> Self {
        Self { coordinate, valid: false }
    }
}

/// Side of the point-to-point link a peer plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Master: carries the reference position and dials the peer
    Initiator,
    /// Client: advertises, accepts the master and displays the result
    Acceptor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => write!(f, "initiator"),
            Role::Acceptor => write!(f, "acceptor"),
        }
    }
}

/// Link-layer address of the acceptor (Bluetooth MAC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerAddress([u8; 6]);

impl PeerAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid peer address '{input}': expected six colon-separated hex octets")]
pub struct AddressParseError {
    pub input: String,
}

impl FromStr for PeerAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressParseError { input: s.to_string() };
        let mut octets = [0u8; 6];
        let mut parts = s.trim().split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl TryFrom<String> for PeerAddress {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeerAddress> for String {
    fn from(address: PeerAddress) -> Self {
        address.to_string()
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a, b, c, d, e, g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_range_checks() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());

        let err = Coordinate::new(90.5, 0.0).unwrap_err();
        assert_eq!(err.axis, Axis::Latitude);

        let err = Coordinate::new(0.0, -180.01).unwrap_err();
        assert_eq!(err.axis, Axis::Longitude);

        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_peer_address_parsing() {
        let address: PeerAddress = "1c:69:20:C6:5E:32".parse().unwrap();
        assert_eq!(address.octets(), [0x1C, 0x69, 0x20, 0xC6, 0x5E, 0x32]);
        assert_eq!(address.to_string(), "1C:69:20:C6:5E:32");

        assert!("1C:69:20:C6:5E".parse::<PeerAddress>().is_err());
        assert!("1C:69:20:C6:5E:32:00".parse::<PeerAddress>().is_err());
        assert!("1C:69:20:C6:5E:3".parse::<PeerAddress>().is_err());
        assert!("ZZ:69:20:C6:5E:32".parse::<PeerAddress>().is_err());
    }

    #[test]
    fn test_peer_address_serde() {
        let address = PeerAddress::new([0x1C, 0x69, 0x20, 0xC6, 0x5E, 0x32]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"1C:69:20:C6:5E:32\"");

        let back: PeerAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);

        assert!(serde_json::from_str::<PeerAddress>("\"nope\"").is_err());
    }
}
