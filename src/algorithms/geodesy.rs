//! Distance and bearing between two positions
//!
//! Distances use the haversine formula on a spherical Earth and are
//! reported in yards. Bearings follow the rhumb line (constant heading on a
//! Mercator chart), not the initial great-circle course. For the short
//! ranges this device works at the two agree to well under a compass
//! sector; over long distances they diverge, and callers must not treat the
//! result as a great-circle heading.

use crate::core::{Coordinate, EARTH_RADIUS_KM, KM_TO_YARDS};
use std::f64::consts::{FRAC_PI_4, PI};
use std::fmt;
use thiserror::Error;

/// Width of one compass sector (degrees)
pub const SECTOR_WIDTH_DEG: f64 = 22.5;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeodesyError {
    /// Bearings must be normalized into [0, 360) before sector lookup
    #[error("bearing {bearing} is outside [0, 360)")]
    BearingOutOfRange { bearing: f64 },
}

/// Great-circle distance between two positions, in yards
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let half_dlat = (lat2 - lat1) / 2.0;
    let half_dlon = (b.longitude() - a.longitude()).to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    // Rounding can push h a hair outside [0, 1] near zero and antipodes
    let h = h.clamp(0.0, 1.0);
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * central_angle * KM_TO_YARDS
}

/// Rhumb-line bearing from `from` toward `to`, in degrees within [0, 360)
pub fn bearing(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();

    let mut dlon = (to.longitude() - from.longitude()).to_radians();
    // Take the short way around the antimeridian
    if dlon > PI {
        dlon -= 2.0 * PI;
    } else if dlon < -PI {
        dlon += 2.0 * PI;
    }

    let mut dpsi = ((FRAC_PI_4 + lat2 / 2.0).tan() / (FRAC_PI_4 + lat1 / 2.0).tan()).ln();
    if dpsi.is_nan() {
        // Both ends on the same pole
        dpsi = lat2 - lat1;
    }

    normalize_degrees(dlon.atan2(dpsi).to_degrees())
}

/// Fold any angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360.0;
    // adding 0.0 also turns -0.0 into 0.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized + 0.0
    }
}

/// Sixteen-point compass rose, clockwise from north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompassSector {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassSector {
    pub const ALL: [CompassSector; 16] = [
        CompassSector::N,
        CompassSector::NNE,
        CompassSector::NE,
        CompassSector::ENE,
        CompassSector::E,
        CompassSector::ESE,
        CompassSector::SE,
        CompassSector::SSE,
        CompassSector::S,
        CompassSector::SSW,
        CompassSector::SW,
        CompassSector::WSW,
        CompassSector::W,
        CompassSector::WNW,
        CompassSector::NW,
        CompassSector::NNW,
    ];

    /// Sector containing `bearing`.
    ///
    /// Sector `k` covers `[22.5k - 11.25, 22.5k + 11.25)`, so north spans
    /// `[348.75, 360) ∪ [0, 11.25)`.
    pub fn from_bearing(bearing: f64) -> Result<Self, GeodesyError> {
        if !(0.0..360.0).contains(&bearing) {
            return Err(GeodesyError::BearingOutOfRange { bearing });
        }
        let index = ((bearing + SECTOR_WIDTH_DEG / 2.0) / SECTOR_WIDTH_DEG).floor() as usize % 16;
        Ok(Self::ALL[index])
    }

    /// Bearing at the middle of the sector
    pub fn center(&self) -> f64 {
        let index = Self::ALL
            .iter()
            .position(|sector| sector == self)
            .unwrap_or(0);
        index as f64 * SECTOR_WIDTH_DEG
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompassSector::N => "N",
            CompassSector::NNE => "NNE",
            CompassSector::NE => "NE",
            CompassSector::ENE => "ENE",
            CompassSector::E => "E",
            CompassSector::ESE => "ESE",
            CompassSector::SE => "SE",
            CompassSector::SSE => "SSE",
            CompassSector::S => "S",
            CompassSector::SSW => "SSW",
            CompassSector::SW => "SW",
            CompassSector::WSW => "WSW",
            CompassSector::W => "W",
            CompassSector::WNW => "WNW",
            CompassSector::NW => "NW",
            CompassSector::NNW => "NNW",
        }
    }
}

impl fmt::Display for CompassSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a normalized bearing onto the 16-point compass
pub fn compass_sector(bearing: f64) -> Result<CompassSector, GeodesyError> {
    CompassSector::from_bearing(bearing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let a = coord(42.3202225, -83.234719);
        let b = coord(42.3202225, -83.234719);
        assert_eq!(distance(&a, &b), 0.0);

        for point in [coord(0.0, 0.0), coord(90.0, 0.0), coord(-33.9, 151.2), coord(12.5, -180.0)] {
            assert_eq!(distance(&point, &point), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (coord(42.3202225, -83.234719), coord(42.32, -83.234)),
            (coord(51.5007, -0.1246), coord(40.6892, -74.0445)),
            (coord(-89.0, 10.0), coord(89.0, -170.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance(&a, &b), distance(&b, &a));
        }
    }

    #[test]
    fn test_one_arc_minute_at_equator() {
        // 1853.25 m on a 6371 km sphere
        let d = distance(&coord(0.0, 0.0), &coord(1.0 / 60.0, 0.0));
        assert!((d - 2026.74).abs() < 1.0, "got {} yards", d);
    }

    #[test]
    fn test_antipodal_distance_is_finite() {
        let d = distance(&coord(0.0, 0.0), &coord(0.0, 180.0));
        let half_circumference = EARTH_RADIUS_KM * PI * KM_TO_YARDS;
        assert!(d.is_finite());
        assert!((d - half_circumference).abs() < 1e-6 * half_circumference);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = coord(10.0, 20.0);
        assert!(bearing(&origin, &coord(10.1, 20.0)).abs() < 1e-9);
        assert!((bearing(&origin, &coord(10.0, 20.1)) - 90.0).abs() < 1e-9);
        assert!((bearing(&origin, &coord(9.9, 20.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(&origin, &coord(10.0, 19.9)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_stays_in_range() {
        let points = [
            coord(0.0, 179.9),
            coord(0.0, -179.9),
            coord(42.3202225, -83.234719),
            coord(-45.0, 0.0),
            coord(90.0, 0.0),
            coord(-90.0, 0.0),
        ];
        for a in points {
            for b in points {
                let value = bearing(&a, &b);
                assert!((0.0..360.0).contains(&value), "{} -> {} gave {}", a, b, value);
            }
        }
    }

    #[test]
    fn test_bearing_crosses_antimeridian_the_short_way() {
        // Eastward across 180 degrees
        let value = bearing(&coord(0.0, 179.9), &coord(0.0, -179.9));
        assert!((value - 90.0).abs() < 1e-9, "got {}", value);
    }

    #[test]
    fn test_compass_sector_labels() {
        assert_eq!(compass_sector(0.0).unwrap(), CompassSector::N);
        assert_eq!(compass_sector(359.9).unwrap(), CompassSector::N);
        assert_eq!(compass_sector(90.0).unwrap(), CompassSector::E);
        assert_eq!(compass_sector(180.0).unwrap(), CompassSector::S);
        assert_eq!(compass_sector(270.0).unwrap(), CompassSector::W);
        assert_eq!(compass_sector(292.5).unwrap().label(), "WNW");
    }

    #[test]
    fn test_compass_sector_boundaries() {
        assert_eq!(compass_sector(11.249).unwrap(), CompassSector::N);
        assert_eq!(compass_sector(11.25).unwrap(), CompassSector::NNE);
        assert_eq!(compass_sector(348.749).unwrap(), CompassSector::NNW);
        assert_eq!(compass_sector(348.75).unwrap(), CompassSector::N);

        for sector in CompassSector::ALL {
            assert_eq!(compass_sector(sector.center()).unwrap(), sector);
        }
    }

    #[test]
    fn test_compass_sector_rejects_unnormalized_input() {
        assert!(matches!(
            compass_sector(360.0),
            Err(GeodesyError::BearingOutOfRange { .. })
        ));
        assert!(compass_sector(-0.1).is_err());
        assert!(compass_sector(f64::NAN).is_err());
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-1e-18), 0.0);
        assert!(normalize_degrees(-0.0).is_sign_positive());
    }
}
