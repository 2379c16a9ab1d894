//! Physical constants and protocol limits

/// Mean Earth radius used by the haversine distance (kilometers)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Conversion factor from kilometers to yards
pub const KM_TO_YARDS: f64 = 1093.613298;

/// Largest accepted location message, excluding the line terminator (bytes)
pub const MAX_MESSAGE_LEN: usize = 128;

/// Largest accepted latitude/longitude field after trimming (characters)
pub const MAX_FIELD_LEN: usize = 15;

/// Decimal digits written for each coordinate on the wire
pub const WIRE_DECIMAL_DIGITS: usize = 8;

/// Inbound line buffer size; one byte is reserved so at most 255 are read
pub const READ_BUFFER_CAPACITY: usize = 256;

/// Line terminator framing every location message
pub const LINE_TERMINATOR: u8 = b'\n';
