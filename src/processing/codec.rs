//! Text codec for location messages exchanged over the link
//!
//! Wire format, one message per line:
//!
//! ```text
//! Latitude: 42.32022250 Longitude: -83.23471900\n
//! ```
//!
//! Labels are case-sensitive and must appear in this order. The line
//! terminator is framing added by the sender and is not part of the message.

use crate::core::{
    Axis, Coordinate, CoordinateError, MAX_FIELD_LEN, MAX_MESSAGE_LEN, WIRE_DECIMAL_DIGITS,
};
use thiserror::Error;

const LATITUDE_LABEL: &str = "Latitude:";
const LONGITUDE_LABEL: &str = "Longitude:";

/// Reasons a location message is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("empty message")]
    EmptyInput,
    #[error("message is {length} bytes, limit is {max}")]
    TooLong { length: usize, max: usize },
    #[error("expected 'Latitude:' followed by 'Longitude:'")]
    MissingField,
    #[error("{axis} field is empty")]
    FieldEmpty { axis: Axis },
    #[error("{axis} field is {length} characters, limit is {max}")]
    FieldTooLong { axis: Axis, length: usize, max: usize },
    #[error("{axis} field '{text}' is not a number")]
    NotANumber { axis: Axis, text: String },
    #[error(transparent)]
    OutOfRange(#[from] CoordinateError),
}

/// Render a coordinate as a location message, without line terminator
pub fn encode(coordinate: &Coordinate) -> String {
    format!(
        "{} {:.prec$} {} {:.prec$}",
        LATITUDE_LABEL,
        coordinate.latitude(),
        LONGITUDE_LABEL,
        coordinate.longitude(),
        prec = WIRE_DECIMAL_DIGITS
    )
}

/// Parse and validate a location message.
///
/// Pure: nothing outside the returned value is touched, so a caller that
/// only stores `Ok` results keeps its last good coordinate on failure.
pub fn decode(text: &str) -> Result<Coordinate, DecodeError> {
    if text.is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    if text.len() > MAX_MESSAGE_LEN {
        return Err(DecodeError::TooLong {
            length: text.len(),
            max: MAX_MESSAGE_LEN,
        });
    }

    let latitude_start = text.find(LATITUDE_LABEL).ok_or(DecodeError::MissingField)? + LATITUDE_LABEL.len();
    // The first longitude label anywhere must follow the latitude label
    let longitude_label = text.find(LONGITUDE_LABEL).ok_or(DecodeError::MissingField)?;
    if longitude_label < latitude_start {
        return Err(DecodeError::MissingField);
    }
    let longitude_start = longitude_label + LONGITUDE_LABEL.len();

    let latitude_text = checked_field(Axis::Latitude, &text[latitude_start..longitude_label])?;
    let longitude_text = checked_field(Axis::Longitude, &text[longitude_start..])?;

    let latitude = parse_field(Axis::Latitude, latitude_text)?;
    let longitude = parse_field(Axis::Longitude, longitude_text)?;

    Ok(Coordinate::new(latitude, longitude)?)
}

fn checked_field(axis: Axis, raw: &str) -> Result<&str, DecodeError> {
    let field = raw.trim();
    let length = field.chars().count();
    if length == 0 {
        return Err(DecodeError::FieldEmpty { axis });
    }
    if length > MAX_FIELD_LEN {
        return Err(DecodeError::FieldTooLong {
            axis,
            length,
            max: MAX_FIELD_LEN,
        });
    }
    Ok(field)
}

fn parse_field(axis: Axis, field: &str) -> Result<f64, DecodeError> {
    field.parse::<f64>().map_err(|_| DecodeError::NotANumber {
        axis,
        text: field.to_string(),
    })
}
