//! Top-level error taxonomy

use crate::algorithms::geodesy::GeodesyError;
use crate::hardware::error::{RecoveryStrategy, TransportError};
use crate::processing::codec::DecodeError;
use thiserror::Error;

/// Every failure the tracker can observe.
///
/// Only `FatalInit` is unrecoverable in place; the others are handled where
/// they happen and surface as diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("location message rejected: {0}")]
    Decode(#[from] DecodeError),
    #[error("direction lookup failed: {0}")]
    Geodesy(#[from] GeodesyError),
    #[error("no valid GPS fix available")]
    SensorUnavailable,
    #[error("transport failed to initialize after {attempts} attempts")]
    FatalInit { attempts: u32 },
}

pub type TrackerResult<T> = Result<T, TrackerError>;

impl TrackerError {
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            TrackerError::Transport(error) => error.recovery_strategy(),
            TrackerError::Decode(_) | TrackerError::Geodesy(_) => RecoveryStrategy::Discard,
            TrackerError::SensorUnavailable => RecoveryStrategy::Wait,
            TrackerError::FatalInit { .. } => RecoveryStrategy::Restart,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self.recovery_strategy(),
            RecoveryStrategy::Halt | RecoveryStrategy::Restart
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_init_failure_restarts() {
        assert_eq!(
            TrackerError::FatalInit { attempts: 5 }.recovery_strategy(),
            RecoveryStrategy::Restart
        );
        assert!(!TrackerError::FatalInit { attempts: 5 }.is_recoverable());
        assert!(TrackerError::Decode(DecodeError::EmptyInput).is_recoverable());
        assert!(TrackerError::SensorUnavailable.is_recoverable());
        assert!(TrackerError::from(TransportError::NotConnected).is_recoverable());
    }
}
