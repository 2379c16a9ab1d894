//! Transport error types and recovery classification

use crate::core::PeerAddress;
use thiserror::Error;

/// Failures reported by the point-to-point transport
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// Operation needs an open link
    #[error("link is not connected")]
    NotConnected,
    /// Dialing the peer failed
    #[error("connection to {address} failed")]
    ConnectFailed { address: PeerAddress },
    /// A listen/advertise burst failed on every attempt
    #[error("listen failed after {attempts} attempts")]
    ListenFailed { attempts: u32 },
    /// The initiator hit its attempt ceiling and stopped retrying
    #[error("gave up after {attempts} consecutive connection attempts")]
    RetriesExhausted { attempts: u32 },
    /// More bytes pending than the inbound buffer can hold; input was drained
    #[error("{pending} bytes pending exceed the {capacity} byte buffer")]
    BufferOverflow { pending: usize, capacity: usize },
    /// The transport rejected outbound data
    #[error("write failed: {details}")]
    WriteFailed { details: String },
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// How a failure should be handled by whoever observes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Leave it to the bounded retry policy of the link lifecycle
    RetryWithBackoff,
    /// Drop the offending data and carry on
    Discard,
    /// Nothing to do until the collaborator produces data
    Wait,
    /// Stop retrying in place until an explicit reset
    Halt,
    /// Restart the whole process
    Restart,
}

impl TransportError {
    /// Get the recommended recovery strategy for this error
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            TransportError::NotConnected => RecoveryStrategy::RetryWithBackoff,
            TransportError::ConnectFailed { .. } => RecoveryStrategy::RetryWithBackoff,
            TransportError::ListenFailed { .. } => RecoveryStrategy::RetryWithBackoff,
            TransportError::RetriesExhausted { .. } => RecoveryStrategy::Halt,
            TransportError::BufferOverflow { .. } => RecoveryStrategy::Discard,
            TransportError::WriteFailed { .. } => RecoveryStrategy::Discard,
        }
    }

    /// Check if the link can recover from this error on its own
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
    fn test_recovery_strategies() {
        let address = PeerAddress::new([0x1C, 0x69, 0x20, 0xC6, 0x5E, 0x32]);
        assert_eq!(
            TransportError::ConnectFailed { address }.recovery_strategy(),
            RecoveryStrategy::RetryWithBackoff
        );
        assert!(TransportError::BufferOverflow { pending: 300, capacity: 255 }.is_recoverable());
        assert!(!TransportError::RetriesExhausted { attempts: 5 }.is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let address = PeerAddress::new([0x1C, 0x69, 0x20, 0xC6, 0x5E, 0x32]);
        assert_eq!(
            TransportError::ConnectFailed { address }.to_string(),
            "connection to 1C:69:20:C6:5E:32 failed"
        );
    }
}
